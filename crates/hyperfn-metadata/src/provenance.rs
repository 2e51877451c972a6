//! Version-control provenance of a build.

use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Repository URL and commit of the working tree a build ran in. Both are
/// present or neither is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(rename = "gitRepo")]
    pub repo: String,
    #[serde(rename = "gitCommit")]
    pub commit: String,
}

/// Looks up the VCS provenance of the current build.
pub trait Provenance {
    /// `None` outside a working tree, or when the lookup fails.
    fn vcs(&self) -> Option<VcsInfo>;
}

/// Asks the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitProvenance {
    dir: Option<PathBuf>,
}

impl GitProvenance {
    /// Query the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the working tree containing `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Trimmed stdout of a successful `git` invocation.
    fn git(&self, args: &[&str]) -> Option<String> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        let output = command.output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Provenance for GitProvenance {
    fn vcs(&self) -> Option<VcsInfo> {
        if self.git(&["rev-parse", "--is-inside-work-tree"]).as_deref() != Some("true") {
            debug!("Not inside a git working tree, skipping provenance");
            return None;
        }
        let Some(remote) = self.git(&["remote", "get-url", "origin"]) else {
            warn!("Git working tree has no 'origin' remote, skipping provenance");
            return None;
        };
        let Some(commit) = self.git(&["rev-parse", "HEAD"]) else {
            warn!("Could not resolve HEAD, skipping provenance");
            return None;
        };
        let repo = normalize_remote(&remote);
        debug!("Git provenance: {} at {}", repo, commit);
        Some(VcsInfo { repo, commit })
    }
}

/// Fixed provenance for embedders and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticProvenance(pub Option<VcsInfo>);

impl StaticProvenance {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(repo: impl Into<String>, commit: impl Into<String>) -> Self {
        Self(Some(VcsInfo {
            repo: repo.into(),
            commit: commit.into(),
        }))
    }
}

impl Provenance for StaticProvenance {
    fn vcs(&self) -> Option<VcsInfo> {
        self.0.clone()
    }
}

/// `git@host:path` becomes `https://host/path`; a trailing `.git` is dropped.
pub fn normalize_remote(url: &str) -> String {
    let url = url.trim();
    let mut url = match url.strip_prefix("git@") {
        Some(rest) => match rest.split_once(':') {
            Some((host, path)) => format!("https://{host}/{path}"),
            None => format!("https://{rest}"),
        },
        None => url.to_string(),
    };
    if let Some(stripped) = url.strip_suffix(".git") {
        url = stripped.to_string();
    }
    url
}
