//! Human-readable build report.

use std::io::{self, Write};

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;
use crate::stringify::{signature_to_string, type_to_string, RecordLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Indented text, optionally ANSI colored.
    #[default]
    Plain,
    /// Headings, a table and bullet lists.
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// ANSI colors in plain output. Ignored for markdown.
    pub color: bool,
    /// Append the manifest as pretty-printed JSON.
    pub debug_json: bool,
}

/// Render `manifest` to `out`.
///
/// Every function is listed. Types are filtered through
/// [`TypeDefinition::is_hidden`](hyperfn_types::signature::TypeDefinition::is_hidden)
/// and the section is left out when nothing remains.
pub fn write_report<W: Write + ?Sized>(
    out: &mut W,
    manifest: &Manifest,
    records: &dyn RecordLookup,
    options: &ReportOptions,
) -> io::Result<()> {
    let mut writer = ReportWriter { out, options };

    writer.header("Plugin Metadata:")?;
    let mut rows = vec![
        ("Plugin Name", manifest.plugin.as_str()),
        ("Library", manifest.library.as_str()),
        ("Build ID", manifest.build_id.as_str()),
        ("Build Timestamp", manifest.build_ts.as_str()),
    ];
    if let Some(vcs) = &manifest.vcs {
        rows.push(("Git Repo", vcs.repo.as_str()));
        rows.push(("Git Commit", vcs.commit.as_str()));
    }
    writer.table(&rows)?;
    writeln!(writer.out)?;

    writer.header("Hypermode Functions:")?;
    for function in &manifest.functions {
        let text = signature_to_string(function, records.records(&function.name));
        writer.item(&text)?;
    }
    writeln!(writer.out)?;

    let types: Vec<String> = manifest.visible_types().map(type_to_string).collect();
    if !types.is_empty() {
        writer.header("Custom Data Types:")?;
        for text in &types {
            writer.item(text)?;
        }
        writeln!(writer.out)?;
    }

    if options.debug_json {
        writer.header("Metadata JSON:")?;
        let json = serde_json::to_string_pretty(manifest).map_err(io::Error::other)?;
        write!(writer.out, "{json}\n\n")?;
    }
    Ok(())
}

struct ReportWriter<'a, W: Write + ?Sized> {
    out: &'a mut W,
    options: &'a ReportOptions,
}

impl<W: Write + ?Sized> ReportWriter<'_, W> {
    fn markdown(&self) -> bool {
        self.options.format == ReportFormat::Markdown
    }

    fn colored(&self) -> bool {
        self.options.color && !self.markdown()
    }

    fn header(&mut self, text: &str) -> io::Result<()> {
        if self.markdown() {
            writeln!(self.out, "### {text}")
        } else if self.colored() {
            writeln!(self.out, "{}", text.blue().bold())
        } else {
            writeln!(self.out, "{text}")
        }
    }

    fn item(&mut self, text: &str) -> io::Result<()> {
        if self.markdown() {
            writeln!(self.out, "  - {text}")
        } else if self.colored() {
            writeln!(self.out, "  {}", text.cyan())
        } else {
            writeln!(self.out, "  {text}")
        }
    }

    /// Two-column table. Markdown gets an empty header row and a separator;
    /// plain output aligns the values after `key:`.
    fn table(&mut self, rows: &[(&str, &str)]) -> io::Result<()> {
        let width = |s: &str| s.chars().count();
        let (pad0, pad1) = rows.iter().fold((0, 0), |(a, b), (key, value)| {
            (a.max(width(key)), b.max(width(value)))
        });

        if self.markdown() {
            writeln!(self.out, "| {} | {} |", " ".repeat(pad0), " ".repeat(pad1))?;
            writeln!(self.out, "| {} | {} |", "-".repeat(pad0), "-".repeat(pad1))?;
        }
        for (key, value) in rows {
            let padding0 = " ".repeat(pad0 - width(key));
            let padding1 = " ".repeat(pad1 - width(value));
            if self.markdown() {
                writeln!(self.out, "| {key}{padding0} | {value}{padding1} |")?;
            } else if self.colored() {
                let key = format!("{key}:");
                writeln!(self.out, "  {}{padding0} {}", key.cyan(), value.blue())?;
            } else {
                writeln!(self.out, "  {key}:{padding0} {value}")?;
            }
        }
        Ok(())
    }
}
