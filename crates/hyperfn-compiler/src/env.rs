//! Module-level name environment for type resolution.
//!
//! [`ModuleEnv`] records which type names a source file can see: classes it
//! declares, names it imports and namespaces it imports.

use std::collections::HashMap;

use hyperfn_types::ast::Program;

// ══════════════════════════════════════════════════════════════════════════════
// Binding
// ══════════════════════════════════════════════════════════════════════════════

/// What a top-level name in a module refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A class declared in this module.
    Class,
    /// `import { imported as local } from "<module>"`
    Import { module: String, imported: String },
    /// `import * as local from "<module>"`
    Namespace { module: String },
}

// ══════════════════════════════════════════════════════════════════════════════
// ModuleEnv
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ModuleEnv {
    path: String,
    bindings: HashMap<String, Binding>,
}

impl ModuleEnv {
    /// Collect the bindings of one parsed source. Later declarations of the
    /// same name shadow earlier ones.
    pub fn from_program(program: &Program) -> Self {
        let mut env = Self {
            path: program.path.clone(),
            bindings: HashMap::new(),
        };
        for import in program.imports() {
            let module = resolve_specifier(&program.path, &import.from);
            if let Some(ns) = &import.namespace {
                env.bindings.insert(
                    ns.name.clone(),
                    Binding::Namespace {
                        module: module.clone(),
                    },
                );
            }
            for member in &import.members {
                env.bindings.insert(
                    member.local.name.clone(),
                    Binding::Import {
                        module: module.clone(),
                        imported: member.imported.name.clone(),
                    },
                );
            }
        }
        for class in program.classes() {
            env.bindings.insert(class.name.name.clone(), Binding::Class);
        }
        env
    }

    /// Module path of the source, e.g. `assembly/index`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Origin path of the type `segments` names, or `None` when the first
    /// segment is not bound in this module.
    pub fn qualify(&self, segments: &[&str]) -> Option<String> {
        let (first, rest) = segments.split_first()?;
        let mut path = match self.lookup(first)? {
            Binding::Class => format!("{}/{}", self.path, first),
            Binding::Import { module, imported } => format!("{module}/{imported}"),
            // The namespace itself is not part of the path.
            Binding::Namespace { .. } if rest.is_empty() => return None,
            Binding::Namespace { module } => module.clone(),
        };
        for segment in rest {
            path.push('/');
            path.push_str(segment);
        }
        Some(path)
    }
}

/// Module path an import specifier refers to when written in module `from`.
///
/// Relative specifiers (`./x`, `../x`) resolve against the directory of
/// `from`; anything else is a package under `~lib/`.
pub fn resolve_specifier(from: &str, spec: &str) -> String {
    let spec = spec.strip_suffix(".ts").unwrap_or(spec);
    if !(spec.starts_with("./") || spec.starts_with("../")) {
        let package = spec.strip_prefix("~lib/").unwrap_or(spec);
        return format!("~lib/{package}");
    }

    let mut parts: Vec<&str> = from.split('/').collect();
    parts.pop();
    for segment in spec.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_specifiers() {
        assert_eq!(resolve_specifier("assembly/index", "./models"), "assembly/models");
        assert_eq!(resolve_specifier("assembly/api/index", "../models.ts"), "assembly/models");
        assert_eq!(resolve_specifier("assembly/index", "./lib/./geo"), "assembly/lib/geo");
    }

    #[test]
    fn package_specifiers_live_under_lib() {
        assert_eq!(
            resolve_specifier("assembly/index", "@hypermode/functions-as"),
            "~lib/@hypermode/functions-as"
        );
        assert_eq!(resolve_specifier("assembly/index", "~lib/date"), "~lib/date");
    }
}
