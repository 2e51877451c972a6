//! Type resolution and the manifest type table.
//!
//! [`TypeResolver`] turns annotations into [`Type`]s using the
//! [`ModuleEnv`] of the module they were written in, and lays out the
//! [`TypeDefinition`]s every exported signature depends on.
//!
//! Ids 1, 2 and 3 belong to `ArrayBuffer`, `String` and `ArrayBufferView`.
//! All other types are numbered from 4 in discovery order.

use std::collections::{HashMap, HashSet};

use hyperfn_types::ast::{ClassDecl, Program, TypeAnnotation, TypeKind};
use hyperfn_types::signature::{Field, TypeDefinition};
use tracing::debug;

use crate::env::ModuleEnv;
use crate::ty::{Primitive, Type, ARRAY_SIZE, DATE_SIZE, MAP_SIZE};

pub const ARRAY_BUFFER_ID: u32 = 1;
pub const STRING_ID: u32 = 2;
pub const ARRAY_BUFFER_VIEW_ID: u32 = 3;
pub const FIRST_USER_ID: u32 = ARRAY_BUFFER_VIEW_ID + 1;

/// A class together with the module that declares it.
#[derive(Debug, Clone, Copy)]
struct ClassEntry<'a> {
    module: &'a str,
    decl: &'a ClassDecl,
}

// ══════════════════════════════════════════════════════════════════════════════
// TypeResolver
// ══════════════════════════════════════════════════════════════════════════════

pub struct TypeResolver<'a> {
    envs: HashMap<&'a str, ModuleEnv>,
    /// Every class of every source, keyed by origin path.
    classes: HashMap<String, ClassEntry<'a>>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(programs: &'a [Program]) -> Self {
        let mut envs = HashMap::new();
        let mut classes = HashMap::new();
        for program in programs {
            envs.insert(program.path.as_str(), ModuleEnv::from_program(program));
            for decl in program.classes() {
                classes.insert(
                    format!("{}/{}", program.path, decl.name.name),
                    ClassEntry {
                        module: program.path.as_str(),
                        decl,
                    },
                );
            }
        }
        Self { envs, classes }
    }

    /// Resolve `ann` as written in `module`.
    pub fn resolve(&self, module: &str, ann: &TypeAnnotation) -> Type {
        match &ann.kind {
            TypeKind::Array(elem) => Type::Array(Box::new(self.resolve(module, elem))),
            TypeKind::Nullable(inner) => Type::Nullable(Box::new(self.resolve(module, inner))),
            TypeKind::Named { segments, args } => {
                let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
                if let [name] = names.as_slice() {
                    if let Some(builtin) = self.builtin(module, name, args) {
                        return builtin;
                    }
                }
                self.class(module, &names)
            }
        }
    }

    /// Resolve an optional return annotation; a missing one is `void`.
    pub fn resolve_return(&self, module: &str, ann: Option<&TypeAnnotation>) -> Type {
        match ann {
            Some(ann) => self.resolve(module, ann),
            None => Type::Primitive(Primitive::Void),
        }
    }

    fn builtin(&self, module: &str, name: &str, args: &[TypeAnnotation]) -> Option<Type> {
        if let Some(primitive) = Primitive::from_name(name) {
            return Some(Type::Primitive(primitive));
        }
        let ty = match (name, args) {
            ("string" | "String", []) => Type::String,
            ("Date", []) => Type::Date,
            ("Array", [elem]) => Type::Array(Box::new(self.resolve(module, elem))),
            ("Map", [key, value]) => Type::Map(
                Box::new(self.resolve(module, key)),
                Box::new(self.resolve(module, value)),
            ),
            _ => return None,
        };
        Some(ty)
    }

    fn class(&self, module: &str, names: &[&str]) -> Type {
        let path = self
            .envs
            .get(module)
            .and_then(|env| env.qualify(names))
            .unwrap_or_else(|| {
                debug!(
                    "Type '{}' is not bound in {}, assuming a local declaration",
                    names.join("."),
                    module
                );
                format!("{module}/{}", names.join("/"))
            });
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Type::Class { path, name }
    }

    // ── Type table ────────────────────────────────────────────────────────────

    /// Definitions of every non-primitive type reachable from `roots`, in
    /// discovery order. Class fields are followed transitively.
    pub fn type_table<'t>(&self, roots: impl IntoIterator<Item = &'t Type>) -> Vec<TypeDefinition> {
        let mut table = TypeTable {
            defs: Vec::new(),
            seen: HashSet::new(),
            next_id: FIRST_USER_ID,
        };
        for ty in roots {
            self.visit(ty, &mut table);
        }
        table.defs
    }

    fn visit(&self, ty: &Type, table: &mut TypeTable) {
        if ty.is_primitive() {
            return;
        }
        if let Type::Nullable(inner) = ty {
            self.visit(inner, table);
            return;
        }
        let path = ty.path();
        if !table.seen.insert(path.clone()) {
            return;
        }
        let id = match ty {
            Type::String => STRING_ID,
            _ => table.allocate(),
        };

        let (size, fields, field_types) = match ty {
            Type::Array(_) => (ARRAY_SIZE, None, Vec::new()),
            Type::Map(..) => (MAP_SIZE, None, Vec::new()),
            Type::Date => (DATE_SIZE, None, Vec::new()),
            Type::Class { path, .. } => match self.class_layout(path) {
                Some(layout) => (layout.size, Some(layout.fields), layout.types),
                None => {
                    debug!("No declaration found for '{}', listing it as opaque", path);
                    (0, None, Vec::new())
                }
            },
            _ => (0, None, Vec::new()),
        };
        debug!("Type {} '{}': {} bytes", id, path, size);
        table.defs.push(TypeDefinition {
            id,
            size,
            path,
            name: ty.to_string(),
            fields,
        });

        for child in ty.children() {
            self.visit(child, table);
        }
        for field_type in &field_types {
            self.visit(field_type, table);
        }
    }

    /// Instance fields of a class, base class fields first, laid out with
    /// natural alignment. `None` when no source declares the class.
    fn class_layout(&self, path: &str) -> Option<ClassLayout> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(*self.classes.get(path)?);
        while let Some(entry) = current {
            if !visited.insert(format!("{}/{}", entry.module, entry.decl.name.name)) {
                break;
            }
            chain.push(entry);
            current = entry.decl.extends.as_ref().and_then(|base| {
                match self.resolve(entry.module, base) {
                    Type::Class { path, .. } => self.classes.get(&path).copied(),
                    _ => None,
                }
            });
        }

        let mut layout = ClassLayout {
            size: 0,
            fields: Vec::new(),
            types: Vec::new(),
        };
        let mut offset = 0u32;
        let mut max_align = 1u32;
        for entry in chain.iter().rev() {
            for field in &entry.decl.fields {
                let ty = self.resolve(entry.module, &field.type_ann);
                let (size, align) = ty.field_layout();
                offset = align_up(offset, align);
                max_align = max_align.max(align);
                layout.fields.push(Field {
                    offset,
                    name: field.name.name.clone(),
                    type_ref: ty.to_type_ref(),
                });
                layout.types.push(ty);
                offset += size;
            }
        }
        layout.size = align_up(offset, max_align);
        Some(layout)
    }
}

struct TypeTable {
    defs: Vec<TypeDefinition>,
    /// Origin paths already listed.
    seen: HashSet<String>,
    next_id: u32,
}

impl TypeTable {
    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

struct ClassLayout {
    size: u32,
    fields: Vec<Field>,
    types: Vec<Type>,
}

fn align_up(offset: u32, align: u32) -> u32 {
    offset.div_ceil(align) * align
}
