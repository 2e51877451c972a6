//! Resolved types for the manifest.
//!
//! [`Type`] is what a [`TypeAnnotation`](hyperfn_types::ast::TypeAnnotation)
//! means once names are resolved. It is distinct from the syntactic
//! annotation, and it knows its display name, origin path and wasm32 layout.

use std::fmt;

use hyperfn_types::signature::TypeRef;

/// Size of a managed reference on wasm32.
pub const POINTER_SIZE: u32 = 4;

/// Instance size of `Array<T>`: buffer, dataStart, byteLength, length.
pub const ARRAY_SIZE: u32 = 16;

/// Instance size of `Map<K, V>`.
pub const MAP_SIZE: u32 = 24;

/// Instance size of `Date`.
pub const DATE_SIZE: u32 = 24;

// ══════════════════════════════════════════════════════════════════════════════
// Primitive
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Isize,
    Usize,
    Void,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Primitive::Bool,
            "i8" => Primitive::I8,
            "u8" => Primitive::U8,
            "i16" => Primitive::I16,
            "u16" => Primitive::U16,
            "i32" => Primitive::I32,
            "u32" => Primitive::U32,
            "i64" => Primitive::I64,
            "u64" => Primitive::U64,
            "f32" => Primitive::F32,
            "f64" => Primitive::F64,
            "isize" => Primitive::Isize,
            "usize" => Primitive::Usize,
            "void" => Primitive::Void,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::U8 => "u8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Isize => "isize",
            Primitive::Usize => "usize",
            Primitive::Void => "void",
        }
    }

    /// Byte size, which is also the alignment.
    pub fn size(self) -> u32 {
        match self {
            Primitive::Void => 0,
            Primitive::Bool | Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32
            | Primitive::U32
            | Primitive::F32
            | Primitive::Isize
            | Primitive::Usize => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    String,
    Date,
    /// `T[]` / `Array<T>`
    Array(Box<Type>),
    /// `Map<K, V>`
    Map(Box<Type>, Box<Type>),
    /// A class, identified by its origin path (`assembly/index/Point`).
    Class { path: String, name: String },
    /// `T | null`
    Nullable(Box<Type>),
}

impl Type {
    /// Fully qualified origin path.
    pub fn path(&self) -> String {
        match self {
            Type::Primitive(p) => p.as_str().to_string(),
            Type::String => "~lib/string/String".to_string(),
            Type::Date => "~lib/date/Date".to_string(),
            Type::Array(elem) => format!("~lib/array/Array<{}>", elem.path()),
            Type::Map(key, value) => format!("~lib/map/Map<{},{}>", key.path(), value.path()),
            Type::Class { path, .. } => path.clone(),
            Type::Nullable(inner) => format!("{}|null", inner.path()),
        }
    }

    pub fn to_type_ref(&self) -> TypeRef {
        TypeRef::new(self.to_string(), self.path())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// `(size, alignment)` of a field or array slot holding this type.
    pub fn field_layout(&self) -> (u32, u32) {
        match self {
            Type::Primitive(p) => {
                let size = p.size();
                (size, size.max(1))
            }
            _ => (POINTER_SIZE, POINTER_SIZE),
        }
    }

    /// Types that appear directly inside this one, in declaration order.
    /// Class fields are not included.
    pub fn children(&self) -> Vec<&Type> {
        match self {
            Type::Array(elem) => vec![elem],
            Type::Map(key, value) => vec![key, value],
            Type::Nullable(inner) => vec![inner],
            _ => Vec::new(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Display
// ══════════════════════════════════════════════════════════════════════════════

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p.as_str()),
            Type::String => write!(f, "string"),
            Type::Date => write!(f, "Date"),
            Type::Array(elem) => match elem.as_ref() {
                Type::Nullable(_) => write!(f, "({elem})[]"),
                _ => write!(f, "{elem}[]"),
            },
            Type::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Type::Class { name, .. } => write!(f, "{name}"),
            Type::Nullable(inner) => write!(f, "{inner} | null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(t: Type) -> Type {
        Type::Array(Box::new(t))
    }

    #[test]
    fn nested_arrays_render_like_source() {
        let t = array(array(Type::Primitive(Primitive::F32)));
        assert_eq!(t.to_string(), "f32[][]");
        assert_eq!(t.path(), "~lib/array/Array<~lib/array/Array<f32>>");
    }

    #[test]
    fn map_and_nullable_paths() {
        let t = Type::Map(Box::new(Type::String), Box::new(Type::Primitive(Primitive::I32)));
        assert_eq!(t.to_string(), "Map<string, i32>");
        assert_eq!(t.path(), "~lib/map/Map<~lib/string/String,i32>");

        let point = Type::Class {
            path: "assembly/index/Point".into(),
            name: "Point".into(),
        };
        let t = array(Type::Nullable(Box::new(point)));
        assert_eq!(t.to_string(), "(Point | null)[]");
        assert_eq!(t.path(), "~lib/array/Array<assembly/index/Point|null>");
    }

    #[test]
    fn field_layouts() {
        assert_eq!(Type::Primitive(Primitive::U8).field_layout(), (1, 1));
        assert_eq!(Type::Primitive(Primitive::F64).field_layout(), (8, 8));
        assert_eq!(Type::Primitive(Primitive::Usize).field_layout(), (4, 4));
        assert_eq!(Type::String.field_layout(), (4, 4));
        assert_eq!(array(Type::Date).field_layout(), (4, 4));
    }

    #[test]
    fn primitive_names_round_trip() {
        for name in ["bool", "i8", "u16", "i32", "u64", "f32", "isize", "void"] {
            assert_eq!(Primitive::from_name(name).map(Primitive::as_str), Some(name));
        }
        assert_eq!(Primitive::from_name("string"), None);
    }
}
