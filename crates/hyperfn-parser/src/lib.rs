//! hyperfn parser: converts a token stream into an arena-backed AST.

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parser::{module_path, ParseResult, Parser};
