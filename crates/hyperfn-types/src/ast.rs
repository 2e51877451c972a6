//! Arena-backed AST for the source-language subset the transform observes.
//!
//! Expressions and statements live in an [`Arena`] owned by the
//! [`Program`] and are referenced through [`ExprId`] / [`StmtId`].
//! Transforms never mutate a program in place: they clone it, append new
//! nodes to the clone's arena and swap in new declarations, so the original
//! tree stays available for diagnostics.

use std::fmt;
use std::ops::Index;

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Arena
// ══════════════════════════════════════════════════════════════════════════════

/// Index of an expression node in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

/// Index of a statement node in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only node storage. Ids are only meaningful for the arena (or a
/// clone of the arena) that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        id
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

impl Index<ExprId> for Arena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.expr(id)
    }
}

impl Index<StmtId> for Arena {
    type Output = Stmt;

    fn index(&self, id: StmtId) -> &Stmt {
        self.stmt(id)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// Role of a source file within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The entry module whose exports form the public surface.
    Entry,
    /// Any other user-authored module.
    User,
    /// Standard or third-party library code. Never transformed.
    Library,
}

/// One parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Normalized module path without extension, e.g. `assembly/index`.
    pub path: String,
    pub kind: SourceKind,
    pub items: Vec<Item>,
    pub arena: Arena,
    pub span: Span,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn exports(&self) -> impl Iterator<Item = &ExportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Export(e) => Some(e),
            _ => None,
        })
    }

    /// Find a top-level function by its resolved name.
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions().find(|f| f.resolved_name() == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes().find(|c| c.name.name == name)
    }
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionDecl),
    Class(ClassDecl),
    /// `export { a, b as c } [from "module"]`
    Export(ExportDecl),
    Import(ImportDecl),
    /// Top-level `let` / `const` / `var`.
    Variable(VarDecl),
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers & Decorators
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `@name` or `@name(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub name: Ident,
    pub args: Vec<ExprId>,
    pub span: Span,
}

/// Host-facing name given by `@external("module", "name")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalName {
    pub module: Option<String>,
    pub name: String,
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// `[export] [declare] function name(params): ReturnType { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub decorators: Vec<Decorator>,
    /// Override from an `@external` decorator, resolved by the parser.
    pub external: Option<ExternalName>,
    pub exported: bool,
    pub declared: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` for body-less (imported) declarations.
    pub body: Option<Block>,
    pub span: Span,
}

impl FunctionDecl {
    /// The name the host sees: the `@external(module, name)` override for
    /// body-less declarations, the declared identifier otherwise. The
    /// one-argument form only renames the wasm import and keeps the
    /// declared identifier.
    pub fn resolved_name(&self) -> &str {
        match (&self.body, &self.external) {
            (
                None,
                Some(ExternalName {
                    module: Some(_),
                    name,
                }),
            ) => name,
            _ => &self.name.name,
        }
    }

    pub fn has_defaults(&self) -> bool {
        self.params.iter().any(|p| p.initializer.is_some())
    }
}

/// `name: Type [= initializer]`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub type_ann: TypeAnnotation,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<StmtId>,
    pub span: Span,
}

/// `[export] class Name [extends Base] { members... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub decorators: Vec<Decorator>,
    pub exported: bool,
    pub extends: Option<TypeAnnotation>,
    pub fields: Vec<FieldDecl>,
    /// Methods and constructors. Never rewritten.
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// `name[!]: Type [= initializer];`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub type_ann: TypeAnnotation,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDecl {
    pub members: Vec<ExportMember>,
    pub from: Option<String>,
    pub span: Span,
}

/// `local [as exported]`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMember {
    pub local: Ident,
    pub exported: Option<Ident>,
}

/// `import { a, b as c } from "module"` or `import * as ns from "module"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub members: Vec<ImportMember>,
    pub namespace: Option<Ident>,
    pub from: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportMember {
    pub imported: Ident,
    pub local: Ident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Let,
    Const,
    Var,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Let => "let",
            VarKind::Const => "const",
            VarKind::Var => "var",
        }
    }
}

/// `[export] let|const|var name[: Type] [= value]`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub name: Ident,
    pub type_ann: Option<TypeAnnotation>,
    pub value: Option<ExprId>,
    pub exported: bool,
    pub decorators: Vec<Decorator>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Block),
    Expr(ExprId),
    /// `let|const|var name[: Type] [= value];` inside a body.
    Local {
        kind: VarKind,
        name: Ident,
        type_ann: Option<TypeAnnotation>,
        value: Option<ExprId>,
    },
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Throw(ExprId),
    /// A lone `;`.
    Empty,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    This,
    /// `new Type(args...)`
    New {
        type_ann: TypeAnnotation,
        args: Vec<ExprId>,
    },
    /// `callee<T...>(args...)`
    Call {
        callee: ExprId,
        type_args: Vec<TypeAnnotation>,
        args: Vec<ExprId>,
    },
    /// `object.property`
    Member {
        object: ExprId,
        property: Ident,
    },
    /// `object[index]`
    Index {
        object: ExprId,
        index: ExprId,
    },
    Binary {
        op: BinOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    Assign {
        op: Option<BinOp>,
        target: ExprId,
        value: ExprId,
    },
    /// `condition ? then : otherwise`
    Conditional {
        condition: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    /// `expr as Type`
    As {
        expr: ExprId,
        type_ann: TypeAnnotation,
    },
    Paren(ExprId),
}

/// Literal forms, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Unsigned integer value plus its source spelling (`0xFF`, `1_000`).
    /// Negative numbers are `Unary { op: Neg, .. }` over this literal.
    Integer { value: u64, text: String },
    Float { value: f64, text: String },
    String(String),
    Array(Vec<ExprId>),
    Object(Vec<(Ident, ExprId)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Shl,
    Shr,
    ShrU,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::ShrU => ">>>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }

    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::BitOr => 3,
            BinOp::BitXor => 4,
            BinOp::BitAnd => 5,
            BinOp::Eq | BinOp::NotEq | BinOp::StrictEq | BinOp::StrictNotEq => 6,
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => 7,
            BinOp::Shl | BinOp::Shr | BinOp::ShrU => 8,
            BinOp::Add | BinOp::Sub => 9,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Annotations
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A plain, unqualified, non-generic type name.
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            TypeKind::Named {
                segments: vec![Ident::new(name, span)],
                args: Vec::new(),
            },
            span,
        )
    }

    /// The final name segment for named types (`collections.Result` → `Result`).
    pub fn base_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Named { segments, .. } => segments.last().map(|s| s.name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `i32`, `Map<string, i32>`, `collections.SearchResult`
    Named {
        segments: Vec<Ident>,
        args: Vec<TypeAnnotation>,
    },
    /// `T[]`
    Array(Box<TypeAnnotation>),
    /// `T | null`
    Nullable(Box<TypeAnnotation>),
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Named { segments, args } => {
                for (i, seg) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&seg.name)?;
                }
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeKind::Array(elem) => match elem.kind {
                TypeKind::Nullable(_) => write!(f, "({elem})[]"),
                _ => write!(f, "{elem}[]"),
            },
            TypeKind::Nullable(inner) => write!(f, "{inner} | null"),
        }
    }
}
