//! Source printer for (rewritten) programs.
//!
//! Prints the front-end subset back to source text with two-space
//! indentation. Parentheses come only from `Paren` nodes, so a parsed
//! program prints with the grouping it was written with.

use std::fmt::Write;

use hyperfn_types::ast::*;

/// Print a whole program.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new(&program.arena);
    for (i, item) in program.items.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.item(item);
    }
    printer.out
}

/// Print one function declaration (decorators included).
pub fn print_function(program: &Program, function: &FunctionDecl) -> String {
    let mut printer = Printer::new(&program.arena);
    printer.function(function, true);
    printer.out
}

struct Printer<'a> {
    arena: &'a Arena,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            out: String::new(),
            indent: 0,
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    // ── Items ─────────────────────────────────────────────────────────────────

    fn item(&mut self, item: &Item) {
        match item {
            Item::Function(f) => self.function(f, true),
            Item::Class(c) => self.class(c),
            Item::Export(e) => {
                self.out.push_str("export { ");
                let members: Vec<String> = e
                    .members
                    .iter()
                    .map(|m| match &m.exported {
                        Some(alias) => format!("{} as {}", m.local.name, alias.name),
                        None => m.local.name.clone(),
                    })
                    .collect();
                self.out.push_str(&members.join(", "));
                self.out.push_str(" }");
                if let Some(from) = &e.from {
                    let _ = write!(self.out, " from {}", quote(from));
                }
                self.out.push_str(";\n");
            }
            Item::Import(i) => {
                self.out.push_str("import ");
                if let Some(ns) = &i.namespace {
                    let _ = write!(self.out, "* as {} from ", ns.name);
                } else if !i.members.is_empty() {
                    let members: Vec<String> = i
                        .members
                        .iter()
                        .map(|m| {
                            if m.imported.name == m.local.name {
                                m.local.name.clone()
                            } else {
                                format!("{} as {}", m.imported.name, m.local.name)
                            }
                        })
                        .collect();
                    let _ = write!(self.out, "{{ {} }} from ", members.join(", "));
                }
                let _ = writeln!(self.out, "{};", quote(&i.from));
            }
            Item::Variable(v) => {
                self.decorators(&v.decorators);
                if v.exported {
                    self.out.push_str("export ");
                }
                self.local(v.kind, &v.name, v.type_ann.as_ref(), v.value);
                self.out.push('\n');
            }
        }
    }

    fn decorators(&mut self, decorators: &[Decorator]) {
        for d in decorators {
            self.pad();
            let _ = write!(self.out, "@{}", d.name.name);
            if !d.args.is_empty() {
                self.out.push('(');
                self.expr_list(&d.args);
                self.out.push(')');
            }
            self.out.push('\n');
        }
    }

    fn function(&mut self, f: &FunctionDecl, top_level: bool) {
        self.decorators(&f.decorators);
        self.pad();
        if f.exported {
            self.out.push_str("export ");
        }
        if f.declared {
            self.out.push_str("declare ");
        }
        if top_level {
            self.out.push_str("function ");
        }
        self.out.push_str(&f.name.name);
        self.out.push('(');
        for (i, p) in f.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let _ = write!(self.out, "{}: {}", p.name.name, p.type_ann);
            if let Some(init) = p.initializer {
                self.out.push_str(" = ");
                self.expr(init);
            }
        }
        self.out.push(')');
        if let Some(ret) = &f.return_type {
            let _ = write!(self.out, ": {ret}");
        }
        match &f.body {
            Some(body) => {
                self.out.push(' ');
                self.block(body);
                self.out.push('\n');
            }
            None => self.out.push_str(";\n"),
        }
    }

    fn class(&mut self, c: &ClassDecl) {
        self.decorators(&c.decorators);
        if c.exported {
            self.out.push_str("export ");
        }
        let _ = write!(self.out, "class {}", c.name.name);
        if let Some(base) = &c.extends {
            let _ = write!(self.out, " extends {base}");
        }
        self.out.push_str(" {\n");
        self.indent += 1;
        for field in &c.fields {
            self.pad();
            let _ = write!(self.out, "{}: {}", field.name.name, field.type_ann);
            if let Some(init) = field.initializer {
                self.out.push_str(" = ");
                self.expr(init);
            }
            self.out.push_str(";\n");
        }
        for method in &c.methods {
            self.function(method, false);
        }
        self.indent -= 1;
        self.out.push_str("}\n");
    }

    // ── Statements ────────────────────────────────────────────────────────────

    fn block(&mut self, block: &Block) {
        self.out.push_str("{\n");
        self.indent += 1;
        for &stmt in &block.stmts {
            self.pad();
            self.stmt(stmt);
            self.out.push('\n');
        }
        self.indent -= 1;
        self.pad();
        self.out.push('}');
    }

    fn local(
        &mut self,
        kind: VarKind,
        name: &Ident,
        type_ann: Option<&TypeAnnotation>,
        value: Option<ExprId>,
    ) {
        let _ = write!(self.out, "{} {}", kind.as_str(), name.name);
        if let Some(ty) = type_ann {
            let _ = write!(self.out, ": {ty}");
        }
        if let Some(value) = value {
            self.out.push_str(" = ");
            self.expr(value);
        }
        self.out.push(';');
    }

    fn stmt(&mut self, id: StmtId) {
        let arena = self.arena;
        match &arena[id].kind {
            StmtKind::Block(block) => self.block(block),
            StmtKind::Expr(expr) => {
                self.expr(*expr);
                self.out.push(';');
            }
            StmtKind::Local {
                kind,
                name,
                type_ann,
                value,
            } => self.local(*kind, name, type_ann.as_ref(), *value),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                self.expr(*condition);
                self.out.push_str(") ");
                self.stmt(*then_branch);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.stmt(*else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.out.push_str("while (");
                self.expr(*condition);
                self.out.push_str(") ");
                self.stmt(*body);
            }
            StmtKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(*value);
                }
                self.out.push(';');
            }
            StmtKind::Throw(value) => {
                self.out.push_str("throw ");
                self.expr(*value);
                self.out.push(';');
            }
            StmtKind::Empty => self.out.push(';'),
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn expr_list(&mut self, items: &[ExprId]) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item);
        }
    }

    fn expr(&mut self, id: ExprId) {
        let arena = self.arena;
        match &arena[id].kind {
            ExprKind::Literal(literal) => self.literal(literal),
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::This => self.out.push_str("this"),
            ExprKind::New { type_ann, args } => {
                let _ = write!(self.out, "new {type_ann}(");
                self.expr_list(args);
                self.out.push(')');
            }
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => {
                self.expr(*callee);
                if !type_args.is_empty() {
                    let types: Vec<String> = type_args.iter().map(ToString::to_string).collect();
                    let _ = write!(self.out, "<{}>", types.join(", "));
                }
                self.out.push('(');
                self.expr_list(args);
                self.out.push(')');
            }
            ExprKind::Member { object, property } => {
                self.expr(*object);
                let _ = write!(self.out, ".{}", property.name);
            }
            ExprKind::Index { object, index } => {
                self.expr(*object);
                self.out.push('[');
                self.expr(*index);
                self.out.push(']');
            }
            ExprKind::Binary { op, left, right } => {
                self.expr(*left);
                let _ = write!(self.out, " {} ", op.as_str());
                self.expr(*right);
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.as_str());
                let nested = matches!(arena[*operand].kind, ExprKind::Unary { .. });
                if nested {
                    self.out.push('(');
                }
                self.expr(*operand);
                if nested {
                    self.out.push(')');
                }
            }
            ExprKind::Assign { op, target, value } => {
                self.expr(*target);
                match op {
                    Some(op) => {
                        let _ = write!(self.out, " {}= ", op.as_str());
                    }
                    None => self.out.push_str(" = "),
                }
                self.expr(*value);
            }
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                self.expr(*condition);
                self.out.push_str(" ? ");
                self.expr(*then);
                self.out.push_str(" : ");
                self.expr(*otherwise);
            }
            ExprKind::As { expr, type_ann } => {
                self.expr(*expr);
                let _ = write!(self.out, " as {type_ann}");
            }
            ExprKind::Paren(inner) => {
                self.out.push('(');
                self.expr(*inner);
                self.out.push(')');
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.out.push_str("null"),
            Literal::Bool(b) => {
                let _ = write!(self.out, "{b}");
            }
            Literal::Integer { text, .. } | Literal::Float { text, .. } => self.out.push_str(text),
            Literal::String(s) => self.out.push_str(&quote(s)),
            Literal::Array(items) => {
                self.out.push('[');
                self.expr_list(items);
                self.out.push(']');
            }
            Literal::Object(entries) => {
                if entries.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{ ");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = write!(self.out, "{}: ", key.name);
                    self.expr(*value);
                }
                self.out.push_str(" }");
            }
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
