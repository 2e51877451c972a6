//! Top-level and declaration parsing.
//!
//! Handles imports, `export { ... }` lists, decorators, functions
//! (with and without bodies), classes and top-level variables.

use hyperfn_lexer::token::TokenKind;
use hyperfn_types::ast::*;
use hyperfn_types::{ErrorCode, Span};

use crate::parser::Parser;

/// Declaration keywords of the full language that the front-end rejects.
const UNSUPPORTED_DECLARATIONS: &[&str] = &[
    "type",
    "interface",
    "enum",
    "namespace",
    "abstract",
    "default",
];

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Items
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse one top-level item.
    pub(crate) fn parse_item(&mut self) -> Option<Item> {
        let start = self.current_span();
        let decorators = self.parse_decorators()?;
        let exported = self.eat(&TokenKind::Export);

        if exported && self.check(&TokenKind::LBrace) {
            return self.parse_export_list(start).map(Item::Export);
        }

        let declared = self.eat(&TokenKind::Declare);

        match self.peek_kind().clone() {
            TokenKind::Function => self
                .parse_function(decorators, exported, declared, start)
                .map(Item::Function),
            TokenKind::Class => self
                .parse_class(decorators, exported, start)
                .map(Item::Class),
            TokenKind::Let | TokenKind::Const | TokenKind::Var => self
                .parse_var_decl(decorators, exported, start)
                .map(Item::Variable),
            TokenKind::Import if !exported && !declared => {
                self.parse_import(start).map(Item::Import)
            }
            TokenKind::Identifier(word) if UNSUPPORTED_DECLARATIONS.contains(&word.as_str()) => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_DECLARATION,
                    format!("'{word}' declarations are not supported"),
                );
                None
            }
            TokenKind::Star if exported => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_DECLARATION,
                    "'export *' re-exports are not supported",
                );
                None
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected a declaration, got '{other}'"),
                );
                None
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Decorators
    // ══════════════════════════════════════════════════════════════════════════

    /// `{ "@" Name [ "(" [ Expr { "," Expr } ] ")" ] }`
    pub(crate) fn parse_decorators(&mut self) -> Option<Vec<Decorator>> {
        let mut decorators = Vec::new();
        while self.check(&TokenKind::At) {
            let start = self.advance().span;
            let name = self.expect_property_name()?;
            let mut args = Vec::new();
            if self.eat(&TokenKind::LParen) {
                args = self.parse_arguments()?;
            }
            let span = start.merge(self.previous_span());
            decorators.push(Decorator { name, args, span });
        }
        Some(decorators)
    }

    /// Resolve `@external(...)` on a declaration into its host-facing name.
    ///
    /// One argument names the import, two give module and name. Anything
    /// other than string literals is an error.
    fn resolve_external(&mut self, decorators: &[Decorator]) -> Option<ExternalName> {
        let decorator = decorators.iter().find(|d| d.name.name == "external")?;
        let mut values = Vec::with_capacity(decorator.args.len());
        for &arg in &decorator.args {
            let expr = self.arena.expr(arg);
            let span = expr.span;
            let literal = match &expr.kind {
                ExprKind::Literal(Literal::String(s)) => Some(s.clone()),
                _ => None,
            };
            match literal {
                Some(value) => values.push(value),
                None => {
                    self.error_at(
                        ErrorCode::INVALID_DECORATOR,
                        "@external arguments must be string literals",
                        span,
                    );
                    return None;
                }
            }
        }
        let mut values = values.into_iter();
        match (values.next(), values.next(), values.next()) {
            (Some(name), None, None) => Some(ExternalName { module: None, name }),
            (Some(module), Some(name), None) => Some(ExternalName {
                module: Some(module),
                name,
            }),
            _ => {
                self.error_at(
                    ErrorCode::INVALID_DECORATOR,
                    format!(
                        "@external takes one or two arguments, got {}",
                        decorator.args.len()
                    ),
                    decorator.span,
                );
                None
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `"function" Name [TypeParams] "(" Params ")" [":" Type] ( Block | ";" )`
    fn parse_function(
        &mut self,
        decorators: Vec<Decorator>,
        exported: bool,
        declared: bool,
        start: Span,
    ) -> Option<FunctionDecl> {
        self.expect(&TokenKind::Function)?;
        let name = self.expect_identifier()?;
        self.skip_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.eat_semicolon();
            None
        };
        if declared && body.is_some() {
            self.error_at(
                ErrorCode::UNSUPPORTED_DECLARATION,
                format!("declared function '{}' cannot have a body", name.name),
                name.span,
            );
        }

        let external = self.resolve_external(&decorators);
        let span = start.merge(self.previous_span());
        Some(FunctionDecl {
            name,
            decorators,
            external,
            exported,
            declared,
            params,
            return_type,
            body,
            span,
        })
    }

    /// `"(" [ Param { "," Param } [","] ] ")"`
    ///
    /// Every parameter needs a type annotation. Constructor parameter
    /// modifiers (`public`, `private`, `readonly`) are accepted and dropped.
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let start = self.current_span();
            while matches!(
                self.peek_kind(),
                TokenKind::Public | TokenKind::Private | TokenKind::Readonly
            ) && !matches!(self.look_ahead(1), TokenKind::Colon | TokenKind::Comma)
            {
                self.advance();
            }
            let name = self.expect_identifier()?;
            if self.check(&TokenKind::Question) {
                self.error_at_current(
                    ErrorCode::MISSING_TYPE_ANNOTATION,
                    format!(
                        "optional parameter '{}' needs a default value instead of '?'",
                        name.name
                    ),
                );
                return None;
            }
            if !self.eat(&TokenKind::Colon) {
                self.error_at(
                    ErrorCode::MISSING_TYPE_ANNOTATION,
                    format!("parameter '{}' is missing a type annotation", name.name),
                    name.span,
                );
                return None;
            }
            let type_ann = self.parse_type_annotation()?;
            let initializer = if self.eat(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let span = start.merge(self.previous_span());
            params.push(Param {
                name,
                type_ann,
                initializer,
                span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// Generic parameter lists (`<T, U>`) are parsed and discarded.
    fn skip_type_params(&mut self) -> Option<()> {
        if !self.eat(&TokenKind::Less) {
            return Some(());
        }
        loop {
            self.expect_identifier()?;
            if matches!(self.peek_kind(), TokenKind::Identifier(w) if w == "extends") {
                self.advance();
                self.parse_type_annotation()?;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing_angle()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Classes
    // ══════════════════════════════════════════════════════════════════════════

    /// `"class" Name [TypeParams] ["extends" Type] ["implements" Type {"," Type}] "{" Members "}"`
    fn parse_class(
        &mut self,
        decorators: Vec<Decorator>,
        exported: bool,
        start: Span,
    ) -> Option<ClassDecl> {
        self.expect(&TokenKind::Class)?;
        let name = self.expect_identifier()?;
        self.skip_type_params()?;

        let mut extends = None;
        if self.eat_word("extends") {
            extends = Some(self.parse_type_annotation()?);
        }
        if self.eat_word("implements") {
            loop {
                self.parse_type_annotation()?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            if self.too_many_errors() {
                break;
            }
            if self.parse_class_member(&mut fields, &mut methods).is_none() {
                self.synchronize_member();
            }
        }
        self.expect(&TokenKind::RBrace)?;

        let span = start.merge(self.previous_span());
        Some(ClassDecl {
            name,
            decorators,
            exported,
            extends,
            fields,
            methods,
            span,
        })
    }

    fn parse_class_member(
        &mut self,
        fields: &mut Vec<FieldDecl>,
        methods: &mut Vec<FunctionDecl>,
    ) -> Option<()> {
        let start = self.current_span();
        let decorators = self.parse_decorators()?;

        let mut is_static = false;
        loop {
            let is_modifier = match self.peek_kind() {
                TokenKind::Public | TokenKind::Private | TokenKind::Readonly => true,
                TokenKind::Identifier(w) => {
                    matches!(w.as_str(), "static" | "protected" | "get" | "set")
                }
                _ => false,
            };
            // A modifier word directly followed by `(`, `:` or `=` is the member name.
            let names_member = matches!(
                self.look_ahead(1),
                TokenKind::LParen
                    | TokenKind::Colon
                    | TokenKind::Eq
                    | TokenKind::Bang
                    | TokenKind::Question
                    | TokenKind::Semicolon
                    | TokenKind::Less
            );
            if !is_modifier || names_member {
                break;
            }
            if matches!(self.peek_kind(), TokenKind::Identifier(w) if w == "static") {
                is_static = true;
            }
            self.advance();
        }

        let name = self.expect_property_name()?;

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Less) {
            self.skip_type_params()?;
            let params = self.parse_params()?;
            let return_type = if self.eat(&TokenKind::Colon) {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            let body = if self.check(&TokenKind::LBrace) {
                Some(self.parse_block()?)
            } else {
                self.eat_semicolon();
                None
            };
            let span = start.merge(self.previous_span());
            methods.push(FunctionDecl {
                name,
                decorators,
                external: None,
                exported: false,
                declared: false,
                params,
                return_type,
                body,
                span,
            });
            return Some(());
        }

        if !self.eat(&TokenKind::Bang) {
            self.eat(&TokenKind::Question);
        }
        if !self.eat(&TokenKind::Colon) {
            self.error_at(
                ErrorCode::MISSING_TYPE_ANNOTATION,
                format!("field '{}' is missing a type annotation", name.name),
                name.span,
            );
            return None;
        }
        let type_ann = self.parse_type_annotation()?;
        let initializer = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.eat_semicolon();

        if !is_static {
            let span = start.merge(self.previous_span());
            fields.push(FieldDecl {
                name,
                type_ann,
                initializer,
                span,
            });
        }
        Some(())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════════

    /// `("let" | "const" | "var") Name [":" Type] ["=" Expr] [";"]`
    fn parse_var_decl(
        &mut self,
        decorators: Vec<Decorator>,
        exported: bool,
        start: Span,
    ) -> Option<VarDecl> {
        let kind = self.parse_var_kind()?;
        let name = self.expect_identifier()?;
        let type_ann = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        let value = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.eat_semicolon();
        let span = start.merge(self.previous_span());
        Some(VarDecl {
            kind,
            name,
            type_ann,
            value,
            exported,
            decorators,
            span,
        })
    }

    pub(crate) fn parse_var_kind(&mut self) -> Option<VarKind> {
        let kind = match self.peek_kind() {
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            TokenKind::Var => VarKind::Var,
            other => {
                let message = format!("expected 'let', 'const' or 'var', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.advance();
        Some(kind)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Modules
    // ══════════════════════════════════════════════════════════════════════════

    /// `"export" "{" [ Member { "," Member } [","] ] "}" ["from" String] [";"]`
    fn parse_export_list(&mut self, start: Span) -> Option<ExportDecl> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let local = self.expect_identifier()?;
            let exported = if self.eat(&TokenKind::As) {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            members.push(ExportMember { local, exported });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let from = if self.eat(&TokenKind::From) {
            Some(self.expect_string_literal()?)
        } else {
            None
        };
        self.eat_semicolon();
        let span = start.merge(self.previous_span());
        Some(ExportDecl {
            members,
            from,
            span,
        })
    }

    /// ```ebnf
    /// Import = "import" "{" Member { "," Member } "}" "from" String
    ///        | "import" "*" "as" Name "from" String
    ///        | "import" String ;
    /// ```
    fn parse_import(&mut self, start: Span) -> Option<ImportDecl> {
        self.expect(&TokenKind::Import)?;
        let mut members = Vec::new();
        let mut namespace = None;

        match self.peek_kind() {
            TokenKind::StringLiteral(_) => {}
            TokenKind::Star => {
                self.advance();
                self.expect(&TokenKind::As)?;
                namespace = Some(self.expect_identifier()?);
            }
            _ => {
                self.expect(&TokenKind::LBrace)?;
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    let imported = self.expect_identifier()?;
                    let local = if self.eat(&TokenKind::As) {
                        self.expect_identifier()?
                    } else {
                        imported.clone()
                    };
                    members.push(ImportMember { imported, local });
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
            }
        }

        if namespace.is_some() || !members.is_empty() || self.check(&TokenKind::From) {
            self.expect(&TokenKind::From)?;
        }
        let from = self.expect_string_literal()?;
        self.eat_semicolon();
        let span = start.merge(self.previous_span());
        Some(ImportDecl {
            members,
            namespace,
            from,
            span,
        })
    }

    /// Skip past a broken class member: through the next `;` or up to the
    /// class's closing `}`.
    fn synchronize_member(&mut self) {
        let mut depth = 0u32;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume a bare identifier with the given spelling.
    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek_kind(), TokenKind::Identifier(w) if w == word) {
            self.advance();
            true
        } else {
            false
        }
    }
}
