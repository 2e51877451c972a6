//! Type annotation parsing.

use hyperfn_lexer::token::TokenKind;
use hyperfn_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a type annotation.
    ///
    /// ```ebnf
    /// Type      = ArrayType [ "|" "null" ] ;
    /// ArrayType = PrimaryType { "[" "]" } ;
    /// PrimaryType = Identifier { "." Identifier } [ "<" Type { "," Type } ">" ]
    ///             | "(" Type ")" ;
    /// ```
    pub(crate) fn parse_type_annotation(&mut self) -> Option<TypeAnnotation> {
        let start = self.current_span();
        let mut ty = self.parse_array_type()?;
        if self.check(&TokenKind::Pipe) && self.look_ahead(1) == &TokenKind::Null {
            self.advance();
            self.advance();
            let span = start.merge(self.previous_span());
            ty = TypeAnnotation::new(TypeKind::Nullable(Box::new(ty)), span);
        }
        Some(ty)
    }

    fn parse_array_type(&mut self) -> Option<TypeAnnotation> {
        let start = self.current_span();
        let mut ty = self.parse_primary_type()?;
        while self.check(&TokenKind::LBracket) && self.look_ahead(1) == &TokenKind::RBracket {
            self.advance();
            self.advance();
            let span = start.merge(self.previous_span());
            ty = TypeAnnotation::new(TypeKind::Array(Box::new(ty)), span);
        }
        Some(ty)
    }

    fn parse_primary_type(&mut self) -> Option<TypeAnnotation> {
        let start = self.current_span();
        if self.eat(&TokenKind::LParen) {
            let inner = self.parse_type_annotation()?;
            self.expect(&TokenKind::RParen)?;
            return Some(TypeAnnotation::new(
                inner.kind,
                start.merge(self.previous_span()),
            ));
        }

        let mut segments = vec![self.expect_type_name()?];
        while self.check(&TokenKind::Dot) {
            self.advance();
            segments.push(self.expect_type_name()?);
        }

        let mut args = Vec::new();
        if self.eat(&TokenKind::Less) {
            loop {
                args.push(self.parse_type_annotation()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_closing_angle()?;
        }

        Some(TypeAnnotation::new(
            TypeKind::Named { segments, args },
            start.merge(self.previous_span()),
        ))
    }

    /// Type names may be `null` (as in `Map<string, null>` payloads) or
    /// any identifier.
    fn expect_type_name(&mut self) -> Option<Ident> {
        if self.check(&TokenKind::Null) {
            let span = self.advance().span;
            return Some(Ident::new("null", span));
        }
        self.expect_identifier()
    }

    /// Quiet check for `<Type, ...>(` at the cursor, used to tell a generic
    /// call from a `<` comparison. Never reports errors.
    pub(crate) fn looks_like_type_args(&self) -> bool {
        if self.peek_kind() != &TokenKind::Less {
            return false;
        }
        let mut depth = 0i32;
        let mut i = 0usize;
        loop {
            match self.look_ahead(i) {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => depth -= 1,
                TokenKind::Shr => depth -= 2,
                TokenKind::ShrU => depth -= 3,
                TokenKind::Identifier(_)
                | TokenKind::Null
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Pipe => {}
                _ => return false,
            }
            i += 1;
            if depth < 0 {
                return false;
            }
            if depth == 0 {
                return self.look_ahead(i) == &TokenKind::LParen;
            }
        }
    }
}
