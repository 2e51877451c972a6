//! Statement and block parsing.

use hyperfn_lexer::token::TokenKind;
use hyperfn_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `"{" { Statement } "}"`
    ///
    /// A statement that fails to parse is skipped; the block itself only
    /// fails when its closing brace is missing.
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.current_span();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.synchronize_stmt();
                    if self.current_span() == before && !self.check(&TokenKind::RBrace) {
                        self.advance();
                    }
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(Block {
            stmts,
            span: start.merge(self.previous_span()),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Option<StmtId> {
        let start = self.current_span();
        let kind = match self.peek_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::Let | TokenKind::Const | TokenKind::Var => self.parse_local()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_statement()?;
                StmtKind::While { condition, body }
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon)
                    || self.check(&TokenKind::RBrace)
                    || self.at_end()
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.eat_semicolon();
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expression()?;
                self.eat_semicolon();
                StmtKind::Throw(value)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat_semicolon();
                StmtKind::Expr(expr)
            }
        };
        let span = start.merge(self.previous_span());
        Some(self.arena.alloc_stmt(kind, span))
    }

    /// `("let" | "const" | "var") Name [":" Type] ["=" Expr] [";"]`
    fn parse_local(&mut self) -> Option<StmtKind> {
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
        Some(StmtKind::Local {
            kind,
            name,
            type_ann,
            value,
        })
    }

    /// `"if" "(" Expr ")" Statement [ "else" Statement ]`
    fn parse_if(&mut self) -> Option<StmtKind> {
        self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Some(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }
}
