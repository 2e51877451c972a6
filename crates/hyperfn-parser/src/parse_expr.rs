//! Expression parsing with operator precedence climbing.
//!
//! Precedence (lowest → highest):
//! 1. `=`, `op=` (right-associative)
//! 2. `? :`
//! 3. binary operators, ranked by [`BinOp::precedence`]; `as` binds at the
//!    relational level
//! 4. unary `-`, `+`, `!`, `~`
//! 5. postfix call, generic call, `.` member, `[]` index

use hyperfn_lexer::token::TokenKind;
use hyperfn_types::ast::*;
use hyperfn_types::{ErrorCode, Span};

use crate::parser::{Parser, MAX_EXPR_DEPTH};

/// Binding power of `expr as Type`.
const AS_PRECEDENCE: u8 = 7;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<ExprId> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_assignment();
        self.expr_depth -= 1;
        result
    }

    /// Comma-separated expressions up to and including `)`. The opening
    /// parenthesis has already been consumed.
    pub(crate) fn parse_arguments(&mut self) -> Option<Vec<ExprId>> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(kind, span)
    }

    fn span_of(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Assignment & Conditional
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_assignment(&mut self) -> Option<ExprId> {
        let target = self.parse_conditional()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Rem),
            TokenKind::AmpEq => Some(BinOp::BitAnd),
            TokenKind::PipeEq => Some(BinOp::BitOr),
            TokenKind::CaretEq => Some(BinOp::BitXor),
            _ => return Some(target),
        };

        let target_expr = self.arena.expr(target);
        let target_span = target_expr.span;
        if !matches!(
            target_expr.kind,
            ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        ) {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                "invalid assignment target",
                target_span,
            );
            return None;
        }

        self.advance();
        let value = self.parse_assignment()?;
        let span = target_span.merge(self.span_of(value));
        Some(self.alloc(ExprKind::Assign { op, target, value }, span))
    }

    fn parse_conditional(&mut self) -> Option<ExprId> {
        let condition = self.parse_binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Some(condition);
        }
        let then = self.parse_assignment()?;
        self.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_assignment()?;
        let span = self.span_of(condition).merge(self.span_of(otherwise));
        Some(self.alloc(
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Binary Operators
    // ══════════════════════════════════════════════════════════════════════════

    /// Left-associative precedence climbing over [`BinOp`].
    fn parse_binary(&mut self, min_prec: u8) -> Option<ExprId> {
        let mut left = self.parse_unary()?;
        loop {
            if self.check(&TokenKind::As) && AS_PRECEDENCE >= min_prec {
                self.advance();
                let type_ann = self.parse_type_annotation()?;
                let span = self.span_of(left).merge(type_ann.span);
                left = self.alloc(ExprKind::As { expr: left, type_ann }, span);
                continue;
            }
            let Some(op) = self.match_binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = self.span_of(left).merge(self.span_of(right));
            left = self.alloc(ExprKind::Binary { op, left, right }, span);
        }
        Some(left)
    }

    fn match_binary_op(&self) -> Option<BinOp> {
        Some(match self.peek_kind() {
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::NotEq,
            TokenKind::EqEqEq => BinOp::StrictEq,
            TokenKind::BangEqEq => BinOp::StrictNotEq,
            TokenKind::Less => BinOp::Less,
            TokenKind::Greater => BinOp::Greater,
            TokenKind::LessEq => BinOp::LessEq,
            TokenKind::GreaterEq => BinOp::GreaterEq,
            TokenKind::Shl => BinOp::Shl,
            TokenKind::Shr => BinOp::Shr,
            TokenKind::ShrU => BinOp::ShrU,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Rem,
            _ => return None,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Unary & Postfix
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_unary(&mut self) -> Option<ExprId> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.merge(self.span_of(operand));
        Some(self.alloc(ExprKind::Unary { op, operand }, span))
    }

    fn parse_postfix(&mut self) -> Option<ExprId> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    let span = self.span_of(expr).merge(self.previous_span());
                    expr = self.alloc(
                        ExprKind::Call {
                            callee: expr,
                            type_args: Vec::new(),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Less if self.looks_like_type_args() => {
                    self.advance();
                    let mut type_args = Vec::new();
                    loop {
                        type_args.push(self.parse_type_annotation()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect_closing_angle()?;
                    self.expect(&TokenKind::LParen)?;
                    let args = self.parse_arguments()?;
                    let span = self.span_of(expr).merge(self.previous_span());
                    expr = self.alloc(
                        ExprKind::Call {
                            callee: expr,
                            type_args,
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_property_name()?;
                    let span = self.span_of(expr).merge(property.span);
                    expr = self.alloc(
                        ExprKind::Member {
                            object: expr,
                            property,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = self.span_of(expr).merge(self.previous_span());
                    expr = self.alloc(ExprKind::Index { object: expr, index }, span);
                }
                _ => break,
            }
        }
        Some(expr)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<ExprId> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::Integer(value, text) => {
                self.advance();
                ExprKind::Literal(Literal::Integer { value, text })
            }
            TokenKind::Float(value, text) => {
                self.advance();
                ExprKind::Literal(Literal::Float { value, text })
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                ExprKind::Literal(Literal::String(value))
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Literal(Literal::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Literal(Literal::Null)
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Identifier(name) => {
                self.advance();
                ExprKind::Identifier(name)
            }
            k if k.is_contextual_keyword() => {
                self.advance();
                ExprKind::Identifier(k.to_string())
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.at_end() {
                    elements.push(self.parse_expression()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                ExprKind::Literal(Literal::Array(elements))
            }
            TokenKind::LBrace => {
                self.advance();
                ExprKind::Literal(Literal::Object(self.parse_object_entries()?))
            }
            TokenKind::New => {
                self.advance();
                let type_ann = self.parse_type_annotation()?;
                let args = if self.eat(&TokenKind::LParen) {
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                ExprKind::New { type_ann, args }
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                return None;
            }
        };
        let span = start.merge(self.previous_span());
        Some(self.alloc(kind, span))
    }

    /// Object literal entries after `{`, through the closing `}`.
    /// Keys are names, keywords or string literals; `{ a }` is shorthand
    /// for `{ a: a }`.
    fn parse_object_entries(&mut self) -> Option<Vec<(Ident, ExprId)>> {
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let key = match self.peek_kind().clone() {
                TokenKind::StringLiteral(value) => {
                    let span = self.advance().span;
                    Ident::new(value, span)
                }
                _ => self.expect_property_name()?,
            };
            let value = if self.eat(&TokenKind::Colon) {
                self.parse_expression()?
            } else {
                self.alloc(ExprKind::Identifier(key.name.clone()), key.span)
            };
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(entries)
    }
}
