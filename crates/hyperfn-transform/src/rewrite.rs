//! The default-parameter rewrite pass.
//!
//! Works on copies: every program is cloned, new nodes are appended to the
//! clone's arena and rewritten declarations replace the originals in the
//! clone's item list.

use hyperfn_types::ast::*;
use hyperfn_types::signature::{OptionalParamRecord, Parameter, TypeRef};
use hyperfn_types::Span;
use tracing::{debug, info};

use crate::context::RewriteContext;
use crate::defaults::{render_default, to_json};
use crate::error::{TransformError, TransformResult};
use crate::mask::{MASK_PARAM, MASK_TYPE, MAX_PARAMS};

/// Rewrite every source of one build.
///
/// Resets `ctx`, collects the required names over all sources, then
/// processes each non-library source in order. Returns the rewritten
/// programs in input order; library programs come back unchanged.
pub fn rewrite_sources(
    programs: &[Program],
    ctx: &mut RewriteContext,
) -> TransformResult<Vec<Program>> {
    ctx.reset();
    for program in programs {
        collect_required(program, ctx);
    }

    let mut rewritten = 0usize;
    let mut output = Vec::with_capacity(programs.len());
    for program in programs {
        if program.kind == SourceKind::Library {
            output.push(program.clone());
            continue;
        }
        let (program, count) = rewrite_program(program, ctx)?;
        rewritten += count;
        output.push(program);
    }

    info!(
        "Default-parameter pass: {} functions processed, {} rewritten",
        ctx.processed().len(),
        rewritten
    );
    Ok(output)
}

/// Names re-exported from the entry module, exported functions of the
/// entry module and body-less declarations of any user source.
fn collect_required(program: &Program, ctx: &mut RewriteContext) {
    if program.kind == SourceKind::Library {
        return;
    }
    if program.kind == SourceKind::Entry {
        for export in program.exports() {
            for member in &export.members {
                ctx.require(member.local.name.as_str());
            }
        }
    }
    for function in program.functions() {
        let entry_export = program.kind == SourceKind::Entry && function.exported;
        if entry_export || function.body.is_none() {
            ctx.require(function.resolved_name());
        }
    }
}

fn should_process(program: &Program, function: &FunctionDecl, ctx: &RewriteContext) -> bool {
    let required = ctx.is_required(function.resolved_name());
    if program.kind != SourceKind::Entry && !required {
        return false;
    }
    function.exported || required
}

fn rewrite_program(program: &Program, ctx: &mut RewriteContext) -> TransformResult<(Program, usize)> {
    let mut output = program.clone();
    let mut rewritten = 0usize;

    for index in 0..output.items.len() {
        let Item::Function(function) = &output.items[index] else {
            continue;
        };
        if !should_process(program, function, ctx) {
            continue;
        }
        let function = function.clone();

        if function.params.len() > MAX_PARAMS {
            return Err(TransformError::TooManyParameters {
                function: function.resolved_name().to_string(),
                count: function.params.len(),
                file: program.path.clone(),
                span: function.span,
            });
        }

        let records = capture_records(&output.arena, &function);
        ctx.record(function.resolved_name(), records);

        if !function.has_defaults() {
            continue;
        }
        if function.body.is_none() {
            output.items[index] = Item::Function(strip_initializers(&function));
            continue;
        }
        if let Some(param) = function.params.iter().find(|p| p.name.name == MASK_PARAM) {
            return Err(TransformError::ReservedParameterName {
                function: function.resolved_name().to_string(),
                file: program.path.clone(),
                span: param.span,
            });
        }

        let decl = rewrite_function(&mut output.arena, &function);
        debug!(
            "Rewrote '{}' in {}: {} parameters, {} defaults",
            function.resolved_name(),
            program.path,
            function.params.len(),
            function.params.iter().filter(|p| p.initializer.is_some()).count()
        );
        output.items[index] = Item::Function(decl);
        rewritten += 1;
    }

    Ok((output, rewritten))
}

/// One record per parameter that declared an initializer.
///
/// The record's type carries the annotation text; the compilation driver
/// resolves real type paths when it builds signatures.
fn capture_records(arena: &Arena, function: &FunctionDecl) -> Vec<OptionalParamRecord> {
    function
        .params
        .iter()
        .filter_map(|param| {
            let init = param.initializer?;
            let type_text = param.type_ann.to_string();
            Some(OptionalParamRecord {
                parameter: Parameter {
                    name: param.name.name.clone(),
                    type_ref: TypeRef::new(type_text.clone(), type_text),
                    optional: true,
                    default: to_json(arena, init),
                },
                default_value_text: Some(render_default(arena, init)),
            })
        })
        .collect()
}

/// Body-less declaration with every initializer cleared. The records keep
/// the defaults.
fn strip_initializers(function: &FunctionDecl) -> FunctionDecl {
    let mut decl = function.clone();
    for param in &mut decl.params {
        param.initializer = None;
    }
    decl
}

/// Build the rewritten declaration: initializers cleared, mask parameter
/// appended, one guarded assignment per default ahead of the original body.
fn rewrite_function(arena: &mut Arena, function: &FunctionDecl) -> FunctionDecl {
    let span = function.span;
    let mut decl = function.clone();

    let mut guards = Vec::new();
    for (index, param) in decl.params.iter_mut().enumerate() {
        let Some(init) = param.initializer.take() else {
            continue;
        };
        let condition = mask_unset_test(arena, index, span);
        let target = arena.alloc_expr(ExprKind::Identifier(param.name.name.clone()), span);
        let assign = arena.alloc_expr(
            ExprKind::Assign {
                op: None,
                target,
                value: init,
            },
            span,
        );
        let then_branch = arena.alloc_stmt(StmtKind::Expr(assign), span);
        guards.push(arena.alloc_stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch: None,
            },
            span,
        ));
    }

    decl.params.push(Param {
        name: Ident::new(MASK_PARAM, span),
        type_ann: TypeAnnotation::simple(MASK_TYPE, span),
        initializer: None,
        span,
    });

    if let Some(body) = decl.body.as_mut() {
        guards.append(&mut body.stmts);
        body.stmts = guards;
    }
    decl
}

/// `(__SUPPLIED_PARAMS & 1) == 0` for index 0,
/// `((__SUPPLIED_PARAMS >> i) & 1) == 0` otherwise.
fn mask_unset_test(arena: &mut Arena, index: usize, span: Span) -> ExprId {
    let mask = arena.alloc_expr(ExprKind::Identifier(MASK_PARAM.to_string()), span);
    let bit = if index == 0 {
        mask
    } else {
        let shift = int_literal(arena, index as u64, span);
        let shifted = arena.alloc_expr(
            ExprKind::Binary {
                op: BinOp::Shr,
                left: mask,
                right: shift,
            },
            span,
        );
        arena.alloc_expr(ExprKind::Paren(shifted), span)
    };
    let one = int_literal(arena, 1, span);
    let masked = arena.alloc_expr(
        ExprKind::Binary {
            op: BinOp::BitAnd,
            left: bit,
            right: one,
        },
        span,
    );
    let masked = arena.alloc_expr(ExprKind::Paren(masked), span);
    let zero = int_literal(arena, 0, span);
    arena.alloc_expr(
        ExprKind::Binary {
            op: BinOp::Eq,
            left: masked,
            right: zero,
        },
        span,
    )
}

fn int_literal(arena: &mut Arena, value: u64, span: Span) -> ExprId {
    arena.alloc_expr(
        ExprKind::Literal(Literal::Integer {
            value,
            text: value.to_string(),
        }),
        span,
    )
}
