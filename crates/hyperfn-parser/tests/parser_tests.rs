//! Parser tests: declarations, decorators, modules, classes, type
//! annotations, expressions, statements and error recovery.

use hyperfn_lexer::Lexer;
use hyperfn_parser::{ParseResult, Parser};
use hyperfn_types::ast::*;
use hyperfn_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("assembly/index.ts", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {e}");
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program.expect("no program returned")
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

fn only_function(prog: &Program) -> &FunctionDecl {
    prog.functions().next().expect("no function")
}

/// The single expression of `let __expr = <expr>;`.
fn parse_expr_source(source_expr: &str) -> (Program, ExprId) {
    let prog = parse_ok(&format!("let __expr = {source_expr};"));
    let value = match &prog.items[0] {
        Item::Variable(v) => v.value.expect("no value"),
        other => panic!("expected variable, got {other:?}"),
    };
    (prog, value)
}

// ─────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_exported_function_with_defaults() {
    let prog = parse_ok(
        "export function createVec(x: i32 = 1, y: i32 = 2, z: i32 = 3): Vec3 {\n  return new Vec3(x, y, z);\n}",
    );
    assert_eq!(prog.path, "assembly/index");
    assert_eq!(prog.kind, SourceKind::Entry);
    let f = only_function(&prog);
    assert_eq!(f.name.name, "createVec");
    assert!(f.exported);
    assert!(!f.declared);
    assert_eq!(f.params.len(), 3);
    assert!(f.params.iter().all(|p| p.initializer.is_some()));
    assert!(f.has_defaults());
    assert_eq!(f.return_type.as_ref().map(|t| t.to_string()), Some("Vec3".into()));
    assert_eq!(f.body.as_ref().map(|b| b.stmts.len()), Some(1));
}

#[test]
fn test_function_without_return_type() {
    let prog = parse_ok("function log(msg: string) {}");
    let f = only_function(&prog);
    assert!(!f.exported);
    assert!(f.return_type.is_none());
}

#[test]
fn test_generic_function_type_params_are_accepted() {
    let prog = parse_ok("function first<T>(items: T[]): T { return items[0]; }");
    assert_eq!(only_function(&prog).params[0].type_ann.to_string(), "T[]");
}

#[test]
fn test_missing_parameter_type_is_reported() {
    assert_eq!(
        error_codes("export function f(a) {}"),
        vec![ErrorCode::MISSING_TYPE_ANNOTATION]
    );
}

#[test]
fn test_question_mark_parameter_is_reported() {
    assert_eq!(
        error_codes("export function f(a?: i32) {}"),
        vec![ErrorCode::MISSING_TYPE_ANNOTATION]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Decorators & external names
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_external_with_module_and_name() {
    let prog = parse_ok(
        r#"@external("hypermode", "log")
declare function hostLog(level: string, message: string): void;"#,
    );
    let f = only_function(&prog);
    assert!(f.declared);
    assert!(f.body.is_none());
    assert_eq!(
        f.external,
        Some(ExternalName {
            module: Some("hypermode".into()),
            name: "log".into(),
        })
    );
    assert_eq!(f.resolved_name(), "log");
    assert_eq!(f.decorators[0].name.name, "external");
    assert_eq!(f.decorators[0].args.len(), 2);
}

#[test]
fn test_external_with_single_argument() {
    let prog = parse_ok(r#"@external("fetch") export declare function hostFetch(url: string): string"#);
    let f = only_function(&prog);
    assert!(f.exported);
    assert_eq!(
        f.external,
        Some(ExternalName {
            module: None,
            name: "fetch".into(),
        })
    );
    // Only the two-argument form renames the function.
    assert_eq!(f.resolved_name(), "hostFetch");
}

#[test]
fn test_external_rejects_non_string_argument() {
    assert_eq!(
        error_codes(r#"@external("env", 42) declare function f(): void;"#),
        vec![ErrorCode::INVALID_DECORATOR]
    );
}

#[test]
fn test_declared_function_with_body_is_rejected() {
    assert_eq!(
        error_codes("declare function f(): void {}"),
        vec![ErrorCode::UNSUPPORTED_DECLARATION]
    );
}

#[test]
fn test_bare_decorators_on_class() {
    let prog = parse_ok("@json\nexport class Person { name!: string; }");
    let class = prog.class("Person").expect("class");
    assert_eq!(class.decorators[0].name.name, "json");
    assert!(class.decorators[0].args.is_empty());
    assert!(class.exported);
}

// ─────────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_export_list_with_alias_and_source() {
    let prog = parse_ok(r#"export { add, sub as minus } from "./math";"#);
    let export = prog.exports().next().expect("export");
    assert_eq!(export.members.len(), 2);
    assert_eq!(export.members[0].local.name, "add");
    assert!(export.members[0].exported.is_none());
    assert_eq!(export.members[1].local.name, "sub");
    assert_eq!(
        export.members[1].exported.as_ref().map(|i| i.name.as_str()),
        Some("minus")
    );
    assert_eq!(export.from.as_deref(), Some("./math"));
}

#[test]
fn test_import_forms() {
    let prog = parse_ok(
        r#"import { Vec3, Point as P } from "./models";
import * as collections from "@hypermode/functions-as/collections";
import "./side-effect";"#,
    );
    let imports: Vec<_> = prog.imports().collect();
    assert_eq!(imports.len(), 3);
    assert_eq!(imports[0].members[1].imported.name, "Point");
    assert_eq!(imports[0].members[1].local.name, "P");
    assert_eq!(imports[0].from, "./models");
    assert_eq!(
        imports[1].namespace.as_ref().map(|n| n.name.as_str()),
        Some("collections")
    );
    assert!(imports[2].members.is_empty());
    assert_eq!(imports[2].from, "./side-effect");
}

#[test]
fn test_unsupported_declarations() {
    assert_eq!(
        error_codes("export * from \"./all\";"),
        vec![ErrorCode::UNSUPPORTED_DECLARATION]
    );
    assert_eq!(
        error_codes("enum Color { Red }"),
        vec![ErrorCode::UNSUPPORTED_DECLARATION]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_class_fields_and_methods() {
    let prog = parse_ok(
        r#"export class Vec3 extends Base {
  x: f64 = 0;
  private y!: f64;
  readonly z: f64;
  static ORIGIN: Vec3 = new Vec3();
  constructor(x: f64 = 0) { super(); }
  get length(): f64 { return this.x; }
  scale(factor: f64): void { this.x = this.x * factor; }
}"#,
    );
    let class = prog.class("Vec3").expect("class");
    assert_eq!(class.extends.as_ref().map(|t| t.to_string()), Some("Base".into()));
    let names: Vec<_> = class.fields.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y", "z"]);
    assert!(class.fields[0].initializer.is_some());
    let methods: Vec<_> = class.methods.iter().map(|m| m.name.name.as_str()).collect();
    assert_eq!(methods, vec!["constructor", "length", "scale"]);
    // Methods never count as top-level functions.
    assert_eq!(prog.functions().count(), 0);
}

#[test]
fn test_field_named_like_a_modifier() {
    let prog = parse_ok("class Flags { readonly: bool; static: i32; }");
    let class = prog.class("Flags").expect("class");
    let names: Vec<_> = class.fields.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, vec!["readonly", "static"]);
}

#[test]
fn test_field_without_type_is_reported() {
    assert_eq!(
        error_codes("class A { x = 1; }"),
        vec![ErrorCode::MISSING_TYPE_ANNOTATION]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Type annotations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_type_annotation_forms() {
    let prog = parse_ok(
        "declare function f(a: f32[][], b: Map<string, Array<i32>>, c: string | null, d: collections.SearchResult, e: (string | null)[]): Map<string, Map<string, i64>>;",
    );
    let f = only_function(&prog);
    let types: Vec<_> = f.params.iter().map(|p| p.type_ann.to_string()).collect();
    assert_eq!(
        types,
        vec![
            "f32[][]",
            "Map<string, Array<i32>>",
            "string | null",
            "collections.SearchResult",
            "(string | null)[]",
        ]
    );
    assert_eq!(
        f.return_type.as_ref().map(|t| t.to_string()),
        Some("Map<string, Map<string, i64>>".into())
    );
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_binary_precedence() {
    let (prog, id) = parse_expr_source("a + b * c");
    match &prog.arena[id].kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(*op, BinOp::Add);
            assert!(matches!(
                prog.arena[*right].kind,
                ExprKind::Binary { op: BinOp::Mul, .. }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_mask_test_expression_shape() {
    let (prog, id) = parse_expr_source("((m >> 2) & 1) == 0");
    let ExprKind::Binary { op, left, right } = &prog.arena[id].kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinOp::Eq);
    assert!(matches!(
        prog.arena[*right].kind,
        ExprKind::Literal(Literal::Integer { value: 0, .. })
    ));
    let ExprKind::Paren(inner) = prog.arena[*left].kind else {
        panic!("expected parenthesized mask test");
    };
    assert!(matches!(
        prog.arena[inner].kind,
        ExprKind::Binary { op: BinOp::BitAnd, .. }
    ));
}

#[test]
fn test_assignment_is_right_associative() {
    let (prog, id) = parse_expr_source("a = b = 1");
    let ExprKind::Assign { op, value, .. } = &prog.arena[id].kind else {
        panic!("expected assignment");
    };
    assert!(op.is_none());
    assert!(matches!(prog.arena[*value].kind, ExprKind::Assign { .. }));
}

#[test]
fn test_compound_assignment_operator() {
    let (prog, id) = parse_expr_source("total += 2");
    assert!(matches!(
        prog.arena[id].kind,
        ExprKind::Assign {
            op: Some(BinOp::Add),
            ..
        }
    ));
}

#[test]
fn test_generic_call_versus_comparison() {
    let (prog, id) = parse_expr_source("changetype<usize>(ptr)");
    let ExprKind::Call { type_args, args, .. } = &prog.arena[id].kind else {
        panic!("expected call");
    };
    assert_eq!(type_args[0].to_string(), "usize");
    assert_eq!(args.len(), 1);

    let (prog, id) = parse_expr_source("i < n");
    assert!(matches!(
        prog.arena[id].kind,
        ExprKind::Binary { op: BinOp::Less, .. }
    ));
}

#[test]
fn test_nested_generic_call_splits_shift_token() {
    let (prog, id) = parse_expr_source("make<Array<i32>>()");
    let ExprKind::Call { type_args, .. } = &prog.arena[id].kind else {
        panic!("expected call");
    };
    assert_eq!(type_args[0].to_string(), "Array<i32>");
}

#[test]
fn test_literals_and_new() {
    let (prog, id) = parse_expr_source("[1, 2.5, \"s\", null, true, { a: 1, b }]");
    let ExprKind::Literal(Literal::Array(items)) = &prog.arena[id].kind else {
        panic!("expected array");
    };
    assert_eq!(items.len(), 6);
    let ExprKind::Literal(Literal::Object(entries)) = &prog.arena[items[5]].kind else {
        panic!("expected object");
    };
    assert_eq!(entries[1].0.name, "b");

    let (prog, id) = parse_expr_source("new Map<string, i32>()");
    let ExprKind::New { type_ann, args } = &prog.arena[id].kind else {
        panic!("expected new");
    };
    assert_eq!(type_ann.to_string(), "Map<string, i32>");
    assert!(args.is_empty());
}

#[test]
fn test_member_index_conditional_and_as() {
    let (prog, id) = parse_expr_source("flag ? this.items[0].name : (x as string)");
    let ExprKind::Conditional { then, otherwise, .. } = &prog.arena[id].kind else {
        panic!("expected conditional");
    };
    let ExprKind::Member { property, object } = &prog.arena[*then].kind else {
        panic!("expected member");
    };
    assert_eq!(property.name, "name");
    assert!(matches!(prog.arena[*object].kind, ExprKind::Index { .. }));
    let ExprKind::Paren(inner) = prog.arena[*otherwise].kind else {
        panic!("expected paren");
    };
    assert!(matches!(prog.arena[inner].kind, ExprKind::As { .. }));
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(error_codes("let a = 1 = 2;"), vec![ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_expression_nesting_limit() {
    let source = format!("let a = {}1{};", "(".repeat(80), ")".repeat(80));
    assert!(error_codes(&source).contains(&ErrorCode::NESTING_TOO_DEEP));
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_statement_forms() {
    let prog = parse_ok(
        r#"export function f(x: i32): i32 {
  let y: i32 = x;
  const z = 2;
  if (y > z) y = z; else { y = 0; }
  while (y < 10) y += 1;
  if (y == 3) throw new Error("bad");
  ;
  return y;
}"#,
    );
    let f = only_function(&prog);
    let body = f.body.as_ref().expect("body");
    let kinds: Vec<_> = body
        .stmts
        .iter()
        .map(|&s| match &prog.arena[s].kind {
            StmtKind::Local { kind, .. } => kind.as_str(),
            StmtKind::If { else_branch: Some(_), .. } => "if-else",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::Empty => "empty",
            StmtKind::Return(Some(_)) => "return",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["let", "const", "if-else", "while", "if", "empty", "return"]);
}

#[test]
fn test_bare_return() {
    let prog = parse_ok("function f(): void { return }");
    let body = only_function(&prog).body.as_ref().expect("body");
    assert!(matches!(prog.arena[body.stmts[0]].kind, StmtKind::Return(None)));
}

// ─────────────────────────────────────────────────────────────────────
// Recovery & source kinds
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_errors_in_several_items_are_all_reported() {
    let result = parse("export function a(x) {}\nexport function b(y) {}\nexport function c(z: i32) {}");
    assert_eq!(result.errors.total_errors, 2);
    assert!(result.program.is_none());
}

#[test]
fn test_bad_statement_recovers_inside_block() {
    let result = parse("function f(): void { let = 1; return; }\nfunction g(): void {}");
    assert_eq!(result.errors.total_errors, 1);
}

#[test]
fn test_source_kind_is_recorded() {
    let sf = SourceFile::new("~lib/string.ts", "export function length(s: string): i32 { return 0; }");
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).with_kind(SourceKind::Library).parse();
    let prog = result.program.expect("program");
    assert_eq!(prog.kind, SourceKind::Library);
    assert_eq!(prog.path, "~lib/string");
}

#[test]
fn test_empty_token_stream_is_an_empty_program() {
    let sf = SourceFile::new("assembly/index.ts", "");
    let result = Parser::new(Vec::new(), &sf).parse();
    assert!(!result.errors.has_errors());
    assert!(result.program.expect("program").items.is_empty());
}

#[test]
fn test_stream_without_eof_still_parses() {
    let sf = SourceFile::new("assembly/index.ts", "export function f(): void {}");
    let mut tokens = Lexer::new(&sf).lex().tokens;
    tokens.pop();
    let result = Parser::new(tokens, &sf).parse();
    let prog = result.program.expect("program");
    assert_eq!(only_function(&prog).name.name, "f");
}
