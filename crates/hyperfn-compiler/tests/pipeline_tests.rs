//! End-to-end build tests.
//!
//! Tests verify the full pipeline: source → lex → parse → rewrite → manifest
//! → custom section / report, and the failure modes that abort a build.

use std::borrow::Cow;

use hyperfn_compiler::{compile, Build, BuildConfig, BuildError, SourceInput};
use hyperfn_metadata::{
    read_manifest, signature_to_string, type_to_string, StaticProvenance, SECTION_NAME,
};
use hyperfn_transform::TransformError;
use wasm_encoder::{
    CodeSection, CustomSection, ExportKind, ExportSection, Function, FunctionSection,
    Instruction, Module, TypeSection, ValType,
};
use wasmi::{Engine, Linker, Store};
use wasmparser::{Parser as WasmParser, Payload};

// ══════════════════════════════════════════════════════════════════════════════
// Sources
// ══════════════════════════════════════════════════════════════════════════════

const EMBED: &str = r#"
export function embed(text: string[]): f32[][] {
  const out: f32[][] = [];
  return out;
}
"#;

const VEC3: &str = "
class Vec3 {
  x: i32;
  y: i32;
  z: i32;
  constructor(x: i32, y: i32, z: i32) {
    this.x = x;
    this.y = y;
    this.z = z;
  }
}
export function createVec(x: i32 = 1, y: i32 = 2, z: i32 = 3): Vec3 {
  return new Vec3(x, y, z);
}
";

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn config() -> BuildConfig {
    let mut config = BuildConfig::default();
    config.plugin.name = Some("demo".into());
    config.plugin.version = Some("1.0.0".into());
    config
}

/// Stand-in for the external compiler's output: exports `add(i32, i32)`
/// and carries an unrelated custom section.
fn compiled_module() -> Vec<u8> {
    let mut module = Module::new();
    let mut types = TypeSection::new();
    types
        .ty()
        .function(vec![ValType::I32, ValType::I32], vec![ValType::I32]);
    module.section(&types);
    let mut functions = FunctionSection::new();
    functions.function(0);
    module.section(&functions);
    let mut exports = ExportSection::new();
    exports.export("add", ExportKind::Func, 0);
    module.section(&exports);
    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::End);
    let mut code = CodeSection::new();
    code.function(&f);
    module.section(&code);
    module.section(&CustomSection {
        name: Cow::Borrowed("producers"),
        data: Cow::Borrowed(b"asc"),
    });
    module.finish()
}

fn transformed(sources: &[SourceInput]) -> Build {
    let mut build = Build::new(config(), StaticProvenance::none());
    build.transform(sources).expect("transform");
    build
}

fn report(build: &mut Build) -> String {
    let mut out = Vec::new();
    build.report(&mut out).expect("report");
    String::from_utf8(out).unwrap()
}

// ══════════════════════════════════════════════════════════════════════════════
// Manifest contents
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_embed_signature_text() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", EMBED)]);
    let records = build.context().records("embed").map(<[_]>::to_vec);
    let manifest = build.manifest().unwrap();
    assert_eq!(manifest.functions.len(), 1);
    let sig = &manifest.functions[0];
    assert_eq!(sig.parameters[0].type_ref.path, "~lib/array/Array<~lib/string/String>");
    assert_eq!(sig.return_type.path, "~lib/array/Array<~lib/array/Array<f32>>");
    assert_eq!(
        signature_to_string(sig, records.as_deref()),
        "embed(text: string[]): f32[][]"
    );
}

#[test]
fn test_create_vec_signature_and_types() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", VEC3)]);
    let records = build.context().records("createVec").map(<[_]>::to_vec);
    let manifest = build.manifest().unwrap();
    let sig = &manifest.functions[0];

    let names: Vec<&str> = sig.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "z", "__SUPPLIED_PARAMS"]);
    assert!(sig.parameters[..3].iter().all(|p| p.optional));
    assert!(!sig.parameters[3].optional);
    assert_eq!(sig.parameters[3].type_ref.name, "u64");
    assert_eq!(sig.parameters[1].default, Some(serde_json::json!(2)));
    assert_eq!(
        signature_to_string(sig, records.as_deref()),
        "createVec(x: i32 = 1, y: i32 = 2, z: i32 = 3): Vec3"
    );

    assert_eq!(manifest.types.len(), 1);
    let vec3 = &manifest.types[0];
    assert_eq!(vec3.id, 4);
    assert_eq!(vec3.path, "assembly/index/Vec3");
    assert_eq!(vec3.size, 12);
    assert_eq!(type_to_string(vec3), "Vec3 { x: i32, y: i32, z: i32 }");
    let offsets: Vec<u32> = vec3.fields.as_ref().unwrap().iter().map(|f| f.offset).collect();
    assert_eq!(offsets, [0, 4, 8]);
}

#[test]
fn test_reexported_function_from_user_source() {
    let mut build = transformed(&[
        SourceInput::entry("assembly/index.ts", r#"export { scale } from "./util";"#),
        SourceInput::user(
            "assembly/util.ts",
            "export function scale(v: i32, by: i32 = 2): i32 { return v * by; }
             export function unused(v: i32 = 0): i32 { return v; }",
        ),
    ]);
    let manifest = build.manifest().unwrap();
    let names: Vec<&str> = manifest.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["scale"]);
    assert!(build
        .rewritten_sources()
        .unwrap()
        .iter()
        .any(|(path, text)| path == "assembly/util"
            && text.contains("if (((__SUPPLIED_PARAMS >> 1) & 1) == 0) by = 2;")));
}

#[test]
fn test_library_sources_are_never_rewritten() {
    let build = transformed(&[
        SourceInput::entry("assembly/index.ts", EMBED),
        SourceInput::library("~lib/util.ts", "export function helper(x: i32 = 1): i32 { return x; }"),
    ]);
    assert_eq!(build.context().processed(), ["embed"]);
    assert_eq!(build.programs()[1], build.originals()[1]);
    assert!(build
        .rewritten_sources()
        .unwrap()
        .iter()
        .all(|(path, _)| path != "~lib/util"));
}

#[test]
fn test_manifest_is_stable_within_a_build() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", VEC3)]);
    let first = build.manifest().unwrap().build_id.clone();
    let (wasm, _) = build.embed(&compiled_module()).unwrap();
    let stored = read_manifest(&wasm, SECTION_NAME).unwrap().unwrap();
    assert_eq!(stored.build_id, first);
    assert_eq!(stored.plugin, "demo@1.0.0");
}

// ══════════════════════════════════════════════════════════════════════════════
// Reports
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_report_without_vcs() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", VEC3)]);
    let text = report(&mut build);
    assert!(text.starts_with("Plugin Metadata:\n  Plugin Name:     demo@1.0.0\n"));
    assert!(!text.contains("Git"));
    assert!(text.contains("Hypermode Functions:\n  createVec(x: i32 = 1, y: i32 = 2, z: i32 = 3): Vec3\n"));
    assert!(text.contains("Custom Data Types:\n  Vec3 { x: i32, y: i32, z: i32 }\n"));
    assert!(!text.contains("Metadata JSON:"));
}

#[test]
fn test_report_with_vcs_and_debug_dump() {
    let mut config = config();
    config.debug = true;
    let mut build = Build::new(config, StaticProvenance::new("https://github.com/o/r", "abc123"));
    build
        .transform(&[SourceInput::entry("assembly/index.ts", EMBED)])
        .unwrap();
    let text = report(&mut build);
    assert!(text.contains("  Git Repo:        https://github.com/o/r\n"));
    assert!(text.contains("  Git Commit:      abc123\n"));
    // Only built-in types are reachable, so the section is left out.
    assert!(!text.contains("Custom Data Types:"));
    let (_, json) = text.split_once("Metadata JSON:\n").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();
    assert_eq!(parsed["gitCommit"], "abc123");
}

// ══════════════════════════════════════════════════════════════════════════════
// compile()
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_compile_runs_every_phase() {
    let wasm = compiled_module();
    let output = compile(
        config(),
        StaticProvenance::none(),
        &[SourceInput::entry("assembly/index.ts", VEC3)],
        &wasm,
    )
    .unwrap();

    assert_eq!(read_manifest(&output.wasm, SECTION_NAME).unwrap(), Some(output.manifest.clone()));
    assert_eq!(output.summary.section, SECTION_NAME);
    assert!(output.report.as_deref().is_some_and(|r| r.contains("createVec(")));

    let customs: Vec<String> = WasmParser::new(0)
        .parse_all(&output.wasm)
        .filter_map(Result::ok)
        .filter_map(|p| match p {
            Payload::CustomSection(r) => Some(r.name().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(customs, ["producers", SECTION_NAME]);
}

#[test]
fn test_module_executes_after_compile() {
    let output = compile(
        config(),
        StaticProvenance::none(),
        &[SourceInput::entry("assembly/index.ts", EMBED)],
        &compiled_module(),
    )
    .unwrap();

    let engine = Engine::default();
    let module = wasmi::Module::new(&engine, &output.wasm[..]).expect("failed to parse wasm module");
    let mut store = Store::new(&engine, ());
    let linker = Linker::<()>::new(&engine);
    let instance = linker
        .instantiate(&mut store, &module)
        .expect("failed to instantiate")
        .start(&mut store)
        .expect("failed to start instance");
    let add = instance
        .get_typed_func::<(i32, i32), i32>(&store, "add")
        .unwrap();
    assert_eq!(add.call(&mut store, (2, 40)).unwrap(), 42);
}

#[test]
fn test_disabled_report_is_skipped() {
    let mut config = config();
    config.report.enabled = false;
    config.metadata.section = "custom_meta".into();
    let output = compile(
        config,
        StaticProvenance::none(),
        &[SourceInput::entry("assembly/index.ts", EMBED)],
        &compiled_module(),
    )
    .unwrap();
    assert!(output.report.is_none());
    assert!(read_manifest(&output.wasm, "custom_meta").unwrap().is_some());
    assert!(read_manifest(&output.wasm, SECTION_NAME).unwrap().is_none());
}

// ══════════════════════════════════════════════════════════════════════════════
// Failures
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_sixty_four_parameters_abort_with_function_name() {
    let params: Vec<String> = (0..64).map(|i| format!("p{i}: i32 = {i}")).collect();
    let source = format!("export function wide({}): void {{}}", params.join(", "));
    let mut build = Build::new(config(), StaticProvenance::none());
    let err = build
        .transform(&[SourceInput::entry("assembly/index.ts", source)])
        .unwrap_err();
    match &err {
        BuildError::Transform(TransformError::TooManyParameters { function, count, .. }) => {
            assert_eq!(function, "wide");
            assert_eq!(*count, 64);
        }
        other => panic!("expected TooManyParameters, got {other:?}"),
    }
    assert!(err.to_string().contains("'wide'"));
    assert!(matches!(build.manifest(), Err(BuildError::NotTransformed)));
}

#[test]
fn test_syntax_errors_from_every_source_are_reported() {
    let mut build = Build::new(config(), StaticProvenance::none());
    let err = build
        .transform(&[
            SourceInput::entry("assembly/index.ts", "export function a(x: i32 {}"),
            SourceInput::user("assembly/other.ts", "export function b(: i32) {}"),
        ])
        .unwrap_err();
    let BuildError::Syntax(errors) = &err else {
        panic!("expected syntax errors, got {err:?}");
    };
    assert!(errors.errors.iter().any(|e| e.file == "assembly/index.ts"));
    assert!(errors.errors.iter().any(|e| e.file == "assembly/other.ts"));
}

#[test]
fn test_invalid_module_is_an_embed_error() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", EMBED)]);
    let err = build.embed(b"\0asm garbage").unwrap_err();
    assert!(matches!(err, BuildError::Embed(_)));
}

#[test]
fn test_phases_require_a_transform() {
    let mut build = Build::new(config(), StaticProvenance::none());
    assert!(matches!(build.manifest(), Err(BuildError::NotTransformed)));
    assert!(matches!(build.rewritten_sources(), Err(BuildError::NotTransformed)));
    let mut out = Vec::new();
    assert!(matches!(build.report(&mut out), Err(BuildError::NotTransformed)));
}

#[test]
fn test_transform_resets_previous_build() {
    let mut build = transformed(&[SourceInput::entry("assembly/index.ts", VEC3)]);
    let first = build.manifest().unwrap().build_id.clone();
    build
        .transform(&[SourceInput::entry("assembly/index.ts", EMBED)])
        .unwrap();
    assert!(build.context().records("createVec").is_none());
    let manifest = build.manifest().unwrap();
    assert_ne!(manifest.build_id, first);
    assert_eq!(manifest.functions[0].name, "embed");
}
