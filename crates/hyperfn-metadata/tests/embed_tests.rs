//! Integration tests for manifest embedding.
//!
//! Tests validate:
//! - The manifest round-trips through the custom section
//! - Every other section is preserved byte-for-byte and in order
//! - Existing manifest sections are replaced, never duplicated
//! - Same manifest → same bytes
//! - The module still executes after embedding (via wasmi)

use std::borrow::Cow;

use hyperfn_metadata::{
    embed, read_manifest, EmbedError, Manifest, StaticProvenance, SECTION_NAME,
};
use hyperfn_types::signature::{FunctionSignature, Parameter, TypeRef};
use wasm_encoder::{
    BlockType, CodeSection, CustomSection, ExportKind, ExportSection, Function, FunctionSection,
    Instruction, Module, TypeSection, ValType,
};
use wasmi::{Engine, Linker, Store};
use wasmparser::{Parser as WasmParser, Payload};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// A module exporting `pick_x(x: i32, mask: i64) -> i32`, which returns 1
/// unless bit 0 of `mask` says `x` was supplied. `customs` are emitted as
/// custom sections after the type section.
fn sample_module(customs: &[(&str, &[u8])]) -> Vec<u8> {
    let mut module = Module::new();

    let mut types = TypeSection::new();
    types
        .ty()
        .function(vec![ValType::I32, ValType::I64], vec![ValType::I32]);
    module.section(&types);

    for (name, data) in customs {
        module.section(&CustomSection {
            name: Cow::Borrowed(name),
            data: Cow::Borrowed(data),
        });
    }

    let mut functions = FunctionSection::new();
    functions.function(0);
    module.section(&functions);

    let mut exports = ExportSection::new();
    exports.export("pick_x", ExportKind::Func, 0);
    module.section(&exports);

    let mut f = Function::new(vec![]);
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::I64Const(1));
    f.instruction(&Instruction::I64And);
    f.instruction(&Instruction::I64Eqz);
    f.instruction(&Instruction::If(BlockType::Result(ValType::I32)));
    f.instruction(&Instruction::I32Const(1));
    f.instruction(&Instruction::Else);
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::End);
    f.instruction(&Instruction::End);
    let mut code = CodeSection::new();
    code.function(&f);
    module.section(&code);

    module.finish()
}

fn manifest() -> Manifest {
    let mut m = Manifest::generate("demo@1.0.0", &StaticProvenance::none());
    m.add_functions([FunctionSignature {
        name: "pick_x".into(),
        parameters: vec![
            Parameter {
                name: "x".into(),
                type_ref: TypeRef::new("i32", "i32"),
                optional: true,
                default: Some(serde_json::json!(1)),
            },
            Parameter::required("__SUPPLIED_PARAMS", TypeRef::new("u64", "u64")),
        ],
        return_type: TypeRef::new("i32", "i32"),
    }]);
    m
}

/// `(section id, raw section bytes)` for every section except custom
/// sections named `skip`.
fn sections_except(wasm: &[u8], skip: &str) -> Vec<(u8, Vec<u8>)> {
    let mut out = Vec::new();
    for payload in WasmParser::new(0).parse_all(wasm) {
        let payload = payload.expect("parse");
        if let Payload::CustomSection(reader) = &payload {
            if reader.name() == skip {
                continue;
            }
        }
        if let Some((id, range)) = payload.as_section() {
            out.push((id, wasm[range].to_vec()));
        }
    }
    out
}

fn custom_section_count(wasm: &[u8], name: &str) -> usize {
    WasmParser::new(0)
        .parse_all(wasm)
        .filter_map(Result::ok)
        .filter(|p| matches!(p, Payload::CustomSection(r) if r.name() == name))
        .count()
}

// ══════════════════════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_manifest_round_trips_through_the_section() {
    let wasm = sample_module(&[]);
    let m = manifest();
    let (out, summary) = embed(&wasm, &m, SECTION_NAME).expect("embed");

    assert_eq!(summary.section, "hypermode_meta");
    assert!(!summary.replaced);
    assert_eq!(summary.sha256.len(), 64);
    assert_eq!(summary.payload_len, m.to_json().unwrap().len());
    assert_eq!(read_manifest(&out, SECTION_NAME).unwrap(), Some(m));
    assert_eq!(read_manifest(&wasm, SECTION_NAME).unwrap(), None);
}

#[test]
fn test_other_sections_are_untouched() {
    let wasm = sample_module(&[("name_hint", b"\x01\x02"), ("producers", b"rust")]);
    let (out, _) = embed(&wasm, &manifest(), SECTION_NAME).unwrap();
    assert_eq!(
        sections_except(&out, SECTION_NAME),
        sections_except(&wasm, SECTION_NAME)
    );
    wasmparser::validate(&out).expect("valid output");
}

#[test]
fn test_existing_section_is_replaced_in_place() {
    let wasm = sample_module(&[("before", b"a"), (SECTION_NAME, b"{}"), ("after", b"b")]);
    let m = manifest();
    let (out, summary) = embed(&wasm, &m, SECTION_NAME).unwrap();
    assert!(summary.replaced);
    assert_eq!(custom_section_count(&out, SECTION_NAME), 1);
    assert_eq!(read_manifest(&out, SECTION_NAME).unwrap(), Some(m));

    let order: Vec<String> = WasmParser::new(0)
        .parse_all(&out)
        .filter_map(Result::ok)
        .filter_map(|p| match p {
            Payload::CustomSection(r) => Some(r.name().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["before", SECTION_NAME, "after"]);
}

#[test]
fn test_same_manifest_gives_same_bytes() {
    let wasm = sample_module(&[]);
    let m = manifest();
    let (first, a) = embed(&wasm, &m, SECTION_NAME).unwrap();
    let (second, b) = embed(&wasm, &m, SECTION_NAME).unwrap();
    assert_eq!(first, second);
    assert_eq!(a.sha256, b.sha256);

    // Embedding again into the output changes nothing.
    let (third, _) = embed(&first, &m, SECTION_NAME).unwrap();
    assert_eq!(third, first);
}

#[test]
fn test_section_name_is_configurable() {
    let wasm = sample_module(&[]);
    let (out, _) = embed(&wasm, &manifest(), "custom_meta").unwrap();
    assert!(read_manifest(&out, "custom_meta").unwrap().is_some());
    assert_eq!(custom_section_count(&out, SECTION_NAME), 0);

    assert!(matches!(
        embed(&wasm, &manifest(), ""),
        Err(EmbedError::InvalidSectionName(_))
    ));
}

#[test]
fn test_invalid_input_is_rejected() {
    let err = embed(b"not wasm", &manifest(), SECTION_NAME).unwrap_err();
    assert!(matches!(err, EmbedError::InvalidModule(_)));
    assert!(err.to_string().starts_with("invalid input module"));
}

#[test]
fn test_module_still_runs_after_embedding() {
    let (out, _) = embed(&sample_module(&[]), &manifest(), SECTION_NAME).unwrap();

    let engine = Engine::default();
    let module = wasmi::Module::new(&engine, &out[..]).expect("failed to parse wasm module");
    let mut store = Store::new(&engine, ());
    let linker = Linker::<()>::new(&engine);
    let instance = linker
        .instantiate(&mut store, &module)
        .expect("failed to instantiate")
        .start(&mut store)
        .expect("failed to start instance");
    let pick_x = instance
        .get_typed_func::<(i32, i64), i32>(&store, "pick_x")
        .unwrap();

    assert_eq!(pick_x.call(&mut store, (5, 0b1)).unwrap(), 5);
    assert_eq!(pick_x.call(&mut store, (5, 0b0)).unwrap(), 1);
    assert_eq!(pick_x.call(&mut store, (5, 0b10)).unwrap(), 1);
}
