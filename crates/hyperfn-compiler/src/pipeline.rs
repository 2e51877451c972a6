//! The build driver.
//!
//! ```text
//! sources → Lexer → Parser → default-parameter rewrite → (external compiler) → .wasm
//!                                   ↓                                          ↓
//!                       records + signatures + type table → Manifest → custom section
//!                                                                   ↘ report
//! ```
//!
//! One [`Build`] owns all state of one compilation, so independent builds
//! never share anything.

use std::io::Write;

use hyperfn_lexer::Lexer;
use hyperfn_metadata::{write_report, EmbedSummary, Manifest, Provenance};
use hyperfn_parser::Parser;
use hyperfn_transform::{print_program, rewrite_sources, RewriteContext};
use hyperfn_types::ast::{FunctionDecl, Program, SourceKind};
use hyperfn_types::signature::{FunctionSignature, Parameter};
use hyperfn_types::{CompileErrors, SourceFile};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::resolve::TypeResolver;
use crate::ty::Type;

// ══════════════════════════════════════════════════════════════════════════════
// Inputs & Outputs
// ══════════════════════════════════════════════════════════════════════════════

/// One source file of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInput {
    /// File name relative to the project root, e.g. `assembly/index.ts`.
    pub path: String,
    pub text: String,
    pub kind: SourceKind,
}

impl SourceInput {
    pub fn new(path: impl Into<String>, text: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            kind,
        }
    }

    pub fn entry(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(path, text, SourceKind::Entry)
    }

    pub fn user(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(path, text, SourceKind::User)
    }

    pub fn library(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(path, text, SourceKind::Library)
    }
}

/// Everything [`compile`] produces.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    /// The module with the manifest section attached.
    pub wasm: Vec<u8>,
    pub manifest: Manifest,
    #[serde(skip)]
    pub summary: EmbedSummary,
    /// Rendered report, when enabled in the config.
    pub report: Option<String>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Build
// ══════════════════════════════════════════════════════════════════════════════

pub struct Build {
    config: BuildConfig,
    provenance: Box<dyn Provenance>,
    ctx: RewriteContext,
    /// Parsed sources, as written.
    originals: Vec<Program>,
    /// Sources after the rewrite pass, in input order.
    programs: Vec<Program>,
    /// Assembled once per transform so embedding and reporting agree.
    manifest: Option<Manifest>,
    transformed: bool,
}

impl Build {
    pub fn new(config: BuildConfig, provenance: impl Provenance + 'static) -> Self {
        Self {
            config,
            provenance: Box::new(provenance),
            ctx: RewriteContext::new(),
            originals: Vec::new(),
            programs: Vec::new(),
            manifest: None,
            transformed: false,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Records and processed functions of the last transform.
    pub fn context(&self) -> &RewriteContext {
        &self.ctx
    }

    pub fn originals(&self) -> &[Program] {
        &self.originals
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// Parse every source and run the default-parameter rewrite.
    ///
    /// Syntax errors of all sources are collected before the build aborts.
    /// Any previous result of this build is discarded first.
    pub fn transform(&mut self, sources: &[SourceInput]) -> BuildResult<&[Program]> {
        self.ctx.reset();
        self.originals.clear();
        self.programs.clear();
        self.manifest = None;
        self.transformed = false;

        let mut errors = CompileErrors::empty();
        let mut parsed = Vec::with_capacity(sources.len());
        for source in sources {
            let file = SourceFile::new(source.path.as_str(), source.text.as_str());
            let lexed = Lexer::new(&file).lex();
            if lexed.errors.has_errors() {
                errors.extend(lexed.errors);
                continue;
            }
            let result = Parser::new(lexed.tokens, &file).with_kind(source.kind).parse();
            errors.extend(result.errors);
            if let Some(program) = result.program {
                debug!("Parsed {} ({} items)", program.path, program.items.len());
                parsed.push(program);
            }
        }
        if errors.has_errors() {
            return Err(errors.into());
        }

        self.programs = rewrite_sources(&parsed, &mut self.ctx)?;
        self.originals = parsed;
        self.transformed = true;
        info!("Transformed {} sources", self.programs.len());
        Ok(&self.programs)
    }

    /// Source text of every rewritten non-library program, for the external
    /// compiler.
    pub fn rewritten_sources(&self) -> BuildResult<Vec<(String, String)>> {
        self.ensure_transformed()?;
        Ok(self
            .programs
            .iter()
            .filter(|p| p.kind != SourceKind::Library)
            .map(|p| (p.path.clone(), print_program(p)))
            .collect())
    }

    /// The manifest of this build, assembled on first use.
    pub fn manifest(&mut self) -> BuildResult<&Manifest> {
        self.ensure_manifest()?;
        self.manifest.as_ref().ok_or(BuildError::NotTransformed)
    }

    /// Attach the manifest to `wasm`, the compiled rewritten sources.
    pub fn embed(&mut self, wasm: &[u8]) -> BuildResult<(Vec<u8>, EmbedSummary)> {
        let section = self.config.metadata.section.clone();
        let manifest = self.manifest()?;
        Ok(hyperfn_metadata::embed(wasm, manifest, &section)?)
    }

    /// Render the report configured for this build.
    pub fn report<W: Write + ?Sized>(&mut self, out: &mut W) -> BuildResult<()> {
        self.ensure_manifest()?;
        let manifest = self.manifest.as_ref().ok_or(BuildError::NotTransformed)?;
        write_report(out, manifest, &self.ctx, &self.config.report_options())?;
        Ok(())
    }

    fn ensure_transformed(&self) -> BuildResult<()> {
        if self.transformed {
            Ok(())
        } else {
            Err(BuildError::NotTransformed)
        }
    }

    fn ensure_manifest(&mut self) -> BuildResult<()> {
        self.ensure_transformed()?;
        if self.manifest.is_none() {
            self.manifest = Some(self.assemble());
        }
        Ok(())
    }

    /// Signatures of every processed function, in processing order, plus
    /// the types they reach.
    fn assemble(&self) -> Manifest {
        let resolver = TypeResolver::new(&self.programs);
        let mut functions = Vec::new();
        let mut roots: Vec<Type> = Vec::new();

        for name in self.ctx.processed() {
            let Some((program, decl)) = self.find_processed(name) else {
                continue;
            };
            let records = self.ctx.records(name).unwrap_or_default();
            let mut parameters = Vec::with_capacity(decl.params.len());
            for param in &decl.params {
                let ty = resolver.resolve(&program.path, &param.type_ann);
                let mut parameter = Parameter::required(param.name.name.as_str(), ty.to_type_ref());
                if let Some(record) = records
                    .iter()
                    .find(|r| r.parameter.name == param.name.name)
                {
                    parameter.optional = true;
                    parameter.default = record.parameter.default.clone();
                }
                parameters.push(parameter);
                roots.push(ty);
            }
            let return_type = resolver.resolve_return(&program.path, decl.return_type.as_ref());
            functions.push(FunctionSignature {
                name: name.clone(),
                parameters,
                return_type: return_type.to_type_ref(),
            });
            roots.push(return_type);
        }

        let types = resolver.type_table(&roots);
        info!(
            "Assembled manifest: {} functions, {} types",
            functions.len(),
            types.len()
        );
        let mut manifest = Manifest::generate(self.config.plugin_identity(), self.provenance.as_ref());
        manifest.add_functions(functions);
        manifest.add_types(types);
        manifest
    }

    /// The post-rewrite declaration recorded under `name`. A later
    /// declaration of the same name wins, as it does for records.
    fn find_processed(&self, name: &str) -> Option<(&Program, &FunctionDecl)> {
        self.programs
            .iter()
            .rev()
            .filter(|p| p.kind != SourceKind::Library)
            .find_map(|p| p.function(name).map(|f| (p, f)))
    }
}

/// Run every phase in one call: transform `sources`, attach the manifest to
/// `wasm` and render the report when enabled.
pub fn compile(
    config: BuildConfig,
    provenance: impl Provenance + 'static,
    sources: &[SourceInput],
    wasm: &[u8],
) -> BuildResult<BuildOutput> {
    config.validate()?;
    let report_enabled = config.report.enabled;
    let mut build = Build::new(config, provenance);
    build.transform(sources)?;
    let (wasm, summary) = build.embed(wasm)?;

    let report = if report_enabled {
        let mut out = Vec::new();
        build.report(&mut out)?;
        Some(String::from_utf8_lossy(&out).into_owned())
    } else {
        None
    };

    Ok(BuildOutput {
        wasm,
        manifest: build.manifest()?.clone(),
        summary,
        report,
    })
}
