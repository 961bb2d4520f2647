//! JS stage: transpilation and minification via the oxc toolchain.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};

use crate::paths::{Category, PathTable};
use crate::pipeline::BuildError;

/// Name of the transpiled, still human-readable artifact.
pub const JS_ARTIFACT: &str = "index.js";

/// Name of the minified artifact.
pub const MIN_JS: &str = "index.min.js";

/// Syntax level the transpiled artifact targets.
const TARGET: &str = "es5";

/// Transpile the script entry point and write both the readable and
/// the minified artifact.
///
/// Returns the number of artifacts written. Parse or transform
/// diagnostics abort the stage. With `minify` off the second artifact
/// keeps the transpiled text under the fixed minified name, so
/// downstream references stay valid.
pub async fn build_js(paths: &PathTable, minify_output: bool) -> Result<usize, BuildError> {
    let entry = paths.js_entry();
    if !entry.exists() {
        tracing::debug!("No script entry point at {}", entry.display());
        return Ok(0);
    }

    let source = tokio::fs::read_to_string(&entry)
        .await
        .map_err(|e| BuildError::Read(format!("{}: {}", entry.display(), e)))?;

    let source_type = SourceType::from_path(&entry).unwrap_or_default();
    let transpiled = transpile(&source, &entry, source_type)?;
    let minified = if minify_output {
        minify(&transpiled, source_type)?
    } else {
        transpiled.clone()
    };

    let dest = paths.entry(Category::Js).dest_dir.clone();
    tokio::fs::create_dir_all(&dest)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", dest.display(), e)))?;

    let readable_path = dest.join(JS_ARTIFACT);
    tokio::fs::write(&readable_path, &transpiled)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", readable_path.display(), e)))?;

    let min_path = dest.join(MIN_JS);
    tokio::fs::write(&min_path, &minified)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", min_path.display(), e)))?;

    Ok(2)
}

/// Lower the script to the target syntax level.
fn transpile(source: &str, path: &Path, source_type: SourceType) -> Result<String, BuildError> {
    let allocator = Allocator::default();

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(BuildError::Js(join_diagnostics(&parsed.errors)));
    }
    let mut program = parsed.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options =
        TransformOptions::from_target(TARGET).map_err(|e| BuildError::Js(e.to_string()))?;

    let transformed =
        Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(BuildError::Js(join_diagnostics(&transformed.errors)));
    }

    Ok(Codegen::new().build(&program).code)
}

/// Compress and mangle an already-transpiled script.
fn minify(source: &str, source_type: SourceType) -> Result<String, BuildError> {
    let allocator = Allocator::default();

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(BuildError::Js(join_diagnostics(&parsed.errors)));
    }
    let mut program = parsed.program;

    let minified = Minifier::new(MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::default()),
    })
    .build(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;

    Ok(code)
}

fn join_diagnostics<T: std::fmt::Display>(errors: &[T]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
