//! Pipeline composition over the individual stages.

use std::path::PathBuf;
use std::time::Instant;

use crate::clean;
use crate::css::build_css;
use crate::html::{build_html, SiteVars};
use crate::js::build_js;
use crate::paths::PathTable;

/// Configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source tree root
    pub src_dir: PathBuf,

    /// Output root; everything the pipeline writes lands beneath it
    pub out_dir: PathBuf,

    /// Template values for the HTML stage, captured for this invocation
    pub vars: SiteVars,

    /// Minify CSS/JS output
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("dist"),
            vars: SiteVars::default(),
            minify: true,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct BuildResult {
    /// HTML pages written
    pub pages: usize,

    /// Stylesheet artifacts written (minified CSS + source map)
    pub stylesheets: usize,

    /// Script artifacts written (readable + minified)
    pub scripts: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output root
    pub out_dir: PathBuf,
}

/// Errors that can occur during a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read source: {0}")]
    Read(String),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Stylesheet error: {0}")]
    Css(String),

    #[error("Script error: {0}")]
    Js(String),
}

/// Asset build pipeline.
///
/// `clean` and `build` are separate operations so callers compose the
/// graphs they need: the one-shot build runs the stages alone, while
/// the dev graph awaits `clean` first and reloads clients after.
pub struct Pipeline {
    paths: PathTable,
    vars: SiteVars,
    minify: bool,
}

impl Pipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            paths: PathTable::new(config.src_dir, config.out_dir),
            vars: config.vars,
            minify: config.minify,
        }
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    /// Delete the output tree. Must complete before any stage write in
    /// a graph that includes it.
    pub async fn clean(&self) -> Result<(), BuildError> {
        clean::clean(self.paths.out_root()).await
    }

    /// Run the HTML, CSS, and JS stages concurrently. Any stage
    /// failure fails the whole build; no partial result is reported.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let (pages, stylesheets, scripts) = tokio::try_join!(
            build_html(&self.paths, &self.vars),
            build_css(&self.paths, self.minify),
            build_js(&self.paths, self.minify),
        )?;

        Ok(BuildResult {
            pages,
            stylesheets,
            scripts,
            duration_ms: start.elapsed().as_millis() as u64,
            out_dir: self.paths.out_root().to_path_buf(),
        })
    }
}
