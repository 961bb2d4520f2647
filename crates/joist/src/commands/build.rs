//! One-shot build command.

use std::path::PathBuf;

use anyhow::Result;
use joist_pipeline::{BuildConfig, Pipeline, SiteVars};

use crate::config::ConfigFile;

/// Run the build command. The one-shot graph has no clean step and no
/// reload; a failed stage propagates and exits the process non-zero.
pub async fn run(config: &ConfigFile, out: Option<PathBuf>, no_minify: bool) -> Result<()> {
    tracing::info!("Building assets...");

    let build_config = BuildConfig {
        src_dir: PathBuf::from(&config.paths.src),
        out_dir: out.unwrap_or_else(|| PathBuf::from(&config.paths.out)),
        vars: SiteVars::from_env(),
        // The flag wins over the config default.
        minify: !no_minify && config.build.minify,
    };

    let result = Pipeline::new(build_config).build().await?;

    tracing::info!(
        "Built {} pages, {} stylesheet artifacts, {} script artifacts in {}ms",
        result.pages,
        result.stylesheets,
        result.scripts,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.out_dir.display());

    Ok(())
}
