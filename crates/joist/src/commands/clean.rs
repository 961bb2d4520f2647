//! Output tree removal command.

use std::path::PathBuf;

use anyhow::Result;
use joist_pipeline::{BuildConfig, Pipeline, SiteVars};

use crate::config::ConfigFile;

/// Run the clean command.
pub async fn run(config: &ConfigFile) -> Result<()> {
    let out_dir = PathBuf::from(&config.paths.out);

    let pipeline = Pipeline::new(BuildConfig {
        src_dir: PathBuf::from(&config.paths.src),
        out_dir: out_dir.clone(),
        vars: SiteVars::default(),
        ..BuildConfig::default()
    });
    pipeline.clean().await?;

    tracing::info!("Removed {}", out_dir.display());

    Ok(())
}
