//! Development command: clean, build, serve, then watch forever.

use std::path::PathBuf;

use anyhow::Result;
use joist_pipeline::{BuildConfig, Pipeline, SiteVars};
use joist_server::{DevServer, DevServerConfig};

use crate::config::ConfigFile;

/// Run the dev command.
pub async fn run(config: &ConfigFile, port: Option<u16>, open: bool) -> Result<()> {
    let src_dir = PathBuf::from(&config.paths.src);
    let out_dir = PathBuf::from(&config.paths.out);
    let minify = config.build.minify;

    // Initial cycle: the clean must finish before any stage writes.
    let pipeline = Pipeline::new(BuildConfig {
        src_dir: src_dir.clone(),
        out_dir: out_dir.clone(),
        vars: SiteVars::from_env(),
        minify,
    });
    pipeline.clean().await?;
    let result = pipeline.build().await?;

    tracing::info!(
        "Built {} pages, {} stylesheet artifacts, {} script artifacts in {}ms",
        result.pages,
        result.stylesheets,
        result.scripts,
        result.duration_ms
    );

    let server_config = DevServerConfig {
        root: out_dir.clone(),
        watch_paths: pipeline.paths().watch_roots(),
        port: port.unwrap_or(config.dev.port),
        open: open && config.dev.open,
        ..DevServerConfig::default()
    };

    // Each rebuild re-reads the environment so watch-mode picks up
    // changed values without a restart.
    let server = DevServer::new(server_config);
    server
        .start(move || {
            let build_config = BuildConfig {
                src_dir: src_dir.clone(),
                out_dir: out_dir.clone(),
                vars: SiteVars::from_env(),
                minify,
            };
            async move {
                let pipeline = Pipeline::new(build_config);
                pipeline.clean().await?;
                let result = pipeline.build().await?;
                tracing::info!(
                    "Rebuilt {} pages, {} stylesheet artifacts, {} script artifacts in {}ms",
                    result.pages,
                    result.stylesheets,
                    result.scripts,
                    result.duration_ms
                );
                Ok::<_, joist_pipeline::BuildError>(result)
            }
        })
        .await?;

    Ok(())
}
