//! Scaffold a source tree in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing joist...");

    let src_dir = Path::new("src");

    if src_dir.exists() {
        if !yes {
            tracing::warn!("src/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(src_dir).context("Failed to create src directory")?;
    }
    fs::create_dir_all(src_dir.join("scss")).context("Failed to create src/scss directory")?;
    fs::create_dir_all(src_dir.join("js")).context("Failed to create src/js directory")?;

    let config_path = Path::new("site.toml");
    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG).context("Failed to write site.toml")?;
        tracing::info!("Created site.toml");
    }

    let index_path = src_dir.join("index.html");
    if !index_path.exists() || yes {
        fs::write(&index_path, DEFAULT_INDEX).context("Failed to write index.html")?;
        tracing::info!("Created src/index.html");
    }

    let scss_path = src_dir.join("scss").join("index.scss");
    if !scss_path.exists() || yes {
        fs::write(&scss_path, DEFAULT_SCSS).context("Failed to write index.scss")?;
        tracing::info!("Created src/scss/index.scss");
    }

    let js_path = src_dir.join("js").join("index.js");
    if !js_path.exists() || yes {
        fs::write(&js_path, DEFAULT_JS).context("Failed to write index.js")?;
        tracing::info!("Created src/js/index.js");
    }

    let robots_path = src_dir.join("robots.txt");
    if !robots_path.exists() || yes {
        fs::write(&robots_path, DEFAULT_ROBOTS).context("Failed to write robots.txt")?;
        tracing::info!("Created src/robots.txt");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'joist dev' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Joist Configuration

[paths]
# Source tree root
src = "src"

# Output root
out = "dist"

[dev]
# Dev server port
port = 3000

# Open the browser on start
open = true
"#;

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>MY_SITE_NAME</title>
  <link rel="stylesheet" href="css/index.min.css?cache_bust=">
</head>
<body>
  <h1>MY_SITE_NAME</h1>
  <p>Account: MY_ACCOUNT_ID</p>
  <footer>Deployed DEPLOY_TIMESTAMP</footer>
  <script src="js/index.min.js?cache_bust="></script>
</body>
</html>
"#;

const DEFAULT_SCSS: &str = r#"$accent: #2f6f4f;

body {
  font-family: system-ui, sans-serif;
  margin: 0 auto;
  max-width: 40rem;
  padding: 0 1rem;

  h1 {
    color: $accent;
  }
}
"#;

const DEFAULT_JS: &str = r#"const greet = (name) => `Hello, ${name}`;

document.addEventListener('DOMContentLoaded', () => {
  const heading = document.querySelector('h1');
  if (heading) {
    heading.title = greet(heading.textContent);
  }
});
"#;

const DEFAULT_ROBOTS: &str = "User-agent: *\nAllow: /\n";
