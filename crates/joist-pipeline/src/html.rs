//! HTML stage: template placeholder substitution and the
//! crawler-directives file copy.

use chrono::{Local, Utc};

use crate::paths::{Category, PathTable};
use crate::pipeline::BuildError;

/// Placeholder for the configured account identifier.
const ACCOUNT_ID_PLACEHOLDER: &str = "MY_ACCOUNT_ID";

/// Placeholder for the configured site name.
const SITE_NAME_PLACEHOLDER: &str = "MY_SITE_NAME";

/// Placeholder for the time of the build.
const DEPLOY_TIMESTAMP_PLACEHOLDER: &str = "DEPLOY_TIMESTAMP";

/// Marker rewritten to a `v=<token>` query string for cache busting.
const CACHE_BUST_MARKER: &str = "cache_bust=";

/// Values substituted into HTML templates.
///
/// Captured once per build invocation and passed in explicitly, so the
/// stage itself never touches process-wide environment state.
#[derive(Debug, Clone, Default)]
pub struct SiteVars {
    pub account_id: Option<String>,
    pub site_name: Option<String>,
}

impl SiteVars {
    /// Read the current process environment. Callers re-invoke this
    /// for every build so watch-mode rebuilds see updated values.
    pub fn from_env() -> Self {
        Self {
            account_id: std::env::var("MY_ACCOUNT_ID").ok(),
            site_name: std::env::var("MY_SITE_NAME").ok(),
        }
    }
}

/// Copy `robots.txt` into the output root and rewrite placeholders in
/// every file matching the HTML source glob.
///
/// Returns the number of pages written.
pub async fn build_html(paths: &PathTable, vars: &SiteVars) -> Result<usize, BuildError> {
    let dest = paths.entry(Category::Html).dest_dir.clone();
    tokio::fs::create_dir_all(&dest)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", dest.display(), e)))?;

    copy_robots(paths).await?;

    // One token per invocation so every asset referenced on a page
    // busts together.
    let token = Utc::now().timestamp_millis();

    let mut pages = 0;
    for file in paths.matching_files(Category::Html) {
        let Some(name) = file.file_name() else {
            continue;
        };

        let source = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| BuildError::Read(format!("{}: {}", file.display(), e)))?;

        let rewritten = substitute(&source, token, vars);

        let out = dest.join(name);
        tokio::fs::write(&out, rewritten)
            .await
            .map_err(|e| BuildError::Write(format!("{}: {}", out.display(), e)))?;

        tracing::debug!("Wrote {}", out.display());
        pages += 1;
    }

    Ok(pages)
}

/// Apply the four placeholder substitutions, in order, globally and
/// case-sensitively.
fn substitute(source: &str, token: i64, vars: &SiteVars) -> String {
    let out = source.replace(CACHE_BUST_MARKER, &format!("v={token}"));
    let out = replace_configured(&out, ACCOUNT_ID_PLACEHOLDER, &vars.account_id);
    let out = replace_configured(&out, SITE_NAME_PLACEHOLDER, &vars.site_name);

    // The deploy timestamp is captured fresh, independent of the
    // cache-bust token.
    out.replace(
        DEPLOY_TIMESTAMP_PLACEHOLDER,
        &Local::now().to_rfc2822(),
    )
}

/// Replace `placeholder` where the document actually uses it. A missing
/// configuration value substitutes the empty string and warns rather
/// than failing the build; documents without the placeholder warn about
/// nothing.
fn replace_configured(source: &str, placeholder: &str, value: &Option<String>) -> String {
    if !source.contains(placeholder) {
        return source.to_string();
    }
    match value {
        Some(v) => source.replace(placeholder, v),
        None => {
            tracing::warn!("No value configured for {placeholder}; substituting empty string");
            source.replace(placeholder, "")
        }
    }
}

/// Copy the crawler-directives file to the output root. A missing
/// source file is skipped, not an error.
async fn copy_robots(paths: &PathTable) -> Result<(), BuildError> {
    let src = paths.src_root().join("robots.txt");
    if !src.exists() {
        tracing::debug!("No robots.txt at {}", src.display());
        return Ok(());
    }

    let dest = paths.out_root().join("robots.txt");
    tokio::fs::copy(&src, &dest)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", dest.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn table(temp: &tempfile::TempDir) -> PathTable {
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        PathTable::new(src, temp.path().join("dist"))
    }

    #[tokio::test]
    async fn all_cache_bust_markers_share_one_token() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(
            paths.src_root().join("index.html"),
            r#"<link href="a.css?cache_bust=abc"><script src="b.js?cache_bust=abc"></script>"#,
        )
        .unwrap();

        build_html(&paths, &SiteVars::default()).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("index.html")).unwrap();
        let tokens: Vec<&str> = out
            .match_indices("v=")
            .map(|(i, _)| &out[i..out[i..].find("abc").map(|j| i + j).unwrap()])
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], tokens[1]);
        assert!(!out.contains("cache_bust="));
    }

    #[tokio::test]
    async fn substitutes_configured_values() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(
            paths.src_root().join("index.html"),
            "<title>MY_SITE_NAME</title><meta content=\"MY_ACCOUNT_ID\">",
        )
        .unwrap();

        let vars = SiteVars {
            account_id: Some("UA-12345".to_string()),
            site_name: Some("Acme".to_string()),
        };
        build_html(&paths, &vars).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("index.html")).unwrap();

        assert!(out.contains("<title>Acme</title>"));
        assert!(out.contains("UA-12345"));
        assert_eq!(out.matches("Acme").count(), 1);
    }

    #[tokio::test]
    async fn missing_values_substitute_empty_string() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(paths.src_root().join("index.html"), "<h1>MY_SITE_NAME</h1>").unwrap();

        build_html(&paths, &SiteVars::default()).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("index.html")).unwrap();
        assert_eq!(out, "<h1></h1>");
    }

    #[test]
    fn absent_placeholders_leave_the_document_alone() {
        let source = "<h1>Plain page</h1>";

        let out = replace_configured(source, SITE_NAME_PLACEHOLDER, &None);

        assert_eq!(out, source);
    }

    #[tokio::test]
    async fn placeholder_free_pages_pass_through_unchanged() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(paths.src_root().join("index.html"), "<h1>Plain page</h1>").unwrap();

        build_html(&paths, &SiteVars::default()).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("index.html")).unwrap();
        assert_eq!(out, "<h1>Plain page</h1>");
    }

    #[tokio::test]
    async fn replaces_deploy_timestamp() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(
            paths.src_root().join("index.html"),
            "<footer>DEPLOY_TIMESTAMP</footer>",
        )
        .unwrap();

        build_html(&paths, &SiteVars::default()).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("index.html")).unwrap();
        assert!(!out.contains("DEPLOY_TIMESTAMP"));
        assert_ne!(out, "<footer></footer>");
    }

    #[tokio::test]
    async fn copies_robots_file_before_completing() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);
        fs::write(paths.src_root().join("robots.txt"), "User-agent: *\n").unwrap();

        build_html(&paths, &SiteVars::default()).await.unwrap();

        let robots = fs::read_to_string(paths.out_root().join("robots.txt")).unwrap();
        assert_eq!(robots, "User-agent: *\n");
    }

    #[tokio::test]
    async fn no_sources_is_a_noop() {
        let temp = tempdir().unwrap();
        let paths = table(&temp);

        let pages = build_html(&paths, &SiteVars::default()).await.unwrap();

        assert_eq!(pages, 0);
    }
}
