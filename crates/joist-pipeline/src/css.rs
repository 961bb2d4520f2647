//! CSS stage: SCSS compilation, vendor prefixing, and minification.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::paths::{Category, PathTable};
use crate::pipeline::BuildError;

/// Name of the minified stylesheet artifact.
pub const MIN_CSS: &str = "index.min.css";

/// Compile the stylesheet entry point and write the processed artifact
/// plus its source map.
///
/// Returns the number of artifacts written. A syntax error anywhere in
/// the stylesheet aborts the stage; a broken build must never leave
/// silently stale output behind. With `minify` off the artifact keeps
/// readable formatting but the name and prefixing are unchanged.
pub async fn build_css(paths: &PathTable, minify: bool) -> Result<usize, BuildError> {
    let entry = paths.css_entry();
    if !entry.exists() {
        tracing::debug!("No stylesheet entry point at {}", entry.display());
        return Ok(0);
    }

    let compiled = grass::from_path(&entry, &grass::Options::default())
        .map_err(|e| BuildError::Css(e.to_string()))?;

    let (code, map) = postprocess(&compiled, minify)?;

    let dest = paths.entry(Category::Css).dest_dir.clone();
    tokio::fs::create_dir_all(&dest)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", dest.display(), e)))?;

    let map_name = format!("{MIN_CSS}.map");
    let css_path = dest.join(MIN_CSS);
    let css = format!("{code}\n/*# sourceMappingURL={map_name} */");

    tokio::fs::write(&css_path, css)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", css_path.display(), e)))?;

    let map_path = dest.join(&map_name);
    tokio::fs::write(&map_path, map)
        .await
        .map_err(|e| BuildError::Write(format!("{}: {}", map_path.display(), e)))?;

    Ok(2)
}

/// Transform compiled CSS against the browser targets, recording a
/// source map. Vendor prefixes required by the targets are always
/// inserted; `minify` only controls output formatting.
fn postprocess(css: &str, minify: bool) -> Result<(String, String), BuildError> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: "index.css".into(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| BuildError::Css(e.to_string()))?;

    stylesheet
        .minify(MinifyOptions {
            targets: Targets::from(browser_targets()),
            ..MinifyOptions::default()
        })
        .map_err(|e| BuildError::Css(e.to_string()))?;

    let mut source_map = SourceMap::new("/");
    let out = stylesheet
        .to_css(PrinterOptions {
            minify,
            source_map: Some(&mut source_map),
            targets: Targets::from(browser_targets()),
            ..PrinterOptions::default()
        })
        .map_err(|e| BuildError::Css(e.to_string()))?;

    let map = source_map
        .to_json(None)
        .map_err(|e| BuildError::Css(e.to_string()))?;

    Ok((out.code, map))
}

/// Browser support floor used for vendor prefixing.
fn browser_targets() -> Browsers {
    Browsers {
        chrome: Some(version(60, 0, 0)),
        edge: Some(version(16, 0, 0)),
        firefox: Some(version(60, 0, 0)),
        safari: Some(version(11, 0, 0)),
        ios_saf: Some(version(11, 0, 0)),
        ..Browsers::default()
    }
}

/// Browser versions pack as `major << 16 | minor << 8 | patch`.
const fn version(major: u32, minor: u32, patch: u32) -> u32 {
    (major << 16) | (minor << 8) | patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn table_with_scss(temp: &tempfile::TempDir, scss: &str) -> PathTable {
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("scss")).unwrap();
        fs::write(src.join("scss").join("index.scss"), scss).unwrap();
        PathTable::new(src, temp.path().join("dist"))
    }

    #[tokio::test]
    async fn compiles_nested_scss_to_minified_css() {
        let temp = tempdir().unwrap();
        let paths = table_with_scss(
            &temp,
            "$accent: #2f6f4f;\nnav {\n  a {\n    color: $accent;\n  }\n}\n",
        );

        let artifacts = build_css(&paths, true).await.unwrap();

        assert_eq!(artifacts, 2);
        let out = fs::read_to_string(paths.out_root().join("css").join(MIN_CSS)).unwrap();
        let (code, trailer) = out.split_once('\n').unwrap();

        assert!(code.contains("nav a"));
        assert!(!code.contains('\n'));
        assert!(trailer.contains("sourceMappingURL=index.min.css.map"));
    }

    #[tokio::test]
    async fn inserts_vendor_prefixes_for_targets() {
        let temp = tempdir().unwrap();
        let paths = table_with_scss(&temp, ".toolbar {\n  user-select: none;\n}\n");

        build_css(&paths, true).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("css").join(MIN_CSS)).unwrap();
        assert!(out.contains("-webkit-user-select"));
    }

    #[tokio::test]
    async fn writes_source_map() {
        let temp = tempdir().unwrap();
        let paths = table_with_scss(&temp, "body {\n  margin: 0;\n}\n");

        build_css(&paths, true).await.unwrap();

        let map =
            fs::read_to_string(paths.out_root().join("css").join("index.min.css.map")).unwrap();
        assert!(map.contains("\"mappings\""));
    }

    #[tokio::test]
    async fn skipping_minification_keeps_readable_output() {
        let temp = tempdir().unwrap();
        let paths = table_with_scss(
            &temp,
            ".toolbar {\n  user-select: none;\n  margin: 0;\n}\n",
        );

        build_css(&paths, false).await.unwrap();

        let out = fs::read_to_string(paths.out_root().join("css").join(MIN_CSS)).unwrap();
        let (code, _) = out.rsplit_once('\n').unwrap();

        // Readable formatting, but prefixing and artifact names stay put.
        assert!(code.contains('\n'));
        assert!(code.contains("-webkit-user-select"));
        assert!(paths
            .out_root()
            .join("css")
            .join("index.min.css.map")
            .exists());
    }

    #[tokio::test]
    async fn syntax_error_aborts_the_stage() {
        let temp = tempdir().unwrap();
        let paths = table_with_scss(&temp, "body { color: ; }}}");

        let err = build_css(&paths, true).await.unwrap_err();

        assert!(matches!(err, BuildError::Css(_)));
        assert!(!paths.out_root().join("css").join(MIN_CSS).exists());
    }

    #[tokio::test]
    async fn missing_entry_point_is_a_noop() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let paths = PathTable::new(src, temp.path().join("dist"));

        assert_eq!(build_css(&paths, true).await.unwrap(), 0);
    }
}
