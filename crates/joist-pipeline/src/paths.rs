//! Source and destination locations for each asset category.

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

/// Asset categories handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Html,
    Css,
    Js,
}

/// Source glob and destination directory for one asset category.
#[derive(Debug, Clone)]
pub struct PathEntry {
    /// Glob matching this category's source files
    pub source_glob: String,

    /// Directory the stage writes into
    pub dest_dir: PathBuf,
}

/// Static mapping from asset category to its source glob and
/// destination directory.
///
/// Every destination sits beneath the output root, so a full-tree
/// delete before a build clears all prior artifacts. Lookup never
/// fails; a glob matching zero files makes the owning stage a no-op.
#[derive(Debug, Clone)]
pub struct PathTable {
    src_root: PathBuf,
    out_root: PathBuf,
    html: PathEntry,
    css: PathEntry,
    js: PathEntry,
}

impl PathTable {
    /// Build the table for a source tree and output root.
    pub fn new(src_root: impl Into<PathBuf>, out_root: impl Into<PathBuf>) -> Self {
        let src_root = src_root.into();
        let out_root = out_root.into();

        let html = PathEntry {
            source_glob: format!("{}/*.html", src_root.display()),
            dest_dir: out_root.clone(),
        };
        let css = PathEntry {
            source_glob: format!("{}/scss/*.scss", src_root.display()),
            dest_dir: out_root.join("css"),
        };
        let js = PathEntry {
            source_glob: format!("{}/js/*.js", src_root.display()),
            dest_dir: out_root.join("js"),
        };

        Self {
            src_root,
            out_root,
            html,
            css,
            js,
        }
    }

    pub fn entry(&self, category: Category) -> &PathEntry {
        match category {
            Category::Html => &self.html,
            Category::Css => &self.css,
            Category::Js => &self.js,
        }
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    pub fn out_root(&self) -> &Path {
        &self.out_root
    }

    /// The single stylesheet entry point.
    pub fn css_entry(&self) -> PathBuf {
        self.src_root.join("scss").join("index.scss")
    }

    /// The single script entry point.
    pub fn js_entry(&self) -> PathBuf {
        self.src_root.join("js").join("index.js")
    }

    /// Files matching a category's source glob, sorted for stable
    /// iteration order.
    ///
    /// Wildcards do not cross directory separators, so `src/*.html`
    /// stays top-level only. A glob that matches nothing (or points at
    /// a missing directory) yields an empty list rather than an error.
    pub fn matching_files(&self, category: Category) -> Vec<PathBuf> {
        let entry = self.entry(category);

        let matcher = match GlobBuilder::new(&entry.source_glob)
            .literal_separator(true)
            .build()
        {
            Ok(glob) => glob.compile_matcher(),
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = WalkDir::new(glob_parent(&entry.source_glob))
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| matcher.is_match(p))
            .collect();

        files.sort();
        files
    }

    /// Directories watched for changes, one per category.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        [&self.html, &self.css, &self.js]
            .iter()
            .map(|entry| glob_parent(&entry.source_glob))
            .collect()
    }
}

/// Longest non-wildcard directory prefix of a glob.
fn glob_parent(glob: &str) -> PathBuf {
    let prefix = glob.split('*').next().unwrap_or("");

    match prefix.strip_suffix('/') {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(prefix)
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    }
}
