//! Asset pipeline for static-site builds.
//!
//! Compiles SCSS to minified CSS, transpiles and minifies JavaScript,
//! rewrites template placeholders in HTML, and composes the stages into
//! one-shot and cleaned build graphs.

pub mod clean;
pub mod css;
pub mod html;
pub mod js;
pub mod paths;
pub mod pipeline;

pub use html::SiteVars;
pub use paths::{Category, PathEntry, PathTable};
pub use pipeline::{BuildConfig, BuildError, BuildResult, Pipeline};
