//! Output tree removal.

use std::path::Path;

use crate::pipeline::BuildError;

/// Delete the output root and everything beneath it.
///
/// Deleting a path that does not exist is a no-op. Any graph that
/// includes this stage must await it before a stage writes into the
/// output root, otherwise fresh output could be deleted mid-build.
pub async fn clean(out_root: &Path) -> Result<(), BuildError> {
    match tokio::fs::remove_dir_all(out_root).await {
        Ok(()) => {
            tracing::debug!("Removed {}", out_root.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::Write(format!("{}: {}", out_root.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn removes_entire_tree() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        fs::create_dir_all(out.join("css")).unwrap();
        fs::write(out.join("css").join("stale.css"), "body{}").unwrap();

        clean(&out).await.unwrap();

        assert!(!out.exists());
    }

    #[tokio::test]
    async fn missing_output_root_is_a_noop() {
        let temp = tempdir().unwrap();

        clean(&temp.path().join("never-created")).await.unwrap();
    }
}
