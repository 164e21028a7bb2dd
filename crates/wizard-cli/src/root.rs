use anyhow::bail;
use std::path::{Path, PathBuf};
use wizard_core::paths;

/// Resolve the wizard root directory.
///
/// Priority:
/// 1. `--root` flag / `WIZARD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.wizard/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_wizard_dir(&cwd).unwrap_or(cwd)
}

fn find_wizard_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(paths::WIZARD_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Fail with a pointer to `wizard init` when `root` has no `.wizard/`.
pub fn require_initialized(root: &Path) -> anyhow::Result<()> {
    if !paths::wizard_dir(root).is_dir() {
        bail!(
            "no wizard found at {} (run `wizard init` first)",
            root.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_wizard_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".wizard")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_wizard_dir(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn uninitialized_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = require_initialized(dir.path()).unwrap_err();
        assert!(err.to_string().contains("wizard init"));
        std::fs::create_dir_all(dir.path().join(".wizard")).unwrap();
        assert!(require_initialized(dir.path()).is_ok());
    }
}
