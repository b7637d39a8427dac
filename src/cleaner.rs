//! Removal of generated artifacts

use crate::error::{PackError, PackResult};
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Stop at the first path that cannot be removed, missing paths included
    Hard,
    /// Try every path; missing paths are skipped and failures only logged
    Soft,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub fn remove<P: AsRef<Path>>(
    fs: &dyn FileSystem,
    paths: &[P],
    policy: RemovalPolicy,
) -> PackResult<RemovalSummary> {
    let mut summary = RemovalSummary::default();

    for path in paths {
        let path = path.as_ref();

        if !fs.exists(path) {
            match policy {
                RemovalPolicy::Hard => {
                    return Err(PackError::Removal {
                        path: path.to_path_buf(),
                        reason: "no such file or directory".to_string(),
                    })
                }
                RemovalPolicy::Soft => {
                    debug!(path = %path.display(), "Nothing to remove");
                    summary.missing.push(path.to_path_buf());
                    continue;
                }
            }
        }

        match fs.remove(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed");
                summary.removed.push(path.to_path_buf());
            }
            Err(e) => match policy {
                RemovalPolicy::Hard => {
                    return Err(PackError::Removal {
                        path: path.to_path_buf(),
                        reason: format!("{:#}", e),
                    })
                }
                RemovalPolicy::Soft => {
                    warn!(path = %path.display(), error = %e, "Failed to remove");
                    summary.failed.push((path.to_path_buf(), format!("{:#}", e)));
                }
            },
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_soft_removal_of_missing_path_succeeds() {
        let fs = MockFileSystem::new();
        let summary = remove(&fs, &["/mock/hello/wrap.py"], RemovalPolicy::Soft).unwrap();

        assert!(summary.removed.is_empty());
        assert_eq!(summary.missing, vec![PathBuf::from("/mock/hello/wrap.py")]);
    }

    #[test]
    fn test_hard_removal_of_missing_path_fails() {
        let fs = MockFileSystem::new();
        let err = remove(&fs, &["/mock/hello/lib"], RemovalPolicy::Hard).unwrap_err();

        assert!(matches!(err, PackError::Removal { .. }));
        assert!(!err.is_ignorable());
    }

    #[test]
    fn test_hard_removal_stops_at_first_failure() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt", "");
        fs.add_file("b.txt", "");
        fs.add_file("c.txt", "");
        fs.deny_removal("b.txt");

        let result = remove(
            &fs,
            &["/mock/a.txt", "/mock/b.txt", "/mock/c.txt"],
            RemovalPolicy::Hard,
        );

        assert!(result.is_err());
        assert!(!fs.exists(Path::new("/mock/a.txt")));
        assert!(fs.exists(Path::new("/mock/c.txt")));
    }

    #[test]
    fn test_soft_removal_attempts_every_path() {
        let fs = MockFileSystem::new();
        fs.add_file("hello/wrap.py", "");
        fs.add_file("hello/lib/six.py", "");
        fs.deny_removal("hello/wrap.py");

        let summary = remove(
            &fs,
            &["/mock/hello/wrap.py", "/mock/hello/gone", "/mock/hello/lib"],
            RemovalPolicy::Soft,
        )
        .unwrap();

        assert_eq!(summary.removed, vec![PathBuf::from("/mock/hello/lib")]);
        assert_eq!(summary.missing, vec![PathBuf::from("/mock/hello/gone")]);
        assert_eq!(summary.failed.len(), 1);
        assert!(!fs.exists(Path::new("/mock/hello/lib/six.py")));
    }
}
