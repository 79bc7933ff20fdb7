//! Source tree and artifact copying

use super::StepError;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SKIPPED_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Copies `from` into `to`, returning the number of files copied.
///
/// Version control directories are skipped, and so is `to` itself when it
/// lives inside `from`. Directories on the way down to a nested `to` are only
/// created when they hold something to copy. Symlinks are recreated on unix
/// and followed elsewhere.
pub fn copy_tree(from: &Path, to: &Path) -> Result<u64, StepError> {
    let copy_err = |source: io::Error| StepError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    fs::create_dir_all(to).map_err(copy_err)?;
    let from_root = from.canonicalize().map_err(copy_err)?;
    let to_root = to.canonicalize().map_err(copy_err)?;

    if from_root == to_root {
        return Ok(0);
    }

    let walker = WalkDir::new(&from_root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            if entry.path() == to_root {
                return false;
            }
            !(entry.file_type().is_dir()
                && SKIPPED_DIRS
                    .iter()
                    .any(|skip| entry.file_name() == *skip))
        });

    let mut copied = 0;
    for entry in walker {
        let entry = entry.map_err(|e| copy_err(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(&from_root)
            .map_err(|e| copy_err(io::Error::new(io::ErrorKind::Other, e)))?;
        let dest = to_root.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if !to_root.starts_with(entry.path()) {
                fs::create_dir_all(&dest).map_err(copy_err)?;
            }
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(copy_err)?;
        }
        if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest).map_err(copy_err)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(copy_err)?;
        }
        copied += 1;
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> io::Result<()> {
    let target = fs::read_link(link)?;
    if dest.symlink_metadata().is_ok() {
        fs::remove_file(dest)?;
    }
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(link, dest).map(|_| ())
}

/// [`copy_tree`] on the blocking thread pool.
pub async fn copy_tree_blocking(from: PathBuf, to: PathBuf) -> Result<u64, StepError> {
    let (err_from, err_to) = (from.clone(), to.clone());
    tokio::task::spawn_blocking(move || copy_tree(&from, &to))
        .await
        .map_err(|e| StepError::Copy {
            from: err_from,
            to: err_to,
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
}

/// Copies every file matching `pattern` (relative to `source_dir`) into
/// `artifact_dir`, flattened by file name.
pub fn collect_matching(
    source_dir: &Path,
    pattern: &str,
    artifact_dir: &Path,
) -> Result<u64, StepError> {
    let root = Pattern::escape(&source_dir.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let copy_err = |from: &Path, source: io::Error| StepError::Copy {
        from: from.to_path_buf(),
        to: artifact_dir.to_path_buf(),
        source,
    };

    let paths = glob::glob_with(&full, options).map_err(|e| StepError::Manifest {
        path: source_dir.join(pattern),
        message: e.to_string(),
    })?;

    fs::create_dir_all(artifact_dir).map_err(|e| copy_err(source_dir, e))?;

    let mut copied = 0;
    for path in paths.flatten() {
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        fs::copy(&path, artifact_dir.join(name)).map_err(|e| copy_err(&path, e))?;
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_copies_nested_files() {
        let source = TempDir::new().unwrap();
        let artifact = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("lib/util")).unwrap();
        fs::write(source.path().join("index.js"), "module.exports = 1").unwrap();
        fs::write(source.path().join("lib/util/a.js"), "a").unwrap();

        let copied = copy_tree(source.path(), artifact.path()).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(artifact.path().join("lib/util/a.js")).unwrap(),
            "a"
        );
    }

    #[test]
    fn test_copy_tree_skips_vcs_and_nested_artifact_dir() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join(".git")).unwrap();
        fs::write(source.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(source.path().join("main.py"), "print(1)").unwrap();
        let artifact = source.path().join(".fc/build/artifacts");

        copy_tree(source.path(), &artifact).unwrap();
        // Second copy must not recurse into the previous output
        let copied = copy_tree(source.path(), &artifact).unwrap();

        assert_eq!(copied, 1);
        assert!(artifact.join("main.py").exists());
        assert!(!artifact.join(".git").exists());
        assert!(!artifact.join(".fc").exists());
    }

    #[test]
    fn test_copy_tree_keeps_files_beside_nested_artifact_dir() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join(".fc/build")).unwrap();
        fs::write(source.path().join(".fc/config.yml"), "edition: 1").unwrap();
        fs::write(source.path().join("index.js"), "exports.handler = 1").unwrap();
        let artifact = source.path().join(".fc/build/artifacts");

        let copied = copy_tree(source.path(), &artifact).unwrap();

        assert_eq!(copied, 2);
        assert!(artifact.join(".fc/config.yml").exists());
        assert!(!artifact.join(".fc/build").exists());
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let artifact = TempDir::new().unwrap();
        let err = copy_tree(Path::new("/definitely/not/here"), artifact.path()).unwrap_err();
        assert!(matches!(err, StepError::Copy { .. }));
    }

    #[test]
    fn test_collect_matching_flattens() {
        let source = TempDir::new().unwrap();
        let artifact = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("target/classes")).unwrap();
        fs::write(source.path().join("target/app-1.0.jar"), "jar").unwrap();
        fs::write(source.path().join("target/.partial.jar"), "tmp").unwrap();
        fs::write(source.path().join("target/classes/App.class"), "class").unwrap();

        let copied = collect_matching(source.path(), "target/*.jar", artifact.path()).unwrap();

        assert_eq!(copied, 1);
        assert!(artifact.path().join("app-1.0.jar").exists());
    }
}
