//! Copy-filter rules for packaging passes
//!
//! A [`FilterRules`] value pairs a directory-name blacklist (applied at any
//! nesting depth) with a filename-glob blacklist. The packaging pipeline uses
//! three named instances: the stdlib copy rules, the stricter stdlib archive
//! rules (which drop sources and keep bytecode), and the site-packages rules.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::BundleError;

/// Directories never copied out of the standard library tree
const STDLIB_DIR_BLACKLIST: &[&str] = &[
    "__pycache__",
    "curses",
    "ensurepip",
    "idlelib",
    "lib2to3",
    "test",
    "tests",
    "tkinter",
    "turtledemo",
    "venv",
    "wsgiref",
];

/// File patterns excluded from every stdlib pass
const STDLIB_FILEN_BLACKLIST_COMMON: &[&str] = &[
    "*.exe",
    "*.whl",
    "README",
    "README.txt",
    "distutils/command/command_template",
    "email/architecture.rst",
];

/// Directories never copied out of the site-packages tree
const SITE_PACKAGES_DIR_BLACKLIST: &[&str] = &["__pycache__", "tests"];

/// A directory-name blacklist plus a filename-glob blacklist
#[derive(Debug, Clone)]
pub struct FilterRules {
    dir_blacklist: HashSet<String>,
    file_blacklist: Vec<Pattern>,
}

impl FilterRules {
    /// Build rules from directory names and glob patterns
    pub fn new(dirs: &[&str], files: &[&str]) -> Result<Self, BundleError> {
        let mut file_blacklist = Vec::with_capacity(files.len());
        for pattern in files {
            file_blacklist.push(Pattern::new(pattern).map_err(|e| {
                BundleError::InvalidPattern {
                    pattern: (*pattern).to_string(),
                    error: e.to_string(),
                }
            })?);
        }
        Ok(Self {
            dir_blacklist: dirs.iter().map(ToString::to_string).collect(),
            file_blacklist,
        })
    }

    /// Whether a directory of this name is excluded (at any depth)
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.dir_blacklist.contains(name)
    }

    /// Whether a file is excluded, by file name or by tree-relative path
    pub fn excludes_file(&self, rel_path: &Path) -> bool {
        let file_name = rel_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.file_blacklist
            .iter()
            .any(|p| p.matches(&file_name) || p.matches_path(rel_path))
    }

    /// Rules for copying the standard library tree (drops stale bytecode)
    pub fn stdlib() -> Result<Self, BundleError> {
        let mut files = STDLIB_FILEN_BLACKLIST_COMMON.to_vec();
        files.push("*.pyc");
        Self::new(STDLIB_DIR_BLACKLIST, &files)
    }

    /// Rules for archiving the compiled standard library (drops sources,
    /// keeps bytecode)
    pub fn stdlib_zip() -> Result<Self, BundleError> {
        let mut files = STDLIB_FILEN_BLACKLIST_COMMON.to_vec();
        files.push("*.py");
        Self::new(STDLIB_DIR_BLACKLIST, &files)
    }

    /// Rules for copying installed third-party packages
    pub fn site_packages() -> Result<Self, BundleError> {
        Self::new(SITE_PACKAGES_DIR_BLACKLIST, &[])
    }
}

/// Walk a tree depth-first and return the tree-relative paths of all files
/// that survive the rules. Blacklisted directories are pruned whole, so
/// nothing under them is ever visited. Output order is deterministic.
pub fn walk_valid_files(root: &Path, rules: &FilterRules) -> Result<Vec<PathBuf>, BundleError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !rules.excludes_dir(&name)
        });

    for entry in walker {
        let entry = entry.map_err(|e| BundleError::Io {
            path: root.to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| BundleError::Io {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?
            .to_path_buf();
        if !rules.excludes_file(&rel) {
            files.push(rel);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "x").unwrap();
    }

    #[test]
    fn test_dir_blacklist_applies_at_any_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "os.py");
        touch(dir.path(), "test/test_os.py");
        touch(dir.path(), "email/test/data/sample.py");
        touch(dir.path(), "email/message.py");

        let rules = FilterRules::stdlib().unwrap();
        let files = walk_valid_files(dir.path(), &rules).unwrap();

        assert!(files.contains(&PathBuf::from("os.py")));
        assert!(files.contains(&PathBuf::from("email/message.py")));
        assert!(!files.iter().any(|f| f.starts_with("test")));
        assert!(!files.iter().any(|f| f.to_string_lossy().contains("test")));
    }

    #[test]
    fn test_stdlib_rules_drop_stale_bytecode_and_binaries() {
        let rules = FilterRules::stdlib().unwrap();
        assert!(rules.excludes_file(Path::new("os.pyc")));
        assert!(rules.excludes_file(Path::new("setup.exe")));
        assert!(rules.excludes_file(Path::new("pip-10.0-py3-none-any.whl")));
        assert!(!rules.excludes_file(Path::new("os.py")));
    }

    #[test]
    fn test_stdlib_zip_rules_drop_sources_keep_bytecode() {
        let rules = FilterRules::stdlib_zip().unwrap();
        assert!(rules.excludes_file(Path::new("os.py")));
        assert!(!rules.excludes_file(Path::new("os.pyc")));
    }

    #[test]
    fn test_path_patterns_match_relative_path() {
        let rules = FilterRules::stdlib().unwrap();
        assert!(rules.excludes_file(Path::new("distutils/command/command_template")));
        assert!(rules.excludes_file(Path::new("email/architecture.rst")));
        assert!(!rules.excludes_file(Path::new("distutils/command/build.py")));
    }

    #[test]
    fn test_site_packages_rules_narrower() {
        let rules = FilterRules::site_packages().unwrap();
        assert!(rules.excludes_dir("tests"));
        assert!(rules.excludes_dir("__pycache__"));
        // Narrower than stdlib: sources and wheels survive the copy
        assert!(!rules.excludes_file(Path::new("requests/api.py")));
        assert!(!rules.excludes_dir("idlelib"));
    }

    #[test]
    fn test_walk_order_is_deterministic() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a.py");
        touch(dir.path(), "sub/c.py");

        let rules = FilterRules::site_packages().unwrap();
        let first = walk_valid_files(dir.path(), &rules).unwrap();
        let second = walk_valid_files(dir.path(), &rules).unwrap();
        assert_eq!(first, second);
    }
}
