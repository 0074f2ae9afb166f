//! Shared test utilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use droidforge::infra::process::{CommandRunner, ProcessOutput};

/// One recorded process invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// A [`CommandRunner`] that records invocations instead of spawning anything
#[derive(Default)]
pub struct RecordingRunner {
    invocations: RefCell<Vec<Invocation>>,
    /// Report failure for any command run in a directory whose path contains
    /// this fragment
    fail_in_dir_containing: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_in(fragment: &str) -> Self {
        Self {
            invocations: RefCell::new(Vec::new()),
            fail_in_dir_containing: Some(fragment.to_string()),
        }
    }

    pub fn count(&self) -> usize {
        self.invocations.borrow().len()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|i| i.program.clone())
            .collect()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        _env: &HashMap<String, String>,
    ) -> Result<ProcessOutput, String> {
        self.invocations.borrow_mut().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });

        let fail = self
            .fail_in_dir_containing
            .as_ref()
            .is_some_and(|f| cwd.to_string_lossy().contains(f.as_str()));
        Ok(ProcessOutput {
            success: !fail,
            stdout: String::new(),
            stderr: if fail {
                "simulated tool failure".to_string()
            } else {
                String::new()
            },
        })
    }
}

/// A [`CommandRunner`] that emulates `compileall -b`: for every `*.py` under
/// the working directory it writes a sibling `*.pyc`
#[derive(Default)]
pub struct CompilingRunner;

impl CommandRunner for CompilingRunner {
    fn run(
        &self,
        _program: &str,
        args: &[String],
        cwd: &Path,
        _env: &HashMap<String, String>,
    ) -> Result<ProcessOutput, String> {
        if args.iter().any(|a| a == "compileall") {
            for entry in walkdir::WalkDir::new(cwd)
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "py") {
                    std::fs::write(path.with_extension("pyc"), b"bytecode")
                        .map_err(|e| e.to_string())?;
                }
            }
        }
        Ok(ProcessOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Write a file, creating parent directories
pub fn touch(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
}
