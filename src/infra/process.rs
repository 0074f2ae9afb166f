//! External process execution
//!
//! Build steps spawn external tools (configure scripts, make, the host
//! interpreter) with a fully-formed environment. The [`CommandRunner`] trait
//! is the seam that lets the executor and packager be tested without touching
//! the real toolchain.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// Captured result of a finished external process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// True if the process exited with status zero
    pub success: bool,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl ProcessOutput {
    /// Combined stdout + stderr, for error reporting
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Spawns external build tools, blocking until completion.
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, using exactly `env` as the process
    /// environment. Returns the captured output; a non-zero exit is reported
    /// through [`ProcessOutput::success`], not as an `Err`.
    ///
    /// # Errors
    ///
    /// Returns the OS error message if the process could not be spawned at all.
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ProcessOutput, String>;
}

/// [`CommandRunner`] backed by [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ProcessOutput, String> {
        tracing::debug!("Running {} {} in {}", program, args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .env_clear()
            .envs(env)
            .output()
            .map_err(|e| e.to_string())?;

        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
