//! Access to the host's commands and files, behind a trait so scanners can
//! be exercised against canned output.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Runs external commands and reads files for a scanner.
pub trait System: Send + Sync {
    /// Run a command and return its stdout.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<String>> + Send;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// The real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSystem;

impl System for HostSystem {
    /// Run `program` with `args`.
    ///
    /// `lsof` and `ps` exit 1 with nothing on stderr when nothing matched,
    /// so that one case yields the (empty) stdout. Any other non-zero exit
    /// is a failure.
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let nothing_matched = output.status.code() == Some(1) && stderr.is_empty();
            if !nothing_matched {
                return Err(Error::CommandFailed(format!(
                    "{} exited with {}: {}",
                    program, output.status, stderr
                )));
            }
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in {} output: {}", program, e)))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }
}
