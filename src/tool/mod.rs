//! Invocation of the external `pdftohtml` executable.
//!
//! Every run happens with the child's working directory set to the job's
//! output directory so that relative output names land there. The change
//! is applied to the child only; the caller's working directory is never
//! touched.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Executable looked up on `PATH` when no tool is configured.
pub const DEFAULT_TOOL: &str = "pdftohtml";

/// Switches passed on every invocation.
const COMMON_ARGS: [&str; 6] = ["-enc", "UTF-8", "-noframes", "-p", "-nomerge", "-nodrm"];

/// Build the argument vector of the primary conversion.
pub fn conversion_args(source: &str, index: &str, include_images: bool, xml: bool) -> Vec<String> {
    let mut args: Vec<String> = COMMON_ARGS.iter().map(|s| s.to_string()).collect();
    args.push(source.to_string());
    args.push(index.to_string());
    if !include_images {
        args.push("-i".to_string());
    }
    if xml {
        args.push("-xml".to_string());
    }
    args
}

/// Build the argument vector of the first-page, outline-only pass.
pub fn outline_args(source: &str) -> Vec<String> {
    let mut args: Vec<String> = ["-f", "1", "-l", "1", "-xml", "-i"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(COMMON_ARGS.iter().map(|s| s.to_string()));
    args.extend(["-q", "-stdout", source].iter().map(|s| s.to_string()));
    args
}

/// Handle to the external conversion tool.
#[derive(Debug, Clone)]
pub struct Tool {
    program: PathBuf,
}

impl Tool {
    /// Create a handle for `program`.
    ///
    /// A relative path with a directory component (`bin/pdftohtml`) is
    /// anchored to the current directory, because the tool runs from the
    /// job directory. Bare names are left for `PATH` lookup.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let program = if program.is_relative() && program.components().count() > 1 {
            std::env::current_dir()
                .map(|cwd| cwd.join(&program))
                .unwrap_or(program)
        } else {
            program
        };
        Self { program }
    }

    /// Path or name of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command<I, S>(&self, work_dir: &Path, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(work_dir).stdin(Stdio::null());
        cmd
    }

    fn launch_error(&self, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::ToolNotFound {
                tool: self.program.display().to_string(),
            }
        } else {
            Error::Launch(err)
        }
    }

    /// Run the tool with stdout and stderr redirected to a temporary log.
    ///
    /// Returns the trimmed log text when the tool exits successfully.
    pub fn run_logged(&self, work_dir: &Path, args: &[String]) -> Result<String> {
        log::debug!("running {} {}", self.program.display(), args.join(" "));

        let log_file = tempfile::Builder::new()
            .prefix("pdftohtml_log")
            .tempfile()?;
        let stdout = log_file.as_file().try_clone()?;
        let stderr = log_file.as_file().try_clone()?;

        let status = self
            .command(work_dir, args)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| self.launch_error(e))?;

        let raw = fs::read(log_file.path())?;
        let log = String::from_utf8_lossy(&raw).trim().to_string();

        if !status.success() {
            return Err(Error::ConversionFailed {
                code: status.code().unwrap_or(-1),
                log,
            });
        }
        Ok(log)
    }

    /// Run the outline pass, capturing standard output directly.
    pub fn run_captured(&self, work_dir: &Path, args: &[String]) -> Result<Vec<u8>> {
        log::debug!("running {} {}", self.program.display(), args.join(" "));

        let output = self
            .command(work_dir, args)
            .output()
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::OutlineExtraction(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    /// Ask the tool for its version line.
    ///
    /// pdftohtml prints the banner on stderr and some builds exit nonzero
    /// for `-v`, so the exit status is ignored.
    pub fn version(&self) -> Result<Option<String>> {
        let output = Command::new(&self.program)
            .arg("-v")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.launch_error(e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stderr
            .lines()
            .chain(stdout.lines())
            .find(|line| line.to_ascii_lowercase().contains("version"))
            .map(|line| line.trim().to_string()))
    }
}

impl Default for Tool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}
