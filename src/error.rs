//! Error types for the svgconv library.
//!
//! This module defines all error types that can occur while configuring
//! a conversion, building a command, or running an external tool.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessOutput;

pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur during conversion setup and execution.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The requested export format is not in the provider's whitelist.
    #[error("unsupported export format: {format}. Supported by {provider}: {supported}")]
    UnsupportedFormat {
        /// The rejected format (already lower-cased).
        format: String,
        /// The provider that rejected it.
        provider: String,
        /// Comma-separated list of formats the provider accepts.
        supported: String,
    },

    /// A color string did not match any accepted syntax.
    #[error("unsupported color format: {color}. Supported formats are {formats}")]
    InvalidColor {
        /// The rejected color string.
        color: String,
        /// Human-readable list of accepted syntaxes.
        formats: &'static str,
    },

    /// Background opacity outside the closed interval [0.0, 1.0].
    #[error("background opacity must be between 0.0 and 1.0, got {value}")]
    InvalidOpacity {
        /// The rejected value.
        value: f64,
    },

    /// No export format was set and none could be inferred.
    #[error("no export format specified: use format() or provide a filename with an extension")]
    MissingFormat,

    /// The provider name is not registered with the manager.
    #[error("unknown SVG converter provider: {0}")]
    UnknownProvider(String),

    /// The storage disk name is not registered.
    #[error("unknown storage disk: {0}")]
    UnknownDisk(String),

    /// The input file does not exist on the local filesystem.
    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input file does not exist on the given storage disk.
    #[error("file does not exist on disk [{disk}]: {path}")]
    DiskFileNotFound {
        /// The disk that was queried.
        disk: String,
        /// The path within the disk.
        path: String,
    },

    /// The underlying tool has no CLI equivalent for the requested feature.
    #[error("{provider} does not support {feature} via the command line")]
    UnsupportedCapability {
        /// The provider lacking the feature.
        provider: String,
        /// The feature that was requested (e.g. "background color").
        feature: String,
    },

    /// The external tool exited non-zero or timed out.
    #[error("{message}")]
    ProcessFailed {
        /// Message derived from stderr, or a generic provider-named failure.
        message: String,
        /// The command string that was executed.
        command: String,
        /// Captured standard output (lossy UTF-8).
        stdout: String,
        /// Captured standard error (lossy UTF-8).
        stderr: String,
        /// The process exit code (-1 if killed).
        exit_code: i32,
        /// Whether the timeout elapsed before the process exited.
        timed_out: bool,
    },

    /// The tool reported success but the expected output file is absent.
    #[error("{provider} did not produce the expected output file: {}", .path.display())]
    MissingOutput {
        /// The provider that was executed.
        provider: String,
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Creates a `ProcessFailed` error from a finished process.
    ///
    /// The message is taken from trimmed stderr when present, otherwise a
    /// generic provider-named failure message is used. The attempted command
    /// is included for diagnostics.
    pub fn from_process(output: &ProcessOutput, command: &str, provider: &str) -> Self {
        let stderr = output.stderr_str();
        let reason = match stderr.trim() {
            "" => format!("{provider} process failed."),
            trimmed => trimmed.to_string(),
        };

        let message = if command.is_empty() {
            reason
        } else {
            format!("{provider} command failed [{command}]: {reason}")
        };

        ConvertError::ProcessFailed {
            message,
            command: command.to_string(),
            stdout: output.stdout_str().into_owned(),
            stderr: stderr.into_owned(),
            exit_code: output.exit_code,
            timed_out: output.timed_out,
        }
    }

    /// Returns a multi-line summary of a process failure for debugging.
    ///
    /// Returns `None` for non-process errors.
    pub fn summary(&self) -> Option<String> {
        match self {
            ConvertError::ProcessFailed {
                stdout,
                stderr,
                exit_code,
                ..
            } => {
                let mut lines = vec![format!("Exit code: {exit_code}")];
                if !stderr.is_empty() {
                    lines.push(format!("Stderr: {stderr}"));
                }
                if !stdout.is_empty() {
                    lines.push(format!("Stdout: {stdout}"));
                }
                Some(lines.join("\n"))
            }
            _ => None,
        }
    }
}
