//! Error types for pdf2html.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdf2html operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing job files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The external conversion tool could not be found.
    #[error("Could not find {tool}, check it is in your PATH")]
    ToolNotFound {
        /// Tool as it was requested
        tool: String,
    },

    /// The external tool could not be started for a reason other than a missing executable.
    #[error("Failed to launch conversion tool: {0}")]
    Launch(io::Error),

    /// The external tool exited with a nonzero status.
    #[error("pdftohtml failed with return code: {code}\n{log}")]
    ConversionFailed {
        /// Exit code, or -1 when the process was killed by a signal
        code: i32,
        /// Everything the tool wrote to stdout and stderr
        log: String,
    },

    /// The tool reported success but its output is missing or too small.
    ///
    /// This is the usual outcome for DRM-protected documents.
    #[error("No usable output at {} ({size} bytes): document is protected or empty", path.display())]
    ProtectedOrEmptyDocument {
        /// Expected output file
        path: PathBuf,
        /// Observed size, zero if the file does not exist
        size: u64,
    },

    /// A flip-tagged image was found; image flipping is disabled.
    #[error("Image flipping is disabled, refusing to process {}", src.display())]
    FlipDisabled {
        /// Image path as resolved inside the output directory
        src: PathBuf,
    },

    /// The outline-only extraction pass failed.
    #[error("Outline extraction failed: {0}")]
    OutlineExtraction(String),

    /// Error writing XML output.
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Whether this error signals a protected (DRM) or empty source document.
    pub fn is_protected(&self) -> bool {
        matches!(self, Error::ProtectedOrEmptyDocument { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
