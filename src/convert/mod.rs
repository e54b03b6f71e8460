//! Conversion jobs: options, results and the job runner.
//!
//! # Example
//!
//! ```no_run
//! use pdf2html::convert::{ConversionJob, ConvertOptions, OutlineMode};
//!
//! fn main() -> pdf2html::Result<()> {
//!     let options = ConvertOptions::new().with_outline_mode(OutlineMode::Lenient);
//!     let result = ConversionJob::new("book_html", "book.pdf", options).run()?;
//!     println!("{}", result.document.display());
//!     Ok(())
//! }
//! ```

mod job;

pub use job::{ConversionJob, SOURCE_COPY_NAME};

use crate::tool::DEFAULT_TOOL;
use serde::Serialize;
use std::path::PathBuf;

/// Default minimum size of the generated document, in bytes.
///
/// Anything smaller is treated as a protected or empty source.
pub const MIN_OUTPUT_SIZE: u64 = 100;

/// Options for a conversion job.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Executable to run
    pub tool: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Whether pdftohtml should extract images
    pub include_images: bool,

    /// How failures of the outline pass are handled
    pub outline_mode: OutlineMode,

    /// Minimum size of the generated document in bytes
    pub min_output_size: u64,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executable to run.
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Produce XML instead of HTML.
    pub fn xml(mut self) -> Self {
        self.format = OutputFormat::Xml;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Set outline handling.
    pub fn with_outline_mode(mut self, mode: OutlineMode) -> Self {
        self.outline_mode = mode;
        self
    }

    /// Set the minimum size of the generated document.
    pub fn with_min_output_size(mut self, bytes: u64) -> Self {
        self.min_output_size = bytes;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(DEFAULT_TOOL),
            format: OutputFormat::Html,
            include_images: false,
            outline_mode: OutlineMode::Strict,
            min_output_size: MIN_OUTPUT_SIZE,
        }
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Repaired HTML plus an optional NCX outline
    #[default]
    Html,

    /// pdftohtml's raw XML, left untouched
    Xml,
}

impl OutputFormat {
    /// File name of the generated document.
    pub fn index_name(self) -> &'static str {
        match self {
            OutputFormat::Html => "index.html",
            OutputFormat::Xml => "index.xml",
        }
    }
}

/// How the outline pass of an HTML job is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutlineMode {
    /// Outline failures fail the whole job
    #[default]
    Strict,
    /// Outline failures are logged and the job succeeds without `toc.ncx`
    Lenient,
    /// The outline pass is not run
    Disabled,
}

/// Result of a conversion job.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    /// Generated document
    pub document: PathBuf,

    /// Output format of the generated document
    pub format: OutputFormat,

    /// Navigation document, when a substantial outline was found
    pub toc: Option<PathBuf>,

    /// Number of outline entries found, written or not
    pub outline_entries: usize,

    /// Diagnostics printed by the tool during the primary run
    pub tool_log: String,
}

impl ConvertResult {
    /// Create a new result for `document`.
    pub fn new(document: PathBuf, format: OutputFormat) -> Self {
        Self {
            document,
            format,
            toc: None,
            outline_entries: 0,
            tool_log: String::new(),
        }
    }

    /// Set the tool diagnostics.
    pub fn with_tool_log(mut self, log: impl Into<String>) -> Self {
        self.tool_log = log.into();
        self
    }
}
