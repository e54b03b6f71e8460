//! # pdf2html
//!
//! PDF to HTML conversion for e-book pipelines, driven by poppler's
//! `pdftohtml`.
//!
//! The library runs `pdftohtml` in a job directory, repairs the HTML it
//! writes (page anchors, self-closing `<br/>`, entities, style blocks) and
//! extracts the PDF outline into an NCX navigation document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf2html::convert_to_html;
//!
//! fn main() -> pdf2html::Result<()> {
//!     let result = convert_to_html("book_html", "book.pdf")?;
//!     println!("{}", result.document.display());
//!     if let Some(toc) = result.toc {
//!         println!("{}", toc.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! - `index.html` (or `index.xml` in XML mode)
//! - `toc.ncx` when the PDF has an outline with more than two entries
//!
//! A missing or tiny `index.html` is reported as
//! [`Error::ProtectedOrEmptyDocument`], which usually means the PDF is
//! DRM-protected.

pub mod convert;
pub mod detect;
pub mod error;
pub mod outline;
pub mod repair;
pub mod tool;

// Re-export commonly used types
pub use convert::{
    ConversionJob, ConvertOptions, ConvertResult, OutlineMode, OutputFormat, MIN_OUTPUT_SIZE,
};
pub use error::{Error, Result};
pub use outline::{OutlineNode, Toc};
pub use repair::RepairPipeline;

use std::path::{Path, PathBuf};

/// Convert a PDF to repaired HTML in `output_dir`.
///
/// # Example
///
/// ```no_run
/// use pdf2html::convert_to_html;
///
/// let result = convert_to_html("out", "document.pdf").unwrap();
/// assert!(result.document.ends_with("index.html"));
/// ```
pub fn convert_to_html<P: AsRef<Path>, Q: AsRef<Path>>(
    output_dir: P,
    pdf_path: Q,
) -> Result<ConvertResult> {
    convert_with_options(output_dir, pdf_path, ConvertOptions::default())
}

/// Convert a PDF to pdftohtml's XML format in `output_dir`.
pub fn convert_to_xml<P: AsRef<Path>, Q: AsRef<Path>>(
    output_dir: P,
    pdf_path: Q,
) -> Result<ConvertResult> {
    convert_with_options(output_dir, pdf_path, ConvertOptions::new().xml())
}

/// Convert a PDF with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf2html::{convert_with_options, ConvertOptions, OutlineMode};
///
/// let options = ConvertOptions::new()
///     .with_tool("/usr/local/bin/pdftohtml")
///     .with_outline_mode(OutlineMode::Lenient);
/// let result = convert_with_options("out", "document.pdf", options).unwrap();
/// ```
pub fn convert_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    output_dir: P,
    pdf_path: Q,
    options: ConvertOptions,
) -> Result<ConvertResult> {
    ConversionJob::new(output_dir.as_ref(), pdf_path.as_ref(), options).run()
}

/// Builder for conversion jobs.
///
/// # Example
///
/// ```no_run
/// use pdf2html::Pdf2Html;
///
/// let result = Pdf2Html::new()
///     .with_tool("pdftohtml")
///     .with_images(true)
///     .lenient_outline()
///     .convert("book.pdf", "book_html")?;
/// # Ok::<(), pdf2html::Error>(())
/// ```
pub struct Pdf2Html {
    options: ConvertOptions,
}

impl Pdf2Html {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Set the pdftohtml executable.
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_tool(tool);
        self
    }

    /// Produce XML instead of HTML.
    pub fn xml(mut self) -> Self {
        self.options = self.options.xml();
        self
    }

    /// Enable image extraction.
    pub fn with_images(mut self, include: bool) -> Self {
        self.options = self.options.with_images(include);
        self
    }

    /// Keep the conversion when the outline pass fails.
    pub fn lenient_outline(mut self) -> Self {
        self.options = self.options.with_outline_mode(OutlineMode::Lenient);
        self
    }

    /// Skip the outline pass.
    pub fn without_outline(mut self) -> Self {
        self.options = self.options.with_outline_mode(OutlineMode::Disabled);
        self
    }

    /// Options the builder has collected.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run a conversion of `pdf_path` into `output_dir`.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        pdf_path: P,
        output_dir: Q,
    ) -> Result<ConvertResult> {
        convert_with_options(output_dir, pdf_path, self.options.clone())
    }
}

impl Default for Pdf2Html {
    fn default() -> Self {
        Self::new()
    }
}
