//! A single PDF conversion inside one output directory.

use super::{ConvertOptions, ConvertResult, OutlineMode, OutputFormat};
use crate::detect;
use crate::error::{Error, Result};
use crate::outline::{self, ExtractedOutline, Toc};
use crate::repair;
use crate::tool::{self, Tool};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the working copy of the source PDF inside the output directory.
pub const SOURCE_COPY_NAME: &str = "src.pdf";

/// Working copy of the source PDF, removed when dropped.
struct SourceCopy {
    path: PathBuf,
}

impl SourceCopy {
    fn create(source: &Path, output_dir: &Path) -> Result<Self> {
        let copy = Self {
            path: output_dir.join(SOURCE_COPY_NAME),
        };
        fs::copy(source, &copy.path)?;
        Ok(copy)
    }
}

impl Drop for SourceCopy {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::debug!("could not remove {}: {}", self.path.display(), e);
        }
    }
}

/// Converts one PDF into `index.html` or `index.xml` in an output directory.
///
/// The output directory belongs to the job while it runs; the source PDF
/// is only read.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    output_dir: PathBuf,
    source: PathBuf,
    options: ConvertOptions,
}

impl ConversionJob {
    /// Create a job converting `source` into `output_dir`.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
        options: ConvertOptions,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            source: source.into(),
            options,
        }
    }

    /// Directory the job writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the generated document is written to.
    pub fn document_path(&self) -> PathBuf {
        self.output_dir.join(self.options.format.index_name())
    }

    /// Run the conversion.
    ///
    /// For HTML the document is repaired in place and the outline pass is
    /// run afterwards, subject to [`OutlineMode`].
    pub fn run(&self) -> Result<ConvertResult> {
        let format = self.options.format;
        let tool = Tool::new(&self.options.tool);

        match detect::sniff_path(&self.source) {
            Ok(Some(header)) => log::debug!("{}: {}", self.source.display(), header),
            Ok(None) => log::warn!("{} does not look like a PDF", self.source.display()),
            Err(_) => {}
        }

        fs::create_dir_all(&self.output_dir)?;
        let _copy = SourceCopy::create(&self.source, &self.output_dir)?;

        let args = tool::conversion_args(
            SOURCE_COPY_NAME,
            format.index_name(),
            self.options.include_images,
            format == OutputFormat::Xml,
        );
        let tool_log = tool.run_logged(&self.output_dir, &args)?;
        if !tool_log.is_empty() {
            log::info!("pdftohtml log:\n{}", tool_log);
        }

        let document = self.document_path();
        self.check_output(&document)?;

        let mut result = ConvertResult::new(document, format).with_tool_log(tool_log);
        if format == OutputFormat::Html {
            repair::repair_file(&result.document)?;

            if let Some(extracted) = self.outline_pass(&tool)? {
                result.outline_entries = extracted.toc.total_items();
                result.toc = extracted.ncx;
            }
        }

        Ok(result)
    }

    /// Run only the outline pass and return the folded outline.
    ///
    /// Nothing is left in the output directory; no navigation document is
    /// written.
    pub fn read_outline(&self) -> Result<Option<Toc>> {
        let tool = Tool::new(&self.options.tool);
        fs::create_dir_all(&self.output_dir)?;
        let _copy = SourceCopy::create(&self.source, &self.output_dir)?;

        let raw = tool.run_captured(&self.output_dir, &tool::outline_args(SOURCE_COPY_NAME))?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        outline::parse_outline(&raw, OutputFormat::Html.index_name())
    }

    fn check_output(&self, document: &Path) -> Result<()> {
        let size = fs::metadata(document).map(|m| m.len()).unwrap_or(0);
        if size < self.options.min_output_size {
            return Err(Error::ProtectedOrEmptyDocument {
                path: document.to_path_buf(),
                size,
            });
        }
        Ok(())
    }

    fn outline_pass(&self, tool: &Tool) -> Result<Option<ExtractedOutline>> {
        if self.options.outline_mode == OutlineMode::Disabled {
            return Ok(None);
        }

        let attempt = tool
            .run_captured(&self.output_dir, &tool::outline_args(SOURCE_COPY_NAME))
            .and_then(|raw| {
                if raw.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                outline::extract_outline(
                    &raw,
                    &self.output_dir,
                    OutputFormat::Html.index_name(),
                )
            });

        match attempt {
            Err(e) if self.options.outline_mode == OutlineMode::Lenient => {
                log::warn!("continuing without outline: {}", e);
                Ok(None)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path() {
        let job = ConversionJob::new("out", "book.pdf", ConvertOptions::new().xml());
        assert_eq!(job.document_path(), PathBuf::from("out/index.xml"));
        assert_eq!(job.output_dir(), Path::new("out"));
    }

    #[test]
    fn test_source_copy_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("book.pdf");
        fs::write(&source, b"%PDF-1.4\n").unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let copy = SourceCopy::create(&source, &out).unwrap();
        assert_eq!(fs::read(out.join(SOURCE_COPY_NAME)).unwrap(), b"%PDF-1.4\n");
        drop(copy);
        assert!(!out.join(SOURCE_COPY_NAME).exists());
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = ConversionJob::new(
            dir.path(),
            dir.path().join("missing.pdf"),
            ConvertOptions::default(),
        );
        assert!(matches!(job.run(), Err(Error::Io(_))));
        assert!(!dir.path().join(SOURCE_COPY_NAME).exists());
    }
}
