//! PDF header sniffing.
//!
//! The external tool is the authority on whether a file converts; this
//! module only lets a job warn early when the source does not even look
//! like a PDF.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// PDF format information read from the file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the header of the file at `path`.
///
/// Returns `Ok(None)` when the file is readable but is not a PDF.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> io::Result<Option<PdfHeader>> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    Ok(sniff_bytes(&header))
}

/// Parse a PDF header from the first bytes of a file.
pub fn sniff_bytes(data: &[u8]) -> Option<PdfHeader> {
    let rest = data.strip_prefix(PDF_MAGIC)?;
    let version = rest.get(..VERSION_LEN)?;
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Some(PdfHeader {
                version: String::from_utf8_lossy(version).into_owned(),
            })
        }
        _ => None,
    }
}
