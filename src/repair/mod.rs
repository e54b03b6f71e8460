//! Repair pipeline for the HTML written by pdftohtml.
//!
//! The rewrites run in a fixed order and are meant to be applied exactly
//! once per document. Several of them are not idempotent: a second run
//! adds another provenance comment, and numeric anchors are re-prefixed.

mod flip;

pub use flip::{Flip, FlipGate};

use crate::error::Result;
use regex::{Captures, Regex};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Comment inserted in front of the `<head>` element.
pub const PROVENANCE_COMMENT: &str = "<!-- created by pdf2html -->";

/// Markup rewrites applied to a generated HTML document.
pub struct RepairPipeline {
    flip_gate: FlipGate,
    br_regex: Regex,
    anchor_name_regex: Regex,
    anchor_id_regex: Regex,
    anchor_href_regex: Regex,
    entity_regex: Regex,
}

impl RepairPipeline {
    /// Create a new pipeline.
    pub fn new() -> Self {
        Self {
            flip_gate: FlipGate::new(),
            br_regex: Regex::new(r"(?i)<br\s*/>").unwrap(),
            anchor_name_regex: Regex::new(r#"(?i)<a\s+name=(?:"(\d+)"|(\d+)\b)"#).unwrap(),
            anchor_id_regex: Regex::new(r#"(?i)<a id="(\d+)""#).unwrap(),
            anchor_href_regex: Regex::new(r#"(?i)<a href="index\.html#(\d+)""#).unwrap(),
            entity_regex: Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
                .unwrap(),
        }
    }

    /// Run every rewrite over `raw`.
    ///
    /// `base_dir` is the directory image sources are resolved against.
    pub fn process(&self, raw: &str, base_dir: &Path) -> Result<String> {
        let result = self.flip_gate.apply(raw, base_dir)?;
        let result = self.insert_provenance(&result);
        let result = self.normalize_line_breaks(&result);
        let result = self.rewrite_anchors(&result);
        let result = self.replace_entities(&result);
        Ok(self.replace_nbsp(&result))
    }

    /// Insert [`PROVENANCE_COMMENT`] before the first `<head`.
    pub fn insert_provenance(&self, text: &str) -> String {
        text.replacen("<head", &format!("{}\n  <head", PROVENANCE_COMMENT), 1)
    }

    /// Turn self-closing `<br/>` into `<br>`.
    pub fn normalize_line_breaks(&self, text: &str) -> String {
        self.br_regex.replace_all(text, "<br>").into_owned()
    }

    /// Move numbered page anchors to the `pN` scheme.
    ///
    /// `name=` must become `id=` before ids are prefixed, since the id
    /// rewrite also picks up the ids produced by the first step.
    pub fn rewrite_anchors(&self, text: &str) -> String {
        let result = self.anchor_name_regex.replace_all(text, |caps: &Captures| {
            let number = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!(r#"<a id="{}""#, number)
        });
        let result = self.anchor_id_regex.replace_all(&result, r#"<a id="p$1""#);
        self.anchor_href_regex
            .replace_all(&result, r##"<a href="#p$1""##)
            .into_owned()
    }

    /// Decode character and entity references to literal characters.
    ///
    /// References that decode to markup-significant characters keep their
    /// XML escape. Unknown references are left as they are.
    pub fn replace_entities(&self, text: &str) -> String {
        self.entity_regex
            .replace_all(text, |caps: &Captures| {
                let reference = &caps[0];
                let decoded = html_escape::decode_html_entities(reference);
                match decoded.as_ref() {
                    "&" => "&amp;".to_string(),
                    "<" => "&lt;".to_string(),
                    ">" => "&gt;".to_string(),
                    "\"" => "&quot;".to_string(),
                    "'" => "&apos;".to_string(),
                    _ => decoded.into_owned(),
                }
            })
            .into_owned()
    }

    /// Replace non-breaking spaces with plain spaces.
    pub fn replace_nbsp(&self, text: &str) -> String {
        text.replace('\u{a0}', " ")
    }
}

impl Default for RepairPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Repair the HTML document at `path` in place.
///
/// The new content is written to a temporary file next to `path` and
/// renamed over it, so a failure never leaves a half-written document.
pub fn repair_file(path: &Path) -> Result<()> {
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let raw = fs::read(path)?;
    let raw = String::from_utf8_lossy(&raw);

    let repaired = RepairPipeline::new().process(&raw, base_dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(base_dir)?;
    tmp.write_all(repaired.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().set_permissions(fs::metadata(path)?.permissions())?;
    tmp.persist(path).map_err(|e| e.error)?;
    log::debug!("repaired {}", path.display());
    Ok(())
}
