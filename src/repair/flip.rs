//! Image flip gate.
//!
//! pdftohtml tags mirrored images with `class="xflip"`, `"yflip"` or
//! `"xyflip"`. Flipping them is disabled: any such image that exists on
//! disk aborts the repair with [`Error::FlipDisabled`].

use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;

/// Orientation requested by a flip class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// Mirror horizontally
    Horizontal,
    /// Mirror vertically
    Vertical,
    /// Mirror both ways
    Both,
}

impl Flip {
    fn from_class(prefix: &str) -> Option<Self> {
        match prefix {
            "x" => Some(Flip::Horizontal),
            "y" => Some(Flip::Vertical),
            "xy" => Some(Flip::Both),
            _ => None,
        }
    }
}

/// Scans image tags for flip classes and strips style blocks.
pub struct FlipGate {
    img_regex: Regex,
    class_regex: Regex,
    src_regex: Regex,
    style_regex: Regex,
}

impl FlipGate {
    /// Compile the gate's patterns.
    pub fn new() -> Self {
        Self {
            img_regex: Regex::new(r"(?i)<IMG[^>]+/?>").unwrap(),
            class_regex: Regex::new(r#"class="(x|y|xy)flip""#).unwrap(),
            src_regex: Regex::new(r#"src="([^"]+)""#).unwrap(),
            style_regex: Regex::new(r"(?is)<STYLE.+?</STYLE>\s*").unwrap(),
        }
    }

    /// Flip-tagged images in `raw`, with the orientation and `src` of each.
    pub fn flagged<'a>(&self, raw: &'a str) -> Vec<(Flip, &'a str)> {
        self.img_regex
            .find_iter(raw)
            .filter_map(|m| {
                let tag = m.as_str();
                let flip = self
                    .class_regex
                    .captures(tag)
                    .and_then(|c| c.get(1))
                    .and_then(|c| Flip::from_class(c.as_str()))?;
                let src = self.src_regex.captures(tag)?.get(1)?.as_str();
                Some((flip, src))
            })
            .collect()
    }

    /// Run the gate over `raw`, resolving image sources against `base_dir`.
    ///
    /// Returns the markup with every `<style>` block removed.
    pub fn apply(&self, raw: &str, base_dir: &Path) -> Result<String> {
        for (flip, src) in self.flagged(raw) {
            let path = base_dir.join(src);
            if !path.exists() {
                continue;
            }
            log::debug!("{:?} flip requested for {}", flip, path.display());
            return Err(Error::FlipDisabled { src: path });
        }
        Ok(self.style_regex.replace_all(raw, "").into_owned())
    }
}

impl Default for FlipGate {
    fn default() -> Self {
        Self::new()
    }
}
