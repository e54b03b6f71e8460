//! Outline extraction.
//!
//! pdftohtml's XML mode writes the PDF bookmarks as an `<outline>` tree:
//!
//! ```xml
//! <outline>
//!   <item page="1">Chapter 1</item>
//!   <outline>
//!     <item page="2">Section 1.1</item>
//!   </outline>
//!   <item page="5">Chapter 2</item>
//! </outline>
//! ```
//!
//! A nested `<outline>` holds the children of the item just before it.
//! The tree is folded into a [`Toc`] and written as `toc.ncx` when it has
//! enough entries to be worth keeping.

mod ncx;
mod sanitize;
mod tree;

pub use ncx::{to_ncx, NcxMeta};
pub use sanitize::{clean_xml_chars, sanitize};

use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tree::Element;

/// File name of the navigation document.
pub const NCX_FILE: &str = "toc.ncx";

/// Outlines with this many entries or fewer are not written out.
///
/// One or two entries are nearly always a lone "page 1" bookmark rather
/// than real navigation.
pub const TRIVIAL_OUTLINE_ENTRIES: usize = 2;

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    /// Entry title
    pub title: String,
    /// Target document (e.g. `index.html`)
    pub href: String,
    /// Anchor inside the target, `pN` for page N
    pub anchor: String,
    /// Child entries
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a leaf entry.
    pub fn new(title: impl Into<String>, href: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            anchor: anchor.into(),
            children: Vec::new(),
        }
    }

    /// Link target, `href#anchor`.
    pub fn target(&self) -> String {
        format!("{}#{}", self.href, self.anchor)
    }
}

/// Table of contents folded from a document outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toc {
    /// Top-level entries
    pub entries: Vec<OutlineNode>,
}

impl Toc {
    /// Check if the table of contents is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the total number of entries (including nested).
    pub fn total_items(&self) -> usize {
        fn count_items(nodes: &[OutlineNode]) -> usize {
            nodes
                .iter()
                .map(|node| 1 + count_items(&node.children))
                .sum()
        }
        count_items(&self.entries)
    }

    /// Deepest nesting level, 0 for an empty table.
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[OutlineNode]) -> usize {
            nodes
                .iter()
                .map(|node| 1 + depth_of(&node.children))
                .max()
                .unwrap_or(0)
        }
        depth_of(&self.entries)
    }

    /// Whether the table is large enough to be written as a navigation document.
    pub fn is_substantial(&self) -> bool {
        self.total_items() > TRIVIAL_OUTLINE_ENTRIES
    }
}

/// Parse the outline out of raw pdftohtml XML.
///
/// Every entry targets `document`. Returns `Ok(None)` when the XML has no
/// `<outline>` element.
pub fn parse_outline(raw: &[u8], document: &str) -> Result<Option<Toc>> {
    let xml = sanitize(raw);
    let root = tree::parse(&xml)?;
    let Some(outline) = root.find_first("outline") else {
        return Ok(None);
    };

    let (entries, count) = fold(outline, document);
    log::debug!("outline has {} entries", count);
    Ok(Some(Toc { entries }))
}

/// Fold one outline scope into its entries and the number of entries created.
fn fold(scope: &Element, document: &str) -> (Vec<OutlineNode>, usize) {
    scope
        .children
        .iter()
        .fold((Vec::new(), 0), |(mut nodes, count), child| {
            if child.name == "outline" {
                let (nested, nested_count) = fold(child, document);
                match nodes.last_mut() {
                    Some(parent) => parent.children.extend(nested),
                    None => nodes.extend(nested),
                }
                (nodes, count + nested_count)
            } else {
                let title = child.text.trim();
                if title.is_empty() {
                    return (nodes, count);
                }
                let page = child.attr("page").unwrap_or("1");
                nodes.push(OutlineNode::new(title, document, format!("p{}", page)));
                (nodes, count + 1)
            }
        })
}

/// Outcome of an outline extraction.
#[derive(Debug, Clone)]
pub struct ExtractedOutline {
    /// The folded table of contents
    pub toc: Toc,
    /// Path of the written navigation document, if the outline was substantial
    pub ncx: Option<PathBuf>,
}

/// Parse the outline in `raw` and write `toc.ncx` into `output_dir`.
///
/// The navigation document is only written when the outline has more
/// than [`TRIVIAL_OUTLINE_ENTRIES`] entries.
pub fn extract_outline(
    raw: &[u8],
    output_dir: &Path,
    document: &str,
) -> Result<Option<ExtractedOutline>> {
    let Some(toc) = parse_outline(raw, document)? else {
        log::debug!("no outline in tool output");
        return Ok(None);
    };

    let ncx = if toc.is_substantial() {
        let path = output_dir.join(NCX_FILE);
        fs::write(&path, to_ncx(&toc, &NcxMeta::default())?)?;
        log::info!("wrote {} ({} entries)", path.display(), toc.total_items());
        Some(path)
    } else {
        log::debug!(
            "discarding trivial outline with {} entries",
            toc.total_items()
        );
        None
    };

    Ok(Some(ExtractedOutline { toc, ncx }))
}
