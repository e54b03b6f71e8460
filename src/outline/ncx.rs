//! NCX (navigation control file) serialization.

use super::{OutlineNode, Toc};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const NCX_NS: &str = "http://www.daisy.org/z3986/2005/ncx/";

/// Identity written into the NCX head.
#[derive(Debug, Clone)]
pub struct NcxMeta {
    /// `dtb:uid` value
    pub uid: String,
    /// `xml:lang` of the document
    pub lang: String,
    /// Document title
    pub title: String,
}

impl Default for NcxMeta {
    fn default() -> Self {
        Self {
            uid: "pdftohtml".to_string(),
            lang: "en".to_string(),
            title: "pdftohtml".to_string(),
        }
    }
}

/// Serialize `toc` as an indented NCX document with an XML declaration.
pub fn to_ncx(toc: &Toc, meta: &NcxMeta) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("ncx").with_attributes([
        ("xmlns", NCX_NS),
        ("version", "2005-1"),
        ("xml:lang", meta.lang.as_str()),
    ])))?;

    writer.write_event(Event::Start(BytesStart::new("head")))?;
    let depth = toc.depth().to_string();
    for (name, content) in [
        ("dtb:uid", meta.uid.as_str()),
        ("dtb:depth", depth.as_str()),
        ("dtb:generator", "pdf2html"),
        ("dtb:totalPageCount", "0"),
        ("dtb:maxPageNumber", "0"),
    ] {
        writer.write_event(Event::Empty(
            BytesStart::new("meta").with_attributes([("name", name), ("content", content)]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("docTitle")))?;
    write_text_element(&mut writer, &meta.title)?;
    writer.write_event(Event::End(BytesEnd::new("docTitle")))?;

    writer.write_event(Event::Start(BytesStart::new("navMap")))?;
    write_nav_points(&mut writer, &toc.entries, 1)?;
    writer.write_event(Event::End(BytesEnd::new("navMap")))?;

    writer.write_event(Event::End(BytesEnd::new("ncx")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("text")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

/// Write `nodes` in document order, numbering them from `play_order`.
///
/// Returns the next unused play order.
fn write_nav_points(
    writer: &mut Writer<Vec<u8>>,
    nodes: &[OutlineNode],
    play_order: usize,
) -> Result<usize> {
    let mut next = play_order;
    for node in nodes {
        let id = format!("num_{}", next);
        let order = next.to_string();
        writer.write_event(Event::Start(
            BytesStart::new("navPoint")
                .with_attributes([("id", id.as_str()), ("playOrder", order.as_str())]),
        ))?;

        writer.write_event(Event::Start(BytesStart::new("navLabel")))?;
        write_text_element(writer, &node.title)?;
        writer.write_event(Event::End(BytesEnd::new("navLabel")))?;

        let src = node.target();
        writer.write_event(Event::Empty(
            BytesStart::new("content").with_attributes([("src", src.as_str())]),
        ))?;

        next = write_nav_points(writer, &node.children, next + 1)?;
        writer.write_event(Event::End(BytesEnd::new("navPoint")))?;
    }
    Ok(next)
}
