//! Byte-level cleanup of tool XML before parsing.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Decode `raw` to a string that is safe to hand to the XML parser.
///
/// A byte-order mark selects the encoding; otherwise UTF-8 is assumed and
/// malformed sequences become U+FFFD. The declaration's `encoding`
/// pseudo-attribute is dropped since the text is no longer in that
/// encoding, and characters XML 1.0 forbids are removed.
pub fn sanitize(raw: &[u8]) -> String {
    let (encoding, bom_len) = Encoding::for_bom(raw).unwrap_or((UTF_8, 0));
    let (text, _) = encoding.decode_without_bom_handling(&raw[bom_len..]);
    let text = strip_encoding_declaration(&text);
    clean_xml_chars(&text)
}

fn strip_encoding_declaration(text: &str) -> String {
    let re = Regex::new(r#"^(\s*<\?xml[^>]*?)\s+encoding\s*=\s*["'][^"']*["']"#).unwrap();
    re.replacen(text, 1, "$1").into_owned()
}

/// Remove characters outside the XML 1.0 `Char` production.
pub fn clean_xml_chars(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
