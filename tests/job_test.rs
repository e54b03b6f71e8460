//! Integration tests for conversion jobs, using shell scripts in place of pdftohtml.

#![cfg(unix)]

use pdf2html::convert::SOURCE_COPY_NAME;
use pdf2html::{ConversionJob, ConvertOptions, Error, OutlineMode};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>book</title>
<style type="text/css">
p { margin: 0 }
</style>
</head>
<body>
<a name=1></a>Caf&eacute;&nbsp;one<br/>
<a href="index.html#1">back to top</a>
</body>
</html>
"#;

const OUTLINE_3: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
<pdf2xml producer="poppler" version="22.02.0">
<outline>
<item page="1">Ch1</item>
<item page="2">Ch2</item>
<item page="3">Ch3</item>
</outline>
</pdf2xml>"#;

const OUTLINE_2: &str = r#"<pdf2xml><outline>
<item page="1">Ch1</item>
<item page="2">Ch2</item>
</outline></pdf2xml>"#;

/// A scratch area with a source PDF and a stub tool.
struct Fixture {
    dir: TempDir,
    tool: PathBuf,
}

impl Fixture {
    /// `primary` runs for the conversion pass with the output name in `$8`;
    /// `outline` runs for the `-stdout` pass.
    fn new(primary: &str, outline: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.pdf"), b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n").unwrap();

        let script = format!(
            "#!/bin/sh\n\
             test -f src.pdf || exit 9\n\
             case \" $* \" in\n\
             *\" -stdout \"*)\n{}\nexit 0 ;;\n\
             esac\n\
             echo \"$*\" > args.txt\n\
             {}\n",
            outline, primary
        );
        let tool = dir.path().join("pdftohtml-stub");
        fs::write(&tool, script).unwrap();
        let mut perms = fs::metadata(&tool).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&tool, perms).unwrap();

        Self { dir, tool }
    }

    fn source(&self) -> PathBuf {
        self.dir.path().join("book.pdf")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn options(&self) -> ConvertOptions {
        ConvertOptions::new().with_tool(&self.tool)
    }

    fn job(&self, options: ConvertOptions) -> ConversionJob {
        ConversionJob::new(self.out(), self.source(), options)
    }
}

fn write_html() -> String {
    format!("cat > \"$8\" <<'EOF'\n{}EOF", PAGE_HTML)
}

fn print_outline(xml: &str) -> String {
    format!("cat <<'EOF'\n{}\nEOF", xml)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_html_conversion_success() {
    let fx = Fixture::new(&write_html(), &print_outline(OUTLINE_3));
    let result = fx.job(fx.options()).run().unwrap();

    let out = fx.out();
    assert_eq!(result.document, out.join("index.html"));
    assert!(fs::metadata(&result.document).unwrap().len() > 100);
    assert!(!out.join(SOURCE_COPY_NAME).exists());

    let html = read(&result.document);
    assert!(html.contains("<!-- created by pdf2html -->\n  <head>"));
    assert!(html.contains(r#"<a id="p1"></a>Café one<br>"#));
    assert!(html.contains(r##"<a href="#p1">back to top</a>"##));
    assert!(!html.contains("<style"));

    assert_eq!(
        read(&out.join("args.txt")).trim(),
        "-enc UTF-8 -noframes -p -nomerge -nodrm src.pdf index.html -i"
    );
}

#[test]
fn test_outline_with_three_entries_writes_ncx() {
    let fx = Fixture::new(&write_html(), &print_outline(OUTLINE_3));
    let result = fx.job(fx.options()).run().unwrap();

    assert_eq!(result.outline_entries, 3);
    let toc = result.toc.expect("toc.ncx should be written");
    assert_eq!(toc, fx.out().join("toc.ncx"));

    let ncx = read(&toc);
    assert_eq!(ncx.matches("<navPoint ").count(), 3);
    for (page, title) in [(1, "Ch1"), (2, "Ch2"), (3, "Ch3")] {
        assert!(ncx.contains(&format!("<text>{}</text>", title)));
        assert!(ncx.contains(&format!(r#"<content src="index.html#p{}"/>"#, page)));
    }
}

#[test]
fn test_outline_with_two_entries_is_discarded() {
    let fx = Fixture::new(&write_html(), &print_outline(OUTLINE_2));
    let result = fx.job(fx.options()).run().unwrap();

    assert_eq!(result.outline_entries, 2);
    assert!(result.toc.is_none());
    assert!(!fx.out().join("toc.ncx").exists());
}

#[test]
fn test_empty_outline_output_is_skipped() {
    let fx = Fixture::new(&write_html(), "true");
    let result = fx.job(fx.options()).run().unwrap();
    assert!(result.toc.is_none());
    assert_eq!(result.outline_entries, 0);
}

#[test]
fn test_undersized_output_is_protected() {
    let fx = Fixture::new("printf '0123456789' > \"$8\"", &print_outline(OUTLINE_3));
    let err = fx.job(fx.options()).run().unwrap_err();

    match &err {
        Error::ProtectedOrEmptyDocument { path, size } => {
            assert_eq!(path, &fx.out().join("index.html"));
            assert_eq!(*size, 10);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_protected());

    // no repair, no outline
    assert_eq!(read(&fx.out().join("index.html")), "0123456789");
    assert!(!fx.out().join("toc.ncx").exists());
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
}

#[test]
fn test_missing_output_is_protected() {
    let fx = Fixture::new("true", &print_outline(OUTLINE_3));
    let err = fx.job(fx.options()).run().unwrap_err();
    assert!(matches!(
        err,
        Error::ProtectedOrEmptyDocument { size: 0, .. }
    ));
}

#[test]
fn test_missing_tool_is_tool_not_found() {
    let fx = Fixture::new("true", "true");
    let options = ConvertOptions::new().with_tool(fx.dir.path().join("no-such-tool"));
    let err = fx.job(options).run().unwrap_err();

    assert!(matches!(err, Error::ToolNotFound { .. }));
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
}

#[test]
fn test_non_executable_tool_is_launch_error() {
    let fx = Fixture::new("true", "true");
    fs::set_permissions(&fx.tool, fs::Permissions::from_mode(0o644)).unwrap();
    let err = fx.job(fx.options()).run().unwrap_err();

    assert!(matches!(err, Error::Launch(_)), "unexpected error: {err}");
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
}

#[test]
fn test_nonzero_exit_is_conversion_failed() {
    let fx = Fixture::new("echo 'Syntax Error: broken xref' >&2\nexit 3", "true");
    let err = fx.job(fx.options()).run().unwrap_err();

    match err {
        Error::ConversionFailed { code, log } => {
            assert_eq!(code, 3);
            assert!(log.contains("Syntax Error: broken xref"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
}

#[test]
fn test_diagnostics_are_returned_on_success() {
    let primary = format!("echo 'Syntax Warning: odd font' >&2\n{}", write_html());
    let fx = Fixture::new(&primary, "true");
    let result = fx.job(fx.options()).run().unwrap();
    assert_eq!(result.tool_log, "Syntax Warning: odd font");
}

#[test]
fn test_xml_output_is_not_repaired() {
    // the outline pass fails, proving it is not run for XML jobs
    let primary = format!("cat > \"$8\" <<'EOF'\n{}\nEOF", OUTLINE_3);
    let fx = Fixture::new(&primary, "exit 1");
    let result = fx.job(fx.options().xml()).run().unwrap();

    assert_eq!(result.document, fx.out().join("index.xml"));
    assert_eq!(read(&result.document).trim(), OUTLINE_3);
    assert!(result.toc.is_none());
    assert!(read(&fx.out().join("args.txt")).trim().ends_with("index.xml -i -xml"));
}

#[test]
fn test_images_included_when_requested() {
    let fx = Fixture::new(&write_html(), "true");
    fx.job(fx.options().with_images(true)).run().unwrap();

    let args = read(&fx.out().join("args.txt"));
    assert!(!args.split_whitespace().any(|a| a == "-i"));
}

#[test]
fn test_outline_failure_strict() {
    let fx = Fixture::new(&write_html(), "echo 'I/O Error' >&2\nexit 1");
    let err = fx.job(fx.options()).run().unwrap_err();

    assert!(matches!(err, Error::OutlineExtraction(_)));
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
}

#[test]
fn test_outline_failure_lenient() {
    let fx = Fixture::new(&write_html(), "exit 1");
    let options = fx.options().with_outline_mode(OutlineMode::Lenient);
    let result = fx.job(options).run().unwrap();

    assert!(result.toc.is_none());
    assert!(read(&result.document).contains(r#"<a id="p1">"#));
}

#[test]
fn test_malformed_outline_lenient() {
    let fx = Fixture::new(&write_html(), &print_outline("<pdf2xml><outline><item>"));
    let options = fx.options().with_outline_mode(OutlineMode::Lenient);
    assert!(fx.job(options).run().unwrap().toc.is_none());

    let fx = Fixture::new(&write_html(), &print_outline("<pdf2xml><outline><item>"));
    assert!(matches!(
        fx.job(fx.options()).run(),
        Err(Error::OutlineExtraction(_))
    ));
}

#[test]
fn test_outline_disabled() {
    let fx = Fixture::new(&write_html(), "exit 1");
    let options = fx.options().with_outline_mode(OutlineMode::Disabled);
    assert!(fx.job(options).run().unwrap().toc.is_none());
}

#[test]
fn test_flip_tagged_image_aborts() {
    let primary = format!(
        "printf 'png' > page1.png\ncat > \"$8\" <<'EOF'\n{}<img class=\"xflip\" src=\"page1.png\"/>\nEOF",
        PAGE_HTML
    );
    let fx = Fixture::new(&primary, "true");
    let err = fx.job(fx.options().with_images(true)).run().unwrap_err();

    assert!(matches!(err, Error::FlipDisabled { .. }));
    // the document is left as the tool wrote it
    assert!(read(&fx.out().join("index.html")).contains("<style"));
}

#[test]
fn test_read_outline_only() {
    let fx = Fixture::new("exit 1", &print_outline(OUTLINE_2));
    let toc = fx.job(fx.options()).read_outline().unwrap().unwrap();

    assert_eq!(toc.total_items(), 2);
    assert_eq!(toc.entries[1].target(), "index.html#p2");
    // the primary pass never ran and nothing was left behind
    assert!(!fx.out().join("args.txt").exists());
    assert!(!fx.out().join(SOURCE_COPY_NAME).exists());
    assert!(!fx.out().join("toc.ncx").exists());
}
