//! Word export: a minimal OOXML (WordprocessingML) package.
//!
//! Deliberately lossy and linear: every input line, blank lines and raw
//! `##` markers included, becomes exactly one unstyled paragraph, in order.
//! Readers who want structure use the PDF export; this one exists so the
//! text can be edited in a word processor.
//!
//! A `.docx` file is a ZIP archive with three required parts:
//! `[Content_Types].xml`, `_rels/.rels`, and `word/document.xml`. Writing
//! them directly keeps the output deterministic and the dependency surface
//! to the `zip` crate alone.

use crate::error::AnalyzerError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Render the report Markdown as DOCX bytes, one paragraph per input line.
pub fn render_docx(markdown: &str) -> Result<Vec<u8>, AnalyzerError> {
    let cursor = Cursor::new(Vec::new());
    let mut archive = ZipWriter::new(cursor);
    // Stored entries: a report is a few KB and every OOXML reader accepts them.
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    write_entry(&mut archive, "[Content_Types].xml", CONTENT_TYPES.as_bytes(), options)?;
    write_entry(&mut archive, "_rels/.rels", RELS.as_bytes(), options)?;
    write_entry(
        &mut archive,
        "word/document.xml",
        document_xml(markdown).as_bytes(),
        options,
    )?;

    let cursor = archive
        .finish()
        .map_err(|e| export_error("finalising archive", &e.to_string()))?;
    Ok(cursor.into_inner())
}

fn write_entry(
    archive: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), AnalyzerError> {
    archive
        .start_file(name, options)
        .map_err(|e| export_error(name, &e.to_string()))?;
    archive
        .write_all(bytes)
        .map_err(|e| export_error(name, &e.to_string()))?;
    Ok(())
}

fn export_error(context: &str, detail: &str) -> AnalyzerError {
    AnalyzerError::ExportFailed {
        detail: format!("DOCX {context}: {detail}"),
    }
}

fn document_xml(markdown: &str) -> String {
    let mut xml = String::with_capacity(markdown.len() * 2 + 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for line in markdown.lines() {
        if line.is_empty() {
            xml.push_str("<w:p/>");
        } else {
            xml.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
            xml.push_str(&escape_xml(line));
            xml.push_str("</w:t></w:r></w:p>");
        }
    }
    xml.push_str("<w:sectPr/></w:body></w:document>");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
