//! DOCX text extraction.
//!
//! A .docx file is an OOXML zip container; the visible text lives in
//! `word/document.xml` as `<w:t>` runs grouped into `<w:p>` paragraphs.

use std::io::{Cursor, Read};

use anyhow::Context;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    extract_inner(bytes).map_err(ExtractError::Failed)
}

fn extract_inner(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("not a valid OOXML container")?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("missing word/document.xml")?
        .read_to_string(&mut document_xml)
        .context("reading word/document.xml")?;

    let mut reader = Reader::from_str(&document_xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().context("malformed document.xml")? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"tab" => text.push(' '),
            Event::Empty(e) if e.local_name().as_ref() == b"br" => text.push('\n'),
            Event::Text(e) if in_text_run => {
                text.push_str(&e.unescape().context("decoding text node")?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t>Senior Engineer</w:t></w:r><w:r><w:t xml:space="preserve"> at Acme</w:t></w:r></w:p>
    <w:p><w:r><w:t>Skills:</w:t></w:r><w:tab/><w:r><w:t>Rust &amp; SQL</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn docx_fixture(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_extracts_paragraphs_and_runs() {
        let bytes = docx_fixture(DOCUMENT_XML);
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "Jane Doe\nSenior Engineer at Acme\nSkills: Rust & SQL");
    }

    #[test]
    fn test_fails_on_non_zip_bytes() {
        assert!(matches!(
            extract_text(b"not a zip archive"),
            Err(ExtractError::Failed(_))
        ));
    }

    #[test]
    fn test_fails_on_zip_without_document_xml() {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        writer
            .start_file("unrelated.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            extract_text(&cursor.into_inner()),
            Err(ExtractError::Failed(_))
        ));
    }
}
