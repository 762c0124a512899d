// src/extract/docx.rs
//! DOCX text extraction.
//!
//! A .docx file is a zip archive; the paragraph text lives in
//! `word/document.xml`. The XML is streamed and only the character data
//! inside `<w:t>` run elements is kept, with one line per `<w:p>` paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

pub fn text_from_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Read(format!("not a valid DOCX archive: {}", e)))?;

    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Read(format!("DOCX has no document body: {}", e)))?
        .read_to_string(&mut document)
        .map_err(|e| ExtractError::Read(format!("failed to read DOCX body: {}", e)))?;

    let mut reader = Reader::from_str(&document);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_run_text = false,
            Ok(Event::Text(t)) if in_run_text => {
                let chunk = t
                    .unescape()
                    .map_err(|e| ExtractError::Read(format!("malformed DOCX XML: {}", e)))?;
                text.push_str(&chunk);
            }
            // paragraph and explicit line breaks both become newlines
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => text.push('\n'),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => text.push('\t'),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Read(format!("malformed DOCX XML: {}", e)));
            }
            Ok(_) => {}
        }
    }

    // paragraphs are joined by newlines, not terminated by them
    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}
