//! Text extraction for PDF and Word documents.

use quick_xml::events::Event;
use std::io::Read;
use thiserror::Error;

/// Largest decompressed `word/document.xml` accepted.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error parsing PDF: {0}")]
    Pdf(String),

    #[error("Error parsing Word document: {0}")]
    Word(String),
}

/// Text of a PDF with its page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub pages: usize,
}

/// Non-empty page texts joined by blank lines.
pub fn extract_pdf(bytes: &[u8]) -> Result<PdfText, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let text = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if text.is_empty() {
        return Err(ExtractError::Pdf("PDF contains no readable text.".to_string()));
    }

    Ok(PdfText {
        text,
        pages: pages.len(),
    })
}

/// Body paragraphs of a `.docx`, joined by blank lines. Table cells are
/// used only when the body has no paragraph text.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_xml(bytes)?;
    let parts = word_parts(&xml)?;

    let texts = if parts.paragraphs.is_empty() {
        parts.cells
    } else {
        parts.paragraphs
    };
    if texts.is_empty() {
        return Err(ExtractError::Word(
            "Word document contains no readable text.".to_string(),
        ));
    }
    Ok(texts.join("\n\n"))
}

fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Word(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Word(e.to_string()))?;

    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Word(e.to_string()))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Word(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    Ok(xml)
}

#[derive(Debug, Default)]
struct WordParts {
    paragraphs: Vec<String>,
    cells: Vec<String>,
}

/// Walk the document body. Paragraphs nested in tables go to their cell,
/// all others are body paragraphs.
fn word_parts(xml: &[u8]) -> Result<WordParts, ExtractError> {
    let mut parts = WordParts::default();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut paragraph = String::new();
    let mut cell = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tbl" => table_depth += 1,
                b"tc" => cell.clear(),
                b"p" => paragraph.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if matches!(e.local_name().as_ref(), b"tab" | b"br") {
                    paragraph.push(' ');
                }
            }
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| ExtractError::Word(e.to_string()))?;
                paragraph.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = paragraph.trim();
                    if !text.is_empty() {
                        if table_depth == 0 {
                            parts.paragraphs.push(text.to_string());
                        } else {
                            if !cell.is_empty() {
                                cell.push('\n');
                            }
                            cell.push_str(text);
                        }
                    }
                    paragraph.clear();
                }
                b"tc" => {
                    let text = cell.trim();
                    if !text.is_empty() {
                        parts.cells.push(text.to_string());
                    }
                    cell.clear();
                }
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Word(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn docx(body: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"{W_NS}\"><w:body>{body}</w:body></w:document>"
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
    }

    fn table(cells: &[&str]) -> String {
        let cells: String = cells
            .iter()
            .map(|c| format!("<w:tc>{}</w:tc>", para(c)))
            .collect();
        format!("<w:tbl><w:tr>{cells}</w:tr></w:tbl>")
    }

    #[test]
    fn test_docx_paragraphs() {
        let body = format!("{}<w:p/>{}", para("First &amp; foremost"), para("  Second  "));
        let text = extract_docx(&docx(&body)).unwrap();
        assert_eq!(text, "First & foremost\n\nSecond");
    }

    #[test]
    fn test_docx_runs_join_within_paragraph() {
        let body = "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space=\"preserve\"> world</w:t></w:r></w:p>";
        assert_eq!(extract_docx(&docx(body)).unwrap(), "Hello world");
    }

    #[test]
    fn test_docx_tables_ignored_when_body_has_text() {
        let body = format!("{}{}", para("Body"), table(&["Cell A", "Cell B"]));
        assert_eq!(extract_docx(&docx(&body)).unwrap(), "Body");
    }

    #[test]
    fn test_docx_falls_back_to_table_cells() {
        let body = table(&["Cell A", "Cell B"]);
        assert_eq!(extract_docx(&docx(&body)).unwrap(), "Cell A\n\nCell B");
    }

    #[test]
    fn test_docx_without_text() {
        let err = extract_docx(&docx("<w:p/>")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error parsing Word document: Word document contains no readable text."
        );
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx(b"plain bytes").unwrap_err();
        assert!(matches!(err, ExtractError::Word(_)));
    }
}
