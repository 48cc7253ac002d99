//! DOCX text extraction: paragraphs of `word/document.xml`.
//!
//! A DOCX file is a ZIP archive; the body lives in `word/document.xml` as a
//! sequence of `<w:p>` paragraphs made of `<w:r>` runs. Only body paragraphs
//! are collected: paragraphs nested inside `<w:tbl>` tables are skipped, the
//! same set a reader iterating the document's top-level paragraphs sees.
//!
//! Within a paragraph, `<w:t>` contributes its text, `<w:tab/>` a tab and
//! `<w:br/>` / `<w:cr/>` a newline. Paragraphs whose trimmed text is empty
//! are dropped; the rest are joined with `\n`.

use crate::error::ExtractionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract body paragraphs from DOCX bytes.
pub async fn extract_docx(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_docx_blocking(&bytes))
        .await
        .map_err(|e| ExtractionError::malformed(format!("DOCX task panicked: {e}")))?
}

fn extract_docx_blocking(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::malformed(format!("not a DOCX archive: {e}")))?;

    let xml = {
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractionError::malformed(format!("missing {DOCUMENT_PART}: {e}")))?;
        let mut content = String::new();
        part.read_to_string(&mut content)
            .map_err(|e| ExtractionError::malformed(format!("reading {DOCUMENT_PART}: {e}")))?;
        content
    };

    let paragraphs = body_paragraphs(&xml)?;
    debug!("DOCX body: {} paragraphs", paragraphs.len());

    Ok(paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Walk `document.xml` and return the text of every body paragraph, in order.
///
/// Text is only taken from runs whose innermost paragraph is the body
/// paragraph itself. Paragraphs nested in text boxes, `mc:Fallback` copies
/// of alternate content and the tab stops declared in `w:pPr` contribute
/// nothing.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut buf = Vec::new();
    let mut table_depth = 0usize;
    let mut para_depth = 0usize;
    let mut fallback_depth = 0usize;
    let mut in_ppr = false;
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        let collecting = para_depth == 1 && fallback_depth == 0 && !in_ppr;

        match event {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"mc:Fallback" => fallback_depth += 1,
                _ if fallback_depth > 0 => {}
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    para_depth += 1;
                    if para_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:pPr" if para_depth == 1 => in_ppr = true,
                b"w:t" => in_text = collecting,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                _ if fallback_depth > 0 => {}
                b"w:p" if para_depth == 0 && table_depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if collecting => push_to(&mut current, "\t"),
                b"w:br" | b"w:cr" if collecting => push_to(&mut current, "\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractionError::malformed(format!("bad text run: {err}")))?;
                push_to(&mut current, &text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"mc:Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                _ if fallback_depth > 0 => {}
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if para_depth == 1 {
                        if let Some(p) = current.take() {
                            paragraphs.push(p);
                        }
                    }
                    para_depth = para_depth.saturating_sub(1);
                }
                b"w:pPr" if para_depth == 1 => in_ppr = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::malformed(format!(
                    "error parsing {DOCUMENT_PART} at {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_to(current: &mut Option<String>, s: &str) {
    if let Some(p) = current.as_mut() {
        p.push_str(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn paragraphs_in_document_order() {
        let xml = wrap(
            "<w:p><w:r><w:t>Primeiro</w:t></w:r></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">Segundo </w:t></w:r><w:r><w:t>par&amp;grafo</w:t></w:r></w:p>",
        );
        let paras = body_paragraphs(&xml).unwrap();
        assert_eq!(paras, vec!["Primeiro", "Segundo par&grafo"]);
    }

    #[test]
    fn tabs_and_breaks_become_whitespace() {
        let xml = wrap("<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>");
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["a\tb\nc"]);
    }

    #[test]
    fn table_paragraphs_are_skipped() {
        let xml = wrap(
            "<w:p><w:r><w:t>antes</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>celula</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>depois</w:t></w:r></w:p>",
        );
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["antes", "depois"]);
    }

    #[test]
    fn empty_paragraphs_are_kept_by_the_walker() {
        let xml = wrap("<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p><w:p></w:p>");
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["", "x", ""]);
    }

    #[test]
    fn tab_stop_definitions_are_not_text() {
        let xml = wrap(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/><w:tab/></w:tabs></w:pPr>\
             <w:r><w:t>Texto</w:t></w:r></w:p>",
        );
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["Texto"]);
    }

    #[test]
    fn text_box_content_is_not_glued_to_the_paragraph() {
        let text_box = "<w:txbxContent><w:p><w:r><w:t>caixa de texto</w:t></w:r></w:p></w:txbxContent>";
        let xml = wrap(&format!(
            "<w:p><w:r><w:t>Antes</w:t></w:r><w:r><mc:AlternateContent>\
             <mc:Choice Requires=\"wps\"><w:drawing><wps:txbx>{text_box}</wps:txbx></w:drawing></mc:Choice>\
             <mc:Fallback><w:pict><v:textbox>{text_box}</v:textbox></w:pict></mc:Fallback>\
             </mc:AlternateContent></w:r></w:p>\
             <w:p><w:r><w:t>Depois</w:t></w:r></w:p>"
        ));
        let paras = body_paragraphs(&xml).unwrap();
        assert_eq!(paras, vec!["Antes", "Depois"]);
    }

    #[test]
    fn hyperlink_runs_belong_to_the_paragraph() {
        let xml = wrap(
            "<w:p><w:r><w:t xml:space=\"preserve\">Veja </w:t></w:r>\
             <w:hyperlink r:id=\"rId5\"><w:r><w:t>o site</w:t></w:r></w:hyperlink></w:p>",
        );
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["Veja o site"]);
    }

    #[test]
    fn non_zip_bytes_are_malformed() {
        let err = extract_docx_blocking(b"PK but not really").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed { .. }));
    }
}
