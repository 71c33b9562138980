use super::encoding::decode_pdf_string;
use crate::utils::error::WorkerError;
use encoding_rs::Encoding;
use lopdf::content::{Content, Operation};
use lopdf::{Document as PdfDocument, Object, ObjectId};
use std::path::Path;
use tracing::{debug, warn};

/// TJ kerning below this (in thousandths of an em) reads as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Text per page as `(1-based page number, text)`, in page order.
///
/// Pages where lopdf's extractor fails are re-read from their raw
/// text-showing operators with `native` decoding.
pub fn extract_pages(
    path: &Path,
    native: &'static Encoding,
) -> Result<Vec<(u32, String)>, WorkerError> {
    let doc = PdfDocument::load(path)?;
    let pages = doc.get_pages();
    debug!("PDF {:?} has {} pages", path, pages.len());

    let mut extracted = Vec::with_capacity(pages.len());

    for (page_num, page_id) in pages {
        let text = match doc.extract_text(&[page_num]) {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    "Text extraction failed on page {} ({}), decoding raw operands",
                    page_num, e
                );
                match extract_raw_text(&doc, page_id, native) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Skipping unreadable page {}: {}", page_num, e);
                        continue;
                    }
                }
            }
        };

        extracted.push((page_num, text));
    }

    Ok(extracted)
}

fn extract_raw_text(
    doc: &PdfDocument,
    page_id: ObjectId,
    native: &'static Encoding,
) -> Result<String, WorkerError> {
    let bytes = doc.get_page_content(page_id)?;
    let content = Content::decode(&bytes)?;

    Ok(operations_text(&content.operations, native))
}

/// Concatenate the strings shown by `Tj`, `TJ`, `'` and `"`, breaking lines
/// on text-positioning operators.
pub fn operations_text(operations: &[Operation], native: &'static Encoding) -> String {
    let mut text = String::new();

    for operation in operations {
        match operation.operator.as_str() {
            "Tj" => {
                for operand in &operation.operands {
                    push_string(&mut text, operand, native);
                }
            }
            "'" | "\"" => {
                new_line(&mut text);
                if let Some(operand) = operation.operands.last() {
                    push_string(&mut text, operand, native);
                }
            }
            "TJ" => {
                let items = operation
                    .operands
                    .iter()
                    .filter_map(|operand| operand.as_array().ok())
                    .flatten();

                for item in items {
                    match item {
                        Object::String(..) => push_string(&mut text, item, native),
                        other => {
                            if let Ok(offset) = other.as_float() {
                                if offset < TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            "T*" | "Td" | "TD" | "ET" => new_line(&mut text),
            _ => {}
        }
    }

    text.trim_end().to_string()
}

fn push_string(text: &mut String, operand: &Object, native: &'static Encoding) {
    if let Object::String(bytes, _) = operand {
        text.push_str(&decode_pdf_string(bytes, native));
    }
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}
