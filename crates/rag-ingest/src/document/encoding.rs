use encoding_rs::{Encoding, UTF_16BE, UTF_8};
use std::borrow::Cow;

const UTF_16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decode a PDF string operand: UTF-16BE when it carries the BOM, otherwise
/// the native encoding first and UTF-8 with replacement if that fails.
pub fn decode_pdf_string(bytes: &[u8], native: &'static Encoding) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF_16BE_BOM) {
        let (text, _) = UTF_16BE.decode_without_bom_handling(rest);
        return text.into_owned();
    }

    decode_native_first(bytes, native).into_owned()
}

pub fn decode_native_first<'a>(bytes: &'a [u8], native: &'static Encoding) -> Cow<'a, str> {
    match native.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text,
        None => String::from_utf8_lossy(bytes),
    }
}

/// Decode a text file: UTF-8 when valid, otherwise the native encoding.
/// Returns the encoding that was used.
pub fn decode_text(bytes: &[u8], native: &'static Encoding) -> (String, &'static Encoding) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), UTF_8);
    }

    let (text, used, _) = native.decode(bytes);
    (text.into_owned(), used)
}
