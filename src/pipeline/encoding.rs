//! Byte encodings for form text.
//!
//! Field values (`/V`) are PDF text strings: PDFDocEncoding, or UTF-16BE
//! behind a `FE FF` byte-order mark. Appearance streams draw with a
//! WinAnsi-encoded standard font, so their string operands use WinAnsi.

use lopdf::{Object, StringFormat};

/// PDFDocEncoding code points 0x18..=0x1F.
const PDFDOC_18: [char; 8] = ['˘', 'ˇ', 'ˆ', '˙', '˝', '˛', '˚', '˜'];

/// PDFDocEncoding code points 0x80..=0xA0. 0x9F is undefined.
const PDFDOC_80: [char; 33] = [
    '•', '†', '‡', '…', '—', '–', 'ƒ', '⁄', '‹', '›', '−', '‰', '„', '“', '”', '‘', '’', '‚', '™',
    'ﬁ', 'ﬂ', 'Ł', 'Œ', 'Š', 'Ÿ', 'Ž', 'ı', 'ł', 'œ', 'š', 'ž', '\u{FFFD}', '€',
];

/// WinAnsiEncoding code points 0x80..=0x9F. Unassigned slots are `None`.
const WIN_ANSI_80: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// ASCII goes in as a literal string; anything else as UTF-16BE with a BOM.
pub fn encode_text(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| pdf_doc_char(b)).collect()
    }
}

fn pdf_doc_char(b: u8) -> char {
    match b {
        0x18..=0x1F => PDFDOC_18[usize::from(b - 0x18)],
        0x80..=0xA0 => PDFDOC_80[usize::from(b - 0x80)],
        0xAD => '\u{FFFD}',
        _ => char::from(b),
    }
}

/// Encode `text` for a WinAnsi font. Characters the encoding lacks become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => WIN_ANSI_80
                .iter()
                .position(|&w| w == Some(c))
                .map(|i| 0x80 + i as u8)
                .unwrap_or(b'?'),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_a_literal() {
        match encode_text("5 lb") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(decode_text(&bytes), "5 lb"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn non_ascii_is_utf16_with_bom() {
        match encode_text("jamón") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(decode_text(&bytes), "jamón");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn pdf_doc_encoding_upper_range() {
        // bullet, em dash, left/right double quotes, trademark
        assert_eq!(decode_text(&[0x80, 0x84, 0x8D, 0x8E, 0x92]), "•—“”™");
        assert_eq!(decode_text(&[0x90]), "’");
        assert_eq!(decode_text(&[0xA0]), "€");
    }

    #[test]
    fn pdf_doc_encoding_latin1_range_is_unchanged() {
        assert_eq!(decode_text(&[0x43, 0xF4, 0x74, 0xE9]), "Côté");
    }

    #[test]
    fn win_ansi_maps_typographic_punctuation() {
        assert_eq!(win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(win_ansi("’€"), vec![0x92, 0x80]);
        assert_eq!(win_ansi("jamón"), b"jam\xF3n".to_vec());
    }

    #[test]
    fn win_ansi_replaces_unmapped() {
        assert_eq!(win_ansi("½ 猪"), vec![0xBD, b' ', b'?']);
    }
}
