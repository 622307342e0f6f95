//! Content stream interpretation.
//!
//! Walks a page's decoded operator stream tracking the text matrix, the
//! active font, and the leading, and emits positioned text spans. Glyph
//! bytes go through the font's declared encoding when lopdf can resolve
//! one, with a byte-level fallback otherwise.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::fonts;

/// TJ adjustments are in thousandths of text space units. Displacements
/// past this threshold stand in for word spaces in justified text.
const SPACE_ADJUSTMENT: f32 = 200.0;

/// One run of text from a single show-text operator.
#[derive(Debug, Clone)]
pub(crate) struct TextSpan {
    pub(crate) text: String,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) font_size: f32,
    pub(crate) is_bold: bool,
    pub(crate) is_italic: bool,
}

/// Text matrix state within a BT/ET block.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Interpret one page's content stream into positioned spans.
pub(crate) fn parse_page_spans(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<TextSpan>, lopdf::Error> {
    let page_fonts = doc.get_page_fonts(page_id)?;
    let content = Content::decode(&content_bytes(doc, page_id)?)?;

    let mut spans = Vec::new();
    let mut matrix = TextMatrix::default();
    let mut font_key: Vec<u8> = Vec::new();
    let mut font_size = 10.0f32;
    let mut is_bold = false;
    let mut is_italic = false;
    let mut in_text = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text = true;
                let leading = matrix.leading;
                matrix = TextMatrix::default();
                matrix.leading = leading;
            }
            "ET" => in_text = false,
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (op.operands.first(), op.operands.get(1))
                {
                    font_key = name.clone();
                    let base = base_font_name(&page_fonts, name);
                    is_bold = fonts::is_bold_font(&base);
                    is_italic = fonts::is_italic_font(&base);
                    font_size = number(size).unwrap_or(10.0);
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    matrix.translate(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    matrix.leading = -ty;
                    matrix.translate(tx, ty);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(number) {
                    matrix.leading = leading;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    matrix.set(
                        number(&op.operands[0]).unwrap_or(1.0),
                        number(&op.operands[1]).unwrap_or(0.0),
                        number(&op.operands[2]).unwrap_or(0.0),
                        number(&op.operands[3]).unwrap_or(1.0),
                        number(&op.operands[4]).unwrap_or(0.0),
                        number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => matrix.next_line(),
            "Tj" => {
                if in_text {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let text = decode_glyphs(doc, &page_fonts, &font_key, bytes);
                        push_span(&mut spans, &matrix, font_size, is_bold, is_italic, text);
                    }
                }
            }
            "TJ" => {
                if in_text {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let text = decode_adjusted(doc, &page_fonts, &font_key, items);
                        push_span(&mut spans, &matrix, font_size, is_bold, is_italic, text);
                    }
                }
            }
            "'" | "\"" => {
                matrix.next_line();
                if in_text {
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        let text = decode_glyphs(doc, &page_fonts, &font_key, bytes);
                        push_span(&mut spans, &matrix, font_size, is_bold, is_italic, text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn push_span(
    spans: &mut Vec<TextSpan>,
    matrix: &TextMatrix,
    font_size: f32,
    is_bold: bool,
    is_italic: bool,
    text: String,
) {
    if text.trim().is_empty() {
        return;
    }
    let (x, y) = matrix.position();
    let effective_size = font_size * matrix.scale();
    // No glyph metrics here; half the em square per character is close
    // enough for gap and column decisions.
    let width = 0.5 * effective_size * text.chars().count() as f32;
    spans.push(TextSpan {
        text,
        x,
        y,
        width,
        font_size: effective_size,
        is_bold,
        is_italic,
    });
}

/// Concatenated, decompressed content stream bytes for a page. Pages with
/// missing or malformed content yield no bytes rather than an error; the
/// caller treats fully textless documents as unreadable.
fn content_bytes(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>, lopdf::Error> {
    let page_dict = doc.get_dictionary(page_id)?;
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match contents {
        Object::Reference(r) => {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                s.decompressed_content()
            } else {
                Ok(Vec::new())
            }
        }
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(content)
        }
        _ => Ok(Vec::new()),
    }
}

fn base_font_name(page_fonts: &BTreeMap<Vec<u8>, &Dictionary>, font_key: &[u8]) -> String {
    page_fonts
        .get(font_key)
        .and_then(|dict| dict.get(b"BaseFont").ok())
        .and_then(|obj| obj.as_name().ok())
        .map(|name| String::from_utf8_lossy(name).to_string())
        .unwrap_or_else(|| String::from_utf8_lossy(font_key).to_string())
}

fn decode_glyphs(
    doc: &Document,
    page_fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font_key: &[u8],
    bytes: &[u8],
) -> String {
    let decoded = page_fonts
        .get(font_key)
        .and_then(|dict| dict.get_font_encoding(doc).ok())
        .and_then(|encoding| Document::decode_text(&encoding, bytes).ok())
        .unwrap_or_else(|| decode_bytes_simple(bytes));
    expand_ligatures(&decoded)
}

/// Decode a TJ array, turning large kerning displacements into spaces.
fn decode_adjusted(
    doc: &Document,
    page_fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font_key: &[u8],
    items: &[Object],
) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode_glyphs(doc, page_fonts, font_key, bytes));
            }
            other => {
                if let Some(n) = number(other) {
                    if -n > SPACE_ADJUSTMENT && !combined.is_empty() && !combined.ends_with(' ') {
                        combined.push(' ');
                    }
                }
            }
        }
    }
    combined
}

/// Byte-level fallback when no font encoding is available: UTF-16BE with
/// BOM, then UTF-8, then Latin-1.
fn decode_bytes_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Typographic ligatures break surname matching ("Hoﬀman" vs "Hoffman"),
/// so expand them to their component letters.
fn expand_ligatures(text: &str) -> String {
    if !text.chars().any(|c| ('\u{FB00}'..='\u{FB06}').contains(&c)) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' => out.push_str("ft"),
            '\u{FB06}' => out.push_str("st"),
            _ => out.push(c),
        }
    }
    out
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
