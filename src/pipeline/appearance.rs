//! Normal-appearance (`/AP /N`) content for filled text fields.
//!
//! The stream replays the field's default appearance string (`/DA`, e.g.
//! `/Helv 0 Tf 0 g`) inside a `/Tx` marked-content block and draws the value
//! with it. A font size of 0 means auto: the largest size up to 12pt that
//! fits the widget. Glyph widths are estimated from Helvetica metrics.

use crate::pipeline::encoding::win_ansi;
use lopdf::content::{Content, Operation};
use lopdf::Object;

const PADDING: f32 = 2.0;
const MAX_AUTO_SIZE: f32 = 12.0;
const MIN_AUTO_SIZE: f32 = 4.0;
const LEADING: f32 = 1.15;

/// Used when neither the field nor the form carries a `/DA`.
pub const FALLBACK_DA: &[u8] = b"/Helv 0 Tf 0 g";

/// Geometry and flags of one widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetBox {
    pub width: f32,
    pub height: f32,
    /// `/Q`: 0 left, 1 centred, 2 right.
    pub quadding: i64,
    pub multiline: bool,
}

/// An encoded appearance stream body and the font resource name it uses.
#[derive(Debug)]
pub struct TextAppearance {
    pub content: Vec<u8>,
    pub font: Vec<u8>,
}

/// Build the content stream drawing `value` in `widget` styled by `da`.
pub fn text_appearance(
    value: &str,
    da: &[u8],
    widget: WidgetBox,
) -> Result<TextAppearance, lopdf::Error> {
    let mut style = Content::decode(da)
        .map(|c| c.operations)
        .unwrap_or_default();
    let tf = match style.iter().position(|op| op.operator == "Tf") {
        Some(i) => i,
        None => {
            let mut fallback = Content::decode(FALLBACK_DA)?.operations;
            fallback.append(&mut style);
            style = fallback;
            0
        }
    };

    let font = style[tf]
        .operands
        .first()
        .and_then(|o| o.as_name().ok())
        .unwrap_or(&b"Helv"[..])
        .to_vec();
    let declared = style[tf]
        .operands
        .get(1)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0);

    let inner_width = (widget.width - 2.0 * PADDING).max(0.0);
    let inner_height = (widget.height - 2.0 * PADDING).max(0.0);

    let (size, lines) = if widget.multiline {
        let size = if declared > 0.0 {
            declared
        } else {
            auto_multiline_size(value, inner_width, inner_height)
        };
        (size, wrap(value, size, inner_width))
    } else {
        let line = value.replace(['\r', '\n'], " ");
        let size = if declared > 0.0 {
            declared
        } else {
            auto_single_size(&line, inner_width, inner_height)
        };
        (size, vec![line])
    };
    style[tf].operands = vec![Object::Name(font.clone()), size.into()];

    let mut ops = vec![
        Operation::new("BMC", vec![Object::Name(b"Tx".to_vec())]),
        Operation::new("q", vec![]),
        Operation::new(
            "re",
            vec![
                1.0f32.into(),
                1.0f32.into(),
                (widget.width - 2.0).max(0.0).into(),
                (widget.height - 2.0).max(0.0).into(),
            ],
        ),
        Operation::new("W", vec![]),
        Operation::new("n", vec![]),
        Operation::new("BT", vec![]),
    ];
    ops.extend(style);

    let first_baseline = if widget.multiline {
        widget.height - PADDING - size * 0.8
    } else {
        (widget.height - size * 0.7) / 2.0
    };
    for (i, line) in lines.iter().enumerate() {
        let x = match widget.quadding {
            1 => (widget.width - text_width(line, size)) / 2.0,
            2 => widget.width - PADDING - text_width(line, size),
            _ => PADDING,
        };
        let y = first_baseline - i as f32 * size * LEADING;
        ops.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                x.into(),
                y.into(),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(line), lopdf::StringFormat::Literal)],
        ));
    }

    ops.extend([
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("EMC", vec![]),
    ]);

    Ok(TextAppearance {
        content: Content { operations: ops }.encode()?,
        font,
    })
}

fn auto_single_size(line: &str, width: f32, height: f32) -> f32 {
    let by_height = height / LEADING;
    let unit = text_width(line, 1.0);
    let by_width = if unit > 0.0 { width / unit } else { MAX_AUTO_SIZE };
    by_height.min(by_width).clamp(MIN_AUTO_SIZE, MAX_AUTO_SIZE)
}

fn auto_multiline_size(value: &str, width: f32, height: f32) -> f32 {
    let mut size = MAX_AUTO_SIZE;
    while size > MIN_AUTO_SIZE {
        let lines = wrap(value, size, width).len() as f32;
        if lines * size * LEADING <= height {
            break;
        }
        size -= 0.5;
    }
    size.max(MIN_AUTO_SIZE)
}

/// Greedy word wrap. A word wider than the box gets a line of its own.
fn wrap(value: &str, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in value.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && text_width(&candidate, size) > width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Approximate Helvetica advance width in points.
fn text_width(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            ' ' | 'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.278,
            'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 0.333,
            'm' | 'M' | 'W' => 0.833,
            'w' | '%' => 0.75,
            c if c.is_uppercase() => 0.667,
            _ => 0.556,
        })
        .sum();
    em * size
}
