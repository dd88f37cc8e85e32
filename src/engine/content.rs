//! Content stream interpretation.
//!
//! Walks the text-showing operators of a decoded page content stream and
//! produces positioned text runs. The interpreter works on [`ContentOp`]
//! values so it stays independent of the concrete PDF library.

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if this operand is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create a new operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    fn number(&self, index: usize, default: f32) -> f32 {
        self.operands
            .get(index)
            .and_then(PdfValue::as_number)
            .unwrap_or(default)
    }
}

/// Font lookups needed while interpreting a page.
pub trait FontResolver {
    /// Base font name for a font resource (e.g. `F1` -> `Helvetica-Bold`).
    fn base_font(&self, resource: &[u8]) -> Option<String>;

    /// Decode a string operand shown with the given font resource.
    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String;
}

/// Text shown by one text-showing operator (or a merged line of them), in
/// user space.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRun {
    pub text: String,
    /// X of the text origin
    pub x: f32,
    /// Y of the baseline (PDF user space, origin bottom-left)
    pub y: f32,
    /// Font size after text matrix scaling
    pub font_size: f32,
    /// Base font name
    pub font_name: String,
}

/// TJ adjustments larger than this (thousandths of an em) are treated as word gaps.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Interpret text operators and collect the runs they show.
///
/// Runs whose text is blank are dropped.
pub fn collect_runs(ops: &[ContentOp], fonts: &dyn FontResolver) -> Vec<PositionedRun> {
    let mut runs = Vec::new();
    let mut state = TextState::default();
    let mut in_text_block = false;

    for op in ops {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                state.matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if let Some(PdfValue::Name(resource)) = op.operands.first() {
                    state.font_name = fonts
                        .base_font(resource)
                        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                    state.font_resource = resource.clone();
                }
                state.font_size = op.number(1, 12.0);
            }
            "TL" => {
                state.leading = op.number(0, 0.0);
            }
            "Td" => {
                state.matrix.translate(op.number(0, 0.0), op.number(1, 0.0));
            }
            "TD" => {
                let ty = op.number(1, 0.0);
                state.leading = -ty;
                state.matrix.translate(op.number(0, 0.0), ty);
            }
            "Tm" => {
                state.matrix.set(
                    op.number(0, 1.0),
                    op.number(1, 0.0),
                    op.number(2, 0.0),
                    op.number(3, 1.0),
                    op.number(4, 0.0),
                    op.number(5, 0.0),
                );
            }
            "T*" => {
                state.next_line();
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" || op.operator == "\"" {
                    state.next_line();
                }
                if !in_text_block {
                    continue;
                }
                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(PdfValue::Array(items)) => {
                            decode_tj_array(items, &state.font_resource, fonts)
                        }
                        _ => String::new(),
                    },
                    "\"" => decode_string_operand(op.operands.get(2), &state.font_resource, fonts),
                    _ => decode_string_operand(op.operands.first(), &state.font_resource, fonts),
                };
                if text.trim().is_empty() {
                    continue;
                }
                let (x, y) = state.matrix.position();
                runs.push(PositionedRun {
                    text,
                    x,
                    y,
                    font_size: state.font_size * state.matrix.vertical_scale(),
                    font_name: state.font_name.clone(),
                });
            }
            _ => {}
        }
    }

    runs
}

/// Runs whose baselines differ by less than this fraction of the font size
/// sit on the same line.
const BASELINE_TOLERANCE: f32 = 0.3;

fn same_baseline(a: &PositionedRun, b: &PositionedRun) -> bool {
    (a.y - b.y).abs() <= a.font_size.max(b.font_size) * BASELINE_TOLERANCE
}

/// Append `next` to `text`, separated by a space when the run starts
/// clearly to the right of the previous piece at `prev_x`.
///
/// Run widths are not measured, so runs shown back to back without a
/// repositioning operator share an x and are joined as-is.
fn append_run(text: &mut String, prev_x: f32, next: &PositionedRun) {
    let gap = next.x - prev_x;
    let avg_char_width = next.font_size * 0.5;
    let prev_char = text.chars().last();
    let next_char = next.text.chars().next();

    let has_space =
        prev_char.is_some_and(char::is_whitespace) || next_char.is_some_and(char::is_whitespace);
    let spaceless = prev_char.is_some_and(is_spaceless_script_char)
        && next_char.is_some_and(is_spaceless_script_char);

    if gap > avg_char_width * 0.2 && !has_space && !spaceless {
        text.push(' ');
    }
    text.push_str(&next.text);
}

/// Merge consecutive runs on one baseline that share a font name and size.
///
/// Each merged run keeps the position of its first piece.
pub fn merge_runs(runs: Vec<PositionedRun>) -> Vec<PositionedRun> {
    let mut merged: Vec<PositionedRun> = Vec::with_capacity(runs.len());
    let mut last_x = 0.0;

    for run in runs {
        if let Some(current) = merged.last_mut() {
            if current.font_name == run.font_name
                && (current.font_size - run.font_size).abs() < 0.01
                && same_baseline(current, &run)
            {
                append_run(&mut current.text, last_x, &run);
                last_x = run.x;
                continue;
            }
        }
        last_x = run.x;
        merged.push(run);
    }

    merged
}

/// Plain text of a page: one line per baseline, each ending in `\n`.
pub fn runs_to_text(runs: &[PositionedRun]) -> String {
    let mut text = String::new();
    let mut prev: Option<&PositionedRun> = None;

    for run in runs {
        match prev {
            Some(p) if same_baseline(p, run) => append_run(&mut text, p.x, run),
            Some(_) => {
                text.push('\n');
                text.push_str(&run.text);
            }
            None => text.push_str(&run.text),
        }
        prev = Some(run);
    }

    if !text.is_empty() {
        text.push('\n');
    }
    text
}

fn decode_string_operand(
    operand: Option<&PdfValue>,
    resource: &[u8],
    fonts: &dyn FontResolver,
) -> String {
    match operand {
        Some(PdfValue::Str(bytes)) => fonts.decode(resource, bytes),
        _ => String::new(),
    }
}

/// Decode a TJ array, turning large negative kerning into word spaces.
fn decode_tj_array(items: &[PdfValue], resource: &[u8], fonts: &dyn FontResolver) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            PdfValue::Str(bytes) => combined.push_str(&fonts.decode(resource, bytes)),
            PdfValue::Integer(_) | PdfValue::Real(_) => {
                let adjustment = -item.as_number().unwrap_or(0.0);
                if adjustment > TJ_SPACE_THRESHOLD
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }
    combined
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: TextMatrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn next_line(&mut self) {
        // Without a TL operator assume the leading equals the font size.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.matrix.translate(0.0, -leading);
    }
}

/// Text line matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
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
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
///
/// Tries UTF-16BE (with BOM), then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}
