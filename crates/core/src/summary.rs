use crate::fields::{label, DeedFields};
use crate::legend::{summary_color, Rgb, LEGEND};

pub const SUMMARY_WIDTH: u32 = 1200;
pub const SUMMARY_HEIGHT: u32 = 1000;
pub const SUMMARY_FONT_SIZE: f32 = 20.0;
pub const SUMMARY_TITLE: &str = "Extracted Deed Information";

/// Characters per wrapped value line.
pub const WRAP_WIDTH: usize = 60;

const MARGIN_X: i32 = 20;
const LEGEND_TOP: i32 = 60;
const LEGEND_LABEL_X: i32 = 50;
const SWATCH_SIZE: u32 = 20;
const VALUE_X: i32 = 250;
const ROW_HEIGHT: i32 = 30;

const BLACK: Rgb = Rgb(0, 0, 0);

/// Text placed with its top-left corner at `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: Rgb,
}

/// Filled legend square.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub x: i32,
    pub y: i32,
    pub size: u32,
    pub color: Rgb,
}

/// Everything drawn on the summary canvas, independent of any rendering
/// backend. Items past the bottom edge are kept; the renderer clips them.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub swatches: Vec<Swatch>,
    pub texts: Vec<TextItem>,
}

/// Lay out the title, the static legend and every present field.
pub fn layout_summary(fields: &DeedFields) -> SummaryLayout {
    let mut swatches = Vec::new();
    let mut texts = vec![TextItem {
        x: MARGIN_X,
        y: 20,
        text: SUMMARY_TITLE.to_string(),
        color: BLACK,
    }];

    let mut y = LEGEND_TOP;
    for (name, color) in LEGEND {
        swatches.push(Swatch {
            x: MARGIN_X,
            y,
            size: SWATCH_SIZE,
            color,
        });
        texts.push(TextItem {
            x: LEGEND_LABEL_X,
            y,
            text: label(name),
            color: BLACK,
        });
        y += ROW_HEIGHT;
    }

    y += ROW_HEIGHT;
    for entry in fields.present() {
        texts.push(TextItem {
            x: MARGIN_X,
            y,
            text: format!("{}:", label(entry.name)),
            color: summary_color(entry.name),
        });

        for line in wrap(&entry.value, WRAP_WIDTH) {
            y += ROW_HEIGHT;
            texts.push(TextItem {
                x: VALUE_X,
                y,
                text: line,
                color: BLACK,
            });
        }
        y += ROW_HEIGHT;
    }

    SummaryLayout {
        width: SUMMARY_WIDTH,
        height: SUMMARY_HEIGHT,
        font_size: SUMMARY_FONT_SIZE,
        swatches,
        texts,
    }
}

/// Greedy wrap at `width` characters.
///
/// Tabs expand to 8-column stops and other ASCII whitespace becomes a space.
/// Whitespace inside a line is kept and dropped at line breaks. Hyphenated
/// words may break after a hyphen, and words longer than `width` are split,
/// right after a hyphen when one fits.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = split_chunks(&expand_whitespace(text));
    chunks.reverse();

    let mut lines = Vec::new();

    while !chunks.is_empty() {
        let mut line: Vec<Vec<char>> = Vec::new();
        let mut len = 0;

        if !lines.is_empty() && chunks.last().is_some_and(|c| is_blank(c)) {
            chunks.pop();
        }

        while let Some(chunk) = chunks.last() {
            if len + chunk.len() > width {
                break;
            }
            len += chunk.len();
            line.extend(chunks.pop());
        }

        if let Some(chunk) = chunks.last_mut() {
            if chunk.len() > width {
                let end = long_word_break(chunk, width - len);
                line.push(chunk.drain(..end).collect());
            }
        }

        if line.last().is_some_and(|c| is_blank(c)) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat().into_iter().collect());
        }
    }

    lines
}

fn expand_whitespace(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    let mut column = 0;

    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = 8 - column % 8;
                out.resize(out.len() + spaces, ' ');
                column += spaces;
            }
            '\n' | '\r' => {
                out.push(' ');
                column = 0;
            }
            '\x0b' | '\x0c' => {
                out.push(' ');
                column += 1;
            }
            other => {
                out.push(other);
                column += 1;
            }
        }
    }

    out
}

/// Split into whitespace runs and words; a hyphenated word is split after
/// each hyphen that joins two letter runs.
fn split_chunks(chars: &[char]) -> Vec<Vec<char>> {
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        if chars[i] == ' ' {
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
        } else {
            i += 1;
            while i < chars.len() && chars[i] != ' ' {
                i += 1;
                if chars[i - 1] == '-' && breaks_after_hyphen(chars, i - 1) {
                    break;
                }
            }
        }
        chunks.push(chars[start..i].to_vec());
    }

    chunks
}

/// `well-known` breaks after the hyphen; `x-ray` and `12-34` do not.
fn breaks_after_hyphen(chars: &[char], hyphen: usize) -> bool {
    let letter = |j: usize| chars.get(j).is_some_and(|&c| c.is_alphabetic() || c == '_');
    let dash = |j: usize| chars.get(j) == Some(&'-');

    let before = (hyphen >= 2 && letter(hyphen - 2) && letter(hyphen - 1))
        || (hyphen >= 3 && letter(hyphen - 3) && dash(hyphen - 2) && letter(hyphen - 1));
    let after = letter(hyphen + 1)
        && (letter(hyphen + 2) || (dash(hyphen + 2) && letter(hyphen + 3)));

    before && after
}

/// How much of an over-long word goes on the current line.
fn long_word_break(chunk: &[char], space_left: usize) -> usize {
    let head = &chunk[..space_left.min(chunk.len())];
    match head.iter().rposition(|&c| c == '-') {
        Some(hyphen) if hyphen > 0 && chunk[..hyphen].iter().any(|&c| c != '-') => hyphen + 1,
        _ => space_left,
    }
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|&c| c == ' ')
}
