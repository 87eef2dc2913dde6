use super::types::OcrDocument;

/// Flatten an OCR document into plain text.
///
/// Emits one line per OCR line, words joined by a single space, lines joined
/// by `\n` in page/block/line order. Geometry is discarded; every word
/// contributes exactly once.
pub fn flatten_text(document: &OcrDocument) -> String {
    let mut lines = Vec::with_capacity(document.line_count());

    for page in &document.pages {
        for block in &page.blocks {
            for line in &block.lines {
                let text = line
                    .words
                    .iter()
                    .map(|word| word.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                lines.push(text);
            }
        }
    }

    lines.join("\n")
}
