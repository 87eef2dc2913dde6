use thiserror::Error;

use super::types::{Block, Geometry, Line, Page, Word};

/// Tesseract TSV row levels.
const LEVEL_PAGE: u32 = 1;
const LEVEL_WORD: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum TsvError {
    #[error("TSV row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
    #[error("TSV output has no page row with a usable size")]
    MissingPage,
}

/// One parsed TSV row. Only the columns the page builder needs.
struct Row<'a> {
    level: u32,
    block: u32,
    paragraph: u32,
    line: u32,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    conf: f32,
    text: &'a str,
}

fn parse_row(index: usize, row: &str) -> Result<Row<'_>, TsvError> {
    let cols: Vec<&str> = row.split('\t').collect();
    // Trailing empty text columns are sometimes dropped.
    if cols.len() < 11 {
        return Err(TsvError::MalformedRow {
            line: index + 1,
            reason: format!("expected 12 columns, found {}", cols.len()),
        });
    }

    let int = |col: usize| -> Result<u32, TsvError> {
        cols[col].trim().parse::<u32>().map_err(|e| TsvError::MalformedRow {
            line: index + 1,
            reason: format!("column {} ({:?}): {}", col + 1, cols[col], e),
        })
    };

    Ok(Row {
        level: int(0)?,
        block: int(2)?,
        paragraph: int(3)?,
        line: int(4)?,
        left: int(6)? as f64,
        top: int(7)? as f64,
        width: int(8)? as f64,
        height: int(9)? as f64,
        conf: cols[10].trim().parse::<f32>().unwrap_or(-1.0),
        text: cols.get(11).map(|t| t.trim()).unwrap_or(""),
    })
}

/// Decode the TSV output of `tesseract <image> stdout tsv` for a single page.
///
/// Blocks come from `block_num`; paragraphs are folded into their block and
/// each `(par_num, line_num)` pair becomes one line. Word boxes are
/// normalized by the page size from the level-1 row. Rows with empty text or
/// negative confidence are dropped.
pub fn parse_tsv(tsv: &str) -> Result<Page, TsvError> {
    let mut page_size: Option<(f64, f64)> = None;
    let mut page = Page::default();
    let mut current_block: Option<u32> = None;
    let mut current_line: Option<(u32, u32)> = None;

    for (index, raw) in tsv.lines().enumerate() {
        if raw.trim().is_empty() || raw.starts_with("level") {
            continue;
        }

        let row = parse_row(index, raw)?;

        if row.level == LEVEL_PAGE {
            if row.width > 0.0 && row.height > 0.0 {
                page_size = Some((row.width, row.height));
            }
            continue;
        }

        if row.level != LEVEL_WORD || row.text.is_empty() || row.conf < 0.0 {
            continue;
        }

        let (page_w, page_h) = page_size.ok_or(TsvError::MissingPage)?;

        if current_block != Some(row.block) {
            page.blocks.push(Block::default());
            current_block = Some(row.block);
            current_line = None;
        }

        let block = page.blocks.last_mut().ok_or(TsvError::MissingPage)?;
        let line_key = (row.paragraph, row.line);
        if current_line != Some(line_key) {
            block.lines.push(Line::default());
            current_line = Some(line_key);
        }

        let geometry = Geometry::new(
            (row.left / page_w).clamp(0.0, 1.0),
            (row.top / page_h).clamp(0.0, 1.0),
            ((row.left + row.width) / page_w).clamp(0.0, 1.0),
            ((row.top + row.height) / page_h).clamp(0.0, 1.0),
        );

        if let Some(line) = block.lines.last_mut() {
            line.words.push(Word {
                value: row.text.to_string(),
                geometry,
                confidence: Some(row.conf),
            });
        }
    }

    if page_size.is_none() {
        return Err(TsvError::MissingPage);
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = vec![HEADER];
        out.extend_from_slice(rows);
        out.join("\n")
    }

    #[test]
    fn test_groups_words_into_blocks_and_lines() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t800\t-1\t",
            "2\t1\t1\t0\t0\t0\t100\t100\t500\t100\t-1\t",
            "5\t1\t1\t1\t1\t1\t100\t160\t200\t40\t96.5\tWARRANTY",
            "5\t1\t1\t1\t1\t2\t320\t160\t100\t40\t95\tDEED",
            "5\t1\t1\t1\t2\t1\t100\t220\t80\t40\t91\tParcel",
            "5\t1\t2\t1\t1\t1\t100\t400\t120\t40\t90\tGrantor",
        ]);

        let page = parse_tsv(&input).unwrap();
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[0].lines.len(), 2);
        assert_eq!(page.blocks[0].lines[0].words.len(), 2);
        assert_eq!(page.blocks[0].lines[0].words[1].value, "DEED");
        assert_eq!(page.blocks[1].lines[0].words[0].value, "Grantor");

        let first = &page.blocks[0].lines[0].words[0];
        assert_eq!(first.geometry, Geometry::new(0.1, 0.2, 0.3, 0.25));
        assert_eq!(first.confidence, Some(96.5));
    }

    #[test]
    fn test_paragraphs_fold_into_block() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tone",
            "5\t1\t1\t2\t1\t1\t0\t20\t10\t10\t90\ttwo",
        ]);

        let page = parse_tsv(&input).unwrap();
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_skips_empty_and_unconfident_words() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t-1\t ",
            "5\t1\t1\t1\t1\t2\t0\t0\t10\t10\t-1\tghost",
            "5\t1\t1\t1\t1\t3\t0\t0\t10\t10\t88\treal",
        ]);

        let page = parse_tsv(&input).unwrap();
        let words: Vec<_> = page.words().map(|w| w.value.as_str()).collect();
        assert_eq!(words, vec!["real"]);
    }

    #[test]
    fn test_blank_page_has_no_blocks() {
        let input = tsv(&["1\t1\t0\t0\t0\t0\t0\t0\t2480\t3508\t-1\t"]);
        let page = parse_tsv(&input).unwrap();
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_missing_page_row() {
        let input = tsv(&["5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tword"]);
        assert_eq!(parse_tsv(&input), Err(TsvError::MissingPage));
        assert_eq!(parse_tsv(""), Err(TsvError::MissingPage));
    }

    #[test]
    fn test_malformed_row() {
        let input = tsv(&["1\t1\t0\t0"]);
        assert!(matches!(
            parse_tsv(&input),
            Err(TsvError::MalformedRow { line: 2, .. })
        ));

        let input = tsv(&["x\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t"]);
        assert!(matches!(
            parse_tsv(&input),
            Err(TsvError::MalformedRow { .. })
        ));
    }
}
