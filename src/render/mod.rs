//! Markdown-to-document rendering: one assembled report in, three export
//! artifacts out.
//!
//! The input dialect is deliberately restricted (`## ` headings,
//! pipe-delimited table rows, blank-line-separated paragraphs) because the
//! assembler and the KPI prompt guarantee nothing richer. The three outputs
//! trade fidelity differently:
//!
//! * **Markdown**: identity, the input string re-encoded as bytes.
//! * **DOCX** ([`docx`]): lossy linear transcription, every input line
//!   becomes one unstyled paragraph.
//! * **PDF** ([`pdf`]): structured flowable layout with a title block,
//!   styled headings, bordered grid tables, and implicit pagination.
//!
//! The renderer never mutates its input, and an export failure leaves the
//! assembled report text untouched so the caller can retry.

pub mod docx;
pub mod pdf;

use crate::error::AnalyzerError;
use serde::Serialize;

/// The three byte buffers derived from one report snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedExports {
    pub markdown: Vec<u8>,
    pub docx: Vec<u8>,
    pub pdf: Vec<u8>,
}

/// Render all three export formats from one assembled Markdown document.
pub fn render_exports(markdown: &str, title: &str) -> Result<RenderedExports, AnalyzerError> {
    Ok(RenderedExports {
        markdown: markdown.as_bytes().to_vec(),
        docx: docx::render_docx(markdown)?,
        pdf: pdf::render_pdf(markdown, title)?,
    })
}

// ── Block parsing ────────────────────────────────────────────────────────────

/// One structural unit of the restricted Markdown dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// An `## `-prefixed heading (marker stripped).
    Heading(String),
    /// A non-blank line that is neither heading nor table row.
    Paragraph(String),
    /// A maximal run of consecutive pipe-delimited rows, as a ragged grid.
    /// The first row is the header row. Separator rows (`| --- | --- |`)
    /// are consumed but carry no cells.
    Table(Vec<Vec<String>>),
    /// A blank line (paragraph/section separator).
    Blank,
}

/// Parse the assembled Markdown into an ordered list of blocks.
///
/// A table run is closed as soon as a line without the delimiter is
/// encountered; a run still open at end of input is flushed as a final
/// table.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut in_table = false;

    for raw_line in markdown.lines() {
        let line = raw_line.trim();

        if let Some(heading) = line.strip_prefix("## ") {
            flush_table(&mut blocks, &mut table_rows, &mut in_table);
            blocks.push(Block::Heading(heading.trim().to_string()));
            continue;
        }

        if line.contains('|') {
            in_table = true;
            if !is_separator_row(line) {
                table_rows.push(split_table_row(line));
            }
            continue;
        }

        // Any line without the delimiter closes an open table run.
        flush_table(&mut blocks, &mut table_rows, &mut in_table);

        if line.is_empty() {
            blocks.push(Block::Blank);
        } else {
            blocks.push(Block::Paragraph(line.to_string()));
        }
    }

    flush_table(&mut blocks, &mut table_rows, &mut in_table);
    blocks
}

fn flush_table(blocks: &mut Vec<Block>, rows: &mut Vec<Vec<String>>, in_table: &mut bool) {
    if *in_table && !rows.is_empty() {
        blocks.push(Block::Table(std::mem::take(rows)));
    }
    rows.clear();
    *in_table = false;
}

/// Split a pipe-delimited row into trimmed cells, discarding the empty
/// leading/trailing cells that a `|`-wrapped row produces.
fn split_table_row(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

/// A GFM alignment/separator row: only `|`, `-`, `:` and spaces, with at
/// least one dash.
fn is_separator_row(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_table_parses_to_grid() {
        let md = "| KPI | Value |\n| Revenue | $45.2 million |\n| Margin | 71% |";
        let blocks = parse_blocks(md);
        assert_eq!(blocks.len(), 1);
        let Block::Table(rows) = &blocks[0] else {
            panic!("expected a table, got {blocks:?}");
        };
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 2));
        assert_eq!(rows[0], vec!["KPI".to_string(), "Value".to_string()]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let md = "| A | B |\n| one |\n| x | y | z |";
        let blocks = parse_blocks(md);
        let Block::Table(rows) = &blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[2].len(), 3);
    }

    #[test]
    fn separator_rows_carry_no_cells() {
        let md = "| KPI | Value |\n| --- | --- |\n| Revenue | $45.2 million |";
        let blocks = parse_blocks(md);
        let Block::Table(rows) = &blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["KPI".to_string(), "Value".to_string()]);
    }

    #[test]
    fn open_table_run_flushed_at_end_of_input() {
        let md = "## KPIs\n| A | B |\n| 1 | 2 |";
        let blocks = parse_blocks(md);
        assert_eq!(blocks[0], Block::Heading("KPIs".into()));
        assert!(matches!(&blocks[1], Block::Table(rows) if rows.len() == 2));
    }

    #[test]
    fn table_closed_by_plain_line() {
        let md = "| A | B |\nplain text\n| C | D |";
        let blocks = parse_blocks(md);
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::Table(rows) if rows.len() == 1));
        assert_eq!(blocks[1], Block::Paragraph("plain text".into()));
        assert!(matches!(&blocks[2], Block::Table(rows) if rows.len() == 1));
    }

    #[test]
    fn headings_paragraphs_and_blanks() {
        let md = "## Executive Summary\n\nA strong year.\n";
        let blocks = parse_blocks(md);
        assert_eq!(
            blocks,
            vec![
                Block::Heading("Executive Summary".into()),
                Block::Blank,
                Block::Paragraph("A strong year.".into()),
            ]
        );
    }

    #[test]
    fn markdown_export_is_identity() {
        let md = "## Section\n\n| A | B |\n| 1 | 2 |\n\nBody text.\n";
        let exports = render_exports(md, "Report").unwrap();
        assert_eq!(exports.markdown, md.as_bytes());
    }

    #[test]
    fn all_three_formats_are_produced() {
        let exports = render_exports("## S\nbody\n", "Report").unwrap();
        assert!(!exports.markdown.is_empty());
        assert!(!exports.docx.is_empty());
        assert!(exports.pdf.starts_with(b"%PDF"));
    }
}
