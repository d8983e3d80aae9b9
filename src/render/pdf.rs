//! PDF export: a small flowable layout engine over lopdf.
//!
//! Content blocks are placed top-down on a letter page; when a block would
//! cross the bottom margin the composer starts a new page and continues from
//! the top, so section order survives page boundaries. Tables paginate row
//! by row for the same reason.
//!
//! The engine uses the two base-14 Helvetica faces, so no font embedding is
//! needed. Text metrics are estimated (half an em per character), which is
//! accurate enough for wrapping body prose and centring the title.

use crate::error::AnalyzerError;
use crate::render::{parse_blocks, Block};
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

// Letter page, 72 pt margins, 36 pt bottom.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN_LEFT: f32 = 72.0;
const MARGIN_RIGHT: f32 = 72.0;
const MARGIN_TOP: f32 = 72.0;
const MARGIN_BOTTOM: f32 = 36.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

const TITLE_COLOR: Rgb = (0.122, 0.278, 0.533);
const HEADING_COLOR: Rgb = (0.173, 0.353, 0.627);
const BODY_COLOR: Rgb = (0.0, 0.0, 0.0);
const META_COLOR: Rgb = (0.5, 0.5, 0.5);
const HEADER_ROW_FILL: Rgb = TITLE_COLOR;
const DATA_ROW_FILL: Rgb = (0.96, 0.96, 0.86);
const GRID_COLOR: Rgb = (0.5, 0.5, 0.5);

const ATTRIBUTION: &str = "Automated financial report analysis";

const HEADER_ROW_HEIGHT: f32 = 24.0;
const DATA_ROW_HEIGHT: f32 = 18.0;

type Rgb = (f32, f32, f32);

#[derive(Clone, Copy)]
enum Font {
    Body,
    Bold,
}

impl Font {
    fn name(self) -> &'static [u8] {
        match self {
            Font::Body => b"F1",
            Font::Bold => b"F2",
        }
    }
}

/// Render the report Markdown as PDF bytes.
pub fn render_pdf(markdown: &str, title: &str) -> Result<Vec<u8>, AnalyzerError> {
    let mut composer = PageComposer::new();
    composer.title_block(title);

    for block in parse_blocks(markdown) {
        match block {
            Block::Heading(text) => composer.heading(&text),
            Block::Paragraph(text) => composer.paragraph(&text),
            Block::Table(rows) => composer.table(&rows),
            Block::Blank => composer.spacer(7.2),
        }
    }

    build_document(composer.finish())
}

/// Accumulates content-stream operations page by page, tracking the
/// vertical cursor.
struct PageComposer {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageComposer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    /// Start a new page if `height` does not fit above the bottom margin.
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN_BOTTOM {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.ops));
        }
        self.pages
    }

    // ── High-level blocks ────────────────────────────────────────────────

    fn title_block(&mut self, title: &str) {
        self.text_line_centered(title, Font::Bold, 24.0, 30.0, TITLE_COLOR);
        self.spacer(14.4);
        let stamp = Local::now().format("%B %d, %Y at %I:%M %p");
        self.text_line_centered(
            &format!("Generated: {stamp}"),
            Font::Body,
            9.0,
            12.0,
            META_COLOR,
        );
        self.text_line_centered(ATTRIBUTION, Font::Body, 9.0, 12.0, META_COLOR);
        self.spacer(21.6);
        self.hrule(2.0, TITLE_COLOR);
        self.spacer(21.6);
    }

    fn heading(&mut self, text: &str) {
        self.spacer(12.0);
        self.text_line(text, Font::Bold, 14.0, 17.0, HEADING_COLOR, MARGIN_LEFT);
        self.spacer(6.0);
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_to_width(text, 10.0) {
            self.text_line(&line, Font::Body, 10.0, 14.0, BODY_COLOR, MARGIN_LEFT);
        }
        self.spacer(10.0);
    }

    /// Render a parsed table run as a bordered grid, header row filled and
    /// bold. Ragged rows are drawn as-is: each row gets exactly as many
    /// bordered cells as it has values, so an uneven grid still exports.
    /// When a data row forces a page break, the header row is re-emitted at
    /// the top of the new page before the row continues.
    fn table(&mut self, rows: &[Vec<String>]) {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return;
        }
        let col_width = TEXT_WIDTH / cols as f32;
        let header = rows.first();

        for (i, row) in rows.iter().enumerate() {
            let is_header = i == 0;
            let row_height = if is_header {
                HEADER_ROW_HEIGHT
            } else {
                DATA_ROW_HEIGHT
            };
            if self.y - row_height < MARGIN_BOTTOM {
                self.break_page();
                if !is_header {
                    if let Some(h) = header {
                        self.table_row(h, true, col_width);
                    }
                }
            }
            self.table_row(row, is_header, col_width);
        }
        self.spacer(14.4);
    }

    fn table_row(&mut self, row: &[String], is_header: bool, col_width: f32) {
        let row_height = if is_header {
            HEADER_ROW_HEIGHT
        } else {
            DATA_ROW_HEIGHT
        };
        let top = self.y;
        let row_width = col_width * row.len() as f32;

        let fill = if is_header { HEADER_ROW_FILL } else { DATA_ROW_FILL };
        self.fill_rect(MARGIN_LEFT, top - row_height, row_width, row_height, fill);

        let (font, size, color) = if is_header {
            (Font::Bold, 11.0, (1.0, 1.0, 1.0))
        } else {
            (Font::Body, 9.0, BODY_COLOR)
        };
        for (c, cell) in row.iter().enumerate() {
            let x = MARGIN_LEFT + c as f32 * col_width + 4.0;
            let text = truncate_to_width(cell, size, col_width - 8.0);
            let baseline = top - row_height + (row_height - size) / 2.0;
            self.text_at(&text, font, size, color, x, baseline);
        }

        for c in 0..row.len() {
            self.stroke_rect(
                MARGIN_LEFT + c as f32 * col_width,
                top - row_height,
                col_width,
                row_height,
                0.5,
                GRID_COLOR,
            );
        }

        self.y = top - row_height;
    }

    // ── Primitive flowables ──────────────────────────────────────────────

    fn spacer(&mut self, height: f32) {
        self.y = (self.y - height).max(MARGIN_BOTTOM);
    }

    fn text_line(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        leading: f32,
        color: Rgb,
        x: f32,
    ) {
        self.ensure_room(leading);
        let baseline = self.y - size;
        self.text_at(text, font, size, color, x, baseline);
        self.y -= leading;
    }

    fn text_line_centered(&mut self, text: &str, font: Font, size: f32, leading: f32, color: Rgb) {
        let x = (PAGE_WIDTH - estimate_width(text, size)).max(0.0) / 2.0;
        self.text_line(text, font, size, leading, color, x);
    }

    fn text_at(&mut self, text: &str, font: Font, size: f32, color: Rgb, x: f32, baseline: f32) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.name().to_vec()), Object::Real(size)],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.ops.push(Operation::new(
            "Td",
            vec![Object::Real(x), Object::Real(baseline)],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_pdf_text(text),
                StringFormat::Literal,
            )],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn hrule(&mut self, thickness: f32, color: Rgb) {
        self.ensure_room(thickness + 2.0);
        let y = self.y - thickness / 2.0;
        self.ops.push(Operation::new(
            "RG",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.ops
            .push(Operation::new("w", vec![Object::Real(thickness)]));
        self.ops.push(Operation::new(
            "m",
            vec![Object::Real(MARGIN_LEFT), Object::Real(y)],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![Object::Real(PAGE_WIDTH - MARGIN_RIGHT), Object::Real(y)],
        ));
        self.ops.push(Operation::new("S", vec![]));
        self.y -= thickness + 2.0;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops.push(Operation::new(
            "rg",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.ops.push(Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(y),
                Object::Real(width),
                Object::Real(height),
            ],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Rgb) {
        self.ops.push(Operation::new(
            "RG",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.ops
            .push(Operation::new("w", vec![Object::Real(line_width)]));
        self.ops.push(Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(y),
                Object::Real(width),
                Object::Real(height),
            ],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }
}

// ── Text metrics ─────────────────────────────────────────────────────────────

/// Estimated rendered width: half an em per character is a serviceable
/// average for Helvetica prose.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Greedy word wrap against the page text width. A single word longer than
/// the line is emitted on its own line rather than split.
fn wrap_to_width(text: &str, size: f32) -> Vec<String> {
    let max_chars = ((TEXT_WIDTH / (size * 0.5)) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate_to_width(text: &str, size: f32, width: f32) -> String {
    let max_chars = ((width / (size * 0.5)) as usize).max(1);
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Base-14 fonts only cover (roughly) Latin-1; transliterate the common
/// typographic characters and drop the rest rather than emit tofu.
fn encode_pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c as u8),
            '\u{2013}' | '\u{2014}' => out.push(b'-'),
            '\u{2018}' | '\u{2019}' => out.push(b'\''),
            '\u{201C}' | '\u{201D}' => out.push(b'"'),
            '\u{2026}' => out.extend_from_slice(b"..."),
            _ => out.push(b'?'),
        }
    }
    out
}

// ── Document assembly ────────────────────────────────────────────────────────

fn build_document(page_ops: Vec<Vec<Operation>>) -> Result<Vec<u8>, AnalyzerError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let bold_font = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![
            ("F1", Object::Reference(body_font)),
            ("F2", Object::Reference(bold_font)),
        ])),
    )]));

    let mut page_ids = Vec::with_capacity(page_ops.len());
    for operations in page_ops {
        let content = Content { operations };
        let encoded = content.encode().map_err(|e| AnalyzerError::ExportFailed {
            detail: format!("PDF content stream: {e}"),
        })?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH as i64),
                    Object::Integer(PAGE_HEIGHT as i64),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| AnalyzerError::ExportFailed {
            detail: format!("PDF serialisation: {e}"),
        })?;
    Ok(buffer)
}
