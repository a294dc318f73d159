//! PDF rendering with the standard Helvetica fonts
//!
//! Base-14 fonts need no embedding but only cover WinAnsi, so all text goes
//! through [`pdf_text`] first. Layout is a single column on A4 with greedy
//! word wrapping and automatic page breaks.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use super::document::{Block, REPORT_TITLE, ReportDocument};
use super::transliterate::pdf_text;
use crate::errors::ExportError;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const LINE_FACTOR: f32 = 1.35;
const FOOTER_SIZE: f32 = 8.0;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn widths(self) -> &'static [u16; 95] {
        match self {
            Face::Regular => &HELVETICA_WIDTHS,
            Face::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

/// Width of WinAnsi-encoded text in points
fn text_width(text: &[u8], face: Face, size: f32) -> f32 {
    let widths = face.widths();
    let units: u32 = text
        .iter()
        .map(|&b| match b {
            32..=126 => u32::from(widths[usize::from(b - 32)]),
            // Latin-1 range: close to the digit width in both faces
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}

#[derive(Debug, Clone)]
struct Word {
    face: Face,
    text: Vec<u8>,
}

struct Style {
    size: f32,
    indent: f32,
    space_before: f32,
}

struct Layout {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn skip(&mut self, amount: f32) {
        if self.y - amount < MARGIN {
            self.new_page();
        } else {
            self.y -= amount;
        }
    }

    /// Wrap and emit `words`; the first line starts at `indent`, later
    /// lines at `indent + hanging`
    fn paragraph(&mut self, words: Vec<Word>, style: &Style, hanging: f32) {
        if self.y < PAGE_HEIGHT - MARGIN {
            self.skip(style.space_before);
        }

        let leading = style.size * LINE_FACTOR;
        let mut indent = style.indent;
        for line in wrap(words, style.size, PAGE_WIDTH - 2.0 * MARGIN - style.indent, hanging) {
            if self.y - leading < MARGIN {
                self.new_page();
            }
            self.y -= leading;
            let (x, y) = (MARGIN + indent, self.y);
            self.emit_line(x, y, style.size, &line);
            indent = style.indent + hanging;
        }
    }

    fn emit_line(&mut self, x: f32, y: f32, size: f32, line: &[Word]) {
        let mut runs: Vec<Word> = Vec::new();
        for (i, word) in line.iter().enumerate() {
            let mut text = word.text.clone();
            if i + 1 < line.len() {
                text.push(b' ');
            }
            if runs.last().is_some_and(|run| run.face == word.face) {
                if let Some(run) = runs.last_mut() {
                    run.text.extend(text);
                }
            } else {
                runs.push(Word {
                    face: word.face,
                    text,
                });
            }
        }

        let ops = self.current();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        for run in runs {
            ops.push(Operation::new(
                "Tf",
                vec![run.face.resource_name().into(), size.into()],
            ));
            ops.push(Operation::new("Tj", vec![Object::string_literal(run.text)]));
        }
        ops.push(Operation::new("ET", vec![]));
    }
}

/// Greedy line filling; words wider than a whole line are split
fn wrap(words: Vec<Word>, size: f32, width: f32, hanging: f32) -> Vec<Vec<Word>> {
    let space = text_width(b" ", Face::Regular, size);
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut used = 0.0_f32;

    for word in words.into_iter().flat_map(|w| split_long(w, size, width - hanging)) {
        let limit = if lines.is_empty() { width } else { width - hanging };
        let w = text_width(&word.text, word.face, size);
        let needed = if line.is_empty() { w } else { used + space + w };

        if needed > limit && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            used = w;
        } else {
            used = needed;
        }
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_long(word: Word, size: f32, width: f32) -> Vec<Word> {
    if text_width(&word.text, word.face, size) <= width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut current = Vec::new();
    for &b in &word.text {
        current.push(b);
        if text_width(&current, word.face, size) > width && current.len() > 1 {
            let overflow = current.pop();
            pieces.push(Word {
                face: word.face,
                text: std::mem::take(&mut current),
            });
            current.extend(overflow);
        }
    }
    if !current.is_empty() {
        pieces.push(Word {
            face: word.face,
            text: current,
        });
    }
    pieces
}

fn words(text: &str, face: Face) -> Vec<Word> {
    text.split_whitespace()
        .map(|w| Word {
            face,
            text: pdf_text(w),
        })
        .collect()
}

fn layout(document: &ReportDocument) -> Layout {
    let mut layout = Layout::new();

    for block in &document.blocks {
        match block {
            Block::Title(text) => layout.paragraph(
                words(text, Face::Bold),
                &Style {
                    size: 18.0,
                    indent: 0.0,
                    space_before: 0.0,
                },
                0.0,
            ),
            Block::Heading(text) => layout.paragraph(
                words(text, Face::Bold),
                &Style {
                    size: 13.0,
                    indent: 0.0,
                    space_before: 14.0,
                },
                0.0,
            ),
            Block::Subheading(text) => layout.paragraph(
                words(text, Face::Bold),
                &Style {
                    size: 11.0,
                    indent: 0.0,
                    space_before: 6.0,
                },
                0.0,
            ),
            Block::Field { label, value } => {
                let mut line = words(&format!("{label}:"), Face::Bold);
                line.extend(words(value, Face::Regular));
                layout.paragraph(
                    line,
                    &Style {
                        size: 10.5,
                        indent: 0.0,
                        space_before: 2.0,
                    },
                    0.0,
                );
            }
            Block::Paragraph(text) => layout.paragraph(
                words(text, Face::Regular),
                &Style {
                    size: 10.0,
                    indent: 12.0,
                    space_before: 1.0,
                },
                0.0,
            ),
            Block::Bullet(text) => {
                let mut line = vec![Word {
                    face: Face::Regular,
                    text: pdf_text("•"),
                }];
                line.extend(words(text, Face::Regular));
                layout.paragraph(
                    line,
                    &Style {
                        size: 10.0,
                        indent: 12.0,
                        space_before: 1.0,
                    },
                    10.0,
                );
            }
        }
    }

    layout
}

fn footer(page: usize, total: usize) -> Vec<Operation> {
    let text = pdf_text(&format!("Сторінка {page} з {total}"));
    let x = PAGE_WIDTH - MARGIN - text_width(&text, Face::Regular, FOOTER_SIZE);
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FOOTER_SIZE.into()]),
        Operation::new("Td", vec![x.into(), (MARGIN / 2.0).into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Render the report as a PDF file
pub fn render(document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let pages = layout(document).pages;
    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, mut operations) in pages.into_iter().enumerate() {
        operations.extend(footer(index + 1, total));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(pdf_text(REPORT_TITLE)),
        "Subject" => Object::string_literal(document.analysis_id.as_bytes().to_vec()),
        "Producer" => Object::string_literal(concat!("tm-analyzer ", env!("CARGO_PKG_VERSION"))),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
