//! PDF assembly: laid-out pages → `lopdf::Document` → bytes.
//!
//! The document is built from scratch with one shared Courier font resource
//! and one uncompressed content stream per page. Nothing time- or
//! randomness-dependent (no `/Info` dates, no `/ID`) is written, so the same
//! input always serialises to the same bytes.

use crate::layout::{layout_text, PageLayout};
use crate::TextPdfError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A finished PDF document.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Lay `text` out on pages of `layout` and serialise the result as PDF.
pub fn render_pdf(text: &str, layout: &PageLayout) -> Result<RenderedPdf, TextPdfError> {
    let pages = layout_text(text, layout)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content = page_content(lines, layout);
        let encoded = content
            .encode()
            .map_err(|e| TextPdfError::Write(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        layout.page_width.into(),
        layout.page_height.into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| TextPdfError::Write(e.to_string()))?;

    Ok(RenderedPdf { bytes, page_count })
}

/// Text operators for one page: a single `BT … ET` block, one `Tj` per line,
/// `T*` advancing by the leading set with `TL`.
fn page_content(lines: &[String], layout: &PageLayout) -> Content {
    let first_baseline = layout.page_height - layout.margin - layout.font_size;

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), layout.font_size.into()]),
        Operation::new("TL", vec![layout.line_height.into()]),
        Operation::new("Td", vec![layout.margin.into(), first_baseline.into()]),
    ];

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
        }
    }

    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Encode a line in WinAnsiEncoding, one byte per character.
///
/// Characters the standard 14 fonts cannot show become `?` so the glyph
/// count, and with it the wrapping, stays exact.
pub fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}
