//! PDF serialization of a `ReportDocument` via `lopdf`.
//!
//! Coordinates arrive in millimetres measured from the top-left page corner
//! and are converted to PDF points measured from the bottom-left. Text uses
//! the standard Helvetica faces with WinAnsi encoding, so no font programs are
//! embedded. A raster capture is embedded once as an RGB image XObject and
//! drawn on each page with its own transform.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::export::document::{DrawOp, ReportDocument};
use crate::layout::{FontFace, TextRun};
use crate::raster::RasterImage;

const PT_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_RESOURCE: &str = "Im1";
const PRODUCER: &str = concat!("pathway ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PdfError(String);

impl PdfError {
    fn new(context: &str, err: impl std::fmt::Display) -> Self {
        Self(format!("{context}: {err}"))
    }
}

/// Serializes `document` into PDF bytes, one page object per document page.
pub fn encode_pdf(document: ReportDocument) -> Result<Vec<u8>, PdfError> {
    let ReportDocument {
        title,
        page_config,
        pages,
        image,
    } = document;

    let width_pt = page_config.width_mm * PT_PER_MM;
    let height_pt = page_config.height_mm * PT_PER_MM;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Helvetica, FontFace::HelveticaBold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }

    let mut resources = dictionary! { "Font" => fonts };
    if let Some(image) = image {
        let image_id = doc.add_object(image_xobject(image));
        resources.set("XObject", dictionary! { IMAGE_RESOURCE => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let mut operations = Vec::new();
        for op in &page.ops {
            match op {
                DrawOp::Text(run) => push_text(&mut operations, run, height_pt),
                DrawOp::Image {
                    x_mm,
                    y_mm,
                    width_mm,
                    height_mm,
                } => {
                    let w = width_mm * PT_PER_MM;
                    let h = height_mm * PT_PER_MM;
                    let x = x_mm * PT_PER_MM;
                    let y = height_pt - (y_mm + height_mm) * PT_PER_MM;
                    operations.push(Operation::new("q", vec![]));
                    operations.push(Operation::new(
                        "cm",
                        vec![w.into(), 0.0f32.into(), 0.0f32.into(), h.into(), x.into(), y.into()],
                    ));
                    operations.push(Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.into())]));
                    operations.push(Operation::new("Q", vec![]));
                }
            }
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| PdfError::new("encode content stream", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.0f32.into(), 0.0f32.into(), width_pt.into(), height_pt.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = info_dictionary(&mut doc, &title);
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::new("write document", e))?;
    Ok(bytes)
}

fn push_text(operations: &mut Vec<Operation>, run: &TextRun, page_height_pt: f32) {
    let x = run.x_mm * PT_PER_MM;
    let y = page_height_pt - run.baseline_mm() * PT_PER_MM;
    let (r, g, b) = (run.color.0, run.color.1, run.color.2);

    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![
            Object::Name(run.face.resource_name().into()),
            run.size_pt.into(),
        ],
    ));
    operations.push(Operation::new(
        "rg",
        vec![channel(r).into(), channel(g).into(), channel(b).into()],
    ));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

fn channel(value: u8) -> f32 {
    value as f32 / 255.0
}

fn image_xobject(image: RasterImage) -> Stream {
    let (width, height) = (image.width() as i64, image.height() as i64);
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        image.into_raw(),
    )
}

fn info_dictionary(doc: &mut Document, title: &str) -> ObjectId {
    let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(created),
    })
}

/// Maps text onto the WinAnsi code page used by the standard fonts.
/// Characters outside it become `?`; arrow glyphs degrade to `-`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '→' | '➤' => b'-',
            _ => b'?',
        })
        .collect()
}

/// Test helpers for reading generated documents back.
#[cfg(test)]
pub(crate) mod readback {
    use lopdf::content::Content;
    use lopdf::{Document, Object};

    /// Page count and the `Tj` strings of each page, in page order.
    pub fn page_texts(bytes: &[u8]) -> (usize, Vec<Vec<String>>) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        let mut texts = Vec::new();
        for (_, page_id) in &pages {
            let data = doc.get_page_content(*page_id).unwrap();
            let content = Content::decode(&data).unwrap();
            let strings = content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(bytes.iter().map(|&b| b as char).collect())
                    }
                    _ => None,
                })
                .collect();
            texts.push(strings);
        }
        (pages.len(), texts)
    }

    /// Number of image draws (`Do`) per page.
    pub fn image_draws(bytes: &[u8]) -> Vec<usize> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|id| {
                let data = doc.get_page_content(*id).unwrap();
                Content::decode(&data)
                    .unwrap()
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Do")
                    .count()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{default_page_config, layout, slice};
    use crate::report::{BlockKind, ContentBlock};
    use image::RgbImage;

    #[test]
    fn test_win_ansi_maps_bullet_and_falls_back() {
        assert_eq!(encode_win_ansi("• SQL"), vec![0x95, b' ', b'S', b'Q', b'L']);
        assert_eq!(encode_win_ansi("é"), vec![0xe9]);
        assert_eq!(encode_win_ansi("漢"), vec![b'?']);
        assert_eq!(encode_win_ansi("→ Deploy ➤"), b"- Deploy -".to_vec());
    }

    #[test]
    fn test_one_page_object_per_layout_page() {
        let config = default_page_config();
        let mut blocks = vec![ContentBlock::new(BlockKind::Title, "Data Scientist")];
        for i in 0..60 {
            blocks.push(ContentBlock::new(BlockKind::CourseItem, format!("Course {i}")));
        }
        let pages = layout(&blocks, &config);
        assert!(pages.len() > 1);

        let doc = ReportDocument::from_text_layout("Data Scientist", config, pages.clone());
        let bytes = encode_pdf(doc).unwrap();
        let (count, texts) = readback::page_texts(&bytes);

        assert_eq!(count, pages.len());
        assert_eq!(texts[0][0], "Data Scientist");
        assert!(texts[0].iter().any(|t| t == "\u{95} Course 0"));
    }

    #[test]
    fn test_raster_document_embeds_image_on_every_page() {
        let config = default_page_config();
        let raster = RasterImage::new(RgbImage::new(420, 1188));
        let bands = slice(420, 1188, config.width_mm, config.height_mm);
        let doc = ReportDocument::from_raster("X", config, raster, &bands);

        let bytes = encode_pdf(doc).unwrap();
        assert_eq!(readback::image_draws(&bytes), vec![1, 1]);
    }
}
