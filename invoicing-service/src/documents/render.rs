//! PDF rendering of a computed layout with printpdf's built-in Helvetica.

use super::layout::{DrawOp, Layout, Rgb, Weight, PAGE_HEIGHT, PAGE_WIDTH};
use super::DocumentError;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
};
use std::io::BufWriter;

const MM_TO_PT: f32 = 2.834_646;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f32::from(rgb.0) / 255.0,
        f32::from(rgb.1) / 255.0,
        f32::from(rgb.2) / 255.0,
        None,
    ))
}

/// Layout coordinates start at the top edge; PDF ones at the bottom.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            weight,
            color: rgb,
            text,
        } => {
            layer.set_fill_color(color(*rgb));
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*y), fonts.get(*weight));
        }
        DrawOp::Line {
            from,
            to,
            thickness,
            color: rgb,
        } => {
            layer.set_outline_color(color(*rgb));
            layer.set_outline_thickness(*thickness * MM_TO_PT);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), flip(from.1)), false),
                    (Point::new(Mm(to.0), flip(to.1)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(rgb) = fill {
                layer.set_fill_color(color(*rgb));
            }
            if let Some(rgb) = stroke {
                layer.set_outline_color(color(*rgb));
                layer.set_outline_thickness(0.1 * MM_TO_PT);
            }
            let rect =
                Rect::new(Mm(*x), flip(*y + *height), Mm(*x + *width), flip(*y)).with_mode(mode);
            layer.add_rect(rect);
        }
    }
}

/// Render every page of `layout` into a PDF byte buffer.
pub fn render(layout: &Layout) -> Result<Vec<u8>, DocumentError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocumentError::Render(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DocumentError::Render(e.to_string()))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        for op in &page.ops {
            draw(&layer, &fonts, op);
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| DocumentError::Render(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| DocumentError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::layout::lay_out;
    use crate::documents::{sample_document, DocumentLine};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn renders_multi_page_layouts_to_pdf_bytes() {
        let mut doc = sample_document();
        doc.items = (1..=40)
            .map(|i| DocumentLine {
                description: format!("Item {}", i),
                quantity: 1,
                unit_price: Decimal::ONE,
                amount: Decimal::ONE,
            })
            .collect();
        let generated_at = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let layout = lay_out(&doc, generated_at);
        assert!(layout.pages.len() > 1);

        let bytes = render(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1_000);
    }
}
