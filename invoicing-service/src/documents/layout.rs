//! Page layout of an invoice document.
//!
//! Everything here is pure: the result is a list of pages holding drawing
//! operations in millimetres on an A4 portrait sheet, origin at the top-left
//! corner, text positioned by its baseline. Rendering to PDF happens in
//! [`super::render`].

use super::payload::{DocumentLine, InvoiceDocument};
use crate::models::money::{format_currency, tax_percent_label};
use chrono::NaiveDateTime;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest baseline body content may use; the footer sits below it.
pub const CONTENT_BOTTOM: f32 = 267.0;

const CONTINUATION_TOP: f32 = 20.0;
const TABLE_TOP: f32 = 125.0;
const COLUMN_WIDTHS: [f32; 4] = [75.0, 25.0, 35.0, 35.0];
const HEADER_ROW_HEIGHT: f32 = 8.0;
const CELL_PADDING: f32 = 2.0;
const BODY_FONT_SIZE: f32 = 10.0;
const BODY_LINE_HEIGHT: f32 = 5.0;
const ROW_PADDING: f32 = 3.0;
const TOTALS_LABEL_X: f32 = 130.0;
const TOTALS_GAP: f32 = 15.0;
const TOTALS_HEIGHT: f32 = 20.0;
const NOTES_GAP: f32 = 15.0;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const PRIMARY: Rgb = Rgb(59, 130, 246);
pub const SECONDARY: Rgb = Rgb(107, 114, 128);
pub const TEXT: Rgb = Rgb(17, 24, 39);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const GRID: Rgb = Rgb(209, 213, 219);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        color: Rgb,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Rgb,
    },
    /// `y` is the top edge.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub pages: Vec<Page>,
}

// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

fn glyph_width(c: char) -> u32 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
        _ => 556,
    }
}

/// Estimated width in millimetres of `text` set in Helvetica.
pub fn text_width(text: &str, size: f32, weight: Weight) -> f32 {
    let units: u32 = text.chars().map(glyph_width).sum();
    let scale = match weight {
        Weight::Regular => 1.0,
        Weight::Bold => 1.05,
    };
    units as f32 / 1000.0 * size * PT_TO_MM * scale
}

/// Greedy word wrap. Words wider than `max_width` are split between
/// characters. Explicit line breaks are kept.
pub fn wrap_text(text: &str, max_width: f32, size: f32, weight: Weight) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, size, weight) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, size, weight) > max_width {
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                } else {
                    current = next;
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct Composer {
    pages: Vec<Page>,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: 0.0,
        }
    }

    fn push(&mut self, op: DrawOp) {
        let last = self.pages.len() - 1;
        self.pages[last].ops.push(op);
    }

    fn text(&mut self, x: f32, y: f32, size: f32, weight: Weight, color: Rgb, text: impl Into<String>) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            weight,
            color,
            text: text.into(),
        });
    }

    fn text_right(&mut self, right: f32, y: f32, size: f32, weight: Weight, color: Rgb, text: String) {
        let x = right - text_width(&text, size, weight);
        self.text(x, y, size, weight, color, text);
    }

    fn text_center(&mut self, center: f32, y: f32, size: f32, weight: Weight, color: Rgb, text: String) {
        let x = center - text_width(&text, size, weight) / 2.0;
        self.text(x, y, size, weight, color, text);
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, thickness: f32, color: Rgb) {
        self.push(DrawOp::Line {
            from: (x1, y),
            to: (x2, y),
            thickness,
            color,
        });
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= CONTENT_BOTTOM
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = CONTINUATION_TOP;
    }
}

/// Lay out `doc`, stamping every page footer with `generated_at`.
pub fn lay_out(doc: &InvoiceDocument, generated_at: NaiveDateTime) -> Layout {
    let mut c = Composer::new();

    header(&mut c, doc);
    bill_to(&mut c, doc);
    table(&mut c, doc);
    totals(&mut c, doc);
    if let Some(notes) = &doc.notes {
        notes_block(&mut c, notes);
    }
    footers(&mut c, generated_at);

    Layout {
        title: format!("Invoice {}", doc.invoice_number),
        pages: c.pages,
    }
}

fn header(c: &mut Composer, doc: &InvoiceDocument) {
    let company = &doc.company;
    c.text(MARGIN, 25.0, 20.0, Weight::Bold, PRIMARY, company.name.as_str());
    let details = [&company.tax_id, &company.address, &company.phone, &company.email];
    for (i, line) in details.into_iter().enumerate() {
        c.text(MARGIN, 35.0 + 7.0 * i as f32, 10.0, Weight::Regular, SECONDARY, line.as_str());
    }

    c.text(150.0, 25.0, 24.0, Weight::Bold, TEXT, "INVOICE");
    c.text(150.0, 35.0, 12.0, Weight::Regular, TEXT, format!("No. {}", doc.invoice_number));
    c.text(
        150.0,
        45.0,
        12.0,
        Weight::Regular,
        TEXT,
        format!("Date: {}", doc.issue_date.format("%d/%m/%Y")),
    );

    c.rule(MARGIN, PAGE_WIDTH - MARGIN, 65.0, 0.5, SECONDARY);
}

fn bill_to(c: &mut Composer, doc: &InvoiceDocument) {
    c.text(MARGIN, 80.0, 14.0, Weight::Bold, TEXT, "BILL TO:");
    let Some(client) = &doc.client else {
        return;
    };

    let lines = [
        client.name.clone(),
        client.address.clone(),
        format!("Tel: {}", client.phone),
        format!("Email: {}", client.email),
    ];
    for (i, line) in lines.into_iter().enumerate() {
        c.text(MARGIN, 90.0 + 7.0 * i as f32, 11.0, Weight::Regular, TEXT, line);
    }
}

fn column_x(index: usize) -> f32 {
    MARGIN + COLUMN_WIDTHS[..index].iter().sum::<f32>()
}

fn table_header(c: &mut Composer) {
    let top = c.y;
    c.push(DrawOp::Rect {
        x: MARGIN,
        y: top,
        width: CONTENT_WIDTH,
        height: HEADER_ROW_HEIGHT,
        fill: Some(PRIMARY),
        stroke: Some(GRID),
    });

    let baseline = top + 5.5;
    c.text(column_x(0) + CELL_PADDING, baseline, 11.0, Weight::Bold, WHITE, "Description");
    c.text_center(
        column_x(1) + COLUMN_WIDTHS[1] / 2.0,
        baseline,
        11.0,
        Weight::Bold,
        WHITE,
        "Qty".to_string(),
    );
    for (index, label) in [(2, "Unit price"), (3, "Amount")] {
        c.text_right(
            column_x(index) + COLUMN_WIDTHS[index] - CELL_PADDING,
            baseline,
            11.0,
            Weight::Bold,
            WHITE,
            label.to_string(),
        );
    }

    c.y = top + HEADER_ROW_HEIGHT;
}

/// Description lines a row starting at `y` can hold above the content bottom.
fn row_capacity(y: f32) -> usize {
    let free = CONTENT_BOTTOM - y - ROW_PADDING;
    if free < BODY_LINE_HEIGHT {
        0
    } else {
        (free / BODY_LINE_HEIGHT) as usize
    }
}

fn table(c: &mut Composer, doc: &InvoiceDocument) {
    c.y = TABLE_TOP;
    table_header(c);

    let description_width = COLUMN_WIDTHS[0] - 2.0 * CELL_PADDING;
    let fresh_capacity = row_capacity(CONTINUATION_TOP + HEADER_ROW_HEIGHT);
    for item in &doc.items {
        let mut lines = wrap_text(
            &item.description,
            description_width,
            BODY_FONT_SIZE,
            Weight::Regular,
        );
        if lines.is_empty() {
            lines.push(String::new());
        }

        // Rows taller than a whole page start here and continue on the next.
        let capacity = row_capacity(c.y);
        if lines.len() > capacity && (lines.len() <= fresh_capacity || capacity == 0) {
            c.new_page();
            table_header(c);
        }

        let mut figures = Some(item);
        loop {
            let take = lines.len().min(row_capacity(c.y));
            let rest = lines.split_off(take);
            table_row(c, lines, figures.take());
            if rest.is_empty() {
                break;
            }
            lines = rest;
            c.new_page();
            table_header(c);
        }
    }
}

/// One row, or one slice of a row split across pages. Quantity and prices
/// are printed only with the first slice.
fn table_row(c: &mut Composer, lines: Vec<String>, figures: Option<&DocumentLine>) {
    let top = c.y;
    let height = lines.len() as f32 * BODY_LINE_HEIGHT + ROW_PADDING;
    for (index, width) in COLUMN_WIDTHS.iter().enumerate() {
        c.push(DrawOp::Rect {
            x: column_x(index),
            y: top,
            width: *width,
            height,
            fill: None,
            stroke: Some(GRID),
        });
    }

    let baseline = top + 5.5;
    for (i, line) in lines.into_iter().enumerate() {
        c.text(
            column_x(0) + CELL_PADDING,
            baseline + i as f32 * BODY_LINE_HEIGHT,
            BODY_FONT_SIZE,
            Weight::Regular,
            TEXT,
            line,
        );
    }
    if let Some(item) = figures {
        c.text_center(
            column_x(1) + COLUMN_WIDTHS[1] / 2.0,
            baseline,
            BODY_FONT_SIZE,
            Weight::Regular,
            TEXT,
            item.quantity.to_string(),
        );
        for (index, value) in [(2, item.unit_price), (3, item.amount)] {
            c.text_right(
                column_x(index) + COLUMN_WIDTHS[index] - CELL_PADDING,
                baseline,
                BODY_FONT_SIZE,
                Weight::Regular,
                TEXT,
                format_currency(value),
            );
        }
    }

    c.y = top + height;
}

fn totals(c: &mut Composer, doc: &InvoiceDocument) {
    c.y += TOTALS_GAP;
    if !c.fits(TOTALS_HEIGHT) {
        c.new_page();
    }

    let top = c.y;
    let right = PAGE_WIDTH - MARGIN;
    c.text(TOTALS_LABEL_X, top, 11.0, Weight::Regular, TEXT, "Subtotal:");
    c.text_right(right, top, 11.0, Weight::Regular, TEXT, format_currency(doc.subtotal));

    c.text(
        TOTALS_LABEL_X,
        top + 8.0,
        11.0,
        Weight::Regular,
        TEXT,
        format!("Tax ({}%):", tax_percent_label()),
    );
    c.text_right(right, top + 8.0, 11.0, Weight::Regular, TEXT, format_currency(doc.tax));

    c.rule(TOTALS_LABEL_X, right, top + 12.0, 0.3, SECONDARY);

    c.text(TOTALS_LABEL_X, top + 20.0, 14.0, Weight::Bold, PRIMARY, "TOTAL:");
    c.text_right(right, top + 20.0, 14.0, Weight::Bold, PRIMARY, format_currency(doc.total));

    c.y = top + TOTALS_HEIGHT;
}

fn notes_block(c: &mut Composer, notes: &str) {
    c.y += NOTES_GAP;
    if !c.fits(8.0 + BODY_LINE_HEIGHT) {
        c.new_page();
    }

    c.text(MARGIN, c.y, 12.0, Weight::Bold, TEXT, "NOTES:");
    c.y += 8.0;

    for line in wrap_text(notes, CONTENT_WIDTH, BODY_FONT_SIZE, Weight::Regular) {
        if !c.fits(0.0) {
            c.new_page();
        }
        c.text(MARGIN, c.y, BODY_FONT_SIZE, Weight::Regular, TEXT, line);
        c.y += BODY_LINE_HEIGHT;
    }
}

fn footers(c: &mut Composer, generated_at: NaiveDateTime) {
    let count = c.pages.len();
    let stamp = format!("Generated on {}", generated_at.format("%d/%m/%Y %H:%M"));
    let center = PAGE_WIDTH / 2.0;

    for (index, page) in c.pages.iter_mut().enumerate() {
        let mut footer = Composer::new();
        footer.text_center(center, 277.0, 8.0, Weight::Regular, SECONDARY, "Thank you for your business".to_string());
        footer.text_center(center, 282.0, 8.0, Weight::Regular, SECONDARY, stamp.clone());
        if count > 1 {
            footer.text_right(
                PAGE_WIDTH - MARGIN,
                282.0,
                8.0,
                Weight::Regular,
                SECONDARY,
                format!("Page {} of {}", index + 1, count),
            );
        }
        for footer_page in footer.pages {
            page.ops.extend(footer_page.ops);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::payload::DocumentLine;
    use crate::documents::sample_document;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn line(description: &str) -> DocumentLine {
        DocumentLine {
            description: description.to_string(),
            quantity: 1,
            unit_price: Decimal::new(100, 0),
            amount: Decimal::new(100, 0),
        }
    }

    #[test]
    fn short_invoice_fits_on_one_page() {
        let layout = lay_out(&sample_document(), generated_at());
        assert_eq!(layout.pages.len(), 1);

        let page = &layout.pages[0];
        for expected in [
            "INVOICE",
            "No. FACT-2023-0001",
            "Date: 15/05/2023",
            "BILL TO:",
            "Acme Corp",
            "Web development",
            "$5,800.00",
            "Tax (16%):",
            "$928.00",
            "TOTAL:",
            "$6,728.00",
            "Thank you for your business",
            "Generated on 10/06/2024 09:30",
        ] {
            assert!(page.contains_text(expected), "missing {:?}", expected);
        }
        assert!(!page.contains_text("NOTES:"));
    }

    #[test]
    fn long_tables_continue_with_repeated_header() {
        let mut doc = sample_document();
        doc.items = (1..=60).map(|i| line(&format!("Item {}", i))).collect();
        let layout = lay_out(&doc, generated_at());

        assert!(layout.pages.len() > 1);
        for (index, page) in layout.pages.iter().enumerate() {
            assert!(page.contains_text("Description"), "page {}", index + 1);
            assert!(page.contains_text("Thank you for your business"));
            assert!(page.contains_text(&format!("Page {} of {}", index + 1, layout.pages.len())));
        }

        let rows: usize = layout
            .pages
            .iter()
            .map(|p| p.texts().filter(|t| t.starts_with("Item ")).count())
            .sum();
        assert_eq!(rows, 60);

        let last = layout.pages.last().unwrap();
        assert!(last.contains_text("TOTAL:"));
        assert!(layout.pages[..layout.pages.len() - 1]
            .iter()
            .all(|p| !p.contains_text("TOTAL:")));
    }

    #[test]
    fn totals_move_to_a_new_page_when_the_table_fills_the_first() {
        let mut doc = sample_document();
        doc.items = (1..=16).map(|i| line(&format!("Item {}", i))).collect();
        let layout = lay_out(&doc, generated_at());

        assert_eq!(layout.pages.len(), 2);
        assert!(layout.pages[0].contains_text("Item 16"));
        assert!(!layout.pages[0].contains_text("TOTAL:"));
        assert!(layout.pages[1].contains_text("TOTAL:"));
        assert!(!layout.pages[1].contains_text("Description"));
    }

    #[test]
    fn content_never_reaches_the_footer_area() {
        let mut doc = sample_document();
        doc.items = (1..=40).map(|i| line(&format!("Item {}", i))).collect();
        doc.notes = Some("Payment by bank transfer. ".repeat(80));
        let layout = lay_out(&doc, generated_at());

        for page in &layout.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, text, .. } = op {
                    let is_footer = text.starts_with("Thank you")
                        || text.starts_with("Generated on")
                        || text.starts_with("Page ");
                    if !is_footer {
                        assert!(*y <= CONTENT_BOTTOM, "{:?} at {}", text, y);
                    }
                }
            }
        }
        assert!(layout.pages.iter().any(|p| p.contains_text("NOTES:")));
    }

    #[test]
    fn description_longer_than_a_page_is_split_across_pages() {
        let mut doc = sample_document();
        doc.items = vec![line(&"Consulting hours for the quarter ".repeat(150))];
        let layout = lay_out(&doc, generated_at());

        assert!(layout.pages.len() >= 3, "{} pages", layout.pages.len());
        for (index, page) in layout.pages.iter().enumerate() {
            for op in &page.ops {
                match op {
                    DrawOp::Text { y, text, .. } => {
                        let is_footer = text.starts_with("Thank you")
                            || text.starts_with("Generated on")
                            || text.starts_with("Page ");
                        if !is_footer {
                            assert!(*y <= CONTENT_BOTTOM, "page {}: {:?} at {}", index, text, y);
                        }
                    }
                    DrawOp::Rect { y, height, .. } => {
                        assert!(*y + *height <= CONTENT_BOTTOM, "page {}: rect ends at {}", index, y + height);
                    }
                    DrawOp::Line { .. } => {}
                }
            }
        }

        let with_rows: Vec<_> = layout
            .pages
            .iter()
            .filter(|p| p.contains_text("Consulting hours"))
            .collect();
        assert!(with_rows.len() >= 2);
        assert!(with_rows.iter().all(|p| p.contains_text("Description")));

        let amounts = layout
            .pages
            .iter()
            .flat_map(|p| p.texts())
            .filter(|t| *t == "$100.00")
            .count();
        assert_eq!(amounts, 2);
        assert!(layout.pages.last().unwrap().contains_text("TOTAL:"));
    }

    #[test]
    fn right_aligned_amounts_end_at_the_column_edge() {
        let layout = lay_out(&sample_document(), generated_at());
        let (x, size) = layout.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { x, size, text, .. } if text == "$6,728.00" => Some((*x, *size)),
                _ => None,
            })
            .unwrap();
        let right = x + text_width("$6,728.00", size, Weight::Bold);
        assert!((right - (PAGE_WIDTH - MARGIN)).abs() < 0.01);
    }

    #[test]
    fn wrapping_respects_width_and_splits_long_words() {
        let lines = wrap_text(
            "Custom website development including responsive layout and accessibility review",
            71.0,
            10.0,
            Weight::Regular,
        );
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 10.0, Weight::Regular) <= 71.0));

        let lines = wrap_text(&"x".repeat(200), 30.0, 10.0, Weight::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(200));
    }

    #[test]
    fn wrapping_keeps_explicit_line_breaks() {
        let lines = wrap_text("First line\n\nThird line", 170.0, 10.0, Weight::Regular);
        assert_eq!(lines, vec!["First line", "", "Third line"]);
    }
}
