//! Invoice PDF rendering.
//!
//! Renders an A4 invoice with the shop header, customer block, a ruled item
//! table and a grand total, then writes it under the invoice directory as
//! `<invoice_no>.pdf`. Rendering happens after the sale transaction commits;
//! a rendering failure is logged and never undoes the sale.

use std::path::{Path, PathBuf};

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon,
    Rgb,
};
use thiserror::Error;

use shoptill_core::Money;

use crate::models::{Sale, SaleItem, ShopInfo};

/// Errors that can occur while producing an invoice PDF.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The PDF backend refused the document.
    #[error("pdf rendering failed: {0}")]
    Render(String),

    /// Writing the file failed.
    #[error("failed to write invoice file: {0}")]
    Io(#[from] std::io::Error),
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;

/// Left/right page margin; also the item table's outer edges.
const MARGIN: f32 = 20.0;
const TABLE_RIGHT: f32 = PAGE_WIDTH - MARGIN;

/// Column separators, sized so the item name gets most of the width.
const COL_QTY: f32 = 110.0;
const COL_PRICE: f32 = 130.0;
const COL_TOTAL: f32 = 160.0;

/// Inset of cell text from the cell's left rule.
const CELL_PAD: f32 = 2.0;

const ROW_HEIGHT: f32 = 8.0;

/// Lowest y a table row may start at; below this the table continues on the
/// next page, leaving room for the footer line.
const BOTTOM_LIMIT: f32 = 30.0;

/// Top of the item table on the first page (below the header blocks) and on
/// continuation pages.
const TABLE_TOP_FIRST: f32 = 240.0;
const TABLE_TOP_CONT: f32 = 280.0;

/// Item names longer than this are cut off in the table.
const NAME_MAX_CHARS: usize = 40;

/// Everything the renderer needs for one invoice.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceContext<'a> {
    pub shop: &'a ShopInfo,
    pub sale: &'a Sale,
    pub items: &'a [SaleItem],
    /// Payments recorded so far; a paid/due block is added when non-zero.
    pub paid: Money,
}

/// Render the invoice PDF and write it to `dir/<invoice_no>.pdf`.
///
/// The directory is created if missing. Returns the path written.
///
/// # Errors
///
/// Returns [`InvoiceError::Render`] if the PDF cannot be produced and
/// [`InvoiceError::Io`] if the file cannot be written.
pub async fn write_pdf(dir: &Path, invoice: InvoiceContext<'_>) -> Result<PathBuf, InvoiceError> {
    let bytes = render_pdf(invoice)?;
    let path = dir.join(format!("{}.pdf", invoice.sale.invoice_no));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, bytes).await?;

    Ok(path)
}

/// Render the invoice PDF in memory.
///
/// # Errors
///
/// Returns [`InvoiceError::Render`] if the PDF backend fails.
pub fn render_pdf(invoice: InvoiceContext<'_>) -> Result<Vec<u8>, InvoiceError> {
    let title = format!("Invoice {}", invoice.sale.invoice_no);
    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| InvoiceError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| InvoiceError::Render(e.to_string()))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| InvoiceError::Render(e.to_string()))?;

    let fonts = Fonts { regular, bold, oblique };

    let mut current = doc.get_page(page).get_layer(layer);
    draw_header(&current, &fonts, &invoice);
    draw_footer(&current, &fonts);

    // Item table, flowing onto continuation pages as needed.
    let mut y = TABLE_TOP_FIRST;
    draw_column_header(&current, &fonts, y);
    y -= ROW_HEIGHT;

    for item in invoice.items {
        if y - ROW_HEIGHT < BOTTOM_LIMIT {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(next_page).get_layer(next_layer);
            draw_footer(&current, &fonts);
            y = TABLE_TOP_CONT;
            draw_column_header(&current, &fonts, y);
            y -= ROW_HEIGHT;
        }

        draw_row_rules(&current, y);
        let name: String = item.product_name.chars().take(NAME_MAX_CHARS).collect();
        set_black(&current);
        current.use_text(name, 10.0, Mm(MARGIN + CELL_PAD), Mm(y - 5.5), &fonts.regular);
        current.use_text(
            item.quantity.to_string(),
            10.0,
            Mm(COL_QTY + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        current.use_text(
            item.unit_price.to_string(),
            10.0,
            Mm(COL_PRICE + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        current.use_text(
            item.total().to_string(),
            10.0,
            Mm(COL_TOTAL + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        y -= ROW_HEIGHT;
    }

    // Totals block, kept together on one page.
    let needed = if invoice.paid.is_zero() { ROW_HEIGHT } else { 3.0 * ROW_HEIGHT };
    if y - needed < BOTTOM_LIMIT {
        let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        current = doc.get_page(next_page).get_layer(next_layer);
        draw_footer(&current, &fonts);
        y = TABLE_TOP_CONT;
    }

    draw_row_rules(&current, y);
    set_black(&current);
    current.use_text(
        "Grand Total",
        10.0,
        Mm(COL_PRICE + CELL_PAD),
        Mm(y - 5.5),
        &fonts.bold,
    );
    current.use_text(
        invoice.sale.total.to_string(),
        10.0,
        Mm(COL_TOTAL + CELL_PAD),
        Mm(y - 5.5),
        &fonts.bold,
    );
    y -= ROW_HEIGHT;

    if !invoice.paid.is_zero() {
        let due = invoice.sale.total.saturating_sub_floor_zero(invoice.paid);
        current.use_text(
            "Paid",
            10.0,
            Mm(COL_PRICE + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        current.use_text(
            invoice.paid.to_string(),
            10.0,
            Mm(COL_TOTAL + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        y -= ROW_HEIGHT;
        current.use_text(
            "Amount Due",
            10.0,
            Mm(COL_PRICE + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
        current.use_text(
            due.to_string(),
            10.0,
            Mm(COL_TOTAL + CELL_PAD),
            Mm(y - 5.5),
            &fonts.regular,
        );
    }

    doc.save_to_bytes().map_err(|e| InvoiceError::Render(e.to_string()))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

/// Shop identity top left, invoice and customer details top right.
fn draw_header(layer: &PdfLayerReference, fonts: &Fonts, invoice: &InvoiceContext<'_>) {
    set_black(layer);
    layer.use_text(
        invoice.shop.shop_name.clone(),
        16.0,
        Mm(MARGIN),
        Mm(277.0),
        &fonts.bold,
    );
    layer.use_text(invoice.shop.address.clone(), 10.0, Mm(MARGIN), Mm(271.0), &fonts.regular);
    layer.use_text(
        format!("Phone: {}", invoice.shop.phone),
        10.0,
        Mm(MARGIN),
        Mm(265.0),
        &fonts.regular,
    );
    layer.use_text(
        format!("GSTIN: {}", invoice.shop.gstin),
        10.0,
        Mm(MARGIN),
        Mm(259.0),
        &fonts.regular,
    );

    let right = 140.0;
    layer.use_text(
        format!("Invoice #: {}", invoice.sale.invoice_no),
        12.0,
        Mm(right),
        Mm(277.0),
        &fonts.bold,
    );
    layer.use_text(
        format!("Date: {}", invoice.sale.created_at.format("%Y-%m-%d")),
        10.0,
        Mm(right),
        Mm(271.0),
        &fonts.regular,
    );
    layer.use_text(
        format!("Customer: {}", invoice.sale.customer_name),
        10.0,
        Mm(right),
        Mm(265.0),
        &fonts.regular,
    );
}

/// Shaded column header band with the four column titles.
fn draw_column_header(layer: &PdfLayerReference, fonts: &Fonts, y: f32) {
    let band = Polygon {
        rings: vec![vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(TABLE_RIGHT), Mm(y)), false),
            (Point::new(Mm(TABLE_RIGHT), Mm(y - ROW_HEIGHT)), false),
            (Point::new(Mm(MARGIN), Mm(y - ROW_HEIGHT)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };
    layer.set_fill_color(Color::Rgb(Rgb::new(0.85, 0.85, 0.85, None)));
    layer.add_polygon(band);

    draw_row_rules(layer, y);

    set_black(layer);
    layer.use_text("Item", 10.0, Mm(MARGIN + CELL_PAD), Mm(y - 5.5), &fonts.bold);
    layer.use_text("Qty", 10.0, Mm(COL_QTY + CELL_PAD), Mm(y - 5.5), &fonts.bold);
    layer.use_text("Price", 10.0, Mm(COL_PRICE + CELL_PAD), Mm(y - 5.5), &fonts.bold);
    layer.use_text("Total", 10.0, Mm(COL_TOTAL + CELL_PAD), Mm(y - 5.5), &fonts.bold);
}

/// Grid rules for one row whose top edge sits at `y`.
fn draw_row_rules(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
    layer.set_outline_thickness(0.5);

    stroke(layer, (MARGIN, y), (TABLE_RIGHT, y));
    stroke(layer, (MARGIN, y - ROW_HEIGHT), (TABLE_RIGHT, y - ROW_HEIGHT));
    for x in [MARGIN, COL_QTY, COL_PRICE, COL_TOTAL, TABLE_RIGHT] {
        stroke(layer, (x, y), (x, y - ROW_HEIGHT));
    }
}

fn draw_footer(layer: &PdfLayerReference, fonts: &Fonts) {
    set_black(layer);
    layer.use_text(
        "Thank you for your purchase!",
        9.0,
        Mm(80.0),
        Mm(15.0),
        &fonts.oblique,
    );
}

fn stroke(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    let line = Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

/// PDF text is painted with the fill color, so reset after shading shapes.
fn set_black(layer: &PdfLayerReference) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use shoptill_core::{InvoiceNumber, ProductId, SaleId, SaleItemId};

    use super::*;

    fn sample_sale(item_count: usize) -> (Sale, Vec<SaleItem>) {
        let sale = Sale {
            id: SaleId::new(7),
            invoice_no: InvoiceNumber::from_seq(7),
            customer_name: "Asha".to_owned(),
            customer_contact: Some("9876543210".to_owned()),
            customer_address: None,
            total: Money::from_cents(9000),
            created_at: Utc::now(),
        };
        let items = (0..item_count)
            .map(|n| SaleItem {
                id: SaleItemId::new(i64::try_from(n).unwrap() + 1),
                sale_id: sale.id,
                product_id: ProductId::new(1),
                product_name: format!("Apple {n}"),
                quantity: 1,
                unit_price: Money::from_cents(3000),
            })
            .collect();
        (sale, items)
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let shop = ShopInfo::default();
        let (sale, items) = sample_sale(2);
        let bytes = render_pdf(InvoiceContext {
            shop: &shop,
            sale: &sale,
            items: &items,
            paid: Money::ZERO,
        })
        .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_with_payments() {
        let shop = ShopInfo::default();
        let (sale, items) = sample_sale(1);
        let bytes = render_pdf(InvoiceContext {
            shop: &shop,
            sale: &sale,
            items: &items,
            paid: Money::from_cents(5000),
        })
        .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_invoices_span_pages() {
        let shop = ShopInfo::default();
        let (sale, short_items) = sample_sale(2);
        let (_, long_items) = sample_sale(60);

        let short = render_pdf(InvoiceContext {
            shop: &shop,
            sale: &sale,
            items: &short_items,
            paid: Money::ZERO,
        })
        .unwrap();
        let long = render_pdf(InvoiceContext {
            shop: &shop,
            sale: &sale,
            items: &long_items,
            paid: Money::ZERO,
        })
        .unwrap();

        // 60 rows cannot fit the first page's 24 item slots, so the long
        // render carries at least one extra page of content.
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[tokio::test]
    async fn test_write_pdf_places_file_by_invoice_number() {
        let dir = std::env::temp_dir().join(format!("shoptill-invoice-test-{}", std::process::id()));
        let shop = ShopInfo::default();
        let (sale, items) = sample_sale(1);

        let path = write_pdf(
            &dir,
            InvoiceContext { shop: &shop, sale: &sale, items: &items, paid: Money::ZERO },
        )
        .await
        .unwrap();

        assert!(path.ends_with("INV-0007.pdf"));
        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
