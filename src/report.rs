//! Two-sheet product workbook and the console summary

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::diff::DiffResult;
use crate::types::{ProductRecord, HEADERS};

pub const PRODUCT_LIST_SHEET: &str = "Product List";
pub const NEW_PRODUCTS_SHEET: &str = "New Products";

pub const TOTAL_LABEL: &str = "Total number of products:";
pub const NEW_LABEL: &str = "Total number of new products:";
pub const PERCENT_LABEL: &str = "Percentage of new products:";
pub const SUMMARY_LABELS: [&str; 3] = [TOTAL_LABEL, NEW_LABEL, PERCENT_LABEL];

const COLUMN_WIDTHS: [f64; 3] = [30.0, 20.0, 50.0];
const HEADER_FILL: u32 = 0xD7E4BC;
/// Row 0 is left blank above the header
const HEADER_ROW: u32 = 1;

/// Run-wide statistics repeated at the foot of every sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_products: usize,
    pub new_products: usize,
    /// Already formatted, e.g. "50.00%"
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub rows: Vec<ProductRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub sheets: Vec<Sheet>,
    pub summary: Summary,
}

/// Assemble the report for a run. Sheets are in workbook order.
pub fn build_report(current: &[ProductRecord], diff: &DiffResult) -> Report {
    Report {
        sheets: vec![
            Sheet {
                name: NEW_PRODUCTS_SHEET,
                rows: diff.new_products.clone(),
            },
            Sheet {
                name: PRODUCT_LIST_SHEET,
                rows: current.to_vec(),
            },
        ],
        summary: Summary {
            total_products: diff.total_count,
            new_products: diff.new_count,
            percentage: diff.formatted_percentage(),
        },
    }
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, XlsxError> {
        let header_format = Format::new()
            .set_bold()
            .set_text_wrap()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_background_color(Color::RGB(HEADER_FILL));
        let label_format = Format::new().set_bold();

        let mut workbook = Workbook::new();
        for sheet in &self.sheets {
            let worksheet = render_sheet(sheet, &self.summary, &header_format, &label_format)?;
            workbook.push_worksheet(worksheet);
        }
        workbook.save_to_buffer()
    }
}

fn render_sheet(
    sheet: &Sheet,
    summary: &Summary,
    header_format: &Format,
    label_format: &Format,
) -> Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet.name)?;

    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, width)?;
        worksheet.write_string_with_format(HEADER_ROW, col, *header, header_format)?;
    }

    let mut row = HEADER_ROW + 1;
    for record in &sheet.rows {
        for (col, value) in record.fields().into_iter().enumerate() {
            worksheet.write_string(row, col as u16, value)?;
        }
        row += 1;
    }

    worksheet.write_string_with_format(row, 0, TOTAL_LABEL, label_format)?;
    worksheet.write_number(row, 1, summary.total_products as f64)?;
    worksheet.write_string_with_format(row + 1, 0, NEW_LABEL, label_format)?;
    worksheet.write_number(row + 1, 1, summary.new_products as f64)?;
    worksheet.write_string_with_format(row + 2, 0, PERCENT_LABEL, label_format)?;
    worksheet.write_string(row + 2, 1, summary.percentage.as_str())?;

    Ok(worksheet)
}

/// Plain-text run summary for the terminal
pub fn console_summary(diff: &DiffResult) -> String {
    let mut out = format!(
        "Total number of products: {}\nTotal number of new products: {}\nPercentage of new products: {}\n",
        diff.total_count,
        diff.new_count,
        diff.formatted_percentage()
    );
    if !diff.new_products.is_empty() {
        out.push_str("New Products:\n");
        out.push_str(&text_table(&diff.new_products));
    }
    out
}

/// Left-aligned columns padded to the widest value, header first
fn text_table(records: &[ProductRecord]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for record in records {
        for (w, field) in widths.iter_mut().zip(record.fields()) {
            *w = (*w).max(field.chars().count());
        }
    }

    let line = |fields: [&str; 3]| {
        let cols: Vec<String> = fields
            .iter()
            .zip(widths)
            .map(|(f, w)| format!("{:<w$}", f, w = w))
            .collect();
        format!("{}\n", cols.join(" ").trim_end())
    };

    let mut out = line(HEADERS);
    for record in records {
        out.push_str(&line(record.fields()));
    }
    out
}
