//! Excel workbook renderers
//!
//! Two workbooks are produced from a `Report`:
//! - `Base_Tratada.xlsx`: the processed record sheet only
//! - `Analise_Chamados_Completa.xlsx`: processed records plus every summary sheet
//!
//! ## Formatting
//!
//! - Bold blue header row, frozen
//! - Date cells as `dd/mm/yyyy hh:mm:ss`
//! - Autofilter on record listings
//! - Conditional formatting on status, percentage and comparison cells, so
//!   colors follow the values if a reader edits the sheet
//! - Late-call rows filled by delay status
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Por_Divisão
//! | Divisão | Total_Chamados | NP_Inicio | NP_Conclusao | ... | % SLA Início | % SLA Conclusão |
//! |---------|----------------|-----------|--------------|-----|--------------|-----------------|
//! | DIV 01  | 120            | 117       | 115          | ... | 97.5         | 95.83           |
//! ```

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, ConditionalFormatText,
    ConditionalFormatTextRule, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};
use std::path::Path;
use ticketsla_core::{CellValue, RenderError, Report, ReportRenderer};
use tracing::{debug, info};

use crate::table::{analysis_tables, records_table, CellRange, Fill, Highlight, SheetTable, PROCESSED_SHEET};

/// Widest column the writer sizes to fit
const MAX_COLUMN_WIDTH: usize = 50;
const MIN_COLUMN_WIDTH: usize = 8;
const DATE_FORMAT: &str = "dd/mm/yyyy hh:mm:ss";

/// Formats for one row style
#[derive(Clone)]
struct CellFormats {
    text: Format,
    number: Format,
    date: Format,
}

impl CellFormats {
    fn new(fill: Option<Fill>) -> Self {
        let base = match fill {
            Some(fill) => Format::new()
                .set_background_color(fill.color())
                .set_border(FormatBorder::Thin),
            None => Format::new().set_border(FormatBorder::Thin),
        };
        Self {
            text: base.clone(),
            number: base.clone().set_num_format("General"),
            date: base.set_num_format(DATE_FORMAT),
        }
    }
}

/// Reusable formats
struct ExcelFormats {
    header: Format,
    plain: CellFormats,
    green: CellFormats,
    yellow: CellFormats,
    orange: CellFormats,
    red: CellFormats,
}

impl ExcelFormats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        Self {
            header,
            plain: CellFormats::new(None),
            green: CellFormats::new(Some(Fill::Green)),
            yellow: CellFormats::new(Some(Fill::Yellow)),
            orange: CellFormats::new(Some(Fill::Orange)),
            red: CellFormats::new(Some(Fill::Red)),
        }
    }

    fn row(&self, fill: Option<Fill>) -> &CellFormats {
        match fill {
            None => &self.plain,
            Some(Fill::Green) => &self.green,
            Some(Fill::Yellow) => &self.yellow,
            Some(Fill::Orange) => &self.orange,
            Some(Fill::Red) => &self.red,
        }
    }
}

/// Fill-only format used by conditional rules
fn highlight_format(fill: Fill) -> Format {
    Format::new().set_background_color(fill.color())
}

/// Write every table as a worksheet and return the workbook bytes
fn write_workbook(tables: &[SheetTable]) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let formats = ExcelFormats::new();

    for table in tables {
        let sheet = workbook.add_worksheet();
        write_sheet(sheet, table, &formats)?;
        debug!(sheet = %table.name, rows = table.rows.len(), "Sheet written");
    }

    workbook
        .save_to_buffer()
        .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
}

fn write_sheet(sheet: &mut Worksheet, table: &SheetTable, formats: &ExcelFormats) -> Result<(), RenderError> {
    sheet
        .set_name(&table.name)
        .map_err(|e| RenderError::Format(e.to_string()))?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, header, &formats.header)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }

    for (i, cells) in table.rows.iter().enumerate() {
        let row = i as u32 + 1;
        let fill = table.row_fills.get(i).copied().flatten();
        let row_formats = formats.row(fill);
        for (col, value) in cells.iter().enumerate() {
            write_cell(sheet, row, col as u16, value, row_formats, fill.is_some())?;
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64).ok();
    }
    sheet.set_freeze_panes(1, 0).ok();

    let last_row = table.rows.len() as u32;
    let last_col = table.headers.len().saturating_sub(1) as u16;
    if table.autofilter && last_row > 0 {
        sheet
            .autofilter(0, 0, last_row, last_col)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }

    for (range, highlight) in &table.highlights {
        add_highlight(sheet, *range, *highlight)?;
    }

    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &CellFormats,
    fill_blanks: bool,
) -> Result<(), RenderError> {
    let result = match value {
        CellValue::Empty if fill_blanks => sheet.write_blank(row, col, &formats.text),
        CellValue::Empty => return Ok(()),
        CellValue::Text(s) => sheet.write_string_with_format(row, col, s, &formats.text),
        CellValue::Number(n) => sheet.write_number_with_format(row, col, *n, &formats.number),
        CellValue::Bool(b) => sheet.write_boolean_with_format(row, col, *b, &formats.text),
        CellValue::DateTime(dt) => sheet.write_datetime_with_format(row, col, dt, &formats.date),
    };
    result
        .map(|_| ())
        .map_err(|e| RenderError::Format(e.to_string()))
}

/// Column widths fitted to the longest header or value
fn column_widths(table: &SheetTable) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| match cell {
                    CellValue::DateTime(_) => DATE_FORMAT.len(),
                    other => other.as_text().map_or(0, |s| s.chars().count()),
                })
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn add_cell_rule(
    sheet: &mut Worksheet,
    range: CellRange,
    rule: ConditionalFormatCellRule<f64>,
    fill: Fill,
) -> Result<(), RenderError> {
    let format = ConditionalFormatCell::new()
        .set_rule(rule)
        .set_format(highlight_format(fill));
    sheet
        .add_conditional_format(range.first_row, range.first_col, range.last_row, range.last_col, &format)
        .map(|_| ())
        .map_err(|e| RenderError::Format(e.to_string()))
}

fn add_highlight(sheet: &mut Worksheet, range: CellRange, highlight: Highlight) -> Result<(), RenderError> {
    match highlight {
        Highlight::Percent { meta } => {
            // Earlier rules take priority over later ones
            add_cell_rule(sheet, range, ConditionalFormatCellRule::GreaterThanOrEqualTo(meta), Fill::Green)?;
            add_cell_rule(
                sheet,
                range,
                ConditionalFormatCellRule::GreaterThanOrEqualTo(meta - 5.0),
                Fill::Yellow,
            )?;
            add_cell_rule(sheet, range, ConditionalFormatCellRule::LessThan(meta - 5.0), Fill::Red)?;
        }
        Highlight::Comparison => {
            add_cell_rule(sheet, range, ConditionalFormatCellRule::GreaterThanOrEqualTo(0.0), Fill::Green)?;
            add_cell_rule(sheet, range, ConditionalFormatCellRule::LessThan(0.0), Fill::Red)?;
        }
        Highlight::Status => {
            for (label, fill) in [
                ("No Prazo", Fill::Green),
                ("Atrasado", Fill::Red),
                ("Pendente", Fill::Yellow),
            ] {
                let format = ConditionalFormatText::new()
                    .set_rule(ConditionalFormatTextRule::Contains(label.to_string()))
                    .set_format(highlight_format(fill));
                sheet
                    .add_conditional_format(
                        range.first_row,
                        range.first_col,
                        range.last_row,
                        range.last_col,
                        &format,
                    )
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }
        }
    }
    Ok(())
}

fn ensure_records(report: &Report) -> Result<(), RenderError> {
    if report.records.is_empty() {
        return Err(RenderError::InvalidData("No records to export".into()));
    }
    Ok(())
}

/// Write rendered bytes to a file
pub fn save(bytes: &[u8], path: &Path) -> Result<(), RenderError> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Workbook saved");
    Ok(())
}

// ============================================================================
// Renderers
// ============================================================================

/// Processed record workbook (`Base_Tratada.xlsx`)
#[derive(Clone, Debug)]
pub struct ProcessedRenderer {
    /// Worksheet name
    pub sheet_name: String,
}

impl Default for ProcessedRenderer {
    fn default() -> Self {
        Self {
            sheet_name: PROCESSED_SHEET.into(),
        }
    }
}

impl ProcessedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}

impl ReportRenderer for ProcessedRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        ensure_records(report)?;
        let table = records_table(&self.sheet_name, report.records.iter());
        write_workbook(std::slice::from_ref(&table))
    }
}

/// Full analysis workbook (`Analise_Chamados_Completa.xlsx`)
#[derive(Clone, Debug)]
pub struct AnalysisRenderer {
    /// Whether to include the calendar sheet
    pub include_calendar: bool,
}

impl Default for AnalysisRenderer {
    fn default() -> Self {
        Self {
            include_calendar: true,
        }
    }
}

impl AnalysisRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out the calendar sheet
    pub fn no_calendar(mut self) -> Self {
        self.include_calendar = false;
        self
    }

    /// Sheets this renderer writes for a report, in order
    pub fn tables(&self, report: &Report) -> Vec<SheetTable> {
        let mut tables = analysis_tables(report);
        if !self.include_calendar {
            tables.retain(|t| t.name != "Calendario");
        }
        tables
    }
}

impl ReportRenderer for AnalysisRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        ensure_records(report)?;
        let tables = self.tables(report);
        info!(sheets = tables.len(), "Rendering analysis workbook");
        write_workbook(&tables)
    }
}
