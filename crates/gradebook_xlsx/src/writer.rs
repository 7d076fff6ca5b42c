//! XLSX writer kernel that renders a gradebook document into workbook output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Chart, ChartType, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use crate::conf::{EnumFmtKey, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, EnumChartKind, GradebookError, GradebookResult, SpecCellFormat, SpecChart,
    SpecSheet, SpecWorkbookDocument,
};
use crate::util::derive_horizontal_merge_tracker;

/// Stateful workbook writer.
///
/// Documents are buffered in memory until [`Self::close`] is called.
pub struct GradebookWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    l_sheet_names: Vec<String>,
    if_closed: bool,
}

impl GradebookWriter {
    /// Create writer bound to an output path.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            l_sheet_names: Vec::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Names of sheets written so far, in order.
    pub fn sheet_names(&self) -> &[String] {
        &self.l_sheet_names
    }

    /// Render every sheet of `doc` into the buffered workbook.
    pub fn write_document(&mut self, doc: &SpecWorkbookDocument) -> GradebookResult<()> {
        if self.if_closed {
            return Err(GradebookError::WriterClosed);
        }
        render_document(&mut self.workbook, doc)?;
        self.l_sheet_names
            .extend(doc.sheets.iter().map(|s| s.name.clone()));
        Ok(())
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> GradebookResult<()> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        debug!(file_out = %self.file_out(), n_sheets = self.l_sheet_names.len(), "saved workbook");
        Ok(())
    }
}

/// Render `doc` and save it to `path_file_out`.
pub fn save_document(doc: &SpecWorkbookDocument, path_file_out: impl AsRef<Path>) -> GradebookResult<()> {
    let mut writer = GradebookWriter::new(path_file_out.as_ref());
    writer.write_document(doc)?;
    writer.close()
}

/// Render `doc` into an in-memory OOXML package.
pub fn save_document_to_buffer(doc: &SpecWorkbookDocument) -> GradebookResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    render_document(&mut workbook, doc)?;
    let v_buf = workbook.save_to_buffer()?;
    debug!(n_bytes = v_buf.len(), n_sheets = doc.sheets.len(), "saved workbook to buffer");
    Ok(v_buf)
}

fn render_document(workbook: &mut Workbook, doc: &SpecWorkbookDocument) -> GradebookResult<()> {
    let dict_formats: BTreeMap<EnumFmtKey, Format> = doc
        .formats
        .iter()
        .map(|(key, spec)| (*key, derive_rust_xlsx_format(spec)))
        .collect();

    for sheet in &doc.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;
        write_sheet(worksheet, sheet, &dict_formats)?;
    }
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SpecSheet,
    dict_formats: &BTreeMap<EnumFmtKey, Format>,
) -> GradebookResult<()> {
    let fmt_default = Format::new();
    let derive_format = |key: Option<EnumFmtKey>| {
        key.and_then(|k| dict_formats.get(&k))
            .unwrap_or(&fmt_default)
    };

    let set_merged_cells = derive_horizontal_merge_tracker(&sheet.merges);
    for ((n_row, n_col), cell) in sheet.cells() {
        if set_merged_cells.contains(&(*n_row, *n_col)) {
            continue;
        }
        write_cell_with_format(worksheet, *n_row, *n_col, &cell.value, derive_format(cell.fmt))?;
    }

    for merge in &sheet.merges {
        let fmt_anchor = derive_format(
            sheet
                .cell(merge.row_idx_start, merge.col_idx_start)
                .and_then(|c| c.fmt),
        );
        worksheet.merge_range(
            cast_row_num(merge.row_idx_start)?,
            cast_col_num(merge.col_idx_start)?,
            cast_row_num(merge.row_idx_start)?,
            cast_col_num(merge.col_idx_end)?,
            &merge.text,
            fmt_anchor,
        )?;
    }

    for (n_col, width) in &sheet.widths_by_col {
        worksheet.set_column_width(cast_col_num(*n_col)?, *width)?;
    }

    if let Some((n_rows_frozen, n_cols_frozen)) = sheet.freeze_panes {
        worksheet.set_freeze_panes(
            u32::try_from(n_rows_frozen)
                .map_err(|_| GradebookError::IndexOverflow(format!("freeze row: {n_rows_frozen}")))?,
            u16::try_from(n_cols_frozen)
                .map_err(|_| GradebookError::IndexOverflow(format!("freeze column: {n_cols_frozen}")))?,
        )?;
    }

    if let Some(spec_chart) = &sheet.chart {
        let chart = derive_rust_xlsx_chart(&sheet.name, spec_chart)?;
        worksheet.insert_chart(
            cast_row_num(spec_chart.row_anchor)?,
            cast_col_num(spec_chart.col_anchor)?,
            &chart,
        )?;
    }

    debug!(sheet = %sheet.name, n_merges = sheet.merges.len(), "wrote sheet");
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: usize,
    n_col: usize,
    value: &EnumCellValue,
    format: &Format,
) -> GradebookResult<()> {
    let row_idx = cast_row_num(n_row)?;
    let col_idx = cast_col_num(n_col)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(row_idx, col_idx, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(row_idx, col_idx, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(row_idx, col_idx, *val, format)?;
        }
        EnumCellValue::Formula(val) => {
            worksheet.write_formula_with_format(row_idx, col_idx, val.as_str(), format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_chart(sheet_name: &str, spec: &SpecChart) -> GradebookResult<Chart> {
    let chart_type = match spec.kind {
        EnumChartKind::Bar => ChartType::Column,
        EnumChartKind::Line => ChartType::Line,
        EnumChartKind::Area => ChartType::Area,
    };
    let mut chart = Chart::new(chart_type);
    chart.title().set_name(spec.title.as_str());
    chart.x_axis().set_name(spec.x_axis_title.as_str());
    chart.y_axis().set_name(spec.y_axis_title.as_str());
    chart
        .set_style(spec.style)
        .set_width(spec.width)
        .set_height(spec.height);

    let row_header = cast_row_num(spec.row_header)?;
    let row_first = cast_row_num(spec.row_header + 1)?;
    let row_last = cast_row_num(spec.row_last)?;
    let col_category = cast_col_num(spec.col_category)?;
    for n_col in spec.col_series_start..=spec.col_series_end {
        let col_idx = cast_col_num(n_col)?;
        chart
            .add_series()
            .set_name((sheet_name, row_header, col_idx))
            .set_categories((sheet_name, row_first, col_category, row_last, col_category))
            .set_values((sheet_name, row_first, col_idx, row_last, col_idx));
    }

    Ok(chart)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

/// 1-based document row to 0-based worksheet row.
fn cast_row_num(value: usize) -> GradebookResult<u32> {
    if value == 0 || value > N_NROWS_EXCEL_MAX {
        return Err(GradebookError::IndexOverflow(format!("row number out of range: {value}")));
    }
    u32::try_from(value - 1).map_err(|_| GradebookError::IndexOverflow(format!("row number: {value}")))
}

/// 1-based document column to 0-based worksheet column.
fn cast_col_num(value: usize) -> GradebookResult<u16> {
    if value == 0 || value > N_NCOLS_EXCEL_MAX {
        return Err(GradebookError::IndexOverflow(format!("column number out of range: {value}")));
    }
    u16::try_from(value - 1).map_err(|_| GradebookError::IndexOverflow(format!("column number: {value}")))
}
