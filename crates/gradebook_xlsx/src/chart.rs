//! Chart sheet builder: literal data table plus one embedded chart.

use tracing::debug;

use crate::conf::{
    C_CHART_PLACEHOLDER, C_CHART_TITLE, C_CHART_X_AXIS, C_CHART_Y_AXIS, EnumFmtKey,
    N_CHART_HEIGHT_PX, N_CHART_STYLE, N_CHART_WIDTH_PX, N_WIDTH_CHART_COLUMN_MIN,
};
use crate::spec::{EnumCellValue, EnumChartKind, SpecChart, SpecChartDataset, SpecSheet};

/// Populate `sheet` from a frozen dataset; an empty dataset leaves a placeholder notice.
pub fn build_chart_sheet(sheet: &mut SpecSheet, dataset: &SpecChartDataset, kind: EnumChartKind) {
    if dataset.is_empty() {
        sheet.write_string(1, 1, C_CHART_PLACEHOLDER, None);
        debug!(sheet = %sheet.name, "chart dataset empty; wrote placeholder");
        return;
    }

    let n_row_header = 1;
    for (idx, column) in dataset.columns.iter().enumerate() {
        let n_col = idx + 1;
        sheet.write_string(n_row_header, n_col, column.as_str(), Some(EnumFmtKey::HeaderMain));
        let n_width = (column.chars().count() + 2) as f64;
        sheet.set_column_width(n_col, n_width.max(N_WIDTH_CHART_COLUMN_MIN));
    }

    for (idx, row) in dataset.rows.iter().enumerate() {
        let n_row = n_row_header + 1 + idx;
        sheet.write_string(n_row, 1, row.category.as_str(), Some(EnumFmtKey::BodyGrade));
        for (idx_value, value) in row.values.iter().enumerate() {
            let value = value.map_or(EnumCellValue::None, EnumCellValue::Number);
            sheet.write(n_row, idx_value + 2, value, Some(EnumFmtKey::BodyGrade));
        }
    }

    let n_row_last = n_row_header + dataset.rows.len();
    if dataset.n_series() > 0 {
        sheet.chart = Some(SpecChart {
            kind,
            title: C_CHART_TITLE.to_string(),
            x_axis_title: C_CHART_X_AXIS.to_string(),
            y_axis_title: C_CHART_Y_AXIS.to_string(),
            row_header: n_row_header,
            row_last: n_row_last,
            col_category: 1,
            col_series_start: 2,
            col_series_end: dataset.columns.len(),
            row_anchor: n_row_last + 3,
            col_anchor: 1,
            width: N_CHART_WIDTH_PX,
            height: N_CHART_HEIGHT_PX,
            style: N_CHART_STYLE,
        });
    }

    debug!(
        sheet = %sheet.name,
        n_rows = dataset.rows.len(),
        n_series = dataset.n_series(),
        "built chart sheet"
    );
}
