//! Tabular inputs: roster text, Polars grade tables and chart datasets.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};
use tracing::debug;

use crate::conf::{C_COL_AVERAGE_A, C_COL_AVERAGE_B, C_COL_CHART_STUDENT, C_COL_FINAL_GRADE, C_COL_STUDENT_NAME};
use crate::spec::{
    EnumAssessmentSetKey, EnumCellValue, GradebookError, GradebookResult, SpecChartDataset,
    SpecGradeTable, SpecGradingConfig,
};
use crate::stats::calculate_row_stats;

/// Computed columns that can be charted next to raw project columns.
pub const L_CHART_COMPUTED_COLUMNS: [&str; 3] = [C_COL_AVERAGE_A, C_COL_AVERAGE_B, C_COL_FINAL_GRADE];

////////////////////////////////////////////////////////////////////////////////
// #region Roster

/// One student name per line; blank lines and `#` comments are skipped.
pub fn parse_roster_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PolarsConversion

/// Decode Polars IPC bytes into a `DataFrame`.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> GradebookResult<DataFrame> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| GradebookError::Data(format!("Failed to read IPC DataFrame bytes: {err}")))
}

/// Build a grade table from a frame keyed by the `Student Name` column.
///
/// Only the first row of each student is read; every other column is a grade column.
pub fn derive_grade_table_from_dataframe(df: &DataFrame) -> GradebookResult<SpecGradeTable> {
    let col_student = df.column(C_COL_STUDENT_NAME).map_err(|_| {
        GradebookError::Data(format!("Grade table has no '{C_COL_STUDENT_NAME}' column."))
    })?;
    let l_cols_grade: Vec<_> = df
        .get_columns()
        .iter()
        .filter(|c_col| c_col.name().as_str() != C_COL_STUDENT_NAME)
        .collect();

    let mut table = SpecGradeTable::new();
    let mut set_students_seen = BTreeSet::new();
    for n_idx_row in 0..df.height() {
        let value = col_student
            .get(n_idx_row)
            .map_err(|err| GradebookError::Data(format!("Failed to read student name: {err}")))?;
        let student = match derive_cell_value_from_any_value(value) {
            EnumCellValue::String(s) => s,
            EnumCellValue::Number(n) => n.to_string(),
            _ => continue,
        };
        if !set_students_seen.insert(student.clone()) {
            continue;
        }

        for c_col in &l_cols_grade {
            let value = c_col
                .get(n_idx_row)
                .map_err(|err| GradebookError::Data(format!("Failed to read grade value: {err}")))?;
            table.insert(student.as_str(), c_col.name().as_str(), derive_cell_value_from_any_value(value));
        }
    }

    debug!(
        n_rows = df.height(),
        n_students = set_students_seen.len(),
        n_values = table.len(),
        "read grade table"
    );
    Ok(table)
}

/// Decode IPC bytes and build a grade table.
pub fn derive_grade_table_from_ipc_bytes(v_ipc_df: &[u8]) -> GradebookResult<SpecGradeTable> {
    derive_grade_table_from_dataframe(&derive_dataframe_from_ipc_bytes(v_ipc_df)?)
}

/// Build a chart dataset: first column is the category, the rest numeric series.
pub fn derive_chart_dataset_from_dataframe(df: &DataFrame) -> GradebookResult<SpecChartDataset> {
    let l_cols = df.get_columns();
    let mut dataset = SpecChartDataset::new(l_cols.iter().map(|c| c.name().to_string()).collect());
    let Some((col_category, l_cols_series)) = l_cols.split_first() else {
        return Ok(dataset);
    };

    for n_idx_row in 0..df.height() {
        let category = col_category
            .get(n_idx_row)
            .map_err(|err| GradebookError::Data(format!("Failed to read chart category: {err}")))?;
        let category = match category {
            AnyValue::Null => String::new(),
            AnyValue::String(val) => val.to_string(),
            AnyValue::StringOwned(val) => val.to_string(),
            other => other.to_string(),
        };

        let mut l_values = Vec::with_capacity(l_cols_series.len());
        for c_col in l_cols_series {
            let value = c_col
                .get(n_idx_row)
                .map_err(|err| GradebookError::Data(format!("Failed to read chart value: {err}")))?;
            l_values.push(derive_f64_from_any_value(value).filter(|n| n.is_finite()));
        }
        dataset.push_row(category, l_values);
    }

    Ok(dataset)
}

/// Decode IPC bytes and build a chart dataset.
pub fn derive_chart_dataset_from_ipc_bytes(v_ipc_df: &[u8]) -> GradebookResult<SpecChartDataset> {
    derive_chart_dataset_from_dataframe(&derive_dataframe_from_ipc_bytes(v_ipc_df)?)
}

fn derive_f64_from_any_value(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::UInt8(val) => Some(val as f64),
        AnyValue::UInt16(val) => Some(val as f64),
        AnyValue::UInt32(val) => Some(val as f64),
        AnyValue::UInt64(val) => Some(val as f64),
        AnyValue::Int8(val) => Some(val as f64),
        AnyValue::Int16(val) => Some(val as f64),
        AnyValue::Int32(val) => Some(val as f64),
        AnyValue::Int64(val) => Some(val as f64),
        AnyValue::Float32(val) => Some(val as f64),
        AnyValue::Float64(val) => Some(val),
        AnyValue::String(val) => val.trim().parse::<f64>().ok(),
        AnyValue::StringOwned(val) => val.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        other => match derive_f64_from_any_value(other.clone()) {
            Some(n) => EnumCellValue::Number(n),
            None => EnumCellValue::String(other.to_string()),
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ChartDatasetDerivation

/// Columns a chart may select: every project key plus the computed columns.
pub fn derive_selectable_chart_columns(config: &SpecGradingConfig) -> Vec<String> {
    let mut l_columns: Vec<String> = EnumAssessmentSetKey::ALL
        .iter()
        .flat_map(|key| config.set(*key).projects.iter().map(|p| key.column_key(p)))
        .collect();
    l_columns.extend(L_CHART_COMPUTED_COLUMNS.iter().map(|c| c.to_string()));
    l_columns
}

/// Freeze chart inputs from grade tables.
///
/// One series per (period with a grade table, selected column), named
/// `"<period> - <column>"`. Computed columns use the native grading arithmetic.
pub fn derive_chart_dataset(
    config: &SpecGradingConfig,
    roster: &[String],
    grades_by_period: &BTreeMap<String, SpecGradeTable>,
    selected_columns: &[String],
) -> SpecChartDataset {
    if roster.is_empty() || grades_by_period.is_empty() {
        return SpecChartDataset::default();
    }

    let mut l_columns = vec![C_COL_CHART_STUDENT.to_string()];
    let mut l_series: Vec<Vec<Option<f64>>> = Vec::new();
    for period in &config.trimesters {
        let Some(table) = grades_by_period.get(period) else {
            continue;
        };
        for column in selected_columns {
            l_columns.push(format!("{period} - {column}"));
            let l_values = roster
                .iter()
                .map(|student| {
                    if L_CHART_COMPUTED_COLUMNS.contains(&column.as_str()) {
                        calculate_row_stats(config, table, student).get(column)
                    } else {
                        table.get(student, column).and_then(EnumCellValue::as_number)
                    }
                })
                .collect();
            l_series.push(l_values);
        }
    }

    let mut dataset = SpecChartDataset::new(l_columns);
    for (n_idx_student, student) in roster.iter().enumerate() {
        let l_values = l_series.iter().map(|s| s[n_idx_student]).collect();
        dataset.push_row(student.as_str(), l_values);
    }
    dataset
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
