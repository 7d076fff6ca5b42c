//! Summary ("Total") sheet builder.

use tracing::debug;

use crate::conf::{
    C_COL_STUDENT_NAME, C_COL_YEAR_AVERAGE, C_COL_YEAR_QUALITATIVE, EnumFmtKey,
    N_ROW_GRADE_DATA_START, N_ROW_SUMMARY_DATA_START, N_ROW_SUMMARY_HEADER, N_WIDTH_STUDENT,
    N_WIDTH_SUMMARY_GRADE, N_WIDTH_SUMMARY_QUALITATIVE,
};
use crate::formula::{
    derive_bounded_average_formula_for_cells, derive_cell_ref, derive_cross_sheet_ref_formula,
    derive_qualitative_formula,
};
use crate::layout::{plan_grade_sheet_columns_for_config, plan_summary_sheet_columns};
use crate::spec::{GradebookResult, SpecGradingConfig, SpecSheet, SpecSummarySheetLayout};

/// Populate `sheet` with one row per student referencing every period sheet.
pub fn build_summary_sheet(
    sheet: &mut SpecSheet,
    roster: &[String],
    config: &SpecGradingConfig,
) -> GradebookResult<SpecSummarySheetLayout> {
    let layout_grade = plan_grade_sheet_columns_for_config(config)?;
    let layout = plan_summary_sheet_columns(config.trimesters.len());

    let n_row_header = N_ROW_SUMMARY_HEADER;
    sheet.write_string(n_row_header, layout.col_student, C_COL_STUDENT_NAME, Some(EnumFmtKey::HeaderMain));
    for (period, (n_col_grade, n_col_qual)) in config.trimesters.iter().zip(&layout.cols_by_period) {
        sheet.write_string(
            n_row_header,
            *n_col_grade,
            format!("{period} Grade"),
            Some(EnumFmtKey::HeaderPeriodGrade),
        );
        sheet.write_string(
            n_row_header,
            *n_col_qual,
            format!("{period} Qual"),
            Some(EnumFmtKey::HeaderQualitative),
        );
    }
    sheet.write_string(n_row_header, layout.col_year_average, C_COL_YEAR_AVERAGE, Some(EnumFmtKey::HeaderFinal));
    sheet.write_string(
        n_row_header,
        layout.col_year_qualitative,
        C_COL_YEAR_QUALITATIVE,
        Some(EnumFmtKey::HeaderYearQualitative),
    );

    for (idx, student) in roster.iter().enumerate() {
        let n_row = N_ROW_SUMMARY_DATA_START + idx;
        let n_row_src = N_ROW_GRADE_DATA_START + idx;
        sheet.write_string(n_row, layout.col_student, student.as_str(), Some(EnumFmtKey::Border));

        let c_final_src = derive_cell_ref(n_row_src, layout_grade.col_final);
        let c_qual_src = derive_cell_ref(n_row_src, layout_grade.col_qualitative);
        let mut l_grade_cells = Vec::with_capacity(layout.cols_by_period.len());
        for (period, (n_col_grade, n_col_qual)) in config.trimesters.iter().zip(&layout.cols_by_period) {
            sheet.write_formula(
                n_row,
                *n_col_grade,
                derive_cross_sheet_ref_formula(period, &c_final_src),
                Some(EnumFmtKey::BodyPeriodGrade),
            );
            sheet.write_formula(
                n_row,
                *n_col_qual,
                derive_cross_sheet_ref_formula(period, &c_qual_src),
                Some(EnumFmtKey::BodyQualitative),
            );
            l_grade_cells.push(derive_cell_ref(n_row, *n_col_grade));
        }

        let c_year_average = derive_bounded_average_formula_for_cells(&l_grade_cells);
        if c_year_average.is_empty() {
            sheet.write_blank(n_row, layout.col_year_average, Some(EnumFmtKey::BodyFinal));
        } else {
            sheet.write_formula(n_row, layout.col_year_average, c_year_average, Some(EnumFmtKey::BodyFinal));
        }

        let c_year_qual = derive_qualitative_formula(
            &derive_cell_ref(n_row, layout.col_year_average),
            &config.qualitative_grades,
        );
        if c_year_qual.is_empty() {
            sheet.write_blank(n_row, layout.col_year_qualitative, Some(EnumFmtKey::BodyYearQualitative));
        } else {
            sheet.write_formula(
                n_row,
                layout.col_year_qualitative,
                c_year_qual,
                Some(EnumFmtKey::BodyYearQualitative),
            );
        }
    }

    sheet.set_column_width(layout.col_student, N_WIDTH_STUDENT);
    for (n_col_grade, n_col_qual) in &layout.cols_by_period {
        sheet.set_column_width(*n_col_grade, N_WIDTH_SUMMARY_GRADE);
        sheet.set_column_width(*n_col_qual, N_WIDTH_SUMMARY_QUALITATIVE);
    }
    sheet.set_column_width(layout.col_year_average, N_WIDTH_SUMMARY_GRADE);
    sheet.set_column_width(layout.col_year_qualitative, N_WIDTH_SUMMARY_QUALITATIVE);
    sheet.freeze_panes = Some((N_ROW_SUMMARY_HEADER, layout.col_student));

    debug!(
        sheet = %sheet.name,
        n_students = roster.len(),
        n_periods = config.trimesters.len(),
        "built summary sheet"
    );
    Ok(layout)
}
