//! Column layout planning for grade and summary sheets.

use crate::conf::N_NCOLS_EXCEL_MAX;
use crate::spec::{
    GradebookError, GradebookResult, SpecGradeSheetLayout, SpecGradingConfig,
    SpecSummarySheetLayout,
};

/// Assign 1-based grade sheet columns from the two set sizes.
///
/// Order: student, Set A projects, Avg A, Set B projects, Avg B, Final, Qualitative.
pub fn plan_grade_sheet_columns(
    n_projects_a: usize,
    n_projects_b: usize,
) -> GradebookResult<SpecGradeSheetLayout> {
    if n_projects_a == 0 || n_projects_b == 0 {
        return Err(GradebookError::Configuration(format!(
            "Both assessment sets need at least one project (got {n_projects_a} and {n_projects_b})."
        )));
    }

    let col_student = 1;
    let col_set_a_start = col_student + 1;
    let col_set_a_end = col_set_a_start + n_projects_a - 1;
    let col_avg_a = col_set_a_end + 1;
    let col_set_b_start = col_avg_a + 1;
    let col_set_b_end = col_set_b_start + n_projects_b - 1;
    let col_avg_b = col_set_b_end + 1;
    let col_final = col_avg_b + 1;
    let col_qualitative = col_final + 1;

    if col_qualitative > N_NCOLS_EXCEL_MAX {
        return Err(GradebookError::Configuration(format!(
            "Grade sheet needs {col_qualitative} columns; Excel allows {N_NCOLS_EXCEL_MAX}."
        )));
    }

    Ok(SpecGradeSheetLayout {
        col_student,
        col_set_a_start,
        col_set_a_end,
        col_avg_a,
        col_set_b_start,
        col_set_b_end,
        col_avg_b,
        col_final,
        col_qualitative,
    })
}

/// Grade sheet layout for a configuration.
pub fn plan_grade_sheet_columns_for_config(
    config: &SpecGradingConfig,
) -> GradebookResult<SpecGradeSheetLayout> {
    plan_grade_sheet_columns(config.set_a.projects.len(), config.set_b.projects.len())
}

/// Assign 1-based summary sheet columns for `n_periods` periods.
pub fn plan_summary_sheet_columns(n_periods: usize) -> SpecSummarySheetLayout {
    let col_student = 1;
    let cols_by_period = (0..n_periods)
        .map(|i| (col_student + 1 + 2 * i, col_student + 2 + 2 * i))
        .collect();
    let col_year_average = col_student + 1 + 2 * n_periods;

    SpecSummarySheetLayout {
        col_student,
        cols_by_period,
        col_year_average,
        col_year_qualitative: col_year_average + 1,
    }
}

/// Reject configurations no workbook can be built from.
pub fn check_grading_config(config: &SpecGradingConfig) -> GradebookResult<()> {
    plan_grade_sheet_columns_for_config(config)?;
    if config.scale.min.is_nan() || config.scale.max.is_nan() || config.scale.max <= config.scale.min {
        return Err(GradebookError::Configuration(format!(
            "Scale max ({}) must be greater than scale min ({}).",
            config.scale.max, config.scale.min
        )));
    }
    Ok(())
}
