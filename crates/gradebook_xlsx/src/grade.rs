//! Grade sheet builder: one worksheet per grading period.

use tracing::debug;

use crate::conf::{
    C_COL_AVERAGE_A, C_COL_AVERAGE_B, C_COL_FINAL_GRADE, C_COL_QUALITATIVE, C_COL_STUDENT_NAME,
    EnumFmtKey, N_ROW_GRADE_DATA_START, N_ROW_GRADE_HEADER_GROUP, N_ROW_GRADE_HEADER_PROJECT,
    N_WIDTH_AVERAGE, N_WIDTH_FINAL, N_WIDTH_PROJECT, N_WIDTH_QUALITATIVE, N_WIDTH_STUDENT,
};
use crate::formula::{
    derive_bounded_average_formula, derive_cell_ref, derive_qualitative_formula,
    derive_row_range_ref, derive_weighted_final_formula,
};
use crate::layout::plan_grade_sheet_columns_for_config;
use crate::spec::{
    EnumAssessmentSetKey, EnumCellValue, GradebookResult, SpecGradeSheetLayout, SpecGradeTable,
    SpecGradingConfig, SpecSheet,
};
use crate::util::{format_weight_percent, plan_horizontal_merges};

/// Header text of a set's average column, e.g. `Avg A`.
pub fn derive_average_header(key: EnumAssessmentSetKey) -> &'static str {
    match key {
        EnumAssessmentSetKey::A => C_COL_AVERAGE_A,
        EnumAssessmentSetKey::B => C_COL_AVERAGE_B,
    }
}

/// Group label of a set, e.g. `Set A (70%)`.
pub fn derive_set_group_label(config: &SpecGradingConfig, key: EnumAssessmentSetKey) -> String {
    let set = config.set(key);
    format!("{} ({}%)", set.name, format_weight_percent(set.weight))
}

fn derive_set_header_fmt(key: EnumAssessmentSetKey) -> EnumFmtKey {
    match key {
        EnumAssessmentSetKey::A => EnumFmtKey::HeaderSetA,
        EnumAssessmentSetKey::B => EnumFmtKey::HeaderSetB,
    }
}

/// Populate `sheet` as a grade sheet for `roster`, seeding literals from `grade_table`.
pub fn build_grade_sheet(
    sheet: &mut SpecSheet,
    roster: &[String],
    config: &SpecGradingConfig,
    grade_table: Option<&SpecGradeTable>,
) -> GradebookResult<SpecGradeSheetLayout> {
    let layout = plan_grade_sheet_columns_for_config(config)?;
    write_grade_header(sheet, config, &layout);

    let mut n_literals = 0usize;
    for (idx, student) in roster.iter().enumerate() {
        let n_row = N_ROW_GRADE_DATA_START + idx;
        sheet.write_string(n_row, layout.col_student, student.as_str(), Some(EnumFmtKey::Border));

        for key in EnumAssessmentSetKey::ALL {
            let (n_col_start, n_col_end) = layout.project_range(key);
            for (n_col, project) in (n_col_start..=n_col_end).zip(&config.set(key).projects) {
                let value = grade_table
                    .and_then(|t| t.get(student, &key.column_key(project)))
                    .cloned()
                    .unwrap_or(EnumCellValue::None);
                if !value.is_blank() {
                    n_literals += 1;
                }
                sheet.write(n_row, n_col, value, Some(EnumFmtKey::BodyGrade));
            }

            let c_range = derive_row_range_ref(n_row, n_col_start, n_col_end);
            sheet.write_formula(
                n_row,
                layout.col_average(key),
                derive_bounded_average_formula(&c_range),
                Some(EnumFmtKey::BodyAverage),
            );
        }

        sheet.write_formula(
            n_row,
            layout.col_final,
            derive_weighted_final_formula(
                &derive_cell_ref(n_row, layout.col_avg_a),
                config.set_a.weight,
                &derive_cell_ref(n_row, layout.col_avg_b),
                config.set_b.weight,
            ),
            Some(EnumFmtKey::BodyFinal),
        );

        let c_qualitative = derive_qualitative_formula(
            &derive_cell_ref(n_row, layout.col_final),
            &config.qualitative_grades,
        );
        if c_qualitative.is_empty() {
            sheet.write_blank(n_row, layout.col_qualitative, Some(EnumFmtKey::BodyQualitative));
        } else {
            sheet.write_formula(
                n_row,
                layout.col_qualitative,
                c_qualitative,
                Some(EnumFmtKey::BodyQualitative),
            );
        }
    }

    sheet.set_column_width(layout.col_student, N_WIDTH_STUDENT);
    for key in EnumAssessmentSetKey::ALL {
        let (n_col_start, n_col_end) = layout.project_range(key);
        for n_col in n_col_start..=n_col_end {
            sheet.set_column_width(n_col, N_WIDTH_PROJECT);
        }
        sheet.set_column_width(layout.col_average(key), N_WIDTH_AVERAGE);
    }
    sheet.set_column_width(layout.col_final, N_WIDTH_FINAL);
    sheet.set_column_width(layout.col_qualitative, N_WIDTH_QUALITATIVE);
    sheet.freeze_panes = Some((N_ROW_GRADE_HEADER_PROJECT, layout.col_student));

    debug!(
        sheet = %sheet.name,
        n_students = roster.len(),
        n_literals,
        "built grade sheet"
    );
    Ok(layout)
}

fn write_grade_header(sheet: &mut SpecSheet, config: &SpecGradingConfig, layout: &SpecGradeSheetLayout) {
    let n_row_group = N_ROW_GRADE_HEADER_GROUP;
    let n_row_project = N_ROW_GRADE_HEADER_PROJECT;

    let mut l_group_labels = vec![String::new(); layout.width()];
    l_group_labels[layout.col_student - 1] = C_COL_STUDENT_NAME.to_string();
    l_group_labels[layout.col_final - 1] = C_COL_FINAL_GRADE.to_string();
    l_group_labels[layout.col_qualitative - 1] = C_COL_QUALITATIVE.to_string();

    sheet.write_string(n_row_group, layout.col_student, C_COL_STUDENT_NAME, Some(EnumFmtKey::HeaderMain));
    sheet.write_blank(n_row_project, layout.col_student, Some(EnumFmtKey::Border));

    for key in EnumAssessmentSetKey::ALL {
        let c_group = derive_set_group_label(config, key);
        let fmt_set = Some(derive_set_header_fmt(key));
        let (n_col_start, n_col_end) = layout.project_range(key);
        for (n_col, project) in (n_col_start..=n_col_end).zip(&config.set(key).projects) {
            l_group_labels[n_col - 1] = c_group.clone();
            sheet.write_string(n_row_group, n_col, c_group.as_str(), fmt_set);
            sheet.write_string(n_row_project, n_col, project.as_str(), Some(EnumFmtKey::HeaderProject));
        }

        let n_col_avg = layout.col_average(key);
        let c_avg = derive_average_header(key);
        sheet.write_string(n_row_group, n_col_avg, c_avg, Some(EnumFmtKey::HeaderAverage));
        sheet.write_blank(n_row_project, n_col_avg, Some(EnumFmtKey::Border));
        l_group_labels[n_col_avg - 1] = c_avg.to_string();
    }

    sheet.write_string(n_row_group, layout.col_final, C_COL_FINAL_GRADE, Some(EnumFmtKey::HeaderFinal));
    sheet.write_blank(n_row_project, layout.col_final, Some(EnumFmtKey::Border));
    sheet.write_string(
        n_row_group,
        layout.col_qualitative,
        C_COL_QUALITATIVE,
        Some(EnumFmtKey::HeaderQualitative),
    );
    sheet.write_blank(n_row_project, layout.col_qualitative, Some(EnumFmtKey::Border));

    for merge in plan_horizontal_merges(&[l_group_labels], n_row_group, layout.col_student) {
        sheet.merge_range(merge.row_idx_start, merge.col_idx_start, merge.col_idx_end, merge.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecAssessmentSet;

    fn create_config() -> SpecGradingConfig {
        SpecGradingConfig {
            set_a: SpecAssessmentSet {
                name: "Set A".to_string(),
                weight: 0.7,
                projects: vec!["P1".to_string(), "P2".to_string()],
            },
            set_b: SpecAssessmentSet {
                name: "Set B".to_string(),
                weight: 0.3,
                projects: vec!["P1".to_string()],
            },
            ..SpecGradingConfig::default()
        }
    }

    #[test]
    fn test_build_grade_sheet_header_merges_only_multi_project_sets() {
        let cfg = create_config();
        let mut sheet = SpecSheet::new("T1");
        build_grade_sheet(&mut sheet, &[], &cfg, None).unwrap();

        assert_eq!(sheet.merges.len(), 1);
        assert_eq!(sheet.merges[0].text, "Set A (70%)");
        assert_eq!((sheet.merges[0].col_idx_start, sheet.merges[0].col_idx_end), (2, 3));
        assert_eq!(
            sheet.value(1, 5),
            Some(&EnumCellValue::String("Set B (30%)".to_string()))
        );
        assert_eq!(sheet.value(2, 3), Some(&EnumCellValue::String("P2".to_string())));
        assert_eq!(sheet.value(1, 4), Some(&EnumCellValue::String("Avg A".to_string())));
        assert_eq!(sheet.value(1, 8), Some(&EnumCellValue::String("Qualitative".to_string())));
    }

    #[test]
    fn test_build_grade_sheet_seeds_literals_and_formulas() {
        let cfg = create_config();
        let mut table = SpecGradeTable::new();
        table.insert("Alice", "A_P1", EnumCellValue::Number(80.0));
        table.insert("Alice", "B_P1", EnumCellValue::String("absent".to_string()));
        let roster = vec!["Alice".to_string(), "Bob".to_string()];

        let mut sheet = SpecSheet::new("T1");
        let layout = build_grade_sheet(&mut sheet, &roster, &cfg, Some(&table)).unwrap();

        assert_eq!(sheet.value(3, 2), Some(&EnumCellValue::Number(80.0)));
        assert_eq!(sheet.value(3, 3), Some(&EnumCellValue::None));
        assert_eq!(sheet.value(3, 5), Some(&EnumCellValue::String("absent".to_string())));
        assert_eq!(
            sheet.formula(3, layout.col_avg_a),
            Some("=IF(COUNT(B3:C3)>0,AVERAGE(B3:C3),\"\")")
        );
        assert_eq!(sheet.formula(4, layout.col_avg_b), Some("=IF(COUNT(E4:E4)>0,AVERAGE(E4:E4),\"\")"));
        assert!(sheet.formula(4, layout.col_qualitative).is_some());
        assert_eq!(sheet.freeze_panes, Some((2, 1)));
    }

    #[test]
    fn test_build_grade_sheet_without_bands_writes_blank_qualitative() {
        let cfg = SpecGradingConfig {
            qualitative_grades: vec![],
            ..create_config()
        };
        let mut sheet = SpecSheet::new("T1");
        let layout = build_grade_sheet(&mut sheet, &["Alice".to_string()], &cfg, None).unwrap();
        assert_eq!(sheet.value(3, layout.col_qualitative), Some(&EnumCellValue::None));
    }
}
