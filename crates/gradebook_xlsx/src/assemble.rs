//! Workbook assembler: orders and builds every sheet of one gradebook.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::chart::build_chart_sheet;
use crate::conf::{
    C_SHEET_NAME_CHART, C_SHEET_NAME_INSTRUCTIONS, C_SHEET_NAME_SUMMARY, EnumFmtKey,
    N_WIDTH_INSTRUCTIONS, derive_default_gradebook_formats,
};
use crate::grade::build_grade_sheet;
use crate::layout::check_grading_config;
use crate::spec::{
    EnumAssessmentSetKey, EnumChartKind, GradebookResult, SpecChartDataset, SpecGradeTable,
    SpecGradingConfig, SpecSheet, SpecWorkbookDocument,
};
use crate::summary::build_summary_sheet;
use crate::util::{format_number_literal, format_weight_percent};

/// Borrowed inputs of one generation call.
#[derive(Debug, Clone, Copy)]
pub struct SpecGradebookInputs<'a> {
    /// Grading configuration.
    pub config: &'a SpecGradingConfig,
    /// Ordered student names.
    pub roster: &'a [String],
    /// Grade tables keyed by period name; missing periods get empty sheets.
    pub grades_by_period: Option<&'a BTreeMap<String, SpecGradeTable>>,
    /// Frozen chart dataset.
    pub chart_dataset: Option<&'a SpecChartDataset>,
    /// Chart kind; the chart sheet needs both this and a non-empty dataset.
    pub chart_kind: Option<EnumChartKind>,
}

impl<'a> SpecGradebookInputs<'a> {
    /// Inputs with no grades and no chart.
    pub fn new(config: &'a SpecGradingConfig, roster: &'a [String]) -> Self {
        Self {
            config,
            roster,
            grades_by_period: None,
            chart_dataset: None,
            chart_kind: None,
        }
    }

    pub fn with_grades(mut self, grades_by_period: &'a BTreeMap<String, SpecGradeTable>) -> Self {
        self.grades_by_period = Some(grades_by_period);
        self
    }

    pub fn with_chart(mut self, dataset: &'a SpecChartDataset, kind: EnumChartKind) -> Self {
        self.chart_dataset = Some(dataset);
        self.chart_kind = Some(kind);
        self
    }
}

/// Build the full gradebook document.
///
/// Sheet order: Instructions, one grade sheet per period, Total, then Charts
/// when a non-empty dataset and a chart kind are both supplied.
pub fn generate_workbook(inputs: SpecGradebookInputs<'_>) -> GradebookResult<SpecWorkbookDocument> {
    let config = inputs.config;
    check_grading_config(config)?;

    let mut l_sheets = Vec::with_capacity(config.trimesters.len() + 3);
    l_sheets.push(build_instructions_sheet(config));

    for period in &config.trimesters {
        let grade_table = inputs.grades_by_period.and_then(|m| m.get(period));
        let mut sheet = SpecSheet::new(period.as_str());
        build_grade_sheet(&mut sheet, inputs.roster, config, grade_table)?;
        l_sheets.push(sheet);
    }

    let mut sheet_summary = SpecSheet::new(C_SHEET_NAME_SUMMARY);
    build_summary_sheet(&mut sheet_summary, inputs.roster, config)?;
    l_sheets.push(sheet_summary);

    if let (Some(dataset), Some(kind)) = (inputs.chart_dataset, inputs.chart_kind) {
        if dataset.is_empty() {
            debug!("chart dataset empty; skipping chart sheet");
        } else {
            let mut sheet_chart = SpecSheet::new(C_SHEET_NAME_CHART);
            build_chart_sheet(&mut sheet_chart, dataset, kind);
            l_sheets.push(sheet_chart);
        }
    }

    info!(
        n_sheets = l_sheets.len(),
        n_students = inputs.roster.len(),
        n_periods = config.trimesters.len(),
        "generated gradebook workbook"
    );

    Ok(SpecWorkbookDocument {
        sheets: l_sheets,
        formats: derive_default_gradebook_formats(config.scale.decimal_places),
        file_out_default: config.output_file.clone(),
    })
}

/// Literal text sheet describing how to use the workbook and the active configuration.
pub fn build_instructions_sheet(config: &SpecGradingConfig) -> SpecSheet {
    let mut sheet = SpecSheet::new(C_SHEET_NAME_INSTRUCTIONS);
    let c_min = format_number_literal(config.scale.min);
    let c_max = format_number_literal(config.scale.max);

    sheet.write_string(1, 1, "Student Grading Matrix", Some(EnumFmtKey::Title));
    sheet.write_string(3, 1, "How to use:", Some(EnumFmtKey::Bold));
    sheet.write_string(
        4,
        1,
        format!("1. Go to each Trimester tab and enter grades ({c_min}-{c_max})"),
        None,
    );
    sheet.write_string(5, 1, "2. Averages, Final Grade, and Qualitative calculate automatically", None);
    sheet.write_string(6, 1, "3. The Total tab shows all trimester summaries and year average", None);
    sheet.write_string(8, 1, "Configuration:", Some(EnumFmtKey::Bold));

    let mut n_row = 9;
    sheet.write_string(n_row, 1, format!("Grade Scale: {c_min} - {c_max}"), None);
    for key in EnumAssessmentSetKey::ALL {
        let set = config.set(key);
        let c_label = key.label();
        n_row += 1;
        sheet.write_string(
            n_row,
            1,
            format!("Set {c_label} Weight: {}%", format_weight_percent(set.weight)),
            None,
        );
        n_row += 1;
        sheet.write_string(
            n_row,
            1,
            format!("Set {c_label} Projects: {}", set.projects.join(", ")),
            None,
        );
    }

    if !config.qualitative_grades.is_empty() {
        n_row += 2;
        sheet.write_string(n_row, 1, "Qualitative Grade Ranges:", Some(EnumFmtKey::Bold));
        for band in &config.qualitative_grades {
            n_row += 1;
            sheet.write_string(
                n_row,
                1,
                format!(
                    "  {}: {} - {}",
                    band.label,
                    format_number_literal(band.min),
                    format_number_literal(band.max)
                ),
                None,
            );
        }
    }

    sheet.set_column_width(1, N_WIDTH_INSTRUCTIONS);
    sheet
}
