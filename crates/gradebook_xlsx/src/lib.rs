//! `gradebook_xlsx` v1:
//! Gradebook workbook synthesis with live spreadsheet formulas.
//!
//! Modules:
//! - `conf`     : constants, default presets and configuration parsing
//! - `spec`     : specs/models/errors and the in-memory document
//! - `util`     : pure helper functions
//! - `layout`   : grade/summary column planning
//! - `formula`  : formula text builders
//! - `grade`    : per-period grade sheet builder
//! - `summary`  : cross-period "Total" sheet builder
//! - `chart`    : chart sheet builder
//! - `assemble` : workbook assembler
//! - `stats`    : native grading arithmetic
//! - `dataset`  : roster text and Polars table conversion
//! - `validate` : non-fatal validation pass
//! - `writer`   : `rust_xlsxwriter` rendering kernel
pub mod assemble;
pub mod chart;
pub mod conf;
pub mod dataset;
pub mod formula;
pub mod grade;
pub mod layout;
pub mod spec;
pub mod stats;
pub mod summary;
pub mod util;
pub mod validate;
pub mod writer;

pub use assemble::{SpecGradebookInputs, build_instructions_sheet, generate_workbook};
pub use conf::{
    EnumFmtKey, derive_default_gradebook_formats, derive_default_grading_config,
    derive_default_grading_config_json, parse_grading_config_json,
};
pub use dataset::{
    derive_chart_dataset, derive_chart_dataset_from_dataframe, derive_chart_dataset_from_ipc_bytes,
    derive_grade_table_from_dataframe, derive_grade_table_from_ipc_bytes, parse_roster_text,
};
pub use layout::{plan_grade_sheet_columns, plan_summary_sheet_columns};
pub use spec::{
    EnumAssessmentSetKey, EnumCellValue, EnumChartKind, EnumIssueLevel, GradebookError,
    GradebookResult, SpecAssessmentSet, SpecCell, SpecCellFormat, SpecChart, SpecChartDataset,
    SpecGradeScale, SpecGradeSheetLayout, SpecGradeTable, SpecGradingConfig,
    SpecGradingConfigPatch, SpecQualitativeBand, SpecSheet, SpecSummarySheetLayout,
    SpecValidationIssue, SpecWorkbookDocument,
};
pub use stats::{SpecRowStats, calculate_row_stats};
pub use validate::{validate_config, validate_grade_table, validate_roster};
pub use writer::{GradebookWriter, save_document, save_document_to_buffer};
