//! Gradebook constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{GradebookResult, SpecCellFormat, SpecGradingConfig, SpecGradingConfigPatch};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;

pub const C_SHEET_NAME_INSTRUCTIONS: &str = "Instructions";
pub const C_SHEET_NAME_SUMMARY: &str = "Total";
pub const C_SHEET_NAME_CHART: &str = "Charts";

/// Student column header on grade and summary sheets (also the grade-table key column).
pub const C_COL_STUDENT_NAME: &str = "Student Name";
/// Category column header of derived chart datasets.
pub const C_COL_CHART_STUDENT: &str = "Student";
pub const C_COL_AVERAGE_A: &str = "Avg A";
pub const C_COL_AVERAGE_B: &str = "Avg B";
pub const C_COL_FINAL_GRADE: &str = "Final Grade";
pub const C_COL_QUALITATIVE: &str = "Qualitative";
pub const C_COL_YEAR_AVERAGE: &str = "Year Average";
pub const C_COL_YEAR_QUALITATIVE: &str = "Year Qualitative";
pub const C_CHART_PLACEHOLDER: &str = "No chart data available";

/// Grade sheet: group label row.
pub const N_ROW_GRADE_HEADER_GROUP: usize = 1;
/// Grade sheet: project name row.
pub const N_ROW_GRADE_HEADER_PROJECT: usize = 2;
/// Grade sheet: first student row.
pub const N_ROW_GRADE_DATA_START: usize = 3;
/// Summary sheet: header row.
pub const N_ROW_SUMMARY_HEADER: usize = 1;
/// Summary sheet: first student row.
pub const N_ROW_SUMMARY_DATA_START: usize = 2;

pub const N_WIDTH_STUDENT: f64 = 25.0;
pub const N_WIDTH_PROJECT: f64 = 12.0;
pub const N_WIDTH_AVERAGE: f64 = 10.0;
pub const N_WIDTH_FINAL: f64 = 12.0;
pub const N_WIDTH_QUALITATIVE: f64 = 20.0;
pub const N_WIDTH_SUMMARY_GRADE: f64 = 14.0;
pub const N_WIDTH_SUMMARY_QUALITATIVE: f64 = 18.0;
pub const N_WIDTH_CHART_COLUMN_MIN: f64 = 15.0;
pub const N_WIDTH_INSTRUCTIONS: f64 = 50.0;

pub const C_CHART_TITLE: &str = "Grade Comparison";
pub const C_CHART_X_AXIS: &str = "Students";
pub const C_CHART_Y_AXIS: &str = "Grade";
pub const N_CHART_STYLE: u8 = 10;
/// 20 cm x 12 cm at 96 dpi.
pub const N_CHART_WIDTH_PX: u32 = 756;
pub const N_CHART_HEIGHT_PX: u32 = 454;

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Student header and chart table header.
    HeaderMain,
    /// Set A group and project headers.
    HeaderSetA,
    /// Set B group and project headers.
    HeaderSetB,
    /// Average column headers.
    HeaderAverage,
    /// Final grade and year average headers.
    HeaderFinal,
    /// Qualitative headers.
    HeaderQualitative,
    /// Period grade headers on the summary sheet.
    HeaderPeriodGrade,
    /// Year qualitative header.
    HeaderYearQualitative,
    /// Bold project name cell.
    HeaderProject,
    /// Bordered cell without fill.
    Border,
    /// Centered grade entry.
    BodyGrade,
    BodyAverage,
    /// Final grade and year average values.
    BodyFinal,
    BodyQualitative,
    BodyPeriodGrade,
    BodyYearQualitative,
    /// Instructions title.
    Title,
    Bold,
}

/// Number format code for `decimal_places` digits, e.g. `0.0`.
pub fn derive_num_format(decimal_places: u32) -> String {
    if decimal_places == 0 {
        "0".to_string()
    } else {
        format!("0.{}", "0".repeat(decimal_places as usize))
    }
}

/// Build the named format presets referenced by the sheet builders.
pub fn derive_default_gradebook_formats(decimal_places: u32) -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_size: Some(11),
        border: Some(1),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_header_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        ..Default::default()
    });
    let create_fill = |base: &SpecCellFormat, color: &str| {
        base.with_(SpecCellFormat {
            bg_color: Some(color.to_string()),
            ..Default::default()
        })
    };
    let create_white_fill = |color: &str| {
        cfg_header_fmt_spec.with_(SpecCellFormat {
            bg_color: Some(color.to_string()),
            font_color: Some("#FFFFFF".to_string()),
            ..Default::default()
        })
    };
    let cfg_num_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        num_format: Some(derive_num_format(decimal_places)),
        ..Default::default()
    });

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::HeaderMain, create_white_fill("#4472C4"));
    dict_fmt.insert(EnumFmtKey::HeaderSetA, create_white_fill("#5B9BD5"));
    dict_fmt.insert(EnumFmtKey::HeaderSetB, create_white_fill("#70AD47"));
    dict_fmt.insert(EnumFmtKey::HeaderAverage, create_fill(&cfg_header_fmt_spec, "#FFE699"));
    dict_fmt.insert(EnumFmtKey::HeaderFinal, create_fill(&cfg_header_fmt_spec, "#F4B183"));
    dict_fmt.insert(EnumFmtKey::HeaderQualitative, create_fill(&cfg_header_fmt_spec, "#C6EFCE"));
    dict_fmt.insert(EnumFmtKey::HeaderPeriodGrade, create_fill(&cfg_header_fmt_spec, "#9BC2E6"));
    dict_fmt.insert(EnumFmtKey::HeaderYearQualitative, create_fill(&cfg_header_fmt_spec, "#A9D08E"));
    dict_fmt.insert(EnumFmtKey::HeaderProject, cfg_header_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Border,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("left".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumFmtKey::BodyGrade, cfg_base_fmt_spec.clone());
    dict_fmt.insert(EnumFmtKey::BodyAverage, create_fill(&cfg_num_fmt_spec, "#FFE699"));
    dict_fmt.insert(EnumFmtKey::BodyFinal, create_fill(&cfg_num_fmt_spec, "#F4B183"));
    dict_fmt.insert(EnumFmtKey::BodyQualitative, create_fill(&cfg_base_fmt_spec, "#C6EFCE"));
    dict_fmt.insert(EnumFmtKey::BodyPeriodGrade, create_fill(&cfg_num_fmt_spec, "#9BC2E6"));
    dict_fmt.insert(EnumFmtKey::BodyYearQualitative, create_fill(&cfg_base_fmt_spec, "#A9D08E"));
    dict_fmt.insert(
        EnumFmtKey::Title,
        SpecCellFormat {
            bold: Some(true),
            font_size: Some(16),
            ..Default::default()
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Bold,
        SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        },
    );

    dict_fmt
}

/// Build the default grading configuration.
pub fn derive_default_grading_config() -> SpecGradingConfig {
    SpecGradingConfig::default()
}

/// Serialize the default configuration as pretty JSON.
pub fn derive_default_grading_config_json() -> GradebookResult<String> {
    Ok(serde_json::to_string_pretty(&derive_default_grading_config())?)
}

/// Parse a (possibly partial) JSON configuration and overlay it on the defaults.
pub fn parse_grading_config_json(text: &str) -> GradebookResult<SpecGradingConfig> {
    let patch: SpecGradingConfigPatch = serde_json::from_str(text)?;
    Ok(derive_default_grading_config().merge(&patch))
}
