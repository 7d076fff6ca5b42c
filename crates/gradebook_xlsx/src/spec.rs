//! Gradebook models, in-memory workbook document and errors.

use std::collections::BTreeMap;

use rust_xlsxwriter::XlsxError;
use serde::{Deserialize, Serialize};

use crate::conf::EnumFmtKey;
use crate::util::convert_cell_value;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, converted to `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Cell content: literal value or formula.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Formula source text, including the leading `=`.
    Formula(String),
}

impl EnumCellValue {
    /// True for `None` and for empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            EnumCellValue::None => true,
            EnumCellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Formula text when this is a formula cell.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            EnumCellValue::Formula(f) => Some(f.as_str()),
            _ => None,
        }
    }

    /// Numeric content. Text is never parsed here; tables normalize on insert.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EnumCellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GradingConfiguration

/// Numeric grading scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecGradeScale {
    /// Lowest valid grade.
    pub min: f64,
    /// Highest valid grade.
    pub max: f64,
    /// Decimal places shown for derived grades.
    pub decimal_places: u32,
}

impl Default for SpecGradeScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            decimal_places: 1,
        }
    }
}

/// Named, weighted group of graded projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecAssessmentSet {
    /// Display name.
    pub name: String,
    /// Weight as a fraction of the final grade.
    pub weight: f64,
    /// Ordered project names; order is column order.
    pub projects: Vec<String>,
}

/// Labeled grade range. Only `min` takes part in lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecQualitativeBand {
    /// Label shown for grades in this band.
    pub label: String,
    /// Inclusive lower threshold.
    pub min: f64,
    /// Inclusive upper threshold (informational).
    pub max: f64,
}

/// Which of the two assessment sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumAssessmentSetKey {
    /// First set (`A_` column keys).
    A,
    /// Second set (`B_` column keys).
    B,
}

impl EnumAssessmentSetKey {
    /// Both keys in column order.
    pub const ALL: [EnumAssessmentSetKey; 2] = [EnumAssessmentSetKey::A, EnumAssessmentSetKey::B];

    /// Short label used in column keys and average headers.
    pub fn label(self) -> &'static str {
        match self {
            EnumAssessmentSetKey::A => "A",
            EnumAssessmentSetKey::B => "B",
        }
    }

    /// Grade-table column key for one project, e.g. `A_Project 1`.
    pub fn column_key(self, project: &str) -> String {
        format!("{}_{project}", self.label())
    }
}

/// Complete grading configuration. Immutable during one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecGradingConfig {
    /// Numeric scale.
    pub scale: SpecGradeScale,
    /// First assessment set.
    pub set_a: SpecAssessmentSet,
    /// Second assessment set.
    pub set_b: SpecAssessmentSet,
    /// Ordered qualitative bands.
    #[serde(default)]
    pub qualitative_grades: Vec<SpecQualitativeBand>,
    /// Ordered grading period names; also used as sheet names.
    pub trimesters: Vec<String>,
    /// Default output filename.
    pub output_file: String,
}

impl Default for SpecGradingConfig {
    fn default() -> Self {
        let create_projects = |n: usize| (1..=n).map(|i| format!("Project {i}")).collect();
        let create_band = |label: &str, min: f64, max: f64| SpecQualitativeBand {
            label: label.to_string(),
            min,
            max,
        };
        Self {
            scale: SpecGradeScale::default(),
            set_a: SpecAssessmentSet {
                name: "Set A".to_string(),
                weight: 0.70,
                projects: create_projects(4),
            },
            set_b: SpecAssessmentSet {
                name: "Set B".to_string(),
                weight: 0.30,
                projects: create_projects(2),
            },
            qualitative_grades: vec![
                create_band("Consistent Impact", 90.0, 100.0),
                create_band("Developing Impact", 80.0, 89.0),
                create_band("Emerging", 70.0, 79.0),
                create_band("Needs Support", 60.0, 69.0),
                create_band("Not Yet Meeting", 0.0, 59.0),
            ],
            trimesters: (1..=3).map(|i| format!("Trimester {i}")).collect(),
            output_file: "grades.xlsx".to_string(),
        }
    }
}

impl SpecGradingConfig {
    /// Borrow one assessment set.
    pub fn set(&self, key: EnumAssessmentSetKey) -> &SpecAssessmentSet {
        match key {
            EnumAssessmentSetKey::A => &self.set_a,
            EnumAssessmentSetKey::B => &self.set_b,
        }
    }

    /// Return a new configuration with `patch` overlaid onto `self`.
    ///
    /// Nested `scale`/`set_a`/`set_b` patches update field by field; lists replace.
    pub fn merge(&self, patch: &SpecGradingConfigPatch) -> SpecGradingConfig {
        SpecGradingConfig {
            scale: patch
                .scale
                .as_ref()
                .map_or_else(|| self.scale.clone(), |p| self.scale.merge(p)),
            set_a: patch
                .set_a
                .as_ref()
                .map_or_else(|| self.set_a.clone(), |p| self.set_a.merge(p)),
            set_b: patch
                .set_b
                .as_ref()
                .map_or_else(|| self.set_b.clone(), |p| self.set_b.merge(p)),
            qualitative_grades: patch
                .qualitative_grades
                .clone()
                .unwrap_or_else(|| self.qualitative_grades.clone()),
            trimesters: patch
                .trimesters
                .clone()
                .unwrap_or_else(|| self.trimesters.clone()),
            output_file: patch
                .output_file
                .clone()
                .unwrap_or_else(|| self.output_file.clone()),
        }
    }
}

impl SpecGradeScale {
    /// Overlay a partial scale.
    pub fn merge(&self, patch: &SpecGradeScalePatch) -> SpecGradeScale {
        SpecGradeScale {
            min: patch.min.unwrap_or(self.min),
            max: patch.max.unwrap_or(self.max),
            decimal_places: patch.decimal_places.unwrap_or(self.decimal_places),
        }
    }
}

impl SpecAssessmentSet {
    /// Overlay a partial assessment set.
    pub fn merge(&self, patch: &SpecAssessmentSetPatch) -> SpecAssessmentSet {
        SpecAssessmentSet {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            weight: patch.weight.unwrap_or(self.weight),
            projects: patch
                .projects
                .clone()
                .unwrap_or_else(|| self.projects.clone()),
        }
    }
}

/// Partial scale used by configuration overlays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecGradeScalePatch {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub decimal_places: Option<u32>,
}

/// Partial assessment set used by configuration overlays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecAssessmentSetPatch {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub projects: Option<Vec<String>>,
}

/// Partial configuration as read from a user JSON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecGradingConfigPatch {
    pub scale: Option<SpecGradeScalePatch>,
    pub set_a: Option<SpecAssessmentSetPatch>,
    pub set_b: Option<SpecAssessmentSetPatch>,
    pub qualitative_grades: Option<Vec<SpecQualitativeBand>>,
    pub trimesters: Option<Vec<String>>,
    pub output_file: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TabularInputs

/// Sparse per-period grades keyed by `(student, column key)`.
///
/// Blank values are never stored, so a missing entry and a blank entry read the same.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGradeTable {
    dict_values: BTreeMap<(String, String), EnumCellValue>,
}

impl SpecGradeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value. The first value recorded for a key wins.
    ///
    /// Values are normalized with [`convert_cell_value`] first, so numeric-looking
    /// text is stored as a number. Returns `true` when the value was stored.
    pub fn insert(
        &mut self,
        student: impl Into<String>,
        column_key: impl Into<String>,
        value: EnumCellValue,
    ) -> bool {
        let value = convert_cell_value(&value);
        if value.is_blank() {
            return false;
        }
        let key = (student.into(), column_key.into());
        if self.dict_values.contains_key(&key) {
            return false;
        }
        self.dict_values.insert(key, value);
        true
    }

    /// Look up the value for an exact student name and column key.
    pub fn get(&self, student: &str, column_key: &str) -> Option<&EnumCellValue> {
        self.dict_values
            .get(&(student.to_string(), column_key.to_string()))
    }

    /// Iterate `((student, column key), value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &EnumCellValue)> {
        self.dict_values.iter()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.dict_values.len()
    }

    /// True when no value is stored.
    pub fn is_empty(&self) -> bool {
        self.dict_values.is_empty()
    }
}

/// One chart dataset row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecChartRow {
    /// Category label (student name).
    pub category: String,
    /// One value per series column; `None` renders blank.
    pub values: Vec<Option<f64>>,
}

/// Frozen chart input table. `columns[0]` names the category column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecChartDataset {
    /// Header names, category column first.
    pub columns: Vec<String>,
    /// Data rows in display order.
    pub rows: Vec<SpecChartRow>,
}

impl SpecChartDataset {
    /// Create a dataset with the given header and no rows.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// Append one row; `values` is padded or truncated to the series count.
    pub fn push_row(&mut self, category: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.n_series(), None);
        self.rows.push(SpecChartRow {
            category: category.into(),
            values,
        });
    }

    /// Number of series columns (all but the category column).
    pub fn n_series(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// True when there is nothing to tabulate.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Chart kind for the chart sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumChartKind {
    /// Vertical bar (column) chart.
    #[default]
    Bar,
    /// Line chart.
    Line,
    /// Area chart.
    Area,
}

impl EnumChartKind {
    /// Parse a selector such as `"line"` or `"line_chart"`; unknown values map to `Bar`.
    pub fn from_name(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match value.trim_end_matches("_chart") {
            "line" => EnumChartKind::Line,
            "area" => EnumChartKind::Area,
            _ => EnumChartKind::Bar,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// 1-based column assignment of a grade sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecGradeSheetLayout {
    pub col_student: usize,
    pub col_set_a_start: usize,
    pub col_set_a_end: usize,
    pub col_avg_a: usize,
    pub col_set_b_start: usize,
    pub col_set_b_end: usize,
    pub col_avg_b: usize,
    pub col_final: usize,
    pub col_qualitative: usize,
}

impl SpecGradeSheetLayout {
    /// Inclusive project column range of one set.
    pub fn project_range(&self, key: EnumAssessmentSetKey) -> (usize, usize) {
        match key {
            EnumAssessmentSetKey::A => (self.col_set_a_start, self.col_set_a_end),
            EnumAssessmentSetKey::B => (self.col_set_b_start, self.col_set_b_end),
        }
    }

    /// Average column of one set.
    pub fn col_average(&self, key: EnumAssessmentSetKey) -> usize {
        match key {
            EnumAssessmentSetKey::A => self.col_avg_a,
            EnumAssessmentSetKey::B => self.col_avg_b,
        }
    }

    /// Total number of columns.
    pub fn width(&self) -> usize {
        self.col_qualitative
    }
}

/// 1-based column assignment of the summary sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSummarySheetLayout {
    pub col_student: usize,
    /// `(grade column, qualitative column)` per period, in period order.
    pub cols_by_period: Vec<(usize, usize)>,
    pub col_year_average: usize,
    pub col_year_qualitative: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentSpecification

/// One styled cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    /// Literal or formula content.
    pub value: EnumCellValue,
    /// Format preset key; `None` uses the workbook default.
    pub fmt: Option<EnumFmtKey>,
}

/// Horizontal merge plan item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetHorizontalMerge {
    /// Row where the merge is applied.
    pub row_idx_start: usize,
    /// Start column (inclusive).
    pub col_idx_start: usize,
    /// End column (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
}

/// Embedded chart description. Row/column numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecChart {
    pub kind: EnumChartKind,
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    /// Header row holding series names.
    pub row_header: usize,
    /// Last data row.
    pub row_last: usize,
    /// Category column.
    pub col_category: usize,
    /// First series column.
    pub col_series_start: usize,
    /// Last series column (inclusive).
    pub col_series_end: usize,
    /// Anchor cell of the chart's top-left corner.
    pub row_anchor: usize,
    pub col_anchor: usize,
    /// Chart size in pixels.
    pub width: u32,
    pub height: u32,
    /// Built-in chart style id.
    pub style: u8,
}

/// One worksheet. Cell coordinates are 1-based `(row, col)`, as in A1 notation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    /// Literal sheet name.
    pub name: String,
    cells: BTreeMap<(usize, usize), SpecCell>,
    /// Horizontal merges (1-based coordinates).
    pub merges: Vec<SpecSheetHorizontalMerge>,
    /// Column widths by 1-based column.
    pub widths_by_col: BTreeMap<usize, f64>,
    /// `(frozen rows, frozen columns)`.
    pub freeze_panes: Option<(usize, usize)>,
    /// Optional embedded chart.
    pub chart: Option<SpecChart>,
}

impl SpecSheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: vec![],
            widths_by_col: BTreeMap::new(),
            freeze_panes: None,
            chart: None,
        }
    }

    /// Write (or overwrite) one cell.
    pub fn write(&mut self, row: usize, col: usize, value: EnumCellValue, fmt: Option<EnumFmtKey>) {
        self.cells.insert((row, col), SpecCell { value, fmt });
    }

    /// Write a text cell.
    pub fn write_string(&mut self, row: usize, col: usize, text: impl Into<String>, fmt: Option<EnumFmtKey>) {
        self.write(row, col, EnumCellValue::String(text.into()), fmt);
    }

    /// Write a formula cell.
    pub fn write_formula(&mut self, row: usize, col: usize, formula: impl Into<String>, fmt: Option<EnumFmtKey>) {
        self.write(row, col, EnumCellValue::Formula(formula.into()), fmt);
    }

    /// Write a blank (formatted) cell.
    pub fn write_blank(&mut self, row: usize, col: usize, fmt: Option<EnumFmtKey>) {
        self.write(row, col, EnumCellValue::None, fmt);
    }

    /// Record a horizontal merge over `col_start..=col_end` on `row`.
    pub fn merge_range(&mut self, row: usize, col_start: usize, col_end: usize, text: impl Into<String>) {
        self.merges.push(SpecSheetHorizontalMerge {
            row_idx_start: row,
            col_idx_start: col_start,
            col_idx_end: col_end,
            text: text.into(),
        });
    }

    /// Set one column width.
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.widths_by_col.insert(col, width);
    }

    /// Borrow one cell.
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecCell> {
        self.cells.get(&(row, col))
    }

    /// Borrow one cell's content.
    pub fn value(&self, row: usize, col: usize) -> Option<&EnumCellValue> {
        self.cell(row, col).map(|c| &c.value)
    }

    /// Formula text of one cell, if it holds a formula.
    pub fn formula(&self, row: usize, col: usize) -> Option<&str> {
        self.value(row, col).and_then(EnumCellValue::as_formula)
    }

    /// Iterate cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&(usize, usize), &SpecCell)> {
        self.cells.iter()
    }
}

/// Finished workbook: ordered sheets plus the format presets they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbookDocument {
    /// Sheets in output order.
    pub sheets: Vec<SpecSheet>,
    /// Format presets referenced by cells.
    pub formats: BTreeMap<EnumFmtKey, SpecCellFormat>,
    /// Default output filename taken from the configuration.
    pub file_out_default: String,
}

impl SpecWorkbookDocument {
    /// Borrow a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&SpecSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in output order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValidationSpecification

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumIssueLevel {
    Error,
    Warning,
}

impl EnumIssueLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            EnumIssueLevel::Error => "error",
            EnumIssueLevel::Warning => "warning",
        }
    }
}

/// One non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValidationIssue {
    pub level: EnumIssueLevel,
    pub message: String,
    /// Student the issue refers to, for grade issues.
    pub student: Option<String>,
    /// Column key the issue refers to, for grade issues.
    pub column: Option<String>,
    /// Offending raw value, for grade issues.
    pub value: Option<String>,
}

impl SpecValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self::create(EnumIssueLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::create(EnumIssueLevel::Warning, message)
    }

    fn create(level: EnumIssueLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            student: None,
            column: None,
            value: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors that abort a generation or write call.
#[derive(Debug, thiserror::Error)]
pub enum GradebookError {
    /// Structurally invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Unreadable tabular input.
    #[error("data error: {0}")]
    Data(String),
    /// Configuration JSON could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// `rust_xlsxwriter` rejected a write or save.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Writer used after `close()`.
    #[error("Cannot write after close().")]
    WriterClosed,
    /// Row/column number outside the worksheet grid.
    #[error("index overflow: {0}")]
    IndexOverflow(String),
}

pub type GradebookResult<T> = Result<T, GradebookError>;

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_merge_updates_nested_fields_and_replaces_lists() {
        let cfg_base = SpecGradingConfig::default();
        let patch = SpecGradingConfigPatch {
            set_a: Some(SpecAssessmentSetPatch {
                name: Some("Labs".to_string()),
                ..Default::default()
            }),
            trimesters: Some(vec!["Fall".to_string()]),
            ..Default::default()
        };

        let cfg = cfg_base.merge(&patch);
        assert_eq!(cfg.set_a.name, "Labs");
        assert_eq!(cfg.set_a.weight, 0.70);
        assert_eq!(cfg.set_a.projects.len(), 4);
        assert_eq!(cfg.trimesters, vec!["Fall".to_string()]);
        assert_eq!(cfg.set_b, cfg_base.set_b);
    }

    #[test]
    fn test_grade_table_first_value_wins_and_blank_is_not_stored() {
        let mut table = SpecGradeTable::new();
        assert!(table.insert("Alice", "A_P1", EnumCellValue::Number(80.0)));
        assert!(!table.insert("Alice", "A_P1", EnumCellValue::Number(10.0)));
        assert!(!table.insert("Bob", "A_P1", EnumCellValue::String(String::new())));

        assert_eq!(table.get("Alice", "A_P1"), Some(&EnumCellValue::Number(80.0)));
        assert_eq!(table.get("Bob", "A_P1"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_grade_table_insert_normalizes_numeric_text() {
        let mut table = SpecGradeTable::new();
        assert!(table.insert("Alice", "A_P1", EnumCellValue::String(" 85 ".to_string())));
        assert!(table.insert("Alice", "A_P2", EnumCellValue::String("excused".to_string())));
        assert!(!table.insert("Alice", "A_P3", EnumCellValue::Number(f64::NAN)));

        assert_eq!(table.get("Alice", "A_P1"), Some(&EnumCellValue::Number(85.0)));
        assert_eq!(table.get("Alice", "A_P2").and_then(EnumCellValue::as_number), None);
    }

    #[test]
    fn test_chart_kind_from_name_defaults_to_bar() {
        assert_eq!(EnumChartKind::from_name("line_chart"), EnumChartKind::Line);
        assert_eq!(EnumChartKind::from_name("Area Chart"), EnumChartKind::Area);
        assert_eq!(EnumChartKind::from_name("bar"), EnumChartKind::Bar);
        assert_eq!(EnumChartKind::from_name("pie"), EnumChartKind::Bar);
    }

    #[test]
    fn test_chart_dataset_pads_rows_to_series_count() {
        let mut dataset = SpecChartDataset::new(vec!["Student".into(), "T1".into(), "T2".into()]);
        dataset.push_row("Alice", vec![Some(1.0)]);
        assert_eq!(dataset.rows[0].values, vec![Some(1.0), None]);
        assert!(!dataset.is_empty());
        assert!(SpecChartDataset::new(vec!["Student".into()]).is_empty());
    }
}
