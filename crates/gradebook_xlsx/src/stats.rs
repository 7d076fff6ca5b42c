//! Native evaluation of the grading arithmetic encoded by the sheet formulas.

use crate::conf::{C_COL_AVERAGE_A, C_COL_AVERAGE_B, C_COL_FINAL_GRADE};
use crate::spec::{
    EnumAssessmentSetKey, EnumCellValue, SpecGradeTable, SpecGradingConfig, SpecQualitativeBand,
};
use crate::util::round_to_decimal_places;

/// Derived values for one student in one period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRowStats {
    pub avg_a: Option<f64>,
    pub avg_b: Option<f64>,
    pub final_grade: Option<f64>,
    pub qualitative: Option<String>,
}

impl SpecRowStats {
    /// Computed value by display name (`Avg A`, `Avg B`, `Final Grade`).
    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            C_COL_AVERAGE_A => self.avg_a,
            C_COL_AVERAGE_B => self.avg_b,
            C_COL_FINAL_GRADE => self.final_grade,
            _ => None,
        }
    }
}

/// Mean of the present values; `None` when nothing is present.
pub fn derive_bounded_average(values: &[Option<f64>]) -> Option<f64> {
    let l_present: Vec<f64> = values.iter().flatten().copied().collect();
    if l_present.is_empty() {
        return None;
    }
    Some(l_present.iter().sum::<f64>() / l_present.len() as f64)
}

/// Weighted final grade, falling back to whichever average is present.
pub fn derive_weighted_final(avg_a: Option<f64>, weight_a: f64, avg_b: Option<f64>, weight_b: f64) -> Option<f64> {
    match (avg_a, avg_b) {
        (Some(a), Some(b)) => Some(a * weight_a + b * weight_b),
        (Some(a), None) => Some(a * weight_a),
        (None, Some(b)) => Some(b * weight_b),
        (None, None) => None,
    }
}

/// Label of the highest band whose `min` the value meets, else the lowest band.
pub fn derive_qualitative_label(value: Option<f64>, bands: &[SpecQualitativeBand]) -> Option<String> {
    let value = value?;
    let mut l_bands: Vec<&SpecQualitativeBand> = bands.iter().collect();
    l_bands.sort_by(|a, b| b.min.total_cmp(&a.min));
    l_bands
        .iter()
        .find(|band| value >= band.min)
        .or_else(|| l_bands.last())
        .map(|band| band.label.clone())
}

/// Compute averages, final grade and label for `student`, rounded to the scale precision.
///
/// Non-numeric grade entries are ignored, as `COUNT`/`AVERAGE` ignore text cells.
pub fn calculate_row_stats(config: &SpecGradingConfig, table: &SpecGradeTable, student: &str) -> SpecRowStats {
    let derive_set_average = |key: EnumAssessmentSetKey| {
        let l_values: Vec<Option<f64>> = config
            .set(key)
            .projects
            .iter()
            .map(|project| {
                table
                    .get(student, &key.column_key(project))
                    .and_then(EnumCellValue::as_number)
            })
            .collect();
        derive_bounded_average(&l_values)
    };

    let avg_a = derive_set_average(EnumAssessmentSetKey::A);
    let avg_b = derive_set_average(EnumAssessmentSetKey::B);
    let final_grade = derive_weighted_final(avg_a, config.set_a.weight, avg_b, config.set_b.weight);
    let qualitative = derive_qualitative_label(final_grade, &config.qualitative_grades);

    let n_places = config.scale.decimal_places;
    SpecRowStats {
        avg_a: avg_a.map(|x| round_to_decimal_places(x, n_places)),
        avg_b: avg_b.map(|x| round_to_decimal_places(x, n_places)),
        final_grade: final_grade.map(|x| round_to_decimal_places(x, n_places)),
        qualitative,
    }
}
