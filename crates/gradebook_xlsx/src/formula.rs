//! Formula text builders for averages, final grades and qualitative labels.
//!
//! All builders are pure string functions; none of them inspects cell values.

use crate::spec::SpecQualitativeBand;
use crate::util::format_number_literal;

/// Convert a 1-based column number to its A1 letters (`1` -> `A`, `27` -> `AA`).
pub fn derive_column_letter(n_col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n = n_col;
    while n > 0 {
        let n_rem = (n - 1) % 26;
        l_chars.push((b'A' + n_rem as u8) as char);
        n = (n - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// A1 reference of a 1-based `(row, col)` cell.
pub fn derive_cell_ref(n_row: usize, n_col: usize) -> String {
    format!("{}{n_row}", derive_column_letter(n_col))
}

/// A1 range on one row, e.g. `B3:E3`.
pub fn derive_row_range_ref(n_row: usize, n_col_start: usize, n_col_end: usize) -> String {
    format!(
        "{}:{}",
        derive_cell_ref(n_row, n_col_start),
        derive_cell_ref(n_row, n_col_end)
    )
}

/// Escape text for use inside a formula string literal.
pub fn escape_formula_text(text: &str) -> String {
    text.replace('"', "\"\"")
}

/// Average of the numeric cells in `c_range`; blank when none is numeric.
pub fn derive_bounded_average_formula(c_range: &str) -> String {
    format!("=IF(COUNT({c_range})>0,AVERAGE({c_range}),\"\")")
}

/// Bounded average over an explicit cell list; empty list yields an empty string.
pub fn derive_bounded_average_formula_for_cells(l_cells: &[String]) -> String {
    if l_cells.is_empty() {
        return String::new();
    }
    derive_bounded_average_formula(&l_cells.join(","))
}

/// Weighted final grade from two averages, tolerating a missing side.
pub fn derive_weighted_final_formula(c_avg_a: &str, weight_a: f64, c_avg_b: &str, weight_b: f64) -> String {
    let c_wa = format_number_literal(weight_a);
    let c_wb = format_number_literal(weight_b);
    format!(
        "=IF(AND(ISNUMBER({c_avg_a}),ISNUMBER({c_avg_b})),{c_avg_a}*{c_wa}+{c_avg_b}*{c_wb},\
         IF(ISNUMBER({c_avg_a}),{c_avg_a}*{c_wa},IF(ISNUMBER({c_avg_b}),{c_avg_b}*{c_wb},\"\")))"
    )
}

/// Nested IF mapping the value in `c_cell` to a band label.
///
/// Bands are tried by `min` descending (ties keep declaration order); the
/// lowest band closes the chain unconditionally. No bands yields an empty string.
pub fn derive_qualitative_formula(c_cell: &str, bands: &[SpecQualitativeBand]) -> String {
    let mut l_bands: Vec<&SpecQualitativeBand> = bands.iter().collect();
    l_bands.sort_by(|a, b| b.min.total_cmp(&a.min));

    let Some((band_last, l_bands_checked)) = l_bands.split_last() else {
        return String::new();
    };

    let mut c_formula = format!("=IF({c_cell}=\"\",\"\",");
    for band in l_bands_checked {
        c_formula.push_str(&format!(
            "IF({c_cell}>={},\"{}\",",
            format_number_literal(band.min),
            escape_formula_text(&band.label)
        ));
    }
    c_formula.push_str(&format!("\"{}\"", escape_formula_text(&band_last.label)));
    c_formula.push_str(&")".repeat(l_bands_checked.len() + 1));
    c_formula
}

/// Reference to a cell on another sheet, e.g. `='Trimester 1'!J3`.
pub fn derive_cross_sheet_ref_formula(sheet_name: &str, c_cell: &str) -> String {
    format!("='{}'!{c_cell}", sheet_name.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_band(label: &str, min: f64, max: f64) -> SpecQualitativeBand {
        SpecQualitativeBand {
            label: label.to_string(),
            min,
            max,
        }
    }

    #[test]
    fn test_derive_column_letter() {
        assert_eq!(derive_column_letter(1), "A");
        assert_eq!(derive_column_letter(26), "Z");
        assert_eq!(derive_column_letter(27), "AA");
        assert_eq!(derive_column_letter(702), "ZZ");
        assert_eq!(derive_column_letter(703), "AAA");
        assert_eq!(derive_row_range_ref(3, 2, 5), "B3:E3");
    }

    #[test]
    fn test_derive_bounded_average_formula() {
        assert_eq!(
            derive_bounded_average_formula("B3:E3"),
            "=IF(COUNT(B3:E3)>0,AVERAGE(B3:E3),\"\")"
        );
        assert_eq!(
            derive_bounded_average_formula_for_cells(&["B2".to_string(), "D2".to_string()]),
            "=IF(COUNT(B2,D2)>0,AVERAGE(B2,D2),\"\")"
        );
        assert_eq!(derive_bounded_average_formula_for_cells(&[]), "");
    }

    #[test]
    fn test_derive_weighted_final_formula() {
        assert_eq!(
            derive_weighted_final_formula("F3", 0.7, "I3", 0.3),
            "=IF(AND(ISNUMBER(F3),ISNUMBER(I3)),F3*0.7+I3*0.3,\
             IF(ISNUMBER(F3),F3*0.7,IF(ISNUMBER(I3),I3*0.3,\"\")))"
        );
    }

    #[test]
    fn test_derive_qualitative_formula_sorts_by_min_descending() {
        let bands = vec![create_band("Fail", 0.0, 59.0), create_band("Pass", 60.0, 100.0)];
        assert_eq!(
            derive_qualitative_formula("J3", &bands),
            "=IF(J3=\"\",\"\",IF(J3>=60,\"Pass\",\"Fail\"))"
        );
    }

    #[test]
    fn test_derive_qualitative_formula_single_and_empty_band_lists() {
        assert_eq!(
            derive_qualitative_formula("K2", &[create_band("Only \"one\"", 0.0, 100.0)]),
            "=IF(K2=\"\",\"\",\"Only \"\"one\"\"\")"
        );
        assert_eq!(derive_qualitative_formula("K2", &[]), "");
    }

    #[test]
    fn test_derive_cross_sheet_ref_formula() {
        assert_eq!(derive_cross_sheet_ref_formula("Trimester 1", "J3"), "='Trimester 1'!J3");
        assert_eq!(derive_cross_sheet_ref_formula("Kid's", "A1"), "='Kid''s'!A1");
    }
}
