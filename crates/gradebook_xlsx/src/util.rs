//! Stateless helper utilities shared by the sheet builders.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{EnumCellValue, SpecSheetHorizontalMerge};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize a raw grade value: numeric-looking text becomes a number,
/// empty text and non-finite numbers become `None`.
pub fn convert_cell_value(value: &EnumCellValue) -> EnumCellValue {
    match value {
        EnumCellValue::Number(n) if n.is_finite() => EnumCellValue::Number(*n),
        EnumCellValue::Number(_) | EnumCellValue::None => EnumCellValue::None,
        EnumCellValue::String(s) => {
            let c_trimmed = s.trim();
            if c_trimmed.is_empty() {
                return EnumCellValue::None;
            }
            match c_trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => EnumCellValue::Number(n),
                _ => EnumCellValue::String(s.clone()),
            }
        }
        EnumCellValue::Formula(f) => EnumCellValue::Formula(f.clone()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NumberDisplay

/// Shortest decimal rendering of `x` (`80.0` -> `80`, `0.7` -> `0.7`).
pub fn format_number_literal(x: f64) -> String {
    format!("{x}")
}

/// Whole-percent rendering of a fractional weight, truncated (`0.7` -> `70`, `0.29` -> `28`).
pub fn format_weight_percent(weight: f64) -> String {
    format!("{}", (weight * 100.0).trunc() as i64)
}

/// Round half away from zero to `decimal_places` digits.
pub fn round_to_decimal_places(x: f64, decimal_places: u32) -> f64 {
    let n_factor = 10f64.powi(decimal_places as i32);
    (x * n_factor).round() / n_factor
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderMergeUtils

/// Plan horizontal merges for repeated non-empty header text per row.
///
/// `header_grid[0][0]` sits at `(n_row_first, n_col_first)`; returned merges
/// carry absolute sheet coordinates.
pub fn plan_horizontal_merges(
    header_grid: &[Vec<String>],
    n_row_first: usize,
    n_col_first: usize,
) -> Vec<SpecSheetHorizontalMerge> {
    let mut l_horizontal_merges = Vec::new();

    for (idx_row, v_str_current_row) in header_grid.iter().enumerate() {
        let n_cols = v_str_current_row.len();
        let mut n_col_idx = 0;

        while n_col_idx < n_cols {
            let c_cell_val = &v_str_current_row[n_col_idx];
            if c_cell_val.is_empty() {
                n_col_idx += 1;
                continue;
            }

            let mut n_col_idx_end = n_col_idx + 1;
            while n_col_idx_end < n_cols && v_str_current_row[n_col_idx_end] == *c_cell_val {
                n_col_idx_end += 1;
            }

            if n_col_idx_end - n_col_idx > 1 {
                l_horizontal_merges.push(SpecSheetHorizontalMerge {
                    row_idx_start: n_row_first + idx_row,
                    col_idx_start: n_col_first + n_col_idx,
                    col_idx_end: n_col_first + n_col_idx_end - 1,
                    text: c_cell_val.clone(),
                });
            }
            n_col_idx = n_col_idx_end;
        }
    }

    l_horizontal_merges
}

/// Collect cells covered by a horizontal merge (excluding the anchor).
pub fn derive_horizontal_merge_tracker(
    horizontal_merges: &[SpecSheetHorizontalMerge],
) -> BTreeSet<(usize, usize)> {
    let mut set_merged_cells = BTreeSet::new();

    for merge in horizontal_merges {
        for col_idx in (merge.col_idx_start + 1)..=merge.col_idx_end {
            set_merged_cells.insert((merge.row_idx_start, col_idx));
        }
    }

    set_merged_cells
}

/// Count occurrences of each name, keeping first-seen order.
pub fn count_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut dict_idx: BTreeMap<&'a str, usize> = BTreeMap::new();
    let mut l_counts: Vec<(&'a str, usize)> = Vec::new();
    for name in names {
        match dict_idx.get(name) {
            Some(idx) => l_counts[*idx].1 += 1,
            None => {
                dict_idx.insert(name, l_counts.len());
                l_counts.push((name, 1));
            }
        }
    }
    l_counts
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
