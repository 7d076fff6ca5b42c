//! Non-fatal validation of configurations, grade tables and rosters.

use crate::spec::{
    EnumAssessmentSetKey, EnumCellValue, SpecGradeTable, SpecGradingConfig, SpecValidationIssue,
};
use crate::util::{count_names, format_number_literal};

const N_WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Report configuration problems without rejecting the configuration.
pub fn validate_config(config: &SpecGradingConfig) -> Vec<SpecValidationIssue> {
    let mut l_issues = Vec::new();
    let c_min = format_number_literal(config.scale.min);
    let c_max = format_number_literal(config.scale.max);

    let n_weight_total = config.set_a.weight + config.set_b.weight;
    if (n_weight_total - 1.0).abs() > N_WEIGHT_SUM_TOLERANCE {
        l_issues.push(SpecValidationIssue::warning(format!(
            "Weights sum to {:.0}% (should be 100%)",
            n_weight_total * 100.0
        )));
    }

    if config.scale.max <= config.scale.min {
        l_issues.push(SpecValidationIssue::error(format!(
            "Scale max ({c_max}) must be greater than scale min ({c_min})"
        )));
    }

    for band in &config.qualitative_grades {
        if band.min < config.scale.min || band.max > config.scale.max {
            l_issues.push(SpecValidationIssue::error(format!(
                "Qualitative grade '{}' range ({}-{}) is outside scale ({c_min}-{c_max})",
                band.label,
                format_number_literal(band.min),
                format_number_literal(band.max)
            )));
        }
    }

    for key in EnumAssessmentSetKey::ALL {
        if config.set(key).projects.is_empty() {
            l_issues.push(SpecValidationIssue::error(format!(
                "Set {} has no projects defined",
                key.label()
            )));
        }
    }

    if config.trimesters.is_empty() {
        l_issues.push(SpecValidationIssue::error("No trimesters defined"));
    }

    l_issues
}

/// Report out-of-scale and non-numeric values in the project columns of `table`.
pub fn validate_grade_table(table: &SpecGradeTable, config: &SpecGradingConfig) -> Vec<SpecValidationIssue> {
    let l_cols_grade: Vec<String> = EnumAssessmentSetKey::ALL
        .iter()
        .flat_map(|key| config.set(*key).projects.iter().map(|p| key.column_key(p)))
        .collect();
    let c_min = format_number_literal(config.scale.min);
    let c_max = format_number_literal(config.scale.max);

    let mut l_issues = Vec::new();
    for ((student, column), value) in table.iter() {
        if !l_cols_grade.contains(column) {
            continue;
        }
        let (c_value, c_message) = match value {
            EnumCellValue::Number(n) if *n < config.scale.min || *n > config.scale.max => {
                let c_value = format_number_literal(*n);
                let c_message = format!("Grade {c_value} is outside scale ({c_min}-{c_max})");
                (c_value, c_message)
            }
            EnumCellValue::String(s) => (s.clone(), format!("Invalid grade value: {s}")),
            _ => continue,
        };
        l_issues.push(SpecValidationIssue {
            student: Some(student.clone()),
            column: Some(column.clone()),
            value: Some(c_value),
            ..SpecValidationIssue::error(c_message)
        });
    }
    l_issues
}

/// Report empty rosters, duplicate names and blank names.
pub fn validate_roster(roster: &[String]) -> Vec<SpecValidationIssue> {
    if roster.is_empty() {
        return vec![SpecValidationIssue::error("No students provided")];
    }

    let mut l_issues = Vec::new();
    let l_duplicates: Vec<&str> = count_names(roster.iter().map(String::as_str))
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name)
        .collect();
    if !l_duplicates.is_empty() {
        l_issues.push(SpecValidationIssue::warning(format!(
            "Duplicate student names: {}",
            l_duplicates.join(", ")
        )));
    }

    let n_empty = roster.iter().filter(|s| s.trim().is_empty()).count();
    if n_empty > 0 {
        l_issues.push(SpecValidationIssue::warning(format!(
            "{n_empty} empty student name(s) found"
        )));
    }
    l_issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumIssueLevel, SpecQualitativeBand};

    #[test]
    fn test_validate_config_default_is_clean() {
        assert!(validate_config(&SpecGradingConfig::default()).is_empty());
    }

    #[test]
    fn test_validate_config_reports_each_problem() {
        let mut cfg = SpecGradingConfig::default();
        cfg.set_a.weight = 0.5;
        cfg.set_b.projects.clear();
        cfg.trimesters.clear();
        cfg.qualitative_grades.push(SpecQualitativeBand {
            label: "Bonus".to_string(),
            min: 95.0,
            max: 110.0,
        });

        let l_issues = validate_config(&cfg);
        let l_messages: Vec<&str> = l_issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            l_messages,
            vec![
                "Weights sum to 80% (should be 100%)",
                "Qualitative grade 'Bonus' range (95-110) is outside scale (0-100)",
                "Set B has no projects defined",
                "No trimesters defined",
            ]
        );
        assert_eq!(l_issues[0].level, EnumIssueLevel::Warning);
        assert_eq!(l_issues[1].level, EnumIssueLevel::Error);
    }

    #[test]
    fn test_validate_grade_table_flags_out_of_scale_and_text() {
        let cfg = SpecGradingConfig::default();
        let mut table = SpecGradeTable::new();
        table.insert("Alice", "A_Project 1", EnumCellValue::Number(105.0));
        table.insert("Alice", "A_Project 2", EnumCellValue::String("abc".to_string()));
        table.insert("Alice", "B_Project 1", EnumCellValue::Number(50.0));
        table.insert("Alice", "Notes", EnumCellValue::String("late".to_string()));

        let l_issues = validate_grade_table(&table, &cfg);
        assert_eq!(l_issues.len(), 2);
        assert_eq!(l_issues[0].message, "Grade 105 is outside scale (0-100)");
        assert_eq!(l_issues[0].column.as_deref(), Some("A_Project 1"));
        assert_eq!(l_issues[1].message, "Invalid grade value: abc");
        assert_eq!(l_issues[1].student.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_validate_roster() {
        assert_eq!(validate_roster(&[])[0].message, "No students provided");

        let roster: Vec<String> = ["Bob", "Alice", "Bob", " "].iter().map(|s| s.to_string()).collect();
        let l_messages: Vec<String> = validate_roster(&roster).into_iter().map(|i| i.message).collect();
        assert_eq!(
            l_messages,
            vec!["Duplicate student names: Bob", "1 empty student name(s) found"]
        );
    }
}
