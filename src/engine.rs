//! Rule evaluation over the rows of one message.
//!
//! Every rule is applied independently to every row. Rules are not mutually
//! exclusive: a row matching two rules lands in both buckets. Buckets with no
//! match are dropped, which keeps the ordinary message (nothing interesting
//! in it) from producing any notification.
//!
//! ```text
//! parser.rs -> engine.rs -> template.rs -> notify/
//! ```

use crate::config::{RuleCondition, RuleConfig};
use crate::parser::Row;

/// A compiled rule: name, title template and predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRule {
    pub name: String,
    pub title: String,
    pub show_label: bool,
    pub condition: RuleCondition,
}

impl AlertRule {
    pub fn from_config(config: &RuleConfig) -> Self {
        Self {
            name: config.name.trim().to_string(),
            title: config.title.clone(),
            show_label: config.show_label,
            condition: config.when.clone(),
        }
    }

    /// Label sentinel of a label-aware rule.
    pub fn sentinel(&self) -> Option<&str> {
        self.condition.label_equals.as_deref()
    }

    /// Membership test: every configured clause must hold.
    pub fn matches(&self, row: &Row) -> bool {
        let c = &self.condition;

        if let Some(min) = c.left_min
            && row.left < min
        {
            return false;
        }
        if let Some(floor) = c.left_above
            && row.left <= floor
        {
            return false;
        }
        if let Some(max) = c.right_below
            && row.right >= max
        {
            return false;
        }
        if let Some([lo, hi]) = c.right_between
            && !(lo..=hi).contains(&row.right)
        {
            return false;
        }
        if let Some(ref sentinel) = c.label_equals {
            match row.label {
                Some(ref label) if label.eq_ignore_ascii_case(sentinel) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Rows of one message that satisfied one rule, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertBucket {
    pub rule_name: String,
    pub show_label: bool,
    pub matches: Vec<Row>,
}

/// Partition rows into buckets, one per rule with at least one match.
///
/// Bucket order follows rule order; match order follows row order.
pub fn evaluate(rows: &[Row], rules: &[AlertRule]) -> Vec<AlertBucket> {
    rules
        .iter()
        .filter_map(|rule| {
            let matches: Vec<Row> = rows.iter().filter(|row| rule.matches(row)).cloned().collect();
            if matches.is_empty() {
                None
            } else {
                Some(AlertBucket {
                    rule_name: rule.name.clone(),
                    show_label: rule.show_label,
                    matches,
                })
            }
        })
        .collect()
}

/// Holds the ordered rule list of the running service.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<AlertRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn evaluate(&self, rows: &[Row]) -> Vec<AlertBucket> {
        let buckets = evaluate(rows, &self.rules);
        for bucket in &buckets {
            metrics::counter!(
                "nairi_alerts_matched_total",
                "rule_name" => bucket.rule_name.clone()
            )
            .increment(bucket.matches.len() as u64);
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;

    fn row(left: u32, right: u32) -> Row {
        Row {
            left,
            right,
            label: None,
        }
    }

    fn labeled(left: u32, right: u32, label: &str) -> Row {
        Row {
            left,
            right,
            label: Some(label.to_string()),
        }
    }

    fn rule(name: &str, condition: RuleCondition) -> AlertRule {
        AlertRule {
            name: name.to_string(),
            title: "Alert {{ name }}".to_string(),
            show_label: false,
            condition,
        }
    }

    fn builtin_rules() -> Vec<AlertRule> {
        Thresholds::default()
            .into_rules()
            .iter()
            .map(AlertRule::from_config)
            .collect()
    }

    #[test]
    fn banded_rule_keeps_matching_rows_in_order() {
        let banded = rule(
            "A",
            RuleCondition {
                left_min: Some(20),
                right_below: Some(200),
                ..Default::default()
            },
        );
        let rows = vec![row(20, 150), row(2, 500)];

        let buckets = evaluate(&rows, &[banded]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].rule_name, "A");
        assert_eq!(buckets[0].matches, vec![row(20, 150)]);
    }

    #[test]
    fn boundaries_follow_clause_semantics() {
        let left_min = rule("min", RuleCondition { left_min: Some(20), ..Default::default() });
        assert!(left_min.matches(&row(20, 0)));
        assert!(!left_min.matches(&row(19, 0)));

        let left_above = rule("above", RuleCondition { left_above: Some(3), ..Default::default() });
        assert!(left_above.matches(&row(4, 0)));
        assert!(!left_above.matches(&row(3, 0)));

        let right_below = rule("below", RuleCondition { right_below: Some(200), ..Default::default() });
        assert!(right_below.matches(&row(0, 199)));
        assert!(!right_below.matches(&row(0, 200)));

        let between = rule(
            "between",
            RuleCondition {
                right_between: Some([1, 19]),
                ..Default::default()
            },
        );
        assert!(between.matches(&row(0, 1)));
        assert!(between.matches(&row(0, 19)));
        assert!(!between.matches(&row(0, 0)));
        assert!(!between.matches(&row(0, 20)));
    }

    #[test]
    fn label_rule_is_case_insensitive_and_needs_a_label() {
        let seasonal = rule(
            "E",
            RuleCondition {
                left_min: Some(10),
                label_equals: Some("Xmas25".to_string()),
                ..Default::default()
            },
        );

        assert!(seasonal.matches(&labeled(10, 999, "xmas25")));
        assert!(seasonal.matches(&labeled(12, 1, "XMAS25")));
        assert!(!seasonal.matches(&labeled(9, 1, "Xmas25")));
        assert!(!seasonal.matches(&labeled(10, 1, "Xmas24")));
        assert!(!seasonal.matches(&row(10, 1)));
    }

    #[test]
    fn row_matching_two_rules_lands_in_both_buckets() {
        // 35 / 150 satisfies A (>=20, <200) and B (>=30, <400)
        let rows = vec![row(35, 150)];
        let buckets = evaluate(&rows, &builtin_rules());

        let names: Vec<_> = buckets.iter().map(|b| b.rule_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(buckets[0].matches, buckets[1].matches);
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let rows = vec![row(1, 900), row(2, 650)];
        assert!(evaluate(&rows, &builtin_rules()).is_empty());
        assert!(evaluate(&[], &builtin_rules()).is_empty());
    }

    #[test]
    fn bucket_order_follows_rule_order() {
        // D matches first row, A the second; buckets still come out A then D
        let rows = vec![row(0, 5), row(25, 150)];
        let buckets = evaluate(&rows, &builtin_rules());

        let names: Vec<_> = buckets.iter().map(|b| b.rule_name.as_str()).collect();
        assert_eq!(names, ["A", "D"]);
        assert_eq!(buckets[1].matches, vec![row(0, 5)]);
    }

    #[test]
    fn engine_exposes_rules_and_evaluates() {
        let engine = RuleEngine::new(builtin_rules());
        assert_eq!(engine.rules().len(), 5);
        assert_eq!(engine.rules()[4].sentinel(), Some("Xmas25"));

        let buckets = engine.evaluate(&[labeled(11, 300, "Xmas25")]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].rule_name, "E");
        assert!(buckets[0].show_label);
    }
}
