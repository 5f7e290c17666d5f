//! Declarative alert rules.
//!
//! Rules come either from the `ALERT_*` threshold variables (the built-in
//! A..E set) or from a YAML rules file that replaces that set entirely:
//!
//! ```yaml
//! rules:
//!   - name: A
//!     when: { left_min: 20, right_below: 200 }
//!   - name: E
//!     title: "Alert {{ name }} — {{ sentinel }}"
//!     show_label: true
//!     when: { left_min: 10, label_equals: Xmas25 }
//! ```

use super::notifiers::default_true;
use super::validation::{validate_jinja_template, validate_template_render};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Title used when a rule does not set one.
pub const DEFAULT_TITLE_TEMPLATE: &str = "Alert {{ name }}";

/// One named rule: a conjunctive condition plus how its bucket is titled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Jinja template for the header line; sees `name`, `count`, `sentinel`.
    #[serde(default = "default_title")]
    pub title: String,
    /// Append ` — <label>` to every rendered row.
    #[serde(default)]
    pub show_label: bool,
    pub when: RuleCondition,
}

/// Clauses of a rule. Every clause that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleCondition {
    /// `left >= n`
    #[serde(default)]
    pub left_min: Option<u32>,
    /// `left > n`
    #[serde(default)]
    pub left_above: Option<u32>,
    /// `right < n`
    #[serde(default)]
    pub right_below: Option<u32>,
    /// `lo <= right <= hi`
    #[serde(default)]
    pub right_between: Option<[u32; 2]>,
    /// Case-insensitive label match; rows without a label never match.
    #[serde(default)]
    pub label_equals: Option<String>,
}

impl RuleCondition {
    /// True when no clause is set (the rule would match every row).
    pub fn is_empty(&self) -> bool {
        self.left_min.is_none()
            && self.left_above.is_none()
            && self.right_below.is_none()
            && self.right_between.is_none()
            && self.label_equals.is_none()
    }
}

/// Top-level layout of a rules file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    rules: Vec<RuleConfig>,
}

fn default_title() -> String {
    DEFAULT_TITLE_TEMPLATE.to_string()
}

/// Thresholds of the built-in rule set, one field per `ALERT_*` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds {
    pub a_left_min: u32,
    pub a_right_max: u32,
    pub b_left_min: u32,
    pub b_right_max: u32,
    pub c_left_above: u32,
    pub c_right_max: u32,
    pub d_right_min: u32,
    pub d_right_max: u32,
    pub e_left_min: u32,
    pub e_label: String,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            a_left_min: 20,
            a_right_max: 200,
            b_left_min: 30,
            b_right_max: 400,
            c_left_above: 3,
            c_right_max: 100,
            d_right_min: 1,
            d_right_max: 19,
            e_left_min: 10,
            e_label: "Xmas25".to_string(),
        }
    }
}

impl Thresholds {
    /// Expand into the built-in rules A..E, in that order.
    pub fn into_rules(self) -> Vec<RuleConfig> {
        let rule = |name: &str, title: &str, show_label: bool, when: RuleCondition| RuleConfig {
            name: name.to_string(),
            enabled: true,
            title: title.to_string(),
            show_label,
            when,
        };

        vec![
            rule(
                "A",
                DEFAULT_TITLE_TEMPLATE,
                false,
                RuleCondition {
                    left_min: Some(self.a_left_min),
                    right_below: Some(self.a_right_max),
                    ..Default::default()
                },
            ),
            rule(
                "B",
                DEFAULT_TITLE_TEMPLATE,
                false,
                RuleCondition {
                    left_min: Some(self.b_left_min),
                    right_below: Some(self.b_right_max),
                    ..Default::default()
                },
            ),
            rule(
                "C",
                DEFAULT_TITLE_TEMPLATE,
                false,
                RuleCondition {
                    left_above: Some(self.c_left_above),
                    right_below: Some(self.c_right_max),
                    ..Default::default()
                },
            ),
            rule(
                "D",
                DEFAULT_TITLE_TEMPLATE,
                false,
                RuleCondition {
                    right_between: Some([self.d_right_min, self.d_right_max]),
                    ..Default::default()
                },
            ),
            rule(
                "E",
                "Alert {{ name }} — {{ sentinel }}",
                true,
                RuleCondition {
                    left_min: Some(self.e_left_min),
                    label_equals: Some(self.e_label),
                    ..Default::default()
                },
            ),
        ]
    }
}

/// Load the rule list from a YAML rules file.
///
/// # Errors
/// Returns [`ConfigError::LoadError`] if the file cannot be read.
/// Returns [`ConfigError::ValidationError`] if the YAML does not match the layout.
pub fn load_rules_file(path: &Path) -> Result<Vec<RuleConfig>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

    let file: RulesFile = serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::ValidationError(format!("{}: {}", path.display(), e)))?;

    Ok(file.rules)
}

/// Validate every rule, including disabled ones, collecting all errors.
pub(crate) fn validate_rules(rules: &[RuleConfig]) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if rules.is_empty() {
        errors.push(ConfigError::ValidationError(
            "at least one rule is required".to_string(),
        ));
    }

    for rule in rules {
        let name = rule.name.trim();
        if name.is_empty() {
            errors.push(ConfigError::ValidationError(
                "rule name cannot be empty".to_string(),
            ));
        } else if !seen.insert(name) {
            errors.push(ConfigError::InvalidRule {
                rule: name.to_string(),
                message: "duplicate rule name".to_string(),
            });
        }

        if rule.when.is_empty() {
            errors.push(ConfigError::InvalidRule {
                rule: rule.name.clone(),
                message: "condition has no clauses and would match every row".to_string(),
            });
        }

        if let Some([lo, hi]) = rule.when.right_between
            && lo > hi
        {
            errors.push(ConfigError::InvalidRule {
                rule: rule.name.clone(),
                message: format!("right_between lower bound {} exceeds upper bound {}", lo, hi),
            });
        }

        if let Some(ref label) = rule.when.label_equals
            && label.trim().is_empty()
        {
            errors.push(ConfigError::InvalidRule {
                rule: rule.name.clone(),
                message: "label_equals cannot be empty".to_string(),
            });
        }

        if let Err(e) = validate_jinja_template(&rule.title) {
            errors.push(ConfigError::InvalidTemplate {
                rule: rule.name.clone(),
                message: format!("title: {}", e),
            });
        } else if let Err(e) = validate_template_render(&rule.title) {
            errors.push(ConfigError::InvalidTemplate {
                rule: rule.name.clone(),
                message: format!("title render: {}", e),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_expand_to_five_rules() {
        let rules = Thresholds::default().into_rules();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);

        assert_eq!(rules[0].when.left_min, Some(20));
        assert_eq!(rules[0].when.right_below, Some(200));
        assert_eq!(rules[2].when.left_above, Some(3));
        assert_eq!(rules[3].when.right_between, Some([1, 19]));
        assert_eq!(rules[4].when.label_equals.as_deref(), Some("Xmas25"));
        assert!(rules[4].show_label);
        assert!(validate_rules(&rules).is_empty());
    }

    #[test]
    fn rule_config_parses_with_defaults() {
        let yaml = r#"
            name: low_right
            when:
              right_below: 50
        "#;
        let rule: RuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(rule.enabled);
        assert!(!rule.show_label);
        assert_eq!(rule.title, DEFAULT_TITLE_TEMPLATE);
        assert_eq!(rule.when.right_below, Some(50));
    }

    #[test]
    fn rule_config_rejects_unknown_clause() {
        let yaml = r#"
            name: typo
            when:
              right_bellow: 50
        "#;
        assert!(serde_yaml::from_str::<RuleConfig>(yaml).is_err());
    }

    #[test]
    fn validate_rules_collects_all_errors() {
        let rules = vec![
            RuleConfig {
                name: "X".to_string(),
                enabled: true,
                title: default_title(),
                show_label: false,
                when: RuleCondition::default(),
            },
            RuleConfig {
                name: "X".to_string(),
                enabled: false,
                title: "Alert {% if".to_string(),
                show_label: false,
                when: RuleCondition {
                    right_between: Some([19, 1]),
                    ..Default::default()
                },
            },
        ];

        let errors = validate_rules(&rules);
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

        assert_eq!(errors.len(), 4, "{:?}", messages);
        assert!(messages.iter().any(|m| m.contains("would match every row")));
        assert!(messages.iter().any(|m| m.contains("duplicate rule name")));
        assert!(messages.iter().any(|m| m.contains("lower bound 19")));
        assert!(messages.iter().any(|m| m.contains("title")));
    }

    #[test]
    fn validate_rules_rejects_empty_list() {
        let errors = validate_rules(&[]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("at least one rule"));
    }

    #[test]
    fn load_rules_file_reports_missing_file() {
        let err = load_rules_file(Path::new("/nonexistent/rules.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
