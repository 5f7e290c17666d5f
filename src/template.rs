//! Formatting of alert buckets into notification text.
//!
//! The header line is a per-rule Jinja template (minijinja) that sees the
//! rule `name`, the match `count` and the label `sentinel`. The body is fixed:
//! one `(<left> / <right>)` line per matching row, in source order, with
//! ` — <label>` appended for rules that show labels.
//!
//! ```text
//! engine.rs -> template.rs -> notify/
//! ```

use crate::engine::{AlertBucket, AlertRule};
use crate::error::TemplateError;
use crate::parser::Row;
use minijinja::{Environment, UndefinedBehavior, context};
use std::collections::HashMap;

/// Rendered notification, handed unchanged to every sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Header line identifying the bucket.
    pub title: String,
    /// One line per matching row.
    pub body: String,
}

impl RenderedMessage {
    /// Header and body as a single text payload.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }
}

/// Format one row as a body line.
pub fn format_row(row: &Row, show_label: bool) -> String {
    if show_label {
        format!("({} / {}) — {}", row.left, row.right, row.display_label())
    } else {
        format!("({} / {})", row.left, row.right)
    }
}

/// Format all rows of a bucket, joined with line breaks.
pub fn format_body(rows: &[Row], show_label: bool) -> String {
    rows.iter()
        .map(|row| format_row(row, show_label))
        .collect::<Vec<_>>()
        .join("\n")
}

struct TitleTemplate {
    source: String,
    sentinel: Option<String>,
}

/// Renders buckets using the title templates of the configured rules.
pub struct TemplateEngine {
    env: Environment<'static>,
    titles: HashMap<String, TitleTemplate>,
}

impl TemplateEngine {
    /// Build the engine from the compiled rules.
    ///
    /// Titles were checked at config load time, so render errors here are
    /// limited to runtime failures such as a filter erroring on its input.
    pub fn new(rules: &[AlertRule]) -> Self {
        let mut env = Environment::new();
        // Missing variables render as empty strings
        env.set_undefined_behavior(UndefinedBehavior::Lenient);

        let titles = rules
            .iter()
            .map(|rule| {
                (
                    rule.name.clone(),
                    TitleTemplate {
                        source: rule.title.clone(),
                        sentinel: rule.sentinel().map(str::to_string),
                    },
                )
            })
            .collect();

        Self { env, titles }
    }

    /// Render a bucket.
    ///
    /// # Errors
    /// [`TemplateError::NotFound`] when the bucket's rule is unknown,
    /// [`TemplateError::RenderFailed`] when the title fails to render.
    pub fn render(&self, bucket: &AlertBucket) -> Result<RenderedMessage, TemplateError> {
        let template = self
            .titles
            .get(&bucket.rule_name)
            .ok_or_else(|| TemplateError::NotFound {
                rule: bucket.rule_name.clone(),
            })?;

        let title = self
            .env
            .render_str(
                &template.source,
                context! {
                    name => &bucket.rule_name,
                    count => bucket.matches.len(),
                    sentinel => template.sentinel.as_deref().unwrap_or_default(),
                },
            )
            .map_err(|e| TemplateError::RenderFailed {
                message: e.to_string(),
            })?;

        tracing::trace!(rule_name = %bucket.rule_name, title = %title, "Title rendered");

        Ok(RenderedMessage {
            title: title.trim().to_string(),
            body: format_body(&bucket.matches, bucket.show_label),
        })
    }

    /// Render a bucket, falling back to a plain title on error.
    ///
    /// The body never depends on the template, so matches are always
    /// delivered.
    pub fn render_with_fallback(&self, bucket: &AlertBucket) -> RenderedMessage {
        match self.render(bucket) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(
                    rule_name = %bucket.rule_name,
                    error = %e,
                    "Title render failed, using fallback"
                );
                RenderedMessage {
                    title: format!("Alert {}", bucket.rule_name),
                    body: format_body(&bucket.matches, bucket.show_label),
                }
            }
        }
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("rules", &self.titles.keys().collect::<Vec<_>>())
            .finish()
    }
}
