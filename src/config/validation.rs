//! Title template validation.

use minijinja::{Environment, UndefinedBehavior};

/// Validates Jinja template syntax.
pub(crate) fn validate_jinja_template(source: &str) -> Result<(), String> {
    let mut env = Environment::new();
    env.add_template("_validate", source)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Renders a title template against a sample bucket context.
///
/// Catches errors only visible at render time, such as unknown filters.
pub fn validate_template_render(source: &str) -> Result<(), String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.render_str(
        source,
        minijinja::context! { name => "A", count => 1, sentinel => "Xmas25" },
    )
    .map(|_| ())
    .map_err(|e| e.to_string())
}
