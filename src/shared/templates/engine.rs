//! Template engine for the HTML pages served by the sync service.
//!
//! Templates live in `templates/` at the crate root and are embedded into the
//! binary at compile time, so rendering never depends on the working directory.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Embedded templates as (name, source) pairs
const TEMPLATES: &[(&str, &str)] = &[(
    "status.html.jinja",
    include_str!("../../../templates/status.html.jinja"),
)];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
///
/// Values are HTML-escaped by minijinja for templates ending in `.html.jinja`.
pub fn render_template(
    template_name: &str,
    ctx: &HashMap<&str, Value>,
) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    let render_ctx = Value::from_iter(ctx.iter().map(|(k, v)| (*k, v.clone())));

    template
        .render(render_ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template() {
        let result = render_template("nonexistent.jinja", &HashMap::new());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_status_template_escapes_values() {
        let mut ctx = HashMap::new();
        ctx.insert("last_update", Value::from("<b>soon</b>"));
        ctx.insert("download_path", Value::from("/api/data"));
        ctx.insert("filename", Value::from("districts.json"));

        let html = render_template("status.html.jinja", &ctx).unwrap();
        assert!(html.contains("&lt;b&gt;soon"));
        assert!(!html.contains("<b>soon"));
        assert!(html.contains("districts.json"));
    }
}
