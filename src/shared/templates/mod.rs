//! HTML page templates.
//!
//! # Usage
//!
//! ```ignore
//! let html = render_status_page("2026/1/2 03:04:05", "/api/data", "districts.json")?;
//! ```

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Render the sync status page.
///
/// # Arguments
/// * `last_update` - Human readable time of the last successful sync
/// * `download_path` - Path of the download endpoint
/// * `filename` - File name offered by the download endpoint
pub fn render_status_page(
    last_update: &str,
    download_path: &str,
    filename: &str,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("last_update", Value::from(last_update));
    ctx.insert("download_path", Value::from(download_path));
    ctx.insert("filename", Value::from(filename));

    render_template("status.html.jinja", &ctx)
}
