//! Output formatting for CLI commands
//!
//! One-shot commands print the same envelope the stdio server writes, as
//! pretty JSON or YAML.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render data in the given format
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to serialize to YAML"),
    }
}

/// Print data in the given format
pub fn print_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(data, format)?.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let rendered = render(&json!({"ok": true}), OutputFormat::Json).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&rendered).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_render_yaml() {
        let rendered = render(&json!({"ok": true}), OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("ok: true"));
    }
}
