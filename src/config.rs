//! Configuration management for the highlight anchor host

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub highlighter: HighlighterConfig,
    pub layout: LayoutConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlighterConfig {
    /// Show the menu for fresh selections
    pub enabled: bool,
    /// Allow notes
    pub pro: bool,
    /// Render navigation markers
    pub nav: bool,
    /// Longest selection `test` will scan, in characters
    pub max_selection_len: usize,
    /// Quiet period before a non-empty selection is rendered
    pub selection_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub line_height: f64,
    pub columns: usize,
    pub viewport_height: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// Document to load
    pub document_path: Option<PathBuf>,
    /// Where to write the decorated document on shutdown
    pub output_path: Option<PathBuf>,
    /// URL reported to the host once ready
    pub url: Option<String>,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        HighlighterConfig {
            enabled: true,
            pro: false,
            nav: false,
            max_selection_len: 10_000,
            selection_delay_ms: 200,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            line_height: 20.0,
            columns: 80,
            viewport_height: 800.0,
        }
    }
}

impl Config {
    /// Read settings from `RDH_*` variables, falling back to defaults for
    /// anything unset. Fails only on a set but non-UTF-8 path or URL.
    pub fn from_env() -> Result<Self, env::VarError> {
        let highlighter = HighlighterConfig::default();
        let layout = LayoutConfig::default();

        Ok(Config {
            highlighter: HighlighterConfig {
                enabled: env_flag("RDH_ENABLED", highlighter.enabled),
                pro: env_flag("RDH_PRO", highlighter.pro),
                nav: env_flag("RDH_NAV", highlighter.nav),
                max_selection_len: env_parse("RDH_MAX_SELECTION", highlighter.max_selection_len),
                selection_delay_ms: env_parse(
                    "RDH_SELECTION_DELAY_MS",
                    highlighter.selection_delay_ms,
                ),
            },
            layout: LayoutConfig {
                line_height: env_parse("RDH_LINE_HEIGHT", layout.line_height),
                columns: env_parse("RDH_COLUMNS", layout.columns),
                viewport_height: env_parse("RDH_VIEWPORT_HEIGHT", layout.viewport_height),
            },
            host: HostConfig {
                document_path: env_optional("RDH_DOCUMENT")?.map(PathBuf::from),
                output_path: env_optional("RDH_OUTPUT")?.map(PathBuf::from),
                url: env_optional("RDH_URL")?,
            },
        })
    }
}

fn env_optional(name: &str) -> Result<Option<String>, env::VarError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e),
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => parse_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.highlighter.enabled);
        assert!(!config.highlighter.pro);
        assert_eq!(config.highlighter.max_selection_len, 10_000);
        assert_eq!(config.highlighter.selection_delay_ms, 200);
        assert!(config.host.document_path.is_none());
    }

    #[test]
    fn test_from_env_without_document() {
        env::remove_var("RDH_DOCUMENT");
        env::set_var("RDH_NAV", "1");
        env::set_var("RDH_PRO", "yes");
        env::set_var("RDH_OUTPUT", "out.xhtml");
        env::set_var("RDH_COLUMNS", "60");

        let config = Config::from_env().unwrap();

        for name in ["RDH_NAV", "RDH_PRO", "RDH_OUTPUT", "RDH_COLUMNS"] {
            env::remove_var(name);
        }

        assert!(config.highlighter.nav);
        assert!(config.highlighter.pro);
        assert_eq!(config.layout.columns, 60);
        assert!(config.host.document_path.is_none());
        assert_eq!(config.host.output_path, Some(PathBuf::from("out.xhtml")));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
