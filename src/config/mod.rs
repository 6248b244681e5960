use crate::dialog::StackConfig;
use crate::docs::HighlightConfig;
use crate::tui::components::StackViewConfig;
use crate::tui::theme::Theme;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stack offsets and transition timing
    pub stack: StackConfig,

    /// Terminal presentation of the stack
    pub view: StackViewConfig,

    /// UI theme name
    pub theme: String,

    /// Directory of markdown pages replacing the built-in docs
    pub docs_dir: Option<PathBuf>,

    /// Language assumed for unlabelled code fences
    pub code_lang: String,

    /// Frame interval of the interactive UI, in milliseconds
    pub tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack: StackConfig::default(),
            view: StackViewConfig::default(),
            theme: "dark".to_string(),
            docs_dir: None,
            code_lang: "rust".to_string(),
            tick_ms: 16,
        }
    }
}

impl Config {
    /// Initialize configuration from defaults, a config file and the environment
    pub async fn init(path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::load_from_file(path).await? {
            Some((config, source)) => {
                debug!("Loaded configuration from: {}", source.display());
                config
            }
            None => Self::default(),
        };

        config.load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Config files in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.toldo.json"), PathBuf::from("./toldo.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("toldo").join("toldo.json"));
        }
        paths
    }

    /// Read `path`, or the first candidate file that exists.
    ///
    /// An explicit path must exist; missing candidates are skipped.
    pub async fn load_from_file(path: Option<&Path>) -> Result<Option<(Self, PathBuf)>> {
        let paths = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {}", path.display()));
                }
                vec![path.to_path_buf()]
            }
            None => Self::candidate_paths(),
        };

        for path in paths {
            if !path.exists() {
                continue;
            }
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            return Ok(Some((config, path)));
        }

        Ok(None)
    }

    /// Apply `TOLDO_*` environment variables
    pub fn load_from_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = parse_var(&var, "TOLDO_STACK_Y")? {
            self.stack.offsets.y = value;
        }
        if let Some(value) = parse_var(&var, "TOLDO_STACK_SCALE")? {
            self.stack.offsets.scale = value;
        }
        if let Some(value) = parse_var(&var, "TOLDO_STACK_OPACITY")? {
            self.stack.offsets.opacity = value;
        }
        if let Some(value) = parse_var::<u64>(&var, "TOLDO_DURATION_MS")? {
            self.stack.transition.duration = Duration::from_millis(value);
        }
        if let Some(theme) = var("TOLDO_THEME") {
            self.theme = theme;
        }
        if let Some(dir) = var("TOLDO_DOCS_DIR") {
            self.docs_dir = Some(PathBuf::from(dir));
        }
        if let Some(lang) = var("TOLDO_CODE_LANG") {
            self.code_lang = lang;
        }
        if let Some(value) = parse_var(&var, "TOLDO_UNITS_PER_ROW")? {
            self.view.units_per_row = value;
        }
        if let Some(value) = var("TOLDO_CLOSE_ON_ESCAPE") {
            self.view.close_on_escape = parse_bool(&value)
                .ok_or_else(|| anyhow!("TOLDO_CLOSE_ON_ESCAPE must be true or false, got '{}'", value))?;
        }
        if let Some(value) = parse_var(&var, "TOLDO_TICK_MS")? {
            self.tick_ms = value;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.stack.validate()?;

        if !self.view.units_per_row.is_finite() || self.view.units_per_row <= 0.0 {
            return Err(anyhow!("units_per_row must be greater than 0"));
        }

        if self.tick_ms == 0 {
            return Err(anyhow!("tick_ms must be greater than 0"));
        }

        if Theme::by_name(&self.theme).is_none() {
            return Err(anyhow!(
                "Unknown theme '{}', expected one of: {}",
                self.theme,
                Theme::names().join(", ")
            ));
        }

        if self.code_lang.trim().is_empty() {
            return Err(anyhow!("code_lang must not be empty"));
        }

        Ok(())
    }

    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_default()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn highlight_config(&self) -> HighlightConfig {
        HighlightConfig::for_ui(self.theme().is_dark, self.code_lang.clone())
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {}: '{}'", name, value))
        })
        .transpose()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
