use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::dialog::{DialogId, StackLayout};

/// Compute the stack layout for a set of open dialogs
#[derive(Args)]
pub struct LayoutCommand {
    /// Open dialog ids in registration order, comma separated
    #[arg(short = 'o', long = "open", value_delimiter = ',', required = true)]
    pub open: Vec<String>,

    /// Vertical offset per rank
    #[arg(long = "y")]
    pub y: Option<f32>,

    /// Scale reduction per rank
    #[arg(long = "scale")]
    pub scale: Option<f32>,

    /// Opacity reduction per rank
    #[arg(long = "opacity")]
    pub opacity: Option<f32>,

    /// Transition duration, e.g. `400ms` or `1s`
    #[arg(long = "duration", value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,
}

impl LayoutCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let layout = self.layout(config)?;
        println!("{}", serde_json::to_string_pretty(&layout)?);
        Ok(())
    }

    /// Layout for the requested ids, with flag overrides applied to `config`
    pub fn layout(&self, config: &Config) -> Result<StackLayout> {
        let mut stack = config.stack;
        if let Some(y) = self.y {
            stack.offsets.y = y;
        }
        if let Some(scale) = self.scale {
            stack.offsets.scale = scale;
        }
        if let Some(opacity) = self.opacity {
            stack.offsets.opacity = opacity;
        }
        if let Some(duration) = self.duration {
            stack.transition.duration = duration;
        }
        stack.validate()?;

        let ids: Vec<DialogId> = self
            .open
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(DialogId::from)
            .collect();
        if let Some(duplicate) = ids.iter().enumerate().find_map(|(i, id)| ids[..i].contains(id).then_some(id)) {
            return Err(anyhow!("Dialog '{}' listed more than once", duplicate));
        }

        debug!("Computing layout for {} open dialogs", ids.len());
        Ok(StackLayout::compute(&ids, &stack))
    }
}
