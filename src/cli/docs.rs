use anyhow::{anyhow, Result};
use clap::Args;
use tracing::debug;

use crate::config::Config;
use crate::docs::{DocsLibrary, DocsRenderer};

/// Print a rendered documentation page
#[derive(Args)]
pub struct DocsCommand {
    /// Page slug; defaults to the first page
    pub page: Option<String>,

    /// List the available pages instead of rendering one
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Wrap width for rules, tables and code frames
    #[arg(short = 'w', long = "width", default_value_t = 80)]
    pub width: u16,
}

impl DocsCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        println!("{}", self.output(config)?);
        Ok(())
    }

    /// Text the command prints
    pub fn output(&self, config: &Config) -> Result<String> {
        let library = DocsLibrary::load(config.docs_dir.as_deref())?;

        if self.list {
            let width = library.pages().iter().map(|p| p.slug.len()).max().unwrap_or(0);
            let lines: Vec<String> = library
                .pages()
                .iter()
                .map(|page| match page.description() {
                    Some(description) => {
                        format!("{:<width$}  {}: {}", page.slug, page.title(), description)
                    }
                    None => format!("{:<width$}  {}", page.slug, page.title()),
                })
                .collect();
            return Ok(lines.join("\n"));
        }

        let page = match &self.page {
            Some(slug) => library.get(slug).ok_or_else(|| {
                let known: Vec<&str> = library.pages().iter().map(|p| p.slug.as_str()).collect();
                anyhow!("Unknown page '{}', available: {}", slug, known.join(", "))
            })?,
            None => library
                .pages()
                .first()
                .ok_or_else(|| anyhow!("No documentation pages found"))?,
        };
        debug!("Rendering page '{}' at width {}", page.slug, self.width);

        let renderer = DocsRenderer::new(&config.theme(), config.highlight_config(), config.stack)?;
        let doc = renderer.render(&page.body, self.width)?;
        Ok(doc.plain_lines().join("\n"))
    }
}
