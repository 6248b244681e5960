//! Documentation pages
//!
//! Markdown pages with optional YAML front matter, rendered to styled
//! terminal text. A set of pages ships embedded in the binary; a docs
//! directory on disk replaces them when configured.

pub mod components;
pub mod highlight;
pub mod renderer;
pub mod slug;
pub mod styles;

pub use highlight::{HighlightConfig, Highlighter};
pub use renderer::{DocsRenderer, Heading, RenderedDoc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const BUILTIN_PAGES: &[(&str, &str)] = &[
    ("index", include_str!("../../docs/index.md")),
    ("basic", include_str!("../../docs/basic.md")),
    ("animation", include_str!("../../docs/animation.md")),
    ("stacked", include_str!("../../docs/stacked.md")),
    ("api", include_str!("../../docs/api.md")),
];

/// Page metadata from the leading `---` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i64>,
}

/// A single documentation page
#[derive(Debug, Clone, PartialEq)]
pub struct DocsPage {
    pub slug: String,
    pub front_matter: FrontMatter,
    pub body: String,
    /// Source file, if the page was loaded from disk
    pub path: Option<PathBuf>,
}

impl DocsPage {
    pub fn parse(slug: impl Into<String>, source: &str) -> Result<Self> {
        let slug = slug.into();
        let (front_matter, body) = split_front_matter(source);
        let front_matter = match front_matter {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)
                .with_context(|| format!("Invalid front matter in page '{}'", slug))?,
            _ => FrontMatter::default(),
        };

        Ok(Self {
            slug,
            front_matter,
            body: body.to_string(),
            path: None,
        })
    }

    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or(&self.slug)
    }

    pub fn description(&self) -> Option<&str> {
        self.front_matter.description.as_deref()
    }
}

/// Split a leading `---` delimited block from the markdown body
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, source)
}

/// Ordered collection of pages
#[derive(Debug, Clone, Default)]
pub struct DocsLibrary {
    pages: Vec<DocsPage>,
}

impl DocsLibrary {
    /// Pages embedded in the binary
    pub fn builtin() -> Result<Self> {
        let pages = BUILTIN_PAGES
            .iter()
            .map(|(slug, source)| DocsPage::parse(*slug, source))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_pages(pages))
    }

    /// Every `*.md` file below `dir`; the slug is the path without extension
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path).with_extension("");
            let slug = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match DocsPage::parse(slug, &source) {
                Ok(mut page) => {
                    page.path = Some(path.to_path_buf());
                    pages.push(page);
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        debug!("Loaded {} docs pages from {}", pages.len(), dir.display());
        Ok(Self::from_pages(pages))
    }

    /// Pages from `dir` when given, otherwise the embedded ones
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Pages sorted by front matter `order`, then slug
    pub fn from_pages(mut pages: Vec<DocsPage>) -> Self {
        pages.sort_by(|a, b| {
            let order = |p: &DocsPage| p.front_matter.order.unwrap_or(i64::MAX);
            order(a).cmp(&order(b)).then_with(|| a.slug.cmp(&b.slug))
        });
        Self { pages }
    }

    pub fn pages(&self) -> &[DocsPage] {
        &self.pages
    }

    pub fn get(&self, slug: &str) -> Option<&DocsPage> {
        self.pages.iter().find(|page| page.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_front_matter() {
        let (yaml, body) = split_front_matter("---\ntitle: Intro\n---\n# Hello\n");
        assert_eq!(yaml, Some("title: Intro\n"));
        assert_eq!(body, "# Hello\n");

        let (yaml, body) = split_front_matter("# No front matter\n");
        assert_eq!(yaml, None);
        assert_eq!(body, "# No front matter\n");

        // unterminated blocks are left as markdown
        let (yaml, _) = split_front_matter("---\ntitle: x\n");
        assert_eq!(yaml, None);
    }

    #[test]
    fn test_parse_page() {
        let page = DocsPage::parse(
            "intro",
            "---\ntitle: Introduction\ndescription: Start here\norder: 1\n---\nBody\n",
        )
        .unwrap();
        assert_eq!(page.title(), "Introduction");
        assert_eq!(page.description(), Some("Start here"));
        assert_eq!(page.front_matter.order, Some(1));
        assert_eq!(page.body, "Body\n");

        let untitled = DocsPage::parse("notes", "Just text").unwrap();
        assert_eq!(untitled.title(), "notes");
    }

    #[test]
    fn test_invalid_front_matter() {
        assert!(DocsPage::parse("bad", "---\ntitle: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_builtin_pages_parse_and_render() {
        let library = DocsLibrary::builtin().unwrap();
        assert_eq!(library.pages()[0].slug, "index");
        assert!(library.get("api").is_some());

        let renderer = DocsRenderer::new(
            &crate::tui::theme::Theme::dark(),
            HighlightConfig::default(),
            crate::dialog::StackConfig::default(),
        )
        .unwrap();
        for page in library.pages() {
            let doc = renderer.render(&page.body, 80).unwrap();
            assert!(!doc.headings.is_empty(), "page {} has no headings", page.slug);
        }
    }

    #[test]
    fn test_load_dir_orders_pages() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("guides")).unwrap();
        fs::write(dir.path().join("zeta.md"), "---\norder: 1\n---\n# Zeta\n").unwrap();
        fs::write(dir.path().join("alpha.md"), "# Alpha\n").unwrap();
        fs::write(dir.path().join("guides/setup.md"), "---\norder: 2\n---\n# Setup\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = DocsLibrary::load(Some(dir.path())).unwrap();
        let slugs: Vec<&str> = library.pages().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["zeta", "guides/setup", "alpha"]);
        assert!(library.get("alpha").unwrap().path.is_some());
    }
}
