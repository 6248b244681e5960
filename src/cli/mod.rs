mod docs;
mod layout;
mod root;

pub use docs::DocsCommand;
pub use layout::LayoutCommand;
pub use root::{Cli, Commands};
