pub mod check;
pub mod init;
pub mod play;
pub mod topics;

use std::path::Path;

use wordwolf_core::ThemeRepository;

/// Load a topic file, mapping engine errors to CLI messages.
fn load_topics(file: &Path) -> Result<ThemeRepository, String> {
    ThemeRepository::load(file).map_err(|e| format!("{}: {e}", file.display()))
}
