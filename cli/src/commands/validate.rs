//! `hoster validate` — check `config.json` without touching the network.

use anyhow::Result;

use crate::app::AppContext;

/// Run the validate command.
///
/// # Errors
///
/// Returns the config error when the file is unreadable or invalid.
pub fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    app.renderer().render_config(&config)
}
