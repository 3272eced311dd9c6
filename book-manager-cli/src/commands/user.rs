use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Register a reader that exports can be imported for.
pub(crate) fn run_user_add(db_path: &Path, username: &str) -> Result<(), CliError> {
    let conn = book_manager_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalog database: {}", e)))?;

    let existing = book_manager_db::find_user_by_username(&conn, username)
        .map_err(|e| CliError::database(format!("Failed to look up user: {}", e)))?;
    if existing.is_some() {
        return Err(CliError::user_exists(username));
    }

    let user = book_manager_db::insert_user(&conn, username)
        .map_err(|e| CliError::database(format!("Failed to add user: {}", e)))?;

    log::info!(
        "{} user {} (id {})",
        "Added".if_supports_color(Stdout, |t| t.green()),
        user.username.if_supports_color(Stdout, |t| t.cyan()),
        user.id,
    );
    Ok(())
}
