//! Just enough of the launcher's accounts to find whose session to play.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::session::{read_json, write_json};

pub const ACCOUNTS_FILE: &str = "config.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Accounts {
    #[serde(default, rename = "logged-user")]
    logged_user: Option<String>,
}

/// The user marked as logged in under `data_dir`.
pub fn logged_user(data_dir: &Path) -> Result<String> {
    let accounts: Option<Accounts> = read_json(&data_dir.join(ACCOUNTS_FILE))?;
    accounts
        .and_then(|a| a.logged_user)
        .filter(|u| !u.is_empty())
        .ok_or(Error::NoLoggedUser)
}

/// Creates the user's directory (if needed) and logs the user in.
pub fn register(data_dir: &Path, user: &str) -> Result<()> {
    let dir = data_dir.join(user);
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    write_json(
        &data_dir.join(ACCOUNTS_FILE),
        &Accounts {
            logged_user: Some(user.to_string()),
        },
    )?;
    info!(user, "registered and logged in");
    Ok(())
}
