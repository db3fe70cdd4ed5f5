//! Credential acquisition. All environment and `.env` access lives here;
//! the library crates only ever see an explicit [`BotCredentials`].

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use bot_client::BotCredentials;
use dialoguer::Input;

const ENV_FILE: &str = ".env";
const API_ID_KEY: &str = "TG_API_ID";
const API_HASH_KEY: &str = "TG_API_HASH";

/// Loads credentials from the process environment, then from `.env` in the
/// working directory; prompts interactively and appends to `.env` when
/// neither has a complete pair.
pub fn load_or_prompt() -> Result<BotCredentials> {
    let file_vars = read_env_file(Path::new(ENV_FILE)).unwrap_or_default();

    let lookup = |key: &str| {
        std::env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| file_vars.get(key).cloned())
    };

    let (api_id, api_hash) = match (lookup(API_ID_KEY), lookup(API_HASH_KEY)) {
        (Some(id), Some(hash)) => (id, hash),
        _ => prompt_and_persist()?,
    };

    let api_id: u64 = api_id
        .trim()
        .parse()
        .with_context(|| format!("{API_ID_KEY} must be a positive integer"))?;

    Ok(BotCredentials {
        api_id,
        api_hash: api_hash.trim().to_owned(),
    })
}

/// Minimal KEY=VALUE parser, enough for the two keys we persist. Blank
/// lines and `#` comments are skipped.
fn read_env_file(path: &Path) -> Option<HashMap<String, String>> {
    let contents = fs::read_to_string(path).ok()?;

    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            vars.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }

    Some(vars)
}

fn prompt_and_persist() -> Result<(String, String)> {
    eprintln!("Telegram API credentials not found.");

    let api_id: String = Input::new().with_prompt(format!("Enter {API_ID_KEY}")).interact_text()?;
    let api_hash: String = Input::new().with_prompt(format!("Enter {API_HASH_KEY}")).interact_text()?;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(ENV_FILE)
        .with_context(|| format!("could not persist credentials to {ENV_FILE}"))?;
    writeln!(file, "\n{API_ID_KEY}={}\n{API_HASH_KEY}={}", api_id.trim(), api_hash.trim())?;

    Ok((api_id, api_hash))
}
