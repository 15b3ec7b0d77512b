//! API key lookup, interactive entry and storage

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use log::{debug, warn};

use crate::config::{HowConfig, ENV_API_KEY};
use crate::error::Error;

/// Source of a key typed in by the user.
pub trait KeyPrompt
{   /// Whether a user is available to answer.
    fn is_interactive(&self) -> bool;

    /// Ask for a key. `None` means input was cancelled (EOF).
    fn read_key(&mut self) -> Result<Option<String>, Error>;
}

/// Prompt on stdout, read one line from stdin.
pub struct StdinPrompt;

impl KeyPrompt for StdinPrompt
{   fn is_interactive(&self) -> bool
    {   io::stdin().is_terminal()
    }

    fn read_key(&mut self) -> Result<Option<String>, Error>
    {   println!("Paste your Google Gemini API key:");
        print!("API Key: ");
        io::stdout().flush()?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0
        {   return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Resolve the API key from the environment, the key file, or the user.
pub fn resolve_api_key(
  config: &HowConfig
, force_reenter: bool
) -> Result<String, Error>
{   resolve_api_key_with(
      config
    , force_reenter
    , |name| std::env::var(name).ok()
    , &mut StdinPrompt
    )
}

/// [`resolve_api_key`] with injectable environment and prompt.
pub fn resolve_api_key_with<F, P>(
  config: &HowConfig
, force_reenter: bool
, env_lookup: F
, prompt: &mut P
) -> Result<String, Error>
where
  F: Fn(&str) -> Option<String>
, P: KeyPrompt
{   if !force_reenter
    {   if let Some(key) = env_lookup(ENV_API_KEY)
          .map(|k| k.trim().to_string())
          .filter(|k| !k.is_empty())
        {   debug!("Using API key from {}", ENV_API_KEY);
            return Ok(key);
        }
        if let Some(key) = read_key_file(&config.api_key_file())
        {   debug!("Using API key from key file");
            return Ok(key);
        }
    }

    if !prompt.is_interactive()
    {   return Err(Error::Auth(format!(
          "{} not found in non-interactive session.", ENV_API_KEY
        )));
    }
    let key = match prompt.read_key()?
    {   Some(raw) => raw.trim().to_string()
      , None => {
          return Err(Error::Auth("API key input cancelled.".to_string()))
        }
    };
    if key.is_empty()
    {   return Err(Error::Auth("API key cannot be empty.".to_string()));
    }
    if let Err(e) = save_api_key(config, &key)
    {   warn!("Could not save API key: {}", e);
    }
    Ok(key)
}

fn read_key_file(path: &Path) -> Option<String>
{   if !path.exists()
    {   return None;
    }
    match fs::read_to_string(path)
    {   Ok(raw) => Some(raw.trim().to_string()).filter(|k| !k.is_empty())
      , Err(e) => {
          warn!("Could not read API key file: {}", e);
          None
        }
    }
}

/// Store `key` in the key file, owner read/write only.
pub fn save_api_key(config: &HowConfig, key: &str) -> Result<(), Error>
{   let key = key.trim();
    if key.is_empty()
    {   return Err(Error::Auth("API key cannot be empty.".to_string()));
    }
    fs::create_dir_all(&config.config_dir)?;
    let path = config.api_key_file();
    let mut file = key_file_options().open(&path)?;
    // An existing file keeps its old mode when opened
    restrict_permissions(&path)?;
    file.write_all(key.as_bytes())?;
    debug!("Saved API key to {}", path.display());
    Ok(())
}

/// Truncating writer; new files are created owner read/write only.
#[cfg(unix)]
fn key_file_options() -> fs::OpenOptions
{   use std::os::unix::fs::OpenOptionsExt;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn key_file_options() -> fs::OpenOptions
{   let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), Error>
{   use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), Error>
{   Ok(())
}
