//! Question and command history log

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use log::{debug, warn};

use crate::error::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one history entry.
pub fn format_entry(
  at: NaiveDateTime
, question: &str
, commands: &[String]
) -> String
{   let mut entry = format!(
      "[{}] Q: {}\nCommands:\n"
    , at.format(TIMESTAMP_FORMAT)
    , question
    );
    for command in commands
    {   entry.push_str(command);
        entry.push('\n');
    }
    entry.push('\n');
    entry
}

/// Append an entry to the history file, creating its directory.
pub fn append(
  path: &Path
, question: &str
, commands: &[String]
) -> Result<(), Error>
{   if let Some(parent) = path.parent()
    {   fs::create_dir_all(parent)?;
    }
    let entry = format_entry(Local::now().naive_local(), question, commands);
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)?;
    file.write_all(entry.as_bytes())?;
    debug!("Logged history entry to {}", path.display());
    Ok(())
}

/// [`append`], logging a warning instead of failing.
pub fn log_history(path: &Path, question: &str, commands: &[String])
{   if let Err(e) = append(path, question, commands)
    {   warn!("Failed to write history: {}", e);
    }
}

/// Contents of the history file, `None` if there is none yet.
pub fn read(path: &Path) -> Result<Option<String>, Error>
{   if !path.exists()
    {   return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?))
}
