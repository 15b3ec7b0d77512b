//! Top-level command flow for the `how` binary

use std::io;

use clap::CommandFactory;
use log::debug;

use crate::cli::Cli;
use crate::client::ClientHandle;
use crate::config::HowConfig;
use crate::credentials::{resolve_api_key, save_api_key};
use crate::error::Error;
use crate::prompt::{build_prompt, SystemContext};
use crate::response::extract_commands;
use crate::terminal::{try_copy_to_clipboard, typewrite, Spinner, SPINNER_MESSAGE};
use crate::history;

pub const HEADER: &str = "   __             \n  / /  ___ _    __\n / _ \\/ _ \\ |/|/ /\n/_//_/\\___/__4__/ \n";

/// Ask `question` and return the cleaned command lines.
///
/// Shows a spinner on stdout while waiting unless `silent`.
pub async fn ask(
  client: &ClientHandle
, model: &str
, context: &SystemContext
, question: &str
, silent: bool
) -> Result<Vec<String>, Error>
{   let prompt = build_prompt(context, question);
    let spinner = if silent { None } else { Some(Spinner::start(SPINNER_MESSAGE)) };
    let result = client.generate(model, &prompt).await;
    if let Some(spinner) = spinner
    {   spinner.stop().await;
    }
    let commands = extract_commands(&result?);
    if commands.is_empty()
    {   return Err(Error::Other("No valid commands generated.".to_string()));
    }
    Ok(commands)
}

/// Run the CLI.
pub async fn run(cli: Cli) -> Result<(), Error>
{   if cli.is_bare()
    {   println!("{}", HEADER);
        println!("Ask me how to do anything in your terminal!\n");
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = HowConfig::load()?;
    debug!("Using model {} from {}", config.model, config.config_dir.display());

    if cli.history
    {   match history::read(&config.history_file())?
        {   Some(contents) => print!("{}", contents)
          , None => println!("No history found.")
        }
        return Ok(());
    }

    if let Some(Some(key)) = &cli.api_key
    {   save_api_key(&config, key)?;
        println!("Gemini API key replaced successfully.");
        return Ok(());
    }

    let question = match cli.question_text()
    {   Some(question) => question
      , None if cli.reenter_api_key() => {
          prompt_for_key(&config, true).await?;
          println!("Gemini API key replaced successfully.");
          return Ok(());
        }
      , None => return Err(Error::Other("No question provided.".to_string()))
    };

    let api_key = prompt_for_key(&config, cli.reenter_api_key()).await?;
    let client = ClientHandle::from_config(&config, &api_key)?;
    let context = SystemContext::gather();
    let commands = ask(&client, &config.model, &context, &question, cli.silent)
      .await?;

    let full_command = commands.join("\n");
    if cli.typewriter()
    {   typewrite(&mut io::stdout(), &full_command).await?;
    } else
    {   println!("{}", full_command);
    }

    try_copy_to_clipboard(&full_command);
    history::log_history(&config.history_file(), &question, &commands);
    Ok(())
}

/// Key resolution may block on stdin, so it runs off the async threads.
async fn prompt_for_key(
  config: &HowConfig
, force_reenter: bool
) -> Result<String, Error>
{   let config = config.clone();
    tokio::task::spawn_blocking(move || resolve_api_key(&config, force_reenter))
      .await
      .map_err(|e| Error::Other(format!("API key prompt failed: {}", e)))?
}
