//! Binary entrypoint for the `how` CLI.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
      .init();
    let cli = how::Cli::parse();

    tokio::select!
    {   biased;
        _ = tokio::signal::ctrl_c() => {
          how::terminal::clear_spinner_line();
          eprintln!("\nInterrupted.");
          // A blocked key prompt would keep the runtime from shutting down
          std::process::exit(130);
        }
      , result = how::run(cli) => match result
        {   Ok(()) => ExitCode::SUCCESS
          , Err(err) => {
              eprintln!("Error: {err}");
              ExitCode::FAILURE
            }
        }
    }
}
