pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod history;
pub mod prompt;
pub mod providers;
pub mod request;
pub mod response;
pub mod retry;
pub mod terminal;

/*

how: ask how to do anything in your terminal.

The question, plus a snapshot of the local environment (OS, shell, cwd,
files, tools), goes to a Gemini model; the answer comes back as shell
commands that are printed, copied to the clipboard and logged.

how/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports
│   ├── main.rs         # Binary entrypoint
│   ├── app.rs          # Command flow
│   ├── cli.rs          # clap arguments
│   ├── client.rs       # Generation client adapter
│   ├── error.rs        # Error type and failure classification
│   ├── request.rs      # Request/result types
│   ├── retry.rs        # Retry policy for timeouts and rate limits
│   ├── config.rs       # Configuration file and environment
│   ├── credentials.rs  # API key lookup and storage
│   ├── prompt.rs       # Prompt template and system context
│   ├── response.rs     # Cleanup of model output
│   ├── history.rs      # History log
│   ├── terminal.rs     # Spinner, typewriter, clipboard
│   └── providers/      # Provider seam and Gemini implementation
└── tests/

*/

pub use app::{ask, run};
pub use cli::Cli;
pub use client::ClientHandle;
pub use config::HowConfig;
pub use error::{classify, Error, ErrorKind};
pub use providers::{GeminiProvider, Provider, ProviderFailure, ProviderFuture};
pub use request::{GenerationRequest, GenerationResult};
pub use retry::RetryPolicy;
