//! CLI argument definitions.

use clap::Parser;

/// Top-level CLI parser for `how`.
#[derive(Debug, Parser)]
#[command(
  name = "how"
, version
, about = "Ask me how to do anything in your terminal!"
)]
pub struct Cli
{   /// The question, e.g. `how find files larger than 100MB`
    pub question: Vec<String>
  , /// Suppress spinner and typewriter effect
    #[arg(long)]
    pub silent: bool
  , /// Show output with typewriter effect
    #[arg(long = "type")]
    pub type_effect: bool
  , /// Show command/question history
    #[arg(long)]
    pub history: bool
  , /// Set the Gemini API key; without a value, prompt for a new one
    #[arg(long = "api-key", value_name = "API_KEY", num_args = 0..=1)]
    pub api_key: Option<Option<String>>
}

impl Cli
{   /// The question words joined by spaces, `None` when blank.
    pub fn question_text(&self) -> Option<String>
    {   let question = self.question.join(" ");
        let question = question.trim();
        if question.is_empty()
        {   None
        } else
        {   Some(question.to_string())
        }
    }

    pub fn typewriter(&self) -> bool
    {   self.type_effect && !self.silent
    }

    /// `--api-key` given without a value.
    pub fn reenter_api_key(&self) -> bool
    {   matches!(self.api_key, Some(None))
    }

    /// No question and no flags at all.
    pub fn is_bare(&self) -> bool
    {   self.question_text().is_none()
          && !self.silent
          && !self.type_effect
          && !self.history
          && self.api_key.is_none()
    }
}
