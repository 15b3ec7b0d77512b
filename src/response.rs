//! Cleanup of model output into runnable command lines

/// Strip surrounding whitespace and a single code fence or inline
/// backtick pair.
pub fn clean_response(text: &str) -> String
{   let text = text.trim();
    if text.len() >= 6 && text.starts_with("```") && text.ends_with("```")
    {   let first_line = text.split('\n').next().unwrap_or_default();
        // "```bash" opener: drop the language tag line too
        let inner = if first_line.len() > 3 && first_line.len() <= text.len() - 3
        {   &text[first_line.len()..text.len() - 3]
        } else
        {   &text[3..text.len() - 3]
        };
        return inner.trim().to_string();
    }
    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`')
    {   return text[1..text.len() - 1].trim().to_string();
    }
    text.to_string()
}

/// Non-empty, trimmed lines of a cleaned response.
pub fn extract_commands(text: &str) -> Vec<String>
{   clean_response(text)
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(str::to_string)
      .collect()
}
