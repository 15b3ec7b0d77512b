//! Terminal output helpers: spinner, typewriter effect, clipboard

use std::io::{self, Write};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::error::Error;

pub const SPINNER_FRAMES: &[&str] = &[
  "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"
];
pub const SPINNER_MESSAGE: &str = "Generating";
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);
const TYPEWRITER_DELAY: Duration = Duration::from_millis(10);

/// Running spinner. Stop it with [`Spinner::stop`] to clear the line.
pub struct Spinner
{   stop_tx: mpsc::UnboundedSender<()>
  , task: tokio::task::JoinHandle<()>
}

impl Spinner
{   /// Spawn a spinner showing `message`.
    pub fn start(message: impl Into<String>) -> Self
    {   let message = message.into();
        let (stop_tx, stop_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
          run_spinner(message, stop_rx).await
        });
        Spinner
        {   stop_tx
          , task
        }
    }

    /// Stop the spinner and wait until its line is cleared.
    pub async fn stop(self)
    {   let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await
        {   debug!("Spinner task ended abnormally: {}", e);
        }
    }
}

async fn run_spinner(
  message: String
, mut stop_rx: mpsc::UnboundedReceiver<()>
)
{   let mut stdout = io::stdout();
    for frame in SPINNER_FRAMES.iter().cycle()
    {   let _ = write!(stdout, "\r{} {}", frame, message);
        let _ = stdout.flush();
        tokio::select!
        {   _ = stop_rx.recv() => break
          , _ = tokio::time::sleep(SPINNER_INTERVAL) => {}
        }
    }
    let _ = write!(stdout, "{}", clear_line_sequence(&message));
    let _ = stdout.flush();
}

/// Carriage return, blanks covering a spinner frame for `message`, and a
/// carriage return back to column zero.
pub fn clear_line_sequence(message: &str) -> String
{   format!("\r{}\r", " ".repeat(message.chars().count() + 2))
}

/// Wipe a spinner line left behind by an abrupt exit.
pub fn clear_spinner_line()
{   let mut stdout = io::stdout();
    let _ = write!(stdout, "{}", clear_line_sequence(SPINNER_MESSAGE));
    let _ = stdout.flush();
}

/// Write `text` one character at a time, then a newline.
pub async fn typewrite<W: Write>(out: &mut W, text: &str) -> io::Result<()>
{   typewrite_with_delay(out, text, TYPEWRITER_DELAY).await
}

async fn typewrite_with_delay<W: Write>(
  out: &mut W
, text: &str
, delay: Duration
) -> io::Result<()>
{   let mut buf = [0u8; 4];
    for c in text.chars()
    {   out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
        out.flush()?;
        if !delay.is_zero()
        {   tokio::time::sleep(delay).await;
        }
    }
    writeln!(out)?;
    out.flush()
}

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), Error>
{   let mut clipboard = arboard::Clipboard::new()
      .map_err(|e| Error::Other(format!("Clipboard unavailable: {}", e)))?;
    clipboard
      .set_text(text.to_owned())
      .map_err(|e| Error::Other(format!("Clipboard copy failed: {}", e)))
}

/// [`copy_to_clipboard`], logging a warning instead of failing.
pub fn try_copy_to_clipboard(text: &str)
{   match copy_to_clipboard(text)
    {   Ok(()) => debug!("Copied {} bytes to clipboard", text.len())
      , Err(e) => warn!("{}", e)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[tokio::test]
    async fn typewriter_writes_every_char_and_newline()
    {   let mut out = Vec::new();
        typewrite_with_delay(&mut out, "ls → ok", Duration::ZERO)
          .await
          .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ls → ok\n");
    }

    #[test]
    fn clear_sequence_covers_frame_and_message()
    {   let seq = clear_line_sequence(SPINNER_MESSAGE);
        assert_eq!(seq, format!("\r{}\r", " ".repeat(12)));
        // "⠋ Generating" is 12 chars wide
        let frame = format!("{} {}", SPINNER_FRAMES[0], SPINNER_MESSAGE);
        assert_eq!(frame.chars().count() + 2, seq.chars().count());
    }

    #[tokio::test]
    async fn spinner_stops_promptly()
    {   let spinner = Spinner::start(SPINNER_MESSAGE);
        tokio::time::sleep(Duration::from_millis(30)).await;
        tokio::time::timeout(Duration::from_secs(2), spinner.stop())
          .await
          .expect("spinner did not stop");
    }
}
