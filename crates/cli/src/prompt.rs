//! Reading operator input.
//!
//! On a terminal, questions go through `dialoguer`; when stdin is piped,
//! plain lines are read so the tool can be scripted. Whole lines are read on
//! a helper thread so that a Ctrl-C delivered while waiting can wake the
//! caller. End of input during a question and Ctrl-C both surface as
//! [`WorkflowError::Interrupted`].

use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc;
use std::thread;

use dialoguer::{Confirm, Input};

use gitsolver_core::errors::WorkflowError;

/// What the line reader thread (or the signal listener) hands back.
#[derive(Debug)]
enum LineEvent {
    Line(String),
    Eof,
    Failed(io::Error),
    Interrupted,
}

pub struct Prompter {
    interactive: bool,
    events_tx: mpsc::Sender<LineEvent>,
    events: mpsc::Receiver<LineEvent>,
    /// Started on the first line read.
    requests: RefCell<Option<mpsc::Sender<()>>>,
}

impl Prompter {
    /// Pick the prompt style from whether stdin is a terminal.
    pub fn detect() -> Self {
        let (events_tx, events) = mpsc::channel();
        Self {
            interactive: io::stdin().is_terminal(),
            events_tx,
            events,
            requests: RefCell::new(None),
        }
    }

    /// Callback that makes a pending (or the next) line read return
    /// [`WorkflowError::Interrupted`].
    pub fn interrupt_notifier(&self) -> impl Fn() + Send + 'static {
        let events = self.events_tx.clone();
        move || {
            let _ = events.send(LineEvent::Interrupted);
        }
    }

    /// Read one shell command line. `None` means end of input.
    pub fn command_line(&self, prompt: &str) -> Result<Option<String>, WorkflowError> {
        print!("\n{} ", prompt);
        flush();
        self.read_line()
    }

    /// Ask for a non-empty line of text.
    pub fn text(&self, prompt: &str) -> Result<String, WorkflowError> {
        if self.interactive {
            return Input::<String>::new()
                .with_prompt(prompt)
                .interact_text()
                .map(|s| s.trim().to_string())
                .map_err(dialog_error);
        }

        loop {
            print!("{}: ", prompt);
            flush();
            let line = self.read_line()?.ok_or(WorkflowError::Interrupted)?;
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }

    /// Ask a yes/no question.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool, WorkflowError> {
        if self.interactive {
            return Confirm::new()
                .with_prompt(prompt)
                .default(default)
                .interact()
                .map_err(dialog_error);
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            print!("{} {}: ", prompt, hint);
            flush();
            let line = self.read_line()?.ok_or(WorkflowError::Interrupted)?;
            if let Some(answer) = parse_yes_no(&line, default) {
                return Ok(answer);
            }
            println!("Please answer 'y' or 'n'.");
        }
    }

    fn read_line(&self) -> Result<Option<String>, WorkflowError> {
        {
            let mut requests = self.requests.borrow_mut();
            if requests.is_none() {
                *requests = Some(spawn_reader(self.events_tx.clone()).map_err(prompt_error)?);
            }
            let sent = requests.as_ref().is_some_and(|tx| tx.send(()).is_ok());
            if !sent {
                return Err(WorkflowError::Prompt("input reader stopped".into()));
            }
        }

        match self.events.recv() {
            Ok(LineEvent::Line(line)) => Ok(Some(line)),
            Ok(LineEvent::Eof) => Ok(None),
            Ok(LineEvent::Failed(e)) => Err(prompt_error(e)),
            Ok(LineEvent::Interrupted) | Err(_) => Err(WorkflowError::Interrupted),
        }
    }
}

/// Read one stdin line per request until the prompter goes away.
fn spawn_reader(events: mpsc::Sender<LineEvent>) -> io::Result<mpsc::Sender<()>> {
    let (requests, pending) = mpsc::channel::<()>();
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for () in pending {
                let event = match read_stdin_line() {
                    Ok(Some(line)) => LineEvent::Line(line),
                    Ok(None) => LineEvent::Eof,
                    Err(e) => LineEvent::Failed(e),
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        })?;
    Ok(requests)
}

/// `None` for an unrecognised answer.
fn parse_yes_no(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn prompt_error(e: io::Error) -> WorkflowError {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => WorkflowError::Interrupted,
        _ => WorkflowError::Prompt(e.to_string()),
    }
}

fn dialog_error(e: dialoguer::Error) -> WorkflowError {
    match e {
        dialoguer::Error::IO(e) => prompt_error(e),
    }
}

fn flush() {
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("", true), Some(true));
        assert_eq!(parse_yes_no("  ", false), Some(false));
        assert_eq!(parse_yes_no("Y", false), Some(true));
        assert_eq!(parse_yes_no("yes\n", false), Some(true));
        assert_eq!(parse_yes_no("NO", true), Some(false));
        assert_eq!(parse_yes_no("maybe", true), None);
    }

    #[test]
    fn test_prompt_error_mapping() {
        let interrupted = io::Error::new(io::ErrorKind::Interrupted, "read interrupted");
        assert!(matches!(prompt_error(interrupted), WorkflowError::Interrupted));

        let other = io::Error::new(io::ErrorKind::Other, "tty gone");
        assert!(matches!(prompt_error(other), WorkflowError::Prompt(ref m) if m == "tty gone"));
    }

    #[test]
    fn test_dialog_error_unwraps_io_error() {
        let interrupted = dialoguer::Error::from(io::Error::new(io::ErrorKind::Interrupted, "^C"));
        assert!(matches!(dialog_error(interrupted), WorkflowError::Interrupted));

        let other = dialoguer::Error::from(io::Error::new(io::ErrorKind::Other, "no tty"));
        assert!(matches!(dialog_error(other), WorkflowError::Prompt(ref m) if m == "no tty"));
    }

    #[test]
    fn test_interrupt_wakes_line_read() {
        let prompter = Prompter::detect();
        let interrupt = prompter.interrupt_notifier();
        interrupt();
        assert!(matches!(prompter.read_line(), Err(WorkflowError::Interrupted)));
    }
}
