//! The interactive read-dispatch-execute loop.

use crate::command::Command;
use crate::exec::{ExecStatus, execute};
use crate::history::{Dispatch, HistoryRing};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;
use tracing::debug;

/// Prompt shown before every line.
pub const PROMPT: &str = "COMMAND-> ";

/// The interactive shell: line reader, history ring, and executor glued
/// together. Strictly serial; one command runs at a time and the loop
/// blocks until it finishes.
pub struct Shell {
    history: HistoryRing,
    max_args: usize,
}

impl Shell {
    pub fn new(history: HistoryRing, max_args: usize) -> Self {
        Self { history, max_args }
    }

    /// Run the read-dispatch-execute loop until end of input.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline(PROMPT) {
                Ok(mut line) => {
                    rl.add_history_entry(line.as_str())?;
                    // reinstate the terminator the editor strips
                    line.push('\n');
                    self.handle_line(&line)?;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Parse, dispatch through the history, and execute one line.
    ///
    /// A line that does not parse is skipped; the loop keeps going.
    fn handle_line(&mut self, line: &str) -> Result<()> {
        let command = match Command::parse(line, self.max_args) {
            Ok(command) => command,
            Err(err) => {
                debug!(%err, "skipping line");
                return Ok(());
            }
        };

        let command = match self.history.dispatch(command, &mut io::stdout())? {
            Dispatch::Intercepted => return Ok(()),
            Dispatch::Run(command) => command,
        };

        let outcome = execute(&command);
        match outcome.status {
            ExecStatus::Exited(code) => {
                debug!(command = command.raw(), code, "command exited");
            }
            status => println!("System error: {status}"),
        }
        Ok(())
    }
}
