//! Parsing of a raw input line into an executable command.

use std::ffi::CString;
use thiserror::Error;

/// Most arguments a single command line may carry.
///
/// Tokens beyond the cap are dropped rather than rejected.
pub const MAX_ARGS: usize = 50;

/// Why a raw line did not produce a [`Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The line was empty or did not end with a newline. The reader hands
    /// over newline-terminated lines, so this means "no command here" and
    /// lets the caller tell a blank read apart from end of input.
    #[error("line is empty or not newline-terminated")]
    MissingTerminator,
    /// The line opens with a stray control byte.
    #[error("line starts with control character {0:?}")]
    ControlCharacter(char),
    /// The line held nothing but blanks.
    #[error("line contains no arguments")]
    Empty,
}

/// A parsed, immutable command line.
///
/// Owns both the display text and the tokenized argument vector. The
/// argument vector is never empty and never contains an empty string or a
/// NUL byte, so it can be handed to `execvp` as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    raw: String,
    args: Vec<String>,
}

impl Command {
    /// Parse a newline-terminated line into a command.
    ///
    /// The line is split on runs of spaces and tabs up to the first
    /// newline; anything after the terminator is ignored. At most
    /// `max_args` tokens are kept, extra tokens are silently dropped.
    pub fn parse(raw_line: &str, max_args: usize) -> Result<Command, ParseError> {
        let Some(terminator) = raw_line.find('\n') else {
            return Err(ParseError::MissingTerminator);
        };
        match raw_line.chars().next() {
            Some(first) if first.is_control() && first != '\n' => {
                return Err(ParseError::ControlCharacter(first));
            }
            _ => {}
        }

        let line = &raw_line[..terminator];
        // the scanner stops at a NUL just as it does at the terminator
        let line = match line.find('\0') {
            Some(nul) => &line[..nul],
            None => line,
        };

        let args: Vec<String> = line
            .split([' ', '\t'])
            .filter(|token| !token.is_empty())
            .take(max_args)
            .map(str::to_owned)
            .collect();
        if args.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(Command {
            raw: line.to_owned(),
            args,
        })
    }

    /// The original line, without its trailing newline.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The program name, i.e. the first argument.
    pub fn program(&self) -> &str {
        &self.args[0]
    }

    /// All arguments, program name first. Never empty.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The argument vector in the form `execvp` wants.
    pub(crate) fn exec_argv(&self) -> Vec<CString> {
        // arguments never hold NUL bytes, so no token is ever dropped here
        self.args
            .iter()
            .filter_map(|arg| CString::new(arg.as_bytes()).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_splits_on_blank_runs() {
        let command = Command::parse("ls  -l\t/tmp\n", MAX_ARGS).expect("parse");
        assert_eq!(command.raw(), "ls  -l\t/tmp");
        assert_eq!(command.args(), ["ls", "-l", "/tmp"]);
        assert_eq!(command.program(), "ls");
    }

    #[test]
    fn test_parse_requires_a_terminator() {
        assert_eq!(Command::parse("", MAX_ARGS), Err(ParseError::MissingTerminator));
        assert_eq!(Command::parse("ls", MAX_ARGS), Err(ParseError::MissingTerminator));
    }

    #[test]
    fn test_parse_rejects_leading_control_character() {
        assert_eq!(
            Command::parse("\x1bls\n", MAX_ARGS),
            Err(ParseError::ControlCharacter('\x1b'))
        );
        assert_eq!(
            Command::parse("\tls\n", MAX_ARGS),
            Err(ParseError::ControlCharacter('\t'))
        );
    }

    #[test]
    fn test_parse_rejects_blank_lines() {
        assert_eq!(Command::parse("\n", MAX_ARGS), Err(ParseError::Empty));
        assert_eq!(Command::parse("   \n", MAX_ARGS), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_truncates_at_the_argument_cap() {
        let command = Command::parse("a b c d e\n", 3).expect("parse");
        assert_eq!(command.args(), ["a", "b", "c"]);
        // truncation is policy, not an error, and the display text is intact
        assert_eq!(command.raw(), "a b c d e");
    }

    #[test]
    fn test_parse_stops_at_the_first_terminator() {
        let command = Command::parse("ls\nrm -rf /\n", MAX_ARGS).expect("parse");
        assert_eq!(command.args(), ["ls"]);
        assert_eq!(command.raw(), "ls");
    }

    #[test]
    fn test_parse_cuts_at_an_interior_nul() {
        let command = Command::parse("ls\0-l\n", MAX_ARGS).expect("parse");
        assert_eq!(command.args(), ["ls"]);
        assert_eq!(command.raw(), "ls");
    }

    #[test]
    fn test_exec_argv_mirrors_args() {
        let command = Command::parse("echo hello world\n", MAX_ARGS).expect("parse");
        let argv = command.exec_argv();
        assert_eq!(argv.len(), 3);
        assert_eq!(argv[0].to_str().expect("utf8"), "echo");
        assert_eq!(argv[2].to_str().expect("utf8"), "world");
    }
}
