//! Child process execution: fork, exec, and the blocking wait loop.
//!
//! [`execute`] runs one command at a time and does not return until the
//! child reaches a terminal state. Stop, continue, and signal-termination
//! notifications are not terminal; the wait is simply re-issued. There is
//! no timeout: a child that never exits blocks the shell, which is the
//! documented cost of strictly serial execution.

use crate::command::Command;
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};
use std::ffi::CString;
use std::fmt;
use tracing::debug;

/// How one execution attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The child ran and exited with this status code.
    ///
    /// When the exec itself fails inside the child (program missing, not
    /// executable), the child exits immediately with the negated errno.
    /// The kernel keeps only the low eight bits of an exit status, so
    /// e.g. ENOENT reaches the parent as 254. Telling such codes apart
    /// from a program that genuinely exited with 254 is up to the caller.
    Exited(i32),
    /// fork failed; no child process exists.
    ForkFailed(Errno),
    /// waitpid failed; the child, if it was still alive, has been sent
    /// SIGKILL so it cannot linger as an orphan.
    WaitFailed(Errno),
}

impl ExecStatus {
    /// True when the engine itself failed (fork or wait), as opposed to
    /// the child running and exiting with whatever code.
    pub fn is_error(&self) -> bool {
        !matches!(self, ExecStatus::Exited(_))
    }
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecStatus::Exited(code) => write!(f, "exited with status {code}"),
            ExecStatus::ForkFailed(errno) => write!(f, "fork failed: {errno}"),
            ExecStatus::WaitFailed(errno) => write!(f, "wait failed: {errno}"),
        }
    }
}

/// The outcome of [`execute`], tied to the command that produced it.
#[derive(Debug)]
pub struct ExecOutcome<'cmd> {
    pub command: &'cmd Command,
    pub status: ExecStatus,
}

/// Spawn `command` as a child process and block until it reaches a
/// terminal state.
///
/// The child runs `command.args()[0]` with the full argument vector,
/// inheriting the parent's environment and standard streams.
pub fn execute(command: &Command) -> ExecOutcome<'_> {
    // built before forking so the child only execs and exits
    let argv = command.exec_argv();
    let status = match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => wait_for(child),
        Ok(ForkResult::Child) => exec_child(&argv),
        Err(errno) => ExecStatus::ForkFailed(errno),
    };
    ExecOutcome { command, status }
}

/// Replace the child process image. Never returns: either the new image
/// takes over or the child exits with the negated exec errno.
fn exec_child(argv: &[CString]) -> ! {
    let errno = match argv.first() {
        Some(program) => match execvp(program, argv) {
            Ok(infallible) => match infallible {},
            Err(errno) => errno,
        },
        // a Command always carries at least the program name
        None => Errno::EINVAL,
    };
    unsafe { libc::_exit(-(errno as i32)) }
}

/// Block until `child` exits.
///
/// Non-terminal notifications re-enter the wait. A failed wait kills the
/// child first, ignoring errors from the kill itself, so a runaway child
/// is never left behind.
fn wait_for(child: Pid) -> ExecStatus {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return ExecStatus::Exited(code),
            Ok(status) => {
                debug!(?status, "non-terminal wait notification");
                continue;
            }
            Err(errno) => {
                let _ = kill(child, Signal::SIGKILL);
                return ExecStatus::WaitFailed(errno);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MAX_ARGS;

    fn cmd(line: &str) -> Command {
        Command::parse(line, MAX_ARGS).expect("test command")
    }

    #[test]
    fn test_true_exits_zero() {
        let command = cmd("true\n");
        let outcome = execute(&command);
        assert_eq!(outcome.status, ExecStatus::Exited(0));
        assert!(!outcome.status.is_error());
    }

    #[test]
    fn test_false_exits_nonzero() {
        let command = cmd("false\n");
        assert_eq!(execute(&command).status, ExecStatus::Exited(1));
    }

    #[test]
    fn test_arguments_reach_the_child() {
        // test(1) exits 0 or 1 purely based on its argument vector
        let command = cmd("test -n foo\n");
        assert_eq!(execute(&command).status, ExecStatus::Exited(0));
        let command = cmd("test -z foo\n");
        assert_eq!(execute(&command).status, ExecStatus::Exited(1));
    }

    #[test]
    fn test_missing_program_reports_exec_failure() {
        let command = cmd("__no_such_binary__\n");
        match execute(&command).status {
            ExecStatus::Exited(code) => {
                // distinguishable from a genuine small exit status:
                // ENOENT negated and truncated to eight bits
                assert_ne!(code, 0);
                #[cfg(target_os = "linux")]
                assert_eq!(code, 254);
            }
            other => panic!("expected an exit outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_borrows_its_command() {
        let command = cmd("true\n");
        let outcome = execute(&command);
        assert!(std::ptr::eq(outcome.command, &command));
    }
}
