//! An interactive, line-oriented command shell built around two small
//! cores: a fixed-capacity history ring with oldest-first eviction and a
//! fork/exec/wait execution engine that classifies how each child ended.
//!
//! A read line flows through [`command::Command::parse`], then the
//! [`history::HistoryRing`] either intercepts it (the `recent` listing)
//! or records it, and finally [`exec::execute`] spawns a child process
//! and blocks until it reaches a terminal state. [`Shell`] ties the loop
//! together on top of a `rustyline` editor.

pub mod command;
pub mod exec;
pub mod history;
mod shell;

/// Re-export of the interactive loop.
///
/// See [`Shell`] for the high-level API.
pub use shell::Shell;
