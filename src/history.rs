//! Bounded command history: a fixed-capacity ring with oldest-first
//! eviction, a numbered recent-listing, and write-through persistence.

use crate::command::Command;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default number of history entries kept.
pub const HISTORY_CAPACITY: usize = 10;

/// First argument that triggers the recent-history listing (exact match).
pub const RECENT_COMMAND: &str = "recent";

/// Prefix reserved for history recall.
pub const RECALL_SIGIL: char = '!';

/// What the history decided to do with a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The command was a history builtin and has been handled in full;
    /// there is nothing to execute.
    Intercepted,
    /// Execute this command.
    Run(Command),
}

/// A circular store of the most recently executed commands.
///
/// The ring owns a fixed-length array of optional slots plus an `oldest`
/// cursor and an explicit occupancy count. Emptiness is `len == 0`; it is
/// tracked outright because cursor equality cannot tell an empty ring
/// from a ring holding exactly one entry. Inserting into a full ring
/// evicts the oldest entry.
#[derive(Debug)]
pub struct HistoryRing {
    slots: Vec<Option<Command>>,
    /// Index of the least recently inserted occupied slot.
    oldest: usize,
    /// Number of occupied slots, always `min(total inserted, capacity)`.
    len: usize,
    file: Option<PathBuf>,
}

impl HistoryRing {
    /// An in-memory ring holding at most `capacity` commands.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be at least 1");
        Self {
            slots: vec![None; capacity],
            oldest: 0,
            len: 0,
            file: None,
        }
    }

    /// Same, but persisting to `file` on every insertion.
    pub fn with_file(capacity: usize, file: PathBuf) -> Self {
        Self {
            file: Some(file),
            ..Self::new(capacity)
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record `command` as the newest entry.
    ///
    /// The ring stores its own copy; the caller's value stays valid and
    /// usable. A full ring drops the oldest entry to make room. Every
    /// insertion rewrites the persistence file in full.
    pub fn insert(&mut self, command: &Command) {
        let capacity = self.capacity();
        let slot = if self.len == capacity {
            let evicted = self.oldest;
            self.oldest = (self.oldest + 1) % capacity;
            evicted
        } else {
            self.len += 1;
            (self.oldest + self.len - 1) % capacity
        };
        self.slots[slot] = Some(command.clone());
        self.persist();
    }

    /// Walk the stored commands, newest first.
    ///
    /// Yields `(number, raw_text)` pairs: the newest entry carries the
    /// highest number, counting down to 1 for the oldest. The walk never
    /// mutates the ring and can be restarted any number of times. An
    /// empty ring yields nothing.
    pub fn recent(&self) -> Recent<'_> {
        Recent {
            ring: self,
            remaining: self.len,
        }
    }

    /// Route a freshly parsed command through the history.
    ///
    /// The `recent` builtin prints the numbered listing to `out` and is
    /// intercepted without being recorded. A `!`-prefixed command is
    /// reserved for recall and currently passes through untouched.
    /// Anything else is recorded and handed back for execution.
    pub fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Dispatch> {
        if command.program() == RECENT_COMMAND {
            for (number, raw) in self.recent() {
                writeln!(out, "{number} {raw}")?;
            }
            return Ok(Dispatch::Intercepted);
        }
        if command.program().starts_with(RECALL_SIGIL) {
            // TODO: recall ("!!", "!n") is reserved but not implemented;
            // the command is returned verbatim
            return Ok(Dispatch::Run(command));
        }
        self.insert(&command);
        Ok(Dispatch::Run(command))
    }

    /// Replay a persisted history file through [`HistoryRing::insert`].
    ///
    /// The file holds one raw command line per line, oldest first, so the
    /// ring ends up exactly as live use would have left it, including
    /// eviction when the file holds more lines than the ring has slots.
    /// A missing or unreadable file means no history; lines that no
    /// longer parse are skipped. Returns the number of entries loaded.
    pub fn load(&mut self, path: &Path, max_args: usize) -> usize {
        let Ok(contents) = fs::read_to_string(path) else {
            debug!(file = %path.display(), "no history file to load");
            return 0;
        };
        let mut loaded = 0;
        for line in contents.lines() {
            match Command::parse(&format!("{line}\n"), max_args) {
                Ok(command) => {
                    self.insert(&command);
                    loaded += 1;
                }
                Err(err) => debug!(%err, "skipping unparseable history line"),
            }
        }
        loaded
    }

    /// Rewrite the persistence file from scratch, oldest entry first.
    ///
    /// Failures are logged and swallowed; losing the history file must
    /// never take the shell down.
    fn persist(&self) {
        let Some(path) = &self.file else { return };
        if let Err(err) = self.write_to(path) {
            warn!(file = %path.display(), %err, "failed to persist history");
        }
    }

    fn write_to(&self, path: &Path) -> io::Result<()> {
        // truncate-and-rewrite: a crash mid-write loses at most the
        // newest entries, never the file's framing
        let mut file = fs::File::create(path)?;
        for offset in 0..self.len {
            let slot = (self.oldest + offset) % self.capacity();
            if let Some(command) = &self.slots[slot] {
                writeln!(file, "{}", command.raw())?;
            }
        }
        file.flush()
    }
}

/// Lazy newest-first walk over a [`HistoryRing`].
///
/// See [`HistoryRing::recent`].
pub struct Recent<'a> {
    ring: &'a HistoryRing,
    remaining: usize,
}

impl<'a> Iterator for Recent<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = (self.ring.oldest + self.remaining - 1) % self.ring.capacity();
        // every slot within `len` of `oldest` is occupied
        let command = self.ring.slots[slot].as_ref()?;
        let number = self.remaining;
        self.remaining -= 1;
        Some((number, command.raw()))
    }
}
