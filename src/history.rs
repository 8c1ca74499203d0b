// -------- Bounded history ring ---------

use std::fmt::Write as _;
use std::rc::Rc;

use crate::command::CommandSet;
use crate::error::ShellError;

pub const HISTORY_CAPACITY: usize = 5;

// Fixed-capacity circular buffer of executed command sets. Slots share
// ownership of their sets with each other and with the in-flight execution;
// an evicted set is freed only when the dropped reference was the last one.
pub struct HistoryRing {
    slots: [Option<Rc<CommandSet>>; HISTORY_CAPACITY],
    executed: usize,
}

impl HistoryRing {
    pub fn new() -> Self {
        HistoryRing {
            slots: std::array::from_fn(|_| None),
            executed: 0,
        }
    }

    // Total sets recorded since startup, fresh parses and re-executions alike.
    pub fn executed(&self) -> usize {
        self.executed
    }

    pub fn occupancy(&self) -> usize {
        self.executed.min(HISTORY_CAPACITY)
    }

    pub fn record(&mut self, set: Rc<CommandSet>) {
        let slot = self.executed % HISTORY_CAPACITY;
        self.slots[slot] = Some(set);
        self.executed += 1;
    }

    // Resolves a 1-based recency rank (1 = most recent) to the stored set,
    // returned without copying.
    pub fn fetch(&self, rank: usize) -> Result<Rc<CommandSet>, ShellError> {
        if rank == 0 || rank > HISTORY_CAPACITY || rank > self.executed {
            return Err(ShellError::InvalidChoice);
        }
        let slot = (self.executed - rank) % HISTORY_CAPACITY;
        self.slots[slot].clone().ok_or(ShellError::InvalidChoice)
    }

    // Most-recent-first listing; the number on each line is the rank `r N`
    // accepts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for rank in 1..=self.occupancy() {
            let slot = (self.executed - rank) % HISTORY_CAPACITY;
            if let Some(set) = &self.slots[slot] {
                let _ = writeln!(out, "{rank}. {set}");
            }
        }
        out
    }

    // How many slots hold this exact allocation.
    pub fn occurrences(&self, set: &Rc<CommandSet>) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| Rc::ptr_eq(s, set))
            .count()
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}
