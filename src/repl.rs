// -------- Read-parse-execute loop ---------

use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use crate::command::CommandSet;
use crate::error::ShellError;
use crate::exec;
use crate::history::HistoryRing;
use crate::parse;
use crate::trace;

const PROMPT: &str = ">>";

// Over-long lines are rejected, never truncated.
pub const MAX_LINE_LEN: usize = 4096;

enum LoopAction {
    Continue,
    Quit,
}

pub struct Shell {
    history: HistoryRing,
    interactive: bool,
}

impl Shell {
    pub fn new() -> Self {
        Shell {
            history: HistoryRing::new(),
            interactive: atty::is(atty::Stream::Stdin),
        }
    }

    // Top-level loop; returns the process exit status. End of input is a
    // clean exit, a failed read is not.
    pub fn run(&mut self) -> i32 {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut line = String::new();
        loop {
            exec::reap_finished();
            if self.interactive {
                print!("{PROMPT}");
                let _ = io::stdout().flush();
            }
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => return 0,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("{}", ShellError::Input(e));
                    return 1;
                }
            }
            if line.len() > MAX_LINE_LEN {
                eprintln!("{}", ShellError::LineTooLong { max: MAX_LINE_LEN });
                continue;
            }
            match self.dispatch(&line) {
                LoopAction::Continue => {}
                LoopAction::Quit => return 0,
            }
        }
    }

    // One-shot `-c` mode: execute a single command line, no prompt, no
    // control-line forms.
    pub fn run_line(&mut self, line: &str) -> i32 {
        let mut owned = line.to_string();
        if !owned.ends_with('\n') {
            owned.push('\n');
        }
        let set = Rc::new(parse::parse_line(&owned));
        if set.is_empty() {
            return 0;
        }
        self.history.record(Rc::clone(&set));
        match exec::spawn_pipeline(&set) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{e}");
                1
            }
        }
    }

    // Control-line forms are recognized by their first characters, checked
    // in order: quit, blank, hist, repeat, then a fresh command set.
    fn dispatch(&mut self, line: &str) -> LoopAction {
        if line.starts_with('q') && line[1..].contains("uit") {
            return LoopAction::Quit;
        }
        if line == "\n" {
            return LoopAction::Continue;
        }
        if line.starts_with('h') && line[1..].contains("ist") {
            print!("{}", self.history.render());
            let _ = io::stdout().flush();
            return LoopAction::Continue;
        }
        if line.starts_with("r ") {
            self.repeat(line);
            return LoopAction::Continue;
        }
        self.execute_new(line);
        LoopAction::Continue
    }

    fn execute_new(&mut self, line: &str) {
        let set = Rc::new(parse::parse_line(line));
        trace::event(
            "parse",
            json!({ "stages": set.commands.len(), "async": set.asynchronous }),
        );
        if set.is_empty() {
            // Delimiters only; nothing to record or run.
            return;
        }
        self.record_and_run(set);
    }

    fn repeat(&mut self, line: &str) {
        match repeat_rank(line).and_then(|rank| {
            let set = self.history.fetch(rank)?;
            trace::event("fetch", json!({ "rank": rank, "set": set.to_string() }));
            Ok(set)
        }) {
            Ok(set) => self.record_and_run(set),
            Err(e) => eprintln!("{e}"),
        }
    }

    fn record_and_run(&mut self, set: Rc<CommandSet>) {
        self.history.record(Rc::clone(&set));
        trace::event("record", json!({ "executed": self.history.executed() }));
        if let Err(e) = exec::spawn_pipeline(&set) {
            eprintln!("{e}");
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

// `r N`: exactly one digit; a second digit is malformed, trailing non-digit
// text is ignored.
fn repeat_rank(line: &str) -> Result<usize, ShellError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^r ([0-9])(?:[^0-9]|$)").expect("repeat pattern"));
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .ok_or(ShellError::InvalidChoice)
}
