// -------- Pipeline data model ---------

use std::fmt;

// One pipeline stage: its arguments plus the redirect/pipe markers the
// orchestrator acts on. Descriptors live in the per-run wiring table
// (exec::StageIo), not here, so a recorded set is never mutated by execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
    pub reads_pipe: bool,
    pub writes_pipe: bool,
    pub writes_file: bool,
}

impl Command {
    pub fn has_pipe_flags(&self) -> bool {
        self.reads_pipe || self.writes_pipe
    }

    // Under a file redirect the final argument is the target, not a program
    // argument.
    pub fn redirect_target(&self) -> Option<&str> {
        if self.writes_file {
            self.args.last().map(String::as_str)
        } else {
            None
        }
    }

    // The argv actually handed to the program: the redirect target, if any,
    // is trimmed off.
    pub fn exec_args(&self) -> &[String] {
        if self.writes_file {
            &self.args[..self.args.len().saturating_sub(1)]
        } else {
            &self.args
        }
    }
}

// The full pipeline parsed from one input line. Shared between history slots
// and the in-flight execution via Rc<CommandSet>.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    pub commands: Vec<Command>,
    pub asynchronous: bool,
}

impl CommandSet {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// Renders the set back to its textual form: arguments space-separated, `>`
// before a redirect target, `|` between piped stages, trailing `&` when
// asynchronous. Re-parsing the result reproduces the same structure.
impl fmt::Display for CommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            let last = cmd.args.len().saturating_sub(1);
            for (j, arg) in cmd.args.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                if cmd.writes_file && j == last {
                    write!(f, "> ")?;
                }
                write!(f, "{arg}")?;
            }
            if cmd.has_pipe_flags() && i + 1 < self.commands.len() {
                write!(f, " | ")?;
            }
        }
        if self.asynchronous {
            write!(f, " &")?;
        }
        Ok(())
    }
}
