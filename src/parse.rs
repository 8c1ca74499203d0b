// -------- Tokenizer ---------
//
// One left-to-right scan over the line, no backtracking. Delimiters end the
// pending token; zero-length tokens between delimiters are never emitted.

use crate::command::{Command, CommandSet};

fn flush(pending: &mut String, stage: &mut Command) {
    if !pending.is_empty() {
        stage.args.push(std::mem::take(pending));
    }
}

// Parses one raw input line (trailing newline optional) into a CommandSet.
// Shape violations are not rejected here; the orchestrator reports them
// before exec.
pub fn parse_line(line: &str) -> CommandSet {
    let mut done: Vec<Command> = Vec::new();
    let mut cur = Command::default();
    let mut pending = String::new();
    let mut asynchronous = false;

    for ch in line.chars() {
        match ch {
            ' ' | '\t' | '\n' => flush(&mut pending, &mut cur),
            '&' => {
                // Sets the async flag; the token it terminates is still kept.
                asynchronous = true;
                flush(&mut pending, &mut cur);
            }
            '|' => {
                flush(&mut pending, &mut cur);
                cur.writes_pipe = true;
                done.push(std::mem::take(&mut cur));
                cur.reads_pipe = true;
            }
            '>' => {
                flush(&mut pending, &mut cur);
                cur.writes_file = true;
            }
            _ => pending.push(ch),
        }
    }
    // A line may arrive without its newline (end of input).
    flush(&mut pending, &mut cur);

    if done.is_empty() && cur.args.is_empty() && !cur.reads_pipe && !cur.writes_file {
        // Nothing but delimiters: a blank set, skipped by the caller.
        return CommandSet {
            commands: Vec::new(),
            asynchronous,
        };
    }
    done.push(cur);
    CommandSet {
        commands: done,
        asynchronous,
    }
}
