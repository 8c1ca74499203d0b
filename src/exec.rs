// -------- Pipe wiring / process orchestration ---------
//
// Descriptor discipline: whoever does not need an end closes it promptly.
// The parent drops a stage's slots as soon as that stage is forked; the
// child dup2s what it needs and then sweeps every remaining wiring fd
// before exec, so downstream readers see EOF the moment their writers exit.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, ForkResult, pipe, Pid};
use serde_json::json;

use crate::command::{Command, CommandSet};
use crate::error::ShellError;
use crate::trace;

// Exit status of a child whose program could not be located or run.
pub const EXEC_FAILURE_STATUS: i32 = 127;

// Redirect targets are created owner-rwx, truncated if present.
const REDIRECT_FILE_MODE: u32 = 0o700;

// Descriptor slots for one stage of one run: the read end feeding its stdin
// and the write end receiving its stdout. Either may be unset.
#[derive(Debug, Default)]
pub struct StageIo {
    pub read: Option<OwnedFd>,
    pub write: Option<OwnedFd>,
}

// Creates the pipe connecting `stage` to its successor and distributes the
// ends: write end to the source slot, read end to the destination slot,
// whose write half stays explicitly unset. No side effect on a stage that
// does not write to a pipe.
pub fn wire_stage(set: &CommandSet, stage: usize, io: &mut [StageIo]) -> Result<(), ShellError> {
    let cmd = &set.commands[stage];
    if !cmd.writes_pipe {
        return Ok(());
    }
    if stage + 1 >= set.commands.len() {
        return Err(ShellError::InvalidPipe { stage });
    }
    let (read_end, write_end) = pipe().map_err(|e| ShellError::os("pipe", e))?;
    io[stage].write = Some(write_end);
    io[stage + 1].read = Some(read_end);
    io[stage + 1].write = None;
    Ok(())
}

// Shape checks the parser deliberately defers: they must fail here, before
// any fork happens and before any redirect target is opened.
fn validate_stage(cmd: &Command, stage: usize) -> Result<(), ShellError> {
    if cmd.args.is_empty() {
        return Err(ShellError::EmptyStage { stage });
    }
    if cmd.writes_file && cmd.args.len() < 2 {
        return Err(ShellError::RedirectArity);
    }
    Ok(())
}

// Launches every stage left to right, then waits for all of them in launch
// order unless the set is asynchronous. A failing stage abandons the stages
// after it; the ones already launched are left to finish.
pub fn spawn_pipeline(set: &CommandSet) -> Result<(), ShellError> {
    if set.commands.is_empty() {
        return Ok(());
    }
    let mut io: Vec<StageIo> = (0..set.commands.len()).map(|_| StageIo::default()).collect();
    let mut launched: Vec<Pid> = Vec::new();
    let mut failure: Option<ShellError> = None;

    for (i, cmd) in set.commands.iter().enumerate() {
        if let Err(e) = validate_stage(cmd, i).and_then(|()| wire_stage(set, i, &mut io)) {
            failure = Some(e);
            break;
        }
        match unsafe { fork() } {
            Err(e) => {
                failure = Some(ShellError::os("fork", e));
                break;
            }
            Ok(ForkResult::Child) => child_exec(cmd, i, &io),
            Ok(ForkResult::Parent { child }) => {
                trace::event(
                    "launch",
                    json!({ "stage": i, "pid": child.as_raw(), "argv0": cmd.args[0] }),
                );
                launched.push(child);
                // This stage's ends are the child's business now.
                io[i].read = None;
                io[i].write = None;
            }
        }
    }

    if !set.asynchronous {
        for child in &launched {
            match waitpid(*child, None) {
                Ok(status) => trace::event(
                    "wait",
                    json!({ "pid": child.as_raw(), "status": format!("{status:?}") }),
                ),
                Err(e) => eprintln!("wait: {e}"),
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// Child side, between fork and exec: redirections in order (pipe stdin,
// pipe stdout, then file stdout, which wins if both are set), the fd sweep,
// and finally execvp. Never returns to the interpreter loop; any failure
// ends this process alone.
fn child_exec(cmd: &Command, stage: usize, io: &[StageIo]) -> ! {
    if cmd.reads_pipe {
        if let Some(fd) = &io[stage].read {
            if dup2(fd.as_raw_fd(), libc::STDIN_FILENO).is_err() {
                child_fail("dup2 stdin failed");
            }
        }
    }
    if cmd.writes_pipe {
        if let Some(fd) = &io[stage].write {
            if dup2(fd.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
                child_fail("dup2 stdout failed");
            }
        }
    }
    for slot in io {
        if let Some(fd) = &slot.read {
            let _ = close(fd.as_raw_fd());
        }
        if let Some(fd) = &slot.write {
            let _ = close(fd.as_raw_fd());
        }
    }

    if cmd.writes_file {
        // Arity was validated in the parent, so a target is present.
        let target = cmd.redirect_target().unwrap_or_default();
        let file = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(REDIRECT_FILE_MODE)
            .open(target)
        {
            Ok(f) => f,
            Err(e) => child_fail(&format!("open {target}: {e}")),
        };
        if dup2(file.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
            child_fail("dup2 redirect failed");
        }
        let _ = close(file.into_raw_fd());
    }

    let cstrs: Vec<CString> = cmd
        .exec_args()
        .iter()
        .map(|s| CString::new(s.as_str()).unwrap())
        .collect();
    let argv: Vec<&CString> = cstrs.iter().collect();
    if execvp(argv[0], &argv).is_err() {
        eprintln!("{}: program not found", cmd.args[0]);
        unsafe { libc::_exit(EXEC_FAILURE_STATUS) }
    }
    unreachable!();
}

fn child_fail(msg: &str) -> ! {
    eprintln!("{msg}");
    unsafe { libc::_exit(1) }
}

// Non-blocking drain of finished children; called before each prompt so
// asynchronous sets do not accumulate zombies.
pub fn reap_finished() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => {
                trace::event("reap", json!({ "status": format!("{status:?}") }));
                reaped += 1;
            }
        }
    }
    reaped
}
