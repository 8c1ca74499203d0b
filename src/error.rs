use std::io;

use nix::errno::Errno;
use thiserror::Error;

// Every variant names the operation that failed; nothing here ever takes the
// interpreter down with it.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("invalid pipe: stage {stage} has no command to pipe into")]
    InvalidPipe { stage: usize },

    #[error("malformed pipeline: stage {stage} is empty")]
    EmptyStage { stage: usize },

    #[error("illegal redirect: a program and a target file are required")]
    RedirectArity,

    #[error("invalid history choice")]
    InvalidChoice,

    #[error("input line exceeds {max} bytes")]
    LineTooLong { max: usize },

    #[error("{op}: {errno}")]
    Os {
        op: &'static str,
        #[source]
        errno: Errno,
    },

    #[error("read: {0}")]
    Input(#[from] io::Error),
}

impl ShellError {
    pub fn os(op: &'static str, errno: Errno) -> Self {
        ShellError::Os { op, errno }
    }
}
