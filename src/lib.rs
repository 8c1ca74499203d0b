pub mod command;
pub mod error;
pub mod exec;
pub mod history;
pub mod parse;
pub mod repl;
pub mod trace;

pub use command::{Command, CommandSet};
pub use error::ShellError;
pub use history::{HistoryRing, HISTORY_CAPACITY};
