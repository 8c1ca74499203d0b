use std::env;
use std::process;

use anyhow::Result;

use histsh::repl::Shell;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let mut script: Option<String> = None;
    while let Some(a) = args.next() {
        match a.as_str() {
            "-c" => {
                script = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("missing command after -c"))?,
                );
            }
            other => {
                eprintln!("unknown arg: {other}");
            }
        }
    }
    let mut shell = Shell::new();
    let code = match script {
        Some(line) => shell.run_line(&line),
        None => shell.run(),
    };
    process::exit(code);
}
