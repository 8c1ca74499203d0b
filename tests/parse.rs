use histsh::parse::parse_line;
use histsh::{Command, CommandSet};

fn args(cmd: &Command) -> Vec<&str> {
    cmd.args.iter().map(String::as_str).collect()
}

#[test]
fn single_stage_tokens_in_order() {
    let set = parse_line("echo hi\n");
    assert_eq!(set.commands.len(), 1);
    let cmd = &set.commands[0];
    assert_eq!(args(cmd), ["echo", "hi"]);
    assert!(!cmd.reads_pipe && !cmd.writes_pipe && !cmd.writes_file);
    assert!(!set.asynchronous);
}

#[test]
fn pipe_splits_two_stages() {
    let set = parse_line("ls | wc -l\n");
    assert_eq!(set.commands.len(), 2);
    assert_eq!(args(&set.commands[0]), ["ls"]);
    assert!(set.commands[0].writes_pipe);
    assert!(!set.commands[0].reads_pipe);
    assert_eq!(args(&set.commands[1]), ["wc", "-l"]);
    assert!(set.commands[1].reads_pipe);
    assert!(!set.commands[1].writes_pipe);
}

#[test]
fn middle_stage_has_both_pipe_flags() {
    let set = parse_line("a | b | c\n");
    assert_eq!(set.commands.len(), 3);
    assert!(set.commands[0].writes_pipe && !set.commands[0].reads_pipe);
    assert!(set.commands[1].writes_pipe && set.commands[1].reads_pipe);
    assert!(set.commands[2].reads_pipe && !set.commands[2].writes_pipe);
}

#[test]
fn ampersand_sets_async_without_token() {
    let set = parse_line("sleep 5 &\n");
    assert!(set.asynchronous);
    assert_eq!(set.commands.len(), 1);
    assert_eq!(args(&set.commands[0]), ["sleep", "5"]);
}

#[test]
fn ampersand_keeps_the_token_it_terminates() {
    let set = parse_line("echo hi&\n");
    assert!(set.asynchronous);
    assert_eq!(args(&set.commands[0]), ["echo", "hi"]);
}

#[test]
fn redirect_flag_and_target() {
    let set = parse_line("echo hi > out.txt\n");
    assert_eq!(set.commands.len(), 1);
    let cmd = &set.commands[0];
    assert!(cmd.writes_file);
    assert_eq!(args(cmd), ["echo", "hi", "out.txt"]);
    assert_eq!(cmd.redirect_target(), Some("out.txt"));
    assert_eq!(cmd.exec_args(), ["echo".to_string(), "hi".to_string()]);
}

#[test]
fn repeated_delimiters_collapse() {
    let set = parse_line("  a   b \n");
    assert_eq!(args(&set.commands[0]), ["a", "b"]);
}

#[test]
fn single_char_line_is_one_argument() {
    let set = parse_line("a\n");
    assert_eq!(set.commands.len(), 1);
    assert_eq!(args(&set.commands[0]), ["a"]);
}

#[test]
fn missing_trailing_newline_still_terminates() {
    let set = parse_line("echo hi");
    assert_eq!(args(&set.commands[0]), ["echo", "hi"]);
}

#[test]
fn blank_lines_parse_empty() {
    assert!(parse_line("\n").is_empty());
    assert!(parse_line("   \n").is_empty());
    assert!(parse_line("").is_empty());
}

#[test]
fn empty_stage_after_pipe_is_preserved() {
    let set = parse_line("ls |\n");
    assert_eq!(set.commands.len(), 2);
    assert!(set.commands[0].writes_pipe);
    assert!(set.commands[1].reads_pipe);
    assert!(set.commands[1].args.is_empty());
}

#[test]
fn render_round_trips_structure() {
    for line in [
        "echo hi",
        "ls | wc -l",
        "echo hi > out.txt",
        "a | b | c",
        "sleep 5 &",
        "echo a b > t | cat",
    ] {
        let set: CommandSet = parse_line(&format!("{line}\n"));
        let rendered = set.to_string();
        let reparsed = parse_line(&format!("{rendered}\n"));
        assert_eq!(set, reparsed, "round trip failed for {line:?} -> {rendered:?}");
    }
}

#[test]
fn render_places_markers() {
    assert_eq!(parse_line("echo hi > out.txt &\n").to_string(), "echo hi > out.txt &");
    assert_eq!(parse_line("ls | wc -l\n").to_string(), "ls | wc -l");
}
