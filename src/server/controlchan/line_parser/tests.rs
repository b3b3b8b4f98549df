use super::{ParseError, ParseErrorKind, parse};
use crate::server::controlchan::command::Command;

use pretty_assertions::assert_eq;

fn command(directive: &str, argument: Option<&str>, flags: &[&str], raw: &str) -> Command {
    Command {
        directive: directive.to_string(),
        argument: argument.map(str::to_string),
        flags: flags.iter().map(|f| f.to_string()).collect(),
        raw: raw.to_string(),
    }
}

#[test]
fn parse_user() {
    assert_eq!(parse("USER Dolores").unwrap(), command("USER", Some("Dolores"), &[], "USER Dolores"));
}

#[test]
fn parse_lowercase_directive() {
    assert_eq!(parse("user Dolores").unwrap().directive, "USER");
}

#[test]
fn parse_without_argument() {
    assert_eq!(parse("PWD").unwrap(), command("PWD", None, &[], "PWD"));
}

#[test]
fn parse_list_with_flags() {
    assert_eq!(
        parse("LIST -a -l some/dir").unwrap(),
        command("LIST", Some("some/dir"), &["-a", "-l"], "LIST -a -l some/dir")
    );
}

#[test]
fn multi_character_options_are_arguments() {
    assert_eq!(parse("LIST -la").unwrap(), command("LIST", Some("-la"), &[], "LIST -la"));
}

#[test]
fn file_commands_keep_flag_like_names() {
    assert_eq!(parse("RETR -a").unwrap(), command("RETR", Some("-a"), &[], "RETR -a"));
    assert_eq!(parse("STOR -x").unwrap().argument.as_deref(), Some("-x"));
    assert_eq!(parse("SIZE -z").unwrap().flags, Vec::<String>::new());
    assert_eq!(parse("DELE -z").unwrap().flags, vec!["-z".to_string()]);
}

#[test]
fn quotes_are_stripped() {
    assert_eq!(parse("CWD \"My Documents\"").unwrap().argument.as_deref(), Some("My Documents"));
}

#[test]
fn whitespace_runs_collapse() {
    assert_eq!(parse("  SITE   CHMOD  755 file ").unwrap().argument.as_deref(), Some("CHMOD 755 file"));
}

#[test]
fn empty_lines_are_rejected() {
    assert_eq!(parse(""), Err(ParseError::from(ParseErrorKind::EmptyLine)));
    assert_eq!(parse("   ").unwrap_err().kind(), &ParseErrorKind::EmptyLine);
}

#[test]
fn flags_and_argument_recombine_to_the_tokens() {
    let lines = [
        "LIST -a -l dir",
        "NLST -1 \"a b\" -t",
        "STOR -a -b",
        "MKD x -y z",
        "site chmod -R 755 p",
        "NOOP",
    ];
    for line in lines {
        let cmd = parse(line).unwrap();
        let mut rest: Vec<String> = line.replace('"', "").split_whitespace().skip(1).map(str::to_string).collect();
        rest.sort();
        let mut recombined: Vec<String> = cmd.flags.clone();
        if let Some(arg) = &cmd.argument {
            recombined.extend(arg.split(' ').map(str::to_string));
        }
        recombined.sort();
        assert_eq!(recombined, rest, "line {:?}", line);
    }
}
