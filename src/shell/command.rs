//! Command language for driving a queue from a script
//!
//! One command per line. Tokens are separated by whitespace; a token wrapped
//! in double quotes may contain spaces, `\"` and `\\`. Blank lines and lines
//! starting with `#` are skipped.

use super::errors::ShellError;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Free,
    InsertHead { value: String, count: usize },
    InsertTail { value: String, count: usize },
    RemoveHead { expected: Option<String> },
    RemoveHeadQuiet,
    Size { expected: Option<usize> },
    Reverse,
    Sort,
    Show,
    Fail { after: usize },
    Help,
    Quit,
}

/// Name, argument synopsis, and description of every command
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("new", "", "Create new queue"),
    ("free", "", "Delete queue"),
    ("ih", "str [n]", "Insert string str at head of queue n times (default 1)"),
    ("it", "str [n]", "Insert string str at tail of queue n times (default 1)"),
    ("rh", "[str]", "Remove from head of queue; optionally compare to expected value str"),
    ("rhq", "", "Remove from head of queue without reporting value"),
    ("size", "[n]", "Compute queue size; optionally compare to expected n"),
    ("reverse", "", "Reverse queue"),
    ("sort", "", "Sort queue in ascending order, ignoring case"),
    ("show", "", "Display queue contents"),
    ("fail", "n", "Let n allocations succeed, then fail the next one"),
    ("help", "", "Show documentation"),
    ("quit", "", "Exit program"),
];

/// Parse one script line; `Ok(None)` for blank lines and comments
pub fn parse_line(text: &str, line: usize) -> Result<Option<Command>, ShellError> {
    let tokens = tokenize(text, line)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let bad = |usage: &'static str| ShellError::BadArguments { usage, line };

    let command = match name.as_str() {
        "new" => no_args(args, Command::New, bad("new"))?,
        "free" => no_args(args, Command::Free, bad("free"))?,
        "ih" | "it" => {
            let usage = if name == "ih" { "ih str [n]" } else { "it str [n]" };
            let (value, count) = match args {
                [value] => (value.clone(), 1),
                [value, n] => (value.clone(), parse_count(n).ok_or_else(|| bad(usage))?),
                _ => return Err(bad(usage)),
            };
            if name == "ih" {
                Command::InsertHead { value, count }
            } else {
                Command::InsertTail { value, count }
            }
        }
        "rh" => match args {
            [] => Command::RemoveHead { expected: None },
            [expected] => Command::RemoveHead {
                expected: Some(expected.clone()),
            },
            _ => return Err(bad("rh [str]")),
        },
        "rhq" => no_args(args, Command::RemoveHeadQuiet, bad("rhq"))?,
        "size" => match args {
            [] => Command::Size { expected: None },
            [n] => Command::Size {
                expected: Some(n.parse().map_err(|_| bad("size [n]"))?),
            },
            _ => return Err(bad("size [n]")),
        },
        "reverse" => no_args(args, Command::Reverse, bad("reverse"))?,
        "sort" => no_args(args, Command::Sort, bad("sort"))?,
        "show" => no_args(args, Command::Show, bad("show"))?,
        "fail" => match args {
            [n] => Command::Fail {
                after: n.parse().map_err(|_| bad("fail n"))?,
            },
            _ => return Err(bad("fail n")),
        },
        "help" => Command::Help,
        "quit" => Command::Quit,
        other => {
            return Err(ShellError::UnknownCommand {
                name: other.to_string(),
                line,
            })
        }
    };

    Ok(Some(command))
}

fn no_args(args: &[String], command: Command, err: ShellError) -> Result<Command, ShellError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(err)
    }
}

/// Repeat counts must be positive
fn parse_count(text: &str) -> Option<usize> {
    text.parse().ok().filter(|&n| n > 0)
}

/// Split a line into tokens, honouring double quotes
fn tokenize(text: &str, line: usize) -> Result<Vec<String>, ShellError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('#') {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut chars = trimmed.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => break,
                    },
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(ShellError::UnterminatedQuote { line });
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("", 1), Ok(None));
        assert_eq!(parse_line("   ", 1), Ok(None));
        assert_eq!(parse_line("# ih a", 1), Ok(None));
    }

    #[test]
    fn test_insert_commands() {
        assert_eq!(
            parse_line("ih dolphin", 1),
            Ok(Some(Command::InsertHead {
                value: "dolphin".to_string(),
                count: 1
            }))
        );
        assert_eq!(
            parse_line("it gerbil 3", 1),
            Ok(Some(Command::InsertTail {
                value: "gerbil".to_string(),
                count: 3
            }))
        );
        assert!(matches!(
            parse_line("it gerbil 0", 4),
            Err(ShellError::BadArguments { line: 4, .. })
        ));
        assert!(parse_line("ih", 1).is_err());
    }

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(
            parse_line(r#"it "two words" 2"#, 1),
            Ok(Some(Command::InsertTail {
                value: "two words".to_string(),
                count: 2
            }))
        );
        assert_eq!(
            parse_line(r#"rh "say \"hi\"""#, 1),
            Ok(Some(Command::RemoveHead {
                expected: Some("say \"hi\"".to_string())
            }))
        );
        assert_eq!(
            parse_line(r#"ih """#, 1),
            Ok(Some(Command::InsertHead {
                value: String::new(),
                count: 1
            }))
        );
        assert_eq!(
            parse_line(r#"ih "open"#, 7),
            Err(ShellError::UnterminatedQuote { line: 7 })
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_line("new", 1), Ok(Some(Command::New)));
        assert_eq!(parse_line("  sort  ", 1), Ok(Some(Command::Sort)));
        assert_eq!(
            parse_line("size 4", 1),
            Ok(Some(Command::Size { expected: Some(4) }))
        );
        assert_eq!(
            parse_line("fail 2", 1),
            Ok(Some(Command::Fail { after: 2 }))
        );
        assert!(parse_line("reverse now", 1).is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("pop", 9),
            Err(ShellError::UnknownCommand {
                name: "pop".to_string(),
                line: 9
            })
        );
    }
}
