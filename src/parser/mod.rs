//! Command grammar: one parser per verb, each turning argument tokens into an
//! [`Intent`] or a stable, user-facing [`ParseError`].
//!
//! | verb | grammar |
//! |---|---|
//! | `navigate` | `<absolute http(s) url>` |
//! | `open` | `<absolute http(s) url \| relative path...>` |
//! | `show` | `code --<name>` \| `elements [--<name>]` |
//! | `input` | `((--selector <css> \| --index <id> \| --text <label> \| <label>) <value>)... <submit text>` |
//! | `click` | `<css...>` \| `--selector <css...>` \| `--text <text...>` \| `--href <href...>` \| `--index <id>` |
//! | `links` | `[--filter <text...> \| <text...>]` |
//! | `follow` | `<pattern...>` |
//! | `act` | `<id>` |
//! | `wait` | `url <pattern> [--timeout <ms>]` \| `selector <css> [--state <s>] [--timeout <ms>]` |
//! | `move` | `back` \| `forward` |
//! | `print` | `url` \| `title` |
//! | `screenshot` | `--<name>` |
//! | `reload`, `help`, `exit` | no arguments |

use std::fmt;

use crate::intent::Intent;
use crate::tokenize::tokenize;

pub mod act;
pub mod click;
pub mod follow;
pub mod input;
pub mod links;
pub mod r#move;
pub mod navigate;
pub mod open;
pub mod print;
pub mod screenshot;
pub mod show;
pub mod wait;

pub use act::parse_act;
pub use click::parse_click;
pub use follow::parse_follow;
pub use input::parse_input;
pub use links::parse_links;
pub use r#move::parse_move;
pub use navigate::parse_navigate;
pub use open::parse_open;
pub use print::parse_print;
pub use screenshot::parse_screenshot;
pub use show::parse_show;
pub use wait::parse_wait;

/// A malformed or incomplete command. The message is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult = Result<Intent, ParseError>;

/// Shorthand for the `Err` arm used by every verb parser
pub(crate) fn fail(message: impl Into<String>) -> ParseResult {
    Err(ParseError::new(message))
}

/// Tokenize and parse one console line
pub fn parse_line(line: &str) -> ParseResult {
    let tokens = tokenize(line);
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
    parse_tokens(&tokens)
}

/// Route tokens to the parser owning the leading verb
pub fn parse_tokens(tokens: &[&str]) -> ParseResult {
    let Some((verb, args)) = tokens.split_first() else {
        return fail("Empty command");
    };

    match *verb {
        "navigate" => parse_navigate(args),
        "open" => parse_open(args),
        "show" => parse_show(args),
        "input" => parse_input(args),
        "click" => parse_click(args),
        "links" => parse_links(args),
        "follow" => parse_follow(args),
        "act" => parse_act(args),
        "wait" => parse_wait(args),
        "move" => parse_move(args),
        "print" => parse_print(args),
        "screenshot" => parse_screenshot(args),
        "reload" => parse_bare(verb, args, Intent::Reload),
        "help" => parse_bare(verb, args, Intent::Help),
        "exit" => parse_bare(verb, args, Intent::Exit),
        other => fail(format!("Unknown command: {}", other)),
    }
}

fn parse_bare(verb: &str, args: &[&str], intent: Intent) -> ParseResult {
    if !args.is_empty() {
        return fail(format!("{} takes no arguments", verb));
    }
    Ok(intent)
}

/// Non-negative integer argument (ids, indexes)
pub(crate) fn parse_id(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

/// Leading `--` file-name convention shared by `show` and `screenshot`
pub(crate) fn is_file_name_token(token: &str) -> bool {
    token.starts_with("--")
}

#[cfg(test)]
#[path = "../parser_test.rs"]
mod parser_test;
