use super::{ParseResult, fail};
use crate::intent::Intent;

pub fn parse_move(args: &[&str]) -> ParseResult {
    match args {
        ["back"] => Ok(Intent::MoveBack),
        ["forward"] => Ok(Intent::MoveForward),
        _ => fail("move supports two commands: move back & move forward"),
    }
}
