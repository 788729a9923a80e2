use super::{ParseResult, fail};
use crate::intent::Intent;

pub fn parse_follow(args: &[&str]) -> ParseResult {
    let pattern = args.join(" ");
    if pattern.trim().is_empty() {
        return fail("follow requires an href pattern");
    }

    Ok(Intent::Follow { pattern })
}
