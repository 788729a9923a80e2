use super::{ParseResult, fail, parse_id};
use crate::intent::Intent;

/// `act <id>` where `<id>` comes from the last `links` output
pub fn parse_act(args: &[&str]) -> ParseResult {
    let Some(raw) = args.first().filter(|raw| !raw.is_empty()) else {
        return fail("act requires an element id from links output");
    };

    let Some(id) = parse_id(raw) else {
        return fail("act id must be a non-negative integer");
    };

    if args.len() > 1 {
        return fail("act takes exactly one element id");
    }

    Ok(Intent::Act { id })
}
