use super::{ParseResult, fail};
use crate::intent::Intent;

/// `links`, `links --filter <text...>` or `links <text...>`
pub fn parse_links(args: &[&str]) -> ParseResult {
    match args.first().copied() {
        None => Ok(Intent::Links { filter: None }),
        Some("--filter") => {
            let filter = args[1..].join(" ").trim().to_string();
            if filter.is_empty() {
                return fail("--filter needs a value");
            }
            Ok(Intent::Links {
                filter: Some(filter),
            })
        }
        Some(flag) if flag.starts_with("--") => fail(format!("Unknown links option: {}", flag)),
        Some(_) => Ok(Intent::Links {
            filter: Some(args.join(" ")),
        }),
    }
}
