use url::Url;

use super::navigate::{PROTOCOL_ERROR, is_http_scheme};
use super::{ParseResult, fail};
use crate::intent::Intent;

/// `open <url-or-path...>`: tokens are re-joined with spaces. Absolute
/// http(s) targets are validated here; relative paths are resolved against
/// the current page at execution time.
pub fn parse_open(args: &[&str]) -> ParseResult {
    if args.is_empty() {
        return fail("open requires a URL or relative path");
    }

    let target = args.join(" ");

    if target.starts_with("http://") || target.starts_with("https://") {
        match Url::parse(&target) {
            Ok(url) if is_http_scheme(&url) => {}
            Ok(_) => return fail(PROTOCOL_ERROR),
            Err(_) => return fail("Invalid absolute URL"),
        }
    } else if let Ok(url) = Url::parse(&target) {
        // Anything else that already parses as absolute (javascript:, file:,
        // mailto:, ...) would never be resolved against the page.
        if !is_http_scheme(&url) {
            return fail(PROTOCOL_ERROR);
        }
    }

    Ok(Intent::Open { target })
}
