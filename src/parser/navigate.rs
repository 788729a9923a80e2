use url::Url;

use super::{ParseResult, fail};
use crate::intent::Intent;

pub(crate) const PROTOCOL_ERROR: &str = "Invalid URL protocol. Only http and https are allowed.";

/// `navigate <url>`: the URL must be absolute http(s); it is normalized
/// (`https://example.com` becomes `https://example.com/`).
pub fn parse_navigate(args: &[&str]) -> ParseResult {
    let Some(raw) = args.first() else {
        return fail("navigate requires a URL");
    };

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return fail("Invalid URL"),
    };

    if !is_http_scheme(&url) {
        return fail(PROTOCOL_ERROR);
    }

    Ok(Intent::Navigate {
        url: url.to_string(),
    })
}

pub(crate) fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
