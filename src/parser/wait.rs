use super::{ParseError, ParseResult, fail};
use crate::intent::{DEFAULT_WAIT_TIMEOUT_MS, ElementState, Intent, WaitTarget};

const TIMEOUT_ERROR: &str = "--timeout must be a positive integer in milliseconds";

/// `wait url <pattern> [--timeout <ms>]` or
/// `wait selector <css> [--state attached|detached|visible|hidden] [--timeout <ms>]`
pub fn parse_wait(args: &[&str]) -> ParseResult {
    match args.first().copied() {
        None | Some("") => fail("wait requires a target: wait url <pattern> | wait selector <css>"),
        Some("url") => parse_url_wait(&args[1..]),
        Some("selector") => parse_selector_wait(&args[1..]),
        Some(_) => fail("wait supports: wait url <pattern> | wait selector <css>"),
    }
}

fn parse_url_wait(args: &[&str]) -> ParseResult {
    let Some(pattern) = args.first().filter(|p| !p.is_empty()) else {
        return fail("wait url requires a URL pattern");
    };

    let mut timeout_ms = DEFAULT_WAIT_TIMEOUT_MS;
    let mut options = args[1..].iter();
    while let Some(option) = options.next() {
        match *option {
            "--timeout" => timeout_ms = parse_timeout(options.next().copied())?,
            other => return fail(format!("Unknown wait url option: {}", other)),
        }
    }

    Ok(Intent::Wait {
        target: WaitTarget::Url {
            pattern: pattern.to_string(),
            timeout_ms,
        },
    })
}

fn parse_selector_wait(args: &[&str]) -> ParseResult {
    let Some(selector) = args.first().filter(|s| !s.is_empty()) else {
        return fail("wait selector requires a CSS selector");
    };

    let mut state = ElementState::default();
    let mut timeout_ms = DEFAULT_WAIT_TIMEOUT_MS;
    let mut options = args[1..].iter();
    while let Some(option) = options.next() {
        match *option {
            "--state" => {
                state = match options.next().and_then(|raw| raw.parse().ok()) {
                    Some(state) => state,
                    None => {
                        return fail("--state must be one of: attached, detached, visible, hidden");
                    }
                };
            }
            "--timeout" => timeout_ms = parse_timeout(options.next().copied())?,
            other => return fail(format!("Unknown wait selector option: {}", other)),
        }
    }

    Ok(Intent::Wait {
        target: WaitTarget::Selector {
            selector: selector.to_string(),
            state,
            timeout_ms,
        },
    })
}

fn parse_timeout(raw: Option<&str>) -> Result<u64, ParseError> {
    match raw.and_then(|raw| raw.trim().parse::<u64>().ok()) {
        Some(timeout) if timeout > 0 => Ok(timeout),
        _ => Err(ParseError::new(TIMEOUT_ERROR)),
    }
}
