use super::{ParseError, ParseResult, fail, parse_id};
use crate::intent::{ClickTarget, Intent};

/// `click <css...>` or `click --selector|--text|--href <value...>` or
/// `click --index <id>`
pub fn parse_click(args: &[&str]) -> ParseResult {
    let Some(first) = args.first().filter(|arg| !arg.is_empty()) else {
        return fail("click needs a selector or one of --selector --text --href --index");
    };

    let rest = || args[1..].join(" ").trim().to_string();

    let target = match *first {
        "--selector" => ClickTarget::Selector(required(rest(), "--selector")?),
        "--text" => ClickTarget::Text(required(rest(), "--text")?),
        "--href" => ClickTarget::Href(required(rest(), "--href")?),
        "--index" => {
            let Some(raw) = args.get(1).filter(|raw| !raw.is_empty()) else {
                return fail("--index needs a numeric value");
            };
            match parse_id(raw) {
                Some(index) => ClickTarget::Index(index),
                None => return fail("--index must be a non-negative integer"),
            }
        }
        flag if flag.starts_with("--") => {
            return fail("Unknown click mode. Use --selector --text --href or --index");
        }
        _ => ClickTarget::Selector(args.join(" ")),
    };

    Ok(Intent::Click { target })
}

fn required(value: String, flag: &str) -> Result<String, ParseError> {
    if value.is_empty() {
        return Err(ParseError::new(format!("{} needs a value", flag)));
    }
    Ok(value)
}
