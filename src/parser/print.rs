use super::{ParseResult, fail};
use crate::intent::{Intent, PrintTarget};

pub fn parse_print(args: &[&str]) -> ParseResult {
    let target = match args {
        ["url"] => PrintTarget::Url,
        ["title"] => PrintTarget::Title,
        _ => return fail("print supports two commands: print url & print title"),
    };

    Ok(Intent::Print { target })
}
