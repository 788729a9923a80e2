use super::{ParseResult, fail, is_file_name_token};
use crate::intent::Intent;

pub fn parse_screenshot(args: &[&str]) -> ParseResult {
    let Some(file_name) = args.first().filter(|name| !name.is_empty()) else {
        return fail("screenshot needs a file name where image will be stored");
    };

    if !is_file_name_token(file_name) {
        return fail("file name must start with --");
    }

    Ok(Intent::Screenshot {
        file_name: file_name.to_string(),
    })
}
