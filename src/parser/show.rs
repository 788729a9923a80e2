use super::{ParseResult, fail, is_file_name_token};
use crate::intent::{Intent, ShowTarget};

const FILE_NAME_ERROR: &str = "file name must start with --";

/// `show code --<name>` or `show elements [--<name>]`
pub fn parse_show(args: &[&str]) -> ParseResult {
    match args.first().copied() {
        Some("code") => {
            let Some(file_name) = args.get(1).filter(|name| !name.is_empty()) else {
                return fail("show needs a file name where code will be stored");
            };
            if !is_file_name_token(file_name) {
                return fail(FILE_NAME_ERROR);
            }
            Ok(Intent::Show(ShowTarget::Code {
                file_name: file_name.to_string(),
            }))
        }
        Some("elements") => {
            let file_name = args.get(1).filter(|name| !name.is_empty());
            if let Some(name) = file_name
                && !is_file_name_token(name)
            {
                return fail(FILE_NAME_ERROR);
            }
            Ok(Intent::Show(ShowTarget::Elements {
                file_name: file_name.map(|name| name.to_string()),
            }))
        }
        _ => fail("show supports two commands: show code --fileName & show elements"),
    }
}
