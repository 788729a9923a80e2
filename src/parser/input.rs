use super::{ParseError, ParseResult, fail, parse_id};
use crate::intent::{FieldEntry, FieldTarget, Intent};

const FORMAT_ERROR: &str = "input format: input <field> <value> ... <submit button text>";

/// `input (<field> <value>)... <submit text>`, where a field is a bare label,
/// `--text <label>`, `--selector <css>` or `--index <id>`.
pub fn parse_input(args: &[&str]) -> ParseResult {
    let Some((submit, field_tokens)) = args.split_last().filter(|_| args.len() >= 3) else {
        return fail("input requires at least one field/value pair and submit text");
    };

    let submit_text = submit.trim();
    if submit_text.is_empty() {
        return fail("submit button text cannot be empty");
    }

    let mut fields = Vec::new();
    let mut i = 0;
    while i < field_tokens.len() {
        let token = field_tokens[i];
        if token.is_empty() {
            return fail(FORMAT_ERROR);
        }

        let (target, value, consumed) = match token {
            "--selector" => {
                let (css, value) = flagged(
                    field_tokens,
                    i,
                    "input --selector requires: --selector <css> <value>",
                )?;
                (FieldTarget::Selector(css.to_string()), value, 3)
            }
            "--index" => {
                let (raw, value) = flagged(
                    field_tokens,
                    i,
                    "input --index requires: --index <id> <value>",
                )?;
                let Some(id) = parse_id(raw) else {
                    return fail("input --index <id> expects a non-negative integer id");
                };
                (FieldTarget::Index(id), value, 3)
            }
            "--text" => {
                let (label, value) = flagged(
                    field_tokens,
                    i,
                    "input --text requires: --text <field text> <value>",
                )?;
                (FieldTarget::Text(label.to_string()), value, 3)
            }
            label => {
                let Some(value) = field_tokens.get(i + 1) else {
                    return fail(FORMAT_ERROR);
                };
                (FieldTarget::Text(label.to_string()), *value, 2)
            }
        };

        fields.push(FieldEntry {
            target,
            value: value.to_string(),
        });
        i += consumed;
    }

    if fields.is_empty() {
        return fail("input requires at least one field/value pair before submit text");
    }

    Ok(Intent::Input {
        fields,
        submit_text: submit_text.to_string(),
    })
}

/// Key and value following a `--flag` at `i`
fn flagged<'a>(
    tokens: &[&'a str],
    i: usize,
    usage: &str,
) -> Result<(&'a str, &'a str), ParseError> {
    match (tokens.get(i + 1), tokens.get(i + 2)) {
        (Some(key), Some(value)) if !key.is_empty() => Ok((*key, *value)),
        _ => Err(ParseError::new(usage)),
    }
}
