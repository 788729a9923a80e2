//! Shell-like splitting of a console line into tokens.

/// Split `input` into tokens.
///
/// Whitespace separates tokens. A token that opens with `"` or `'` and has a
/// matching closing quote becomes the quoted content with the outer quotes
/// removed; backslash escapes inside it are kept verbatim (`"a\"b"` yields
/// `a\"b`). A quote with no partner is an ordinary character.
pub fn tokenize(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }

        if is_quote(chars[pos])
            && let Some(close) = find_closing_quote(&chars, pos)
        {
            tokens.push(chars[pos + 1..close].iter().collect());
            pos = close + 1;
            continue;
        }

        let start = pos;
        while pos < chars.len() && !chars[pos].is_whitespace() {
            pos += 1;
        }
        tokens.push(strip_wrapping_quotes(&chars[start..pos]));
    }

    tokens
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Index of the quote closing the one at `open`, skipping backslash escapes.
fn find_closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 2,
            '\\' => return None,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

// A bare run like `"a\"` never matched as a quoted span but is still wrapped
// in the same quote character on both ends.
fn strip_wrapping_quotes(run: &[char]) -> String {
    if run.len() >= 2 && is_quote(run[0]) && run[0] == run[run.len() - 1] {
        run[1..run.len() - 1].iter().collect()
    } else {
        run.iter().collect()
    }
}

#[cfg(test)]
#[path = "tokenize_test.rs"]
mod tokenize_test;
