use super::{Column, Error};

/// Split a source line into tokens.
///
/// Tokens are whitespace separated, except that `[` and `]` always stand
/// alone and a leading `'` quotes the rest of its token: `'foo` lexes the
/// same as `[ foo ]`. A standalone `\` ends the line; everything after it
/// is commentary.
pub fn lex(source_line: &str) -> Result<Vec<String>, Error> {
    let mut tokens: Vec<(String, Column)> = vec![];
    let mut chars = source_line.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '[' || ch == ']' {
            chars.next();
            tokens.push((ch.to_string(), start..start + 1));
            continue;
        }
        let mut word = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == '[' || c == ']' {
                break;
            }
            word.push(c);
            chars.next();
        }
        if word == "\\" {
            break;
        }
        let column = start..start + word.len();
        tokens.push((word, column));
    }
    expand_ticks(tokens)
}

fn expand_ticks(tokens: Vec<(String, Column)>) -> Result<Vec<String>, Error> {
    let mut expanded = Vec::with_capacity(tokens.len());
    for (word, column) in tokens {
        if word.starts_with('\'') {
            let rest = &word[1..];
            if rest.is_empty() {
                return Err(error!(SyntaxError; "DANGLING TICK").in_column(&column));
            }
            if rest.starts_with('\'') {
                return Err(error!(SyntaxError; "DOUBLE TICK").in_column(&column));
            }
            expanded.push("[".to_string());
            expanded.push(rest.to_string());
            expanded.push("]".to_string());
        } else {
            expanded.push(word);
        }
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_self_delimit() {
        let tokens = lex("[dup *]'square").unwrap();
        assert_eq!(tokens, vec!["[", "dup", "*", "]", "[", "square", "]"]);
    }

    #[test]
    fn test_comment_hides_brackets() {
        let tokens = lex("1 2 \\ [ never [ closed").unwrap();
        assert_eq!(tokens, vec!["1", "2"]);
    }

    #[test]
    fn test_dangling_tick() {
        assert!(lex("foo '").is_err());
        assert!(lex("''").is_err());
        assert!(lex("'[ bar ]").is_err());
    }
}
