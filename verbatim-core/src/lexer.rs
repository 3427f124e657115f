/// Which placeholders the lexer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSyntax {
    /// `?` markers.
    Positional,
    /// `:name` references.
    Named,
}

/// A piece of SQL text, either passed through verbatim or a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'q> {
    Sql(&'q str),
    Positional,
    Named(&'q str),
}

/// Split `query` into literal SQL and placeholders.
///
/// String literals, quoted identifiers, comments, dollar quoted strings and `::` casts are never
/// searched for placeholders.
pub fn tokenize(query: &str, syntax: PlaceholderSyntax) -> Vec<Token<'_>> {
    let mut result = Vec::new();
    let bytes = query.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_quoted(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = query[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2);
            }
            b'$' => i = skip_dollar_quoted(query, i),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if syntax == PlaceholderSyntax::Named => {
                let len = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                if len == 0 {
                    i += 1;
                    continue;
                }
                if start < i {
                    result.push(Token::Sql(&query[start..i]));
                }
                result.push(Token::Named(&query[i + 1..i + 1 + len]));
                i += 1 + len;
                start = i;
            }
            b'?' if syntax == PlaceholderSyntax::Positional => {
                if start < i {
                    result.push(Token::Sql(&query[start..i]));
                }
                result.push(Token::Positional);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        result.push(Token::Sql(&query[start..]));
    }
    result
}

/// Position after the closing quote, a doubled quote is an escaped one.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a `$tag$ ... $tag$` string, `$1` style markers and lone dollars are plain text.
fn skip_dollar_quoted(query: &str, start: usize) -> usize {
    let rest = &query[start + 1..];
    let tag_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let tag = &rest[..tag_len];
    if rest.as_bytes().get(tag_len) != Some(&b'$') || tag.starts_with(|c: char| c.is_ascii_digit())
    {
        return start + 1;
    }
    let delimiter = &query[start..start + tag_len + 2];
    let body = start + delimiter.len();
    query[body..]
        .find(delimiter)
        .map_or(query.len(), |p| body + p + delimiter.len())
}
