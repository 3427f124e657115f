use crate::{Error, ErrorContext, ParamTable, Result, consume_while};

/// A `{{:name body}}` region of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'q> {
    pub name: &'q str,
    pub negated: bool,
    pub body: &'q str,
}

impl<'q> Directive<'q> {
    /// Parse the text between `{{` and `}}`, `None` when it is not a directive.
    pub fn parse(inner: &'q str) -> Option<Self> {
        let mut input = inner.strip_prefix(':')?;
        let name = consume_while(&mut input, |c| c.is_ascii_alphanumeric() || *c == '_');
        if name.is_empty() {
            return None;
        }
        let negated = if let Some(rest) = input.strip_prefix('!') {
            input = rest;
            true
        } else {
            false
        };
        if !input.is_empty() && !input.starts_with(char::is_whitespace) {
            return None;
        }
        Some(Self {
            name,
            negated,
            body: input.trim(),
        })
    }
}

/// Resolve every conditional directive of `query` against the named parameters.
///
/// Directives are not nested: the first `}}` closes the latest `{{`. A truthy directive is
/// replaced by its body, a falsy one is removed together with the horizontal whitespace in front
/// of it when whitespace (or the end of the query) follows, so that no double spaces remain.
/// Braces that do not hold a directive are copied unchanged.
pub fn resolve_conditionals(query: &str, table: &ParamTable) -> Result<String> {
    let mut out = String::with_capacity(query.len());
    let mut rest = query;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let Some(directive) = Directive::parse(&candidate[..end]) else {
            out.push_str("{{");
            rest = candidate;
            continue;
        };
        let after = &candidate[end + 2..];
        let value = table.get(directive.name).ok_or_else(|| {
            Error::msg(format!(
                "Could not find parameter `{}` for conditional",
                directive.name
            ))
        })?;
        let truthy = value
            .is_truthy()
            .with_context(|| format!("In the conditional of `{}`", directive.name))?;
        if truthy != directive.negated {
            out.push_str(directive.body);
        } else if after.is_empty() || after.starts_with(char::is_whitespace) {
            out.truncate(out.trim_end_matches([' ', '\t']).len());
        }
        rest = after;
    }
    out.push_str(rest);
    Ok(out)
}
