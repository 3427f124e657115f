use crate::{Error, ParamTable, PlaceholderSyntax, Result, Token, Value, tokenize};

/// A piece of a statement between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part<'q> {
    Sql(&'q str),
    /// Generic placeholder, turned into the dialect marker by the rebinder.
    Placeholder,
}

/// Statement with generic placeholders, the i-th placeholder binds the i-th argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement<'q> {
    pub parts: Vec<Part<'q>>,
    pub args: Vec<Value>,
}

impl<'q> Statement<'q> {
    pub fn placeholders(&self) -> usize {
        self.parts
            .iter()
            .filter(|v| matches!(v, Part::Placeholder))
            .count()
    }

    /// The text with `?` for every placeholder.
    pub fn to_generic_sql(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Sql(v) => out.push_str(v),
                Part::Placeholder => out.push('?'),
            }
        }
        out
    }
}

/// Bind `?` markers to the positional arguments, their numbers must match.
pub fn bind_positional(query: &str, args: Vec<Value>) -> Result<Statement<'_>> {
    let parts = tokenize(query, PlaceholderSyntax::Positional)
        .into_iter()
        .map(|v| match v {
            Token::Sql(v) | Token::Named(v) => Part::Sql(v),
            Token::Positional => Part::Placeholder,
        })
        .collect::<Vec<_>>();
    let result = Statement { parts, args };
    let placeholders = result.placeholders();
    if placeholders != result.args.len() {
        return Err(Error::msg(format!(
            "The query has {} placeholders but {} arguments were given",
            placeholders,
            result.args.len()
        )));
    }
    Ok(result)
}

/// Replace every `:name` with a generic placeholder bound to the value of `name`.
///
/// A name can appear multiple times, every occurrence gets its own placeholder and its own copy
/// of the value.
pub fn bind_named<'q>(query: &'q str, table: &ParamTable) -> Result<Statement<'q>> {
    let mut result = Statement::default();
    for token in tokenize(query, PlaceholderSyntax::Named) {
        match token {
            Token::Sql(v) => result.parts.push(Part::Sql(v)),
            Token::Named(name) => {
                let value = table.get(name).ok_or_else(|| {
                    Error::msg(format!("Could not find named parameter `{}`", name))
                })?;
                result.parts.push(Part::Placeholder);
                result.args.push(value.clone());
            }
            Token::Positional => result.parts.push(Part::Sql("?")),
        }
    }
    Ok(result)
}

/// Expand list arguments into one placeholder per element.
///
/// An empty list leaves no placeholder at all, a NULL list stays a single NULL argument. Blobs and
/// native arrays are scalars.
pub fn expand_lists(statement: Statement<'_>) -> Result<Statement<'_>> {
    if !statement
        .args
        .iter()
        .any(|v| matches!(v, Value::List(Some(..), ..)))
    {
        return Ok(statement);
    }
    let mut result = Statement {
        parts: Vec::with_capacity(statement.parts.len()),
        args: Vec::with_capacity(statement.args.len()),
    };
    let mut args = statement.args.into_iter();
    for part in statement.parts {
        let Part::Placeholder = part else {
            result.parts.push(part);
            continue;
        };
        let arg = args
            .next()
            .ok_or_else(|| Error::msg("There are more placeholders than arguments"))?;
        match arg {
            Value::List(Some(items), ..) => {
                for (i, item) in items.into_iter().enumerate() {
                    if i > 0 {
                        result.parts.push(Part::Sql(", "));
                    }
                    result.parts.push(Part::Placeholder);
                    result.args.push(item);
                }
            }
            arg => {
                result.parts.push(Part::Placeholder);
                result.args.push(arg);
            }
        }
    }
    if args.next().is_some() {
        return Err(Error::msg("There are more arguments than placeholders"));
    }
    Ok(result)
}
