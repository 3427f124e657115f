use crate::{Dialect, Part, Prepared, Result, Statement};

/// Turn the generic placeholders into the dialect markers, numbering from 1, and encode the
/// arguments for the dialect.
///
/// Only placeholders produced by the earlier stages are rewritten, the literal SQL parts are
/// copied as they are.
pub fn rebind(dialect: Dialect, statement: Statement<'_>) -> Result<Prepared> {
    let len = statement
        .parts
        .iter()
        .map(|v| match v {
            Part::Sql(v) => v.len(),
            Part::Placeholder => 6,
        })
        .sum();
    let mut sql = String::with_capacity(len);
    let mut index = 0;
    for part in statement.parts {
        match part {
            Part::Sql(v) => sql.push_str(v),
            Part::Placeholder => {
                index += 1;
                dialect.write_placeholder(&mut sql, index);
            }
        }
    }
    let args = statement
        .args
        .into_iter()
        .map(|v| dialect.encode_value(v))
        .collect::<Result<Vec<_>>>()?;
    Ok(Prepared { sql, args })
}
