use crate::{
    Arguments, Dialect, ErrorContext, Param, Result, Statement, Value, bind_named, bind_positional,
    expand_lists, normalize, rebind, resolve_conditionals, truncate_long,
};
use std::fmt::{self, Display};

/// A statement ready for the driver: dialect specific text and its positional arguments.
///
/// Built fresh for every call, it is never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Prepared {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

impl Display for Prepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

/// Run the whole preparation pipeline over `query`.
///
/// Dump sentinels among `params` are dropped, use [`normalize`] and [`prepare_arguments`] to keep
/// them.
/// ```rust
/// use std::collections::HashMap;
/// use verbatim_core::{Dialect, Value, params, prepare};
/// let prepared = prepare(
///     Dialect::PostgreSQL,
///     "select * from t where {{:only_active active and}} id in (:ids)",
///     params![HashMap::from([
///         ("only_active", Value::from(true)),
///         ("ids", Value::from(vec![1, 2])),
///     ])],
/// )
/// .unwrap();
/// assert_eq!(prepared.sql, "select * from t where active and id in ($1, $2)");
/// ```
pub fn prepare(
    dialect: Dialect,
    query: &str,
    params: impl IntoIterator<Item = Param>,
) -> Result<Prepared> {
    let normalized = normalize(params).with_context(|| {
        format!(
            "While normalizing the parameters of the query:\n{}",
            truncate_long!(query)
        )
    })?;
    prepare_arguments(dialect, query, normalized.arguments)
}

/// The pipeline after normalization: conditionals and named binding (named mode only), list
/// expansion and rebinding.
pub fn prepare_arguments(dialect: Dialect, query: &str, arguments: Arguments) -> Result<Prepared> {
    let context = |stage: &str| format!("While {} of the query:\n{}", stage, truncate_long!(query));
    match arguments {
        Arguments::Named(table) => {
            let resolved = resolve_conditionals(query, &table)
                .with_context(|| context("resolving the conditionals"))?;
            let statement = bind_named(&resolved, &table)
                .with_context(|| context("binding the named parameters"))?;
            expand_and_rebind(dialect, statement, context)
        }
        Arguments::Positional(args) => {
            let statement =
                bind_positional(query, args).with_context(|| context("binding the parameters"))?;
            expand_and_rebind(dialect, statement, context)
        }
    }
}

fn expand_and_rebind(
    dialect: Dialect,
    statement: Statement<'_>,
    context: impl Fn(&str) -> String,
) -> Result<Prepared> {
    let statement =
        expand_lists(statement).with_context(|| context("expanding the list parameters"))?;
    let prepared =
        rebind(dialect, statement).with_context(|| context("rebinding the parameters"))?;
    log::debug!("Prepared for {}: {}", dialect.name(), prepared);
    Ok(prepared)
}
