use crate::{
    Arguments, ColumnType, Dialect, Error, ErrorContext, Executor, ParamTable, Prepared, Result,
    RowLabeled, Value, prepare_arguments, separated_by, stream::TryStreamExt,
};
use std::{fmt::Write, future::Future, mem};
use tokio::sync::Mutex;

/// Rows buffered per flush on the unnest path, where the parameter limit does not apply.
pub const DEFAULT_ARRAY_LIMIT: usize = 10_000;

/// Maximum rows of a generic `values` batch with `columns` columns, keeping room for one extra
/// row worth of parameters.
pub const fn limit_for(max_parameters: usize, columns: usize) -> usize {
    if columns == 0 {
        return 1;
    }
    let rows = (max_parameters / columns).saturating_sub(1);
    if rows == 0 { 1 } else { rows }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    /// One placeholder per cell.
    Values,
    /// One array per column, cast to the column array type.
    Unnest { casts: Vec<String> },
}

#[derive(Debug)]
enum Buffer {
    /// Row major.
    Rows(Vec<Value>),
    /// Column major.
    Columns(Vec<Vec<Value>>),
}

#[derive(Debug)]
struct State<E> {
    executor: E,
    buffer: Buffer,
    /// Rows in the buffer.
    pending: usize,
    /// Row numbers (from 1) of the first and last buffered rows.
    batch: (usize, usize),
    /// Rows given to `values`, rejected ones included.
    received: usize,
    inserted: u64,
    flushes: usize,
    returned: Vec<RowLabeled>,
    errors: Vec<String>,
}

/// A bulk insert session into one table.
///
/// Rows are buffered and written in batches: a multi row `insert ... values` statement, or on
/// array capable dialects a single `insert ... select * from unnest(...)` with one array
/// parameter per column. Failures never interrupt the session, they are collected and reported
/// by [`BulkInsert::errors`] and [`BulkInsert::finish`].
///
/// All the methods take `&self`, the session can be shared between tasks: the state is locked
/// for the whole duration of a flush.
/// ```rust,ignore
/// let insert = connection
///     .bulk_insert("book", ["title", "year"])
///     .await?
///     .on_conflict("on conflict (title) do nothing");
/// insert.values([Value::from("Dune"), Value::from(1965)]).await;
/// insert.values([Value::from("Neuromancer"), Value::from(1984)]).await;
/// insert.finish().await?;
/// ```
#[derive(Debug)]
pub struct BulkInsert<E: Executor> {
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    on_conflict: Option<String>,
    returning: Vec<String>,
    limit: usize,
    strategy: Strategy,
    state: Mutex<State<E>>,
}

impl<E: Executor> BulkInsert<E> {
    /// Open a session over `executor`, at least one column is required.
    ///
    /// On array capable dialects the column types are read once here, a column missing from the
    /// table is an error.
    pub fn new<'c>(
        executor: E,
        table: &str,
        columns: impl IntoIterator<Item = &'c str>,
    ) -> impl Future<Output = Result<Self>> + Send {
        let table = table.to_string();
        let columns = columns
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        async move {
            let mut executor = executor;
            if columns.is_empty() {
                return Err(Error::msg(format!(
                    "A bulk insert into `{}` needs at least one column",
                    table
                )));
            }
            let dialect = executor.dialect();
            let (strategy, buffer, limit) = if dialect.supports_arrays() {
                let types = executor
                    .column_types(&table)
                    .await
                    .with_context(|| format!("While reading the columns of `{}`", table))?;
                let casts = columns
                    .iter()
                    .map(|column| array_cast(&table, column, &types))
                    .collect::<Result<Vec<_>>>()?;
                (
                    Strategy::Unnest { casts },
                    Buffer::Columns(vec![Vec::new(); columns.len()]),
                    DEFAULT_ARRAY_LIMIT,
                )
            } else {
                (
                    Strategy::Values,
                    Buffer::Rows(Vec::new()),
                    limit_for(dialect.max_parameters(), columns.len()),
                )
            };
            Ok(Self {
                dialect,
                table,
                columns,
                on_conflict: None,
                returning: Vec::new(),
                limit,
                strategy,
                state: Mutex::new(State {
                    executor,
                    buffer,
                    pending: 0,
                    batch: (0, 0),
                    received: 0,
                    inserted: 0,
                    flushes: 0,
                    returned: Vec::new(),
                    errors: Vec::new(),
                }),
            })
        }
    }

    /// Text appended after the values, `on conflict (id) do nothing` for example.
    pub fn on_conflict(mut self, clause: impl Into<String>) -> Self {
        self.on_conflict = Some(clause.into());
        self
    }

    /// Return these columns from every flush, see [`BulkInsert::returned`].
    pub fn returning<'c>(mut self, columns: impl IntoIterator<Item = &'c str>) -> Result<Self> {
        if !self.dialect.supports_returning() {
            return Err(Error::msg(format!(
                "{} does not support returning the inserted rows",
                self.dialect.name()
            )));
        }
        self.returning = columns.into_iter().map(ToString::to_string).collect();
        Ok(self)
    }

    /// Row limit of a batch, at least one. A batch is flushed before it would reach the limit, so
    /// it holds `limit - 1` rows (one when the limit is one). On the generic path the limit cannot
    /// go over what the parameter limit of the dialect allows.
    pub fn limit(mut self, rows: usize) -> Self {
        self.limit = match self.strategy {
            Strategy::Values => rows.clamp(
                1,
                limit_for(self.dialect.max_parameters(), self.columns.len()),
            ),
            Strategy::Unnest { .. } => rows.max(1),
        };
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Current row limit.
    pub fn row_limit(&self) -> usize {
        self.limit
    }

    /// Buffer one row, flushing first if appending it would reach the row limit.
    ///
    /// A row whose length differs from the number of columns is not inserted, it is recorded as
    /// an error. So is a row holding a list or an array on the unnest path. On the values path
    /// lists are bound as one array parameter, not expanded.
    pub async fn values(&self, row: impl IntoIterator<Item = Value>) {
        let row = row.into_iter().collect::<Vec<_>>();
        let mut state = self.state.lock().await;
        state.received += 1;
        let number = state.received;
        if row.len() != self.columns.len() {
            log::warn!(
                "Bulk insert into `{}` rejected row {}: it has {} values but {} columns were declared",
                self.table,
                number,
                row.len(),
                self.columns.len()
            );
            state.errors.push(format!(
                "Row {} has {} values but {} columns were declared",
                number,
                row.len(),
                self.columns.len()
            ));
            return;
        }
        if let Strategy::Unnest { .. } = self.strategy
            && let Some(i) = row
                .iter()
                .position(|v| matches!(v, Value::List(..) | Value::Array(..)))
        {
            log::warn!(
                "Bulk insert into `{}` rejected row {}: column `{}` holds a list",
                self.table,
                number,
                self.columns[i]
            );
            state.errors.push(format!(
                "Row {} has a list in column `{}`, unnest cannot insert arrays",
                number, self.columns[i]
            ));
            return;
        }
        if state.pending > 0 && state.pending + 1 >= self.limit {
            self.flush_locked(&mut state).await;
        }
        match &mut state.buffer {
            Buffer::Rows(values) => values.extend(row.into_iter().map(list_as_array)),
            Buffer::Columns(columns) => {
                for (column, value) in columns.iter_mut().zip(row) {
                    column.push(value);
                }
            }
        }
        if state.pending == 0 {
            state.batch.0 = number;
        }
        state.batch.1 = number;
        state.pending += 1;
    }

    /// Write the buffered rows now.
    pub async fn flush(&self) {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await;
    }

    /// Rows returned by the flushes since the last call.
    pub async fn returned(&self) -> Vec<RowLabeled> {
        mem::take(&mut self.state.lock().await.returned)
    }

    /// The errors collected so far as one error, pending rows are not flushed.
    pub async fn errors(&self) -> Result<()> {
        combine_errors(&self.state.lock().await.errors)
    }

    /// Flush the pending rows and report every error of the session.
    pub async fn finish(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await;
        combine_errors(&state.errors)
    }

    /// Number of statements executed, failed ones included.
    pub async fn flushes(&self) -> usize {
        self.state.lock().await.flushes
    }

    /// Rows the database reported as inserted.
    pub async fn rows_inserted(&self) -> u64 {
        self.state.lock().await.inserted
    }

    /// Give back the executor, pending rows are discarded.
    pub fn into_executor(self) -> E {
        self.state.into_inner().executor
    }

    async fn flush_locked(&self, state: &mut State<E>) {
        if state.pending == 0 {
            return;
        }
        let rows = mem::take(&mut state.pending);
        let (first, last) = state.batch;
        let buffer = match &mut state.buffer {
            Buffer::Rows(values) => Buffer::Rows(mem::take(values)),
            Buffer::Columns(columns) => Buffer::Columns(
                columns
                    .iter_mut()
                    .map(|v| mem::replace(v, Vec::with_capacity(rows)))
                    .collect(),
            ),
        };
        state.flushes += 1;
        log::debug!(
            "Bulk insert into `{}` flushing rows {} to {} ({} rows)",
            self.table,
            first,
            last,
            rows
        );
        let result = match self.prepare(buffer) {
            Ok(prepared) => self.run(&mut state.executor, prepared).await,
            Err(e) => Err(e),
        };
        match result {
            Ok((inserted, returned)) => {
                state.inserted += inserted;
                state.returned.extend(returned);
            }
            Err(e) => {
                let e = e.context(format!(
                    "While inserting rows {} to {} into `{}`",
                    first, last, self.table
                ));
                log::error!("{:#}", e);
                state
                    .errors
                    .push(format!("Rows {} to {}: {:#}", first, last, e.root_cause()));
            }
        }
    }

    fn prepare(&self, buffer: Buffer) -> Result<Prepared> {
        let mut sql = String::with_capacity(128);
        sql.push_str("insert into ");
        self.dialect.write_table_quoted(&mut sql, &self.table);
        sql.push_str(" (");
        separated_by(&mut sql, &self.columns, |out, v| out.push_str(v), ",");
        sql.push(')');
        let arguments = match (&self.strategy, buffer) {
            (Strategy::Values, Buffer::Rows(values)) => {
                sql.push_str(" values ");
                let row = format!(
                    "({})",
                    self.columns.iter().map(|_| "?").collect::<Vec<_>>().join(",")
                );
                separated_by(
                    &mut sql,
                    0..values.len() / self.columns.len(),
                    |out, _| out.push_str(&row),
                    ",",
                );
                Arguments::Positional(values)
            }
            (Strategy::Unnest { casts }, Buffer::Columns(columns)) => {
                sql.push_str(" select * from unnest(");
                let mut table = ParamTable::new();
                for (i, (cast, values)) in casts.iter().zip(columns).enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    let name = format!("p{}", i + 1);
                    let _ = write!(sql, ":{}::{}", name, cast);
                    table.insert(name, encode_array(values));
                }
                sql.push(')');
                Arguments::Named(table)
            }
            _ => return Err(Error::msg("The bulk insert buffer does not match its strategy")),
        };
        if let Some(clause) = &self.on_conflict {
            sql.push(' ');
            sql.push_str(clause);
        }
        if !self.returning.is_empty() {
            sql.push_str(" returning ");
            separated_by(&mut sql, &self.returning, |out, v| out.push_str(v), ",");
        }
        prepare_arguments(self.dialect, &sql, arguments)
    }

    async fn run(&self, executor: &mut E, prepared: Prepared) -> Result<(u64, Vec<RowLabeled>)> {
        if self.returning.is_empty() {
            let affected = executor.execute(prepared).await?;
            Ok((affected.rows_affected, Vec::new()))
        } else {
            let rows = executor.fetch(prepared).try_collect::<Vec<_>>().await?;
            Ok((rows.len() as u64, rows))
        }
    }
}

/// One column worth of values as a native array, the element type taken from the first non
/// NULL value.
pub fn encode_array(values: Vec<Value>) -> Value {
    let element = values
        .iter()
        .find(|v| !v.is_null())
        .or(values.first())
        .map_or(Value::Null, Value::as_null);
    Value::Array(Some(values.into()), Box::new(element))
}

/// A list cell is one value of the row, bound as a single array parameter.
fn list_as_array(value: Value) -> Value {
    match value {
        Value::List(v, ty) => Value::Array(v.map(Into::into), ty),
        v => v,
    }
}

fn array_cast(table: &str, column: &str, types: &[ColumnType]) -> Result<String> {
    let ty = types
        .iter()
        .find(|v| v.name == column)
        .or_else(|| types.iter().find(|v| v.name.eq_ignore_ascii_case(column)))
        .ok_or_else(|| Error::msg(format!("Table `{}` has no column `{}`", table, column)))?;
    // `format_type` spells arrays `integer[]`, `information_schema` spells them `_int4`
    if ty.type_name.ends_with("[]") || ty.type_name.starts_with('_') {
        return Err(Error::msg(format!(
            "Column `{}` of `{}` has the array type `{}`, unnest cannot insert arrays",
            column, table, ty.type_name
        )));
    }
    Ok(format!("{}[]", ty.type_name))
}

fn combine_errors(errors: &[String]) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(Error::msg(format!("1 error:\n{}", errors[0]))),
        n => Err(Error::msg(format!("{} errors:\n{}", n, errors.join("\n")))),
    }
}
