use crate::{
    BulkInsert, ColumnType, Dialect, Dump, DumpFlags, Error, ErrorContext, Param, ParamTable,
    Prepared, Result, RowLabeled, RowsAffected, Value, normalize, prepare_arguments,
    stream::{Stream, StreamExt, TryStreamExt},
    truncate_long,
};
use std::future::Future;

/// A connection able to run prepared statements: the dialect it speaks plus the two execution
/// primitives. Everything else is built on top of them.
pub trait Executor: Send {
    /// Dialect of the connection, fixed when it was opened.
    fn dialect(&self) -> Dialect;

    /// Run the statement and stream the returned rows.
    fn fetch<'s>(
        &'s mut self,
        query: Prepared,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + 's;

    /// Run the statement and return the number of rows affected.
    fn execute(&mut self, query: Prepared) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Columns of `table` (optionally `schema.table`) with their declared type names.
    ///
    /// The default implementation reads `information_schema.columns`.
    fn column_types(
        &mut self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<ColumnType>>> + Send {
        let (schema, name) = match table.split_once('.') {
            Some((schema, name)) => (schema, name),
            None => ("", table),
        };
        let params = ParamTable::from([
            ("schema".to_string(), Value::from(schema)),
            ("table".to_string(), Value::from(name)),
        ]);
        async move {
            let rows = self
                .query(
                    "select column_name, udt_name from information_schema.columns \
                    where table_name = :table \
                    {{:schema and table_schema = :schema}} \
                    {{:schema! and table_schema = current_schema()}} \
                    order by ordinal_position",
                    vec![Param::KeyedBag(params)],
                )
                .await?;
            if rows.is_empty() {
                return Err(Error::msg(format!(
                    "Could not find the columns of table `{}`",
                    table
                )));
            }
            rows.iter()
                .map(|row| {
                    Ok::<_, Error>(ColumnType::new(
                        row.get::<String>("column_name")?,
                        row.get::<String>("udt_name")?,
                    ))
                })
                .collect()
        }
    }

    /// Prepare and run a statement, returning the number of rows affected.
    fn exec(
        &mut self,
        query: &str,
        params: Vec<Param>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        async move {
            let (prepared, dumps) = prepare_call(self.dialect(), query, params)?;
            dump_explain(self, &prepared, &dumps).await?;
            let result = self.execute(prepared).await?;
            for dump in &dumps {
                dump.affected(&result);
            }
            Ok(result)
        }
    }

    /// Prepare and run a query, returning all rows.
    fn query(
        &mut self,
        query: &str,
        params: Vec<Param>,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        async move {
            let (prepared, dumps) = prepare_call(self.dialect(), query, params)?;
            dump_explain(self, &prepared, &dumps).await?;
            let rows = self.fetch(prepared).try_collect::<Vec<_>>().await?;
            for dump in &dumps {
                dump.rows(DumpFlags::RESULT, &rows);
            }
            Ok(rows)
        }
    }

    /// Prepare and run a query, returning the first row.
    fn get(
        &mut self,
        query: &str,
        params: Vec<Param>,
    ) -> impl Future<Output = Result<Option<RowLabeled>>> + Send {
        async move {
            let (prepared, dumps) = prepare_call(self.dialect(), query, params)?;
            dump_explain(self, &prepared, &dumps).await?;
            let row = {
                let mut stream = Box::pin(self.fetch(prepared));
                stream.next().await.transpose()?
            };
            for dump in &dumps {
                dump.rows(DumpFlags::RESULT, row.as_slice());
            }
            Ok(row)
        }
    }

    /// Start a bulk insert session into `table` over this executor.
    fn bulk_insert<'c>(
        self,
        table: &str,
        columns: impl IntoIterator<Item = &'c str>,
    ) -> impl Future<Output = Result<BulkInsert<Self>>> + Send
    where
        Self: Sized,
    {
        BulkInsert::new(self, table, columns)
    }
}

impl<E: Executor> Executor for &mut E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }
    fn fetch<'s>(
        &'s mut self,
        query: Prepared,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + 's {
        (**self).fetch(query)
    }
    fn execute(&mut self, query: Prepared) -> impl Future<Output = Result<RowsAffected>> + Send {
        (**self).execute(query)
    }
    fn column_types(
        &mut self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<ColumnType>>> + Send {
        (**self).column_types(table)
    }
}

fn prepare_call(
    dialect: Dialect,
    query: &str,
    params: Vec<Param>,
) -> Result<(Prepared, Vec<Dump>)> {
    let normalized = normalize(params).with_context(|| {
        format!(
            "While normalizing the parameters of the query:\n{}",
            truncate_long!(query)
        )
    })?;
    let prepared = prepare_arguments(dialect, query, normalized.arguments)?;
    for dump in &normalized.dumps {
        dump.query(&prepared);
    }
    Ok((prepared, normalized.dumps))
}

async fn dump_explain<E: Executor + ?Sized>(
    executor: &mut E,
    prepared: &Prepared,
    dumps: &[Dump],
) -> Result<()> {
    if !dumps.iter().any(|v| v.flags.contains(DumpFlags::EXPLAIN)) {
        return Ok(());
    }
    let explain = Prepared::new(
        format!("{}{}", executor.dialect().explain_prefix(), prepared.sql),
        prepared.args.clone(),
    );
    let rows = executor
        .fetch(explain)
        .try_collect::<Vec<_>>()
        .await
        .context("While explaining the query")?;
    for dump in dumps {
        dump.rows(DumpFlags::EXPLAIN, &rows);
    }
    Ok(())
}
