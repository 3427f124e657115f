#![allow(dead_code)]
use std::sync::Arc;
use verbatim_core::{
    ColumnType, Dialect, Error, Executor, Prepared, Result, RowLabeled, RowsAffected, Value,
    stream::{self, Stream},
};

/// Records every statement it receives, answers with canned rows.
#[derive(Debug)]
pub struct RecordingExecutor {
    pub dialect: Dialect,
    pub calls: Vec<Prepared>,
    /// Returned by every fetch.
    pub rows: Vec<RowLabeled>,
    /// Returned by `column_types`.
    pub columns: Vec<ColumnType>,
    /// Indexes (from 0) of the calls that fail.
    pub failing: Vec<usize>,
    /// Values per row, used to report the rows affected by a multi row insert.
    pub width: usize,
}

impl RecordingExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            calls: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            failing: Vec::new(),
            width: 1,
        }
    }

    pub fn with_rows(mut self, rows: Vec<RowLabeled>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_columns(mut self, columns: &[(&str, &str)]) -> Self {
        self.columns = columns
            .iter()
            .map(|(name, ty)| ColumnType::new(*name, *ty))
            .collect();
        self
    }

    pub fn failing(mut self, calls: &[usize]) -> Self {
        self.failing = calls.to_vec();
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn sql(&self) -> Vec<&str> {
        self.calls.iter().map(|v| v.sql.as_str()).collect()
    }

    fn record(&mut self, query: Prepared) -> Result<u64> {
        let index = self.calls.len();
        let rows = match query.args.first() {
            Some(Value::Array(Some(v), ..)) => v.len(),
            _ => query.args.len() / self.width.max(1),
        };
        self.calls.push(query);
        if self.failing.contains(&index) {
            return Err(Error::msg(format!("Call {} failed", index)));
        }
        Ok(rows as u64)
    }
}

impl Executor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn fetch<'s>(
        &'s mut self,
        query: Prepared,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + 's {
        let items = match self.record(query) {
            Ok(..) => self.rows.iter().cloned().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    }

    async fn execute(&mut self, query: Prepared) -> Result<RowsAffected> {
        Ok(RowsAffected {
            rows_affected: self.record(query)?,
            last_affected_id: None,
        })
    }

    async fn column_types(&mut self, table: &str) -> Result<Vec<ColumnType>> {
        if self.columns.is_empty() {
            return Err(Error::msg(format!(
                "Could not find the columns of table `{}`",
                table
            )));
        }
        Ok(self.columns.clone())
    }
}

pub fn row(labels: &[&str], values: Vec<Value>) -> RowLabeled {
    RowLabeled::new(
        labels.iter().map(ToString::to_string).collect::<Arc<[String]>>(),
        values.into(),
    )
}
