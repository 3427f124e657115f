use crate::{Error, Result, Value};
use std::{collections::HashMap, fmt::Write};
use time::{format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
const TIMESTAMPTZ_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
);

/// How a dialect spells a bind parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// The same `?` marker repeated.
    Question,
    /// Ordinal markers `$1`, `$2`, ...
    Dollar,
}

/// The SQL engine conventions a connection speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    SQLite,
    PostgreSQL,
    MariaDB,
    MySQL,
    DuckDB,
}

impl Dialect {
    pub const fn name(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgres",
            Dialect::MariaDB => "mariadb",
            Dialect::MySQL => "mysql",
            Dialect::DuckDB => "duckdb",
        }
    }

    pub const fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Dialect::PostgreSQL | Dialect::DuckDB => PlaceholderStyle::Dollar,
            Dialect::SQLite | Dialect::MariaDB | Dialect::MySQL => PlaceholderStyle::Question,
        }
    }

    /// Maximum number of bind parameters a single statement can carry.
    pub const fn max_parameters(&self) -> usize {
        match self {
            Dialect::SQLite => 32766,
            Dialect::PostgreSQL | Dialect::MariaDB | Dialect::MySQL | Dialect::DuckDB => 65535,
        }
    }

    /// A native array can be bound as one parameter and unnested server side.
    pub const fn supports_arrays(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    pub const fn supports_returning(&self) -> bool {
        !matches!(self, Dialect::MySQL)
    }

    pub const fn explain_prefix(&self) -> &'static str {
        match self {
            Dialect::SQLite => "EXPLAIN QUERY PLAN ",
            _ => "EXPLAIN ",
        }
    }

    /// Write the `index`-th (from 1) placeholder.
    pub fn write_placeholder(&self, out: &mut String, index: usize) {
        match self.placeholder_style() {
            PlaceholderStyle::Question => out.push('?'),
            PlaceholderStyle::Dollar => {
                let _ = write!(out, "${}", index);
            }
        }
    }

    /// Quote identifiers doubling the inner quote character.
    pub fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        let quote = match self {
            Dialect::MariaDB | Dialect::MySQL => '`',
            _ => '"',
        };
        out.push(quote);
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == quote {
                out.push_str(&value[position..i]);
                out.push(quote);
                out.push(quote);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
        out.push(quote);
    }

    /// Quote a possibly schema qualified table name (`schema.table`).
    pub fn write_table_quoted(&self, out: &mut String, table: &str) {
        match table.split_once('.') {
            Some((schema, name)) => {
                self.write_identifier_quoted(out, schema);
                out.push('.');
                self.write_identifier_quoted(out, name);
            }
            None => self.write_identifier_quoted(out, table),
        }
    }

    /// Adapt a bind value to what the dialect understands.
    ///
    /// Booleans become 0/1 integers on SQLite, native arrays become JSON text where arrays are
    /// not supported.
    pub fn encode_value(&self, value: Value) -> Result<Value> {
        Ok(match value {
            Value::Boolean(v) if *self == Dialect::SQLite => Value::Int64(v.map(i64::from)),
            Value::Array(v, ..) if !self.supports_arrays() => match v {
                Some(v) => Value::Varchar(Some(encode_json_array(&v)?)),
                None => Value::Varchar(None),
            },
            v => v,
        })
    }
}

/// Encode an array as JSON text, the representation used for arrays on dialects without native
/// array parameters.
pub fn encode_json_array(values: &[Value]) -> Result<String> {
    let values = values
        .iter()
        .map(value_to_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::Value::Array(values).to_string())
}

fn value_to_json(value: &Value) -> Result<serde_json::Value> {
    use serde_json::Value as Json;
    if value.is_null() {
        return Ok(Json::Null);
    }
    let float = |v: f64| {
        serde_json::Number::from_f64(v)
            .map(Json::Number)
            .ok_or_else(|| Error::msg(format!("Cannot encode {} as a JSON number", v)))
    };
    Ok(match value {
        Value::Boolean(Some(v)) => Json::Bool(*v),
        Value::Int8(Some(v)) => Json::from(*v),
        Value::Int16(Some(v)) => Json::from(*v),
        Value::Int32(Some(v)) => Json::from(*v),
        Value::Int64(Some(v)) => Json::from(*v),
        Value::UInt8(Some(v)) => Json::from(*v),
        Value::UInt16(Some(v)) => Json::from(*v),
        Value::UInt32(Some(v)) => Json::from(*v),
        Value::UInt64(Some(v)) => Json::from(*v),
        Value::Float32(Some(v)) => float(*v as f64)?,
        Value::Float64(Some(v)) => float(*v)?,
        Value::Decimal(Some(v)) => Json::String(v.to_string()),
        Value::Varchar(Some(v)) => Json::String(v.clone()),
        Value::Blob(Some(v)) => Json::String(hex::encode(v)),
        Value::Date(Some(v)) => Json::String(v.format(DATE_FORMAT)?),
        Value::Time(Some(v)) => Json::String(v.format(TIME_FORMAT)?),
        Value::Timestamp(Some(v)) => Json::String(v.format(TIMESTAMP_FORMAT)?),
        Value::TimestampWithTimezone(Some(v)) => Json::String(v.format(TIMESTAMPTZ_FORMAT)?),
        Value::Uuid(Some(v)) => Json::String(v.to_string()),
        Value::List(Some(v), ..) => Json::Array(v.iter().map(value_to_json).collect::<Result<_>>()?),
        Value::Array(Some(v), ..) => {
            Json::Array(v.iter().map(value_to_json).collect::<Result<_>>()?)
        }
        _ => Json::Null,
    })
}

/// Maps driver names to dialects.
///
/// Built once at start-up and handed to whatever opens connections. The preparation pipeline
/// only ever sees the resolved [`Dialect`].
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    dialects: HashMap<String, Dialect>,
}

impl DialectRegistry {
    pub fn empty() -> Self {
        Self {
            dialects: HashMap::new(),
        }
    }

    pub fn register(&mut self, driver: impl Into<String>, dialect: Dialect) -> &mut Self {
        let driver = driver.into().to_ascii_lowercase();
        if let Some(previous) = self.dialects.insert(driver.clone(), dialect) {
            if previous != dialect {
                log::warn!(
                    "Driver `{}` was registered as {:?}, now it is {:?}",
                    driver,
                    previous,
                    dialect
                );
            }
        }
        self
    }

    pub fn resolve(&self, driver: &str) -> Result<Dialect> {
        self.dialects
            .get(&driver.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| {
                let mut known = self.dialects.keys().map(String::as_str).collect::<Vec<_>>();
                known.sort_unstable();
                Error::msg(format!(
                    "Unknown driver `{}`, known drivers are: {}",
                    driver,
                    known.join(", ")
                ))
            })
    }

    /// Resolve the dialect from the scheme of a connection URL (`postgres://...`).
    pub fn from_url(&self, url: &str) -> Result<Dialect> {
        let Some((scheme, _)) = url.split_once("://").or_else(|| url.split_once(':')) else {
            return Err(Error::msg(format!(
                "Cannot find the driver name in the connection URL `{}`",
                url
            )));
        };
        self.resolve(scheme)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        let mut result = Self::empty();
        result
            .register("sqlite", Dialect::SQLite)
            .register("sqlite3", Dialect::SQLite)
            .register("postgres", Dialect::PostgreSQL)
            .register("postgresql", Dialect::PostgreSQL)
            .register("pgx", Dialect::PostgreSQL)
            .register("mariadb", Dialect::MariaDB)
            .register("mysql", Dialect::MySQL)
            .register("duckdb", Dialect::DuckDB);
        result
    }
}
