use crate::{Prepared, RowLabeled, RowsAffected, Value};
use std::{
    fmt::{self, Debug},
    io::{self, Write},
    sync::{Arc, Mutex},
};

bitflags::bitflags! {
    /// What a [`Dump`] writes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DumpFlags: u8 {
        /// The query text and its arguments.
        const QUERY = 1;
        /// The query plan.
        const EXPLAIN = 1 << 1;
        /// The returned rows, or the number of rows affected.
        const RESULT = 1 << 2;
        const ALL = Self::QUERY.bits() | Self::EXPLAIN.bits() | Self::RESULT.bits();
    }
}

pub type DumpWriter = Arc<Mutex<dyn Write + Send>>;

/// Parameter sentinel requesting diagnostic output for a call.
///
/// It is passed among the real parameters, removed before binding and never sent to the driver.
/// Output goes to standard error unless a writer is given with [`Dump::to`].
/// ```rust,ignore
/// executor.query("select * from users where id = ?", params![5, Dump::new(DumpFlags::ALL)]).await?;
/// ```
#[derive(Clone)]
pub struct Dump {
    pub flags: DumpFlags,
    writer: Option<DumpWriter>,
}

impl Dump {
    pub fn new(flags: DumpFlags) -> Self {
        Self {
            flags,
            writer: None,
        }
    }

    pub fn to(mut self, writer: DumpWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn query(&self, prepared: &Prepared) {
        if self.flags.contains(DumpFlags::QUERY) {
            self.write(|out| {
                writeln!(out, "{}", prepared.sql)?;
                for (i, arg) in prepared.args.iter().enumerate() {
                    writeln!(out, "  {}: {}", i + 1, DisplayValue(arg))?;
                }
                Ok(())
            });
        }
    }

    pub fn rows(&self, flag: DumpFlags, rows: &[RowLabeled]) {
        if self.flags.contains(flag) {
            self.write(|out| {
                if let Some(first) = rows.first() {
                    writeln!(out, "{}", first.labels.join("\t"))?;
                }
                for row in rows {
                    let values = row
                        .values
                        .iter()
                        .map(|v| DisplayValue(v).to_string())
                        .collect::<Vec<_>>();
                    writeln!(out, "{}", values.join("\t"))?;
                }
                Ok(())
            });
        }
    }

    pub fn affected(&self, affected: &RowsAffected) {
        if self.flags.contains(DumpFlags::RESULT) {
            self.write(|out| writeln!(out, "{} rows affected", affected.rows_affected));
        }
    }

    fn write(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        let result = match &self.writer {
            Some(writer) => match writer.lock() {
                Ok(mut guard) => f(&mut *guard),
                Err(e) => Err(io::Error::other(e.to_string())),
            },
            None => f(&mut io::stderr().lock()),
        };
        if let Err(e) = result {
            log::error!("Could not write the dump: {:#}", e);
        }
    }
}

impl Debug for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dump").field("flags", &self.flags).finish()
    }
}

struct DisplayValue<'a>(&'a Value);

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            v if v.is_null() => f.write_str("NULL"),
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int8(Some(v)) => write!(f, "{}", v),
            Value::Int16(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::UInt8(Some(v)) => write!(f, "{}", v),
            Value::UInt16(Some(v)) => write!(f, "{}", v),
            Value::UInt32(Some(v)) => write!(f, "{}", v),
            Value::UInt64(Some(v)) => write!(f, "{}", v),
            Value::Float32(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v),
            Value::Blob(Some(v)) => write!(f, "x'{}'", hex::encode(v)),
            Value::Date(Some(v)) => write!(f, "{}", v),
            Value::Time(Some(v)) => write!(f, "{}", v),
            Value::Timestamp(Some(v)) => write!(f, "{}", v),
            Value::TimestampWithTimezone(Some(v)) => write!(f, "{}", v),
            Value::Uuid(Some(v)) => write!(f, "{}", v),
            Value::List(Some(v), ..) => write_list(f, v.iter()),
            Value::Array(Some(v), ..) => write_list(f, v.iter()),
            v => write!(f, "{:?}", v),
        }
    }
}

fn write_list<'a>(f: &mut fmt::Formatter<'_>, values: impl Iterator<Item = &'a Value>) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in values.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", DisplayValue(v))?;
    }
    f.write_str("]")
}
