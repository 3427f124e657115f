use crate::{AsValue, Dump, Error, Result, Value};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt::{self, Debug},
    hash::BuildHasher,
};

/// Merged name to value table of a named mode call.
pub type ParamTable = BTreeMap<String, Value>;

/// A value that renders itself as one scalar.
///
/// Types implementing it are always positional, whatever their internal structure, which is what
/// date wrappers or encoded documents need.
pub trait ToValue: Send + Sync {
    fn to_value(&self) -> Result<Value>;
}

/// A struct whose fields are named parameters, usually implemented with `#[derive(Params)]`.
pub trait Params {
    fn labeled(&self) -> Vec<(Cow<'static, str>, Value)>;
}

/// One parameter source given to a call.
pub enum Param {
    Scalar(Value),
    SelfSerializing(Box<dyn ToValue>),
    /// List items and element type.
    List(Vec<Value>, Box<Value>),
    KeyedBag(ParamTable),
    LabeledRecord(Vec<(Cow<'static, str>, Value)>),
    /// Diagnostic sentinel, never bound.
    Dump(Dump),
}

impl Param {
    pub fn serialize(value: impl ToValue + 'static) -> Self {
        Param::SelfSerializing(Box::new(value))
    }

    pub fn record(value: &impl Params) -> Self {
        Param::LabeledRecord(value.labeled())
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Param::KeyedBag(..) | Param::LabeledRecord(..))
    }
}

impl Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Param::SelfSerializing(..) => f.write_str("SelfSerializing(..)"),
            Param::List(v, ..) => f.debug_tuple("List").field(v).finish(),
            Param::KeyedBag(v) => f.debug_tuple("KeyedBag").field(v).finish(),
            Param::LabeledRecord(v) => f.debug_tuple("LabeledRecord").field(v).finish(),
            Param::Dump(v) => f.debug_tuple("Dump").field(v).finish(),
        }
    }
}

/// Conversion into a [`Param`], the shapes a call accepts.
pub trait IntoParam {
    fn into_param(self) -> Param;
}

impl IntoParam for Param {
    fn into_param(self) -> Param {
        self
    }
}

impl IntoParam for Dump {
    fn into_param(self) -> Param {
        Param::Dump(self)
    }
}

impl IntoParam for Value {
    fn into_param(self) -> Param {
        match self {
            Value::List(Some(v), ty) => Param::List(v, ty),
            v => Param::Scalar(v),
        }
    }
}

impl<T: AsValue> IntoParam for T {
    fn into_param(self) -> Param {
        self.as_value().into_param()
    }
}

impl<K: Into<String>, V: Into<Value>, S: BuildHasher> IntoParam for HashMap<K, V, S> {
    fn into_param(self) -> Param {
        Param::KeyedBag(
            self.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> IntoParam for BTreeMap<K, V> {
    fn into_param(self) -> Param {
        Param::KeyedBag(
            self.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build a `Vec<Param>` out of heterogeneous arguments.
///
/// ```rust
/// use verbatim_core::{Param, params};
/// use std::collections::HashMap;
/// let positional = params![1, "two", vec![3, 4]];
/// assert_eq!(positional.len(), 3);
/// let named = params![HashMap::from([("id", 1)])];
/// assert!(matches!(named[0], Param::KeyedBag(..)));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($param:expr),+ $(,)?) => {
        ::std::vec![$($crate::IntoParam::into_param($param)),+]
    };
}

/// The arguments of a call after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<Value>),
    Named(ParamTable),
}

impl Arguments {
    pub fn is_named(&self) -> bool {
        matches!(self, Arguments::Named(..))
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments::Positional(Vec::new())
    }
}

/// Output of [`normalize`]: the arguments and the diagnostic sentinels found among them.
#[derive(Debug, Default)]
pub struct Normalized {
    pub arguments: Arguments,
    pub dumps: Vec<Dump>,
}

/// Classify every source and merge them into either one positional list or one named table.
///
/// Dump sentinels are set aside first. Keyed bags and labeled records fold into the same table,
/// a name given twice is an error, and so is mixing them with positional values.
pub fn normalize(params: impl IntoIterator<Item = Param>) -> Result<Normalized> {
    let mut positional = Vec::new();
    let mut named: Option<ParamTable> = None;
    let mut dumps = Vec::new();
    for param in params {
        match param {
            Param::Dump(dump) => dumps.push(dump),
            Param::Scalar(value) => {
                ensure_positional(&named)?;
                positional.push(value);
            }
            Param::SelfSerializing(value) => {
                ensure_positional(&named)?;
                positional.push(value.to_value()?);
            }
            Param::List(values, ty) => {
                ensure_positional(&named)?;
                positional.push(Value::List(Some(values), ty));
            }
            Param::KeyedBag(table) => {
                ensure_named(&positional)?;
                let merged = named.get_or_insert_with(ParamTable::new);
                for (name, value) in table {
                    merge(merged, name, value)?;
                }
            }
            Param::LabeledRecord(fields) => {
                ensure_named(&positional)?;
                let merged = named.get_or_insert_with(ParamTable::new);
                for (name, value) in fields {
                    merge(merged, name.into_owned(), value)?;
                }
            }
        }
    }
    Ok(Normalized {
        arguments: match named {
            Some(table) => Arguments::Named(table),
            None => Arguments::Positional(positional),
        },
        dumps,
    })
}

fn merge(table: &mut ParamTable, name: String, value: Value) -> Result<()> {
    if table.contains_key(&name) {
        return Err(Error::msg(format!(
            "Parameter given more than once: `{}`",
            name
        )));
    }
    table.insert(name, value);
    Ok(())
}

fn ensure_positional(named: &Option<ParamTable>) -> Result<()> {
    if named.is_some() {
        return Err(mixed_error());
    }
    Ok(())
}

fn ensure_named(positional: &[Value]) -> Result<()> {
    if !positional.is_empty() {
        return Err(mixed_error());
    }
    Ok(())
}

fn mixed_error() -> Error {
    Error::msg("Cannot mix named and positional parameters")
}
