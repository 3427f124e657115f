//! Plain SQL with named parameters, `{{:name ...}}` conditional fragments and list expansion,
//! prepared the same way for every supported database.
//!
//! ```rust
//! use std::collections::HashMap;
//! use verbatim::{Dialect, Value, params, prepare};
//! let prepared = prepare(
//!     Dialect::SQLite,
//!     "select * from book where year > :year {{:author and author = :author}}",
//!     params![HashMap::from([
//!         ("year", Value::from(1950)),
//!         ("author", Value::from("")),
//!     ])],
//! )
//! .unwrap();
//! assert_eq!(prepared.sql, "select * from book where year > ?");
//! assert_eq!(prepared.args, vec![Value::from(1950)]);
//! ```
pub use verbatim_core::*;
pub use verbatim_macros::*;
