mod as_value;
mod bind;
mod bulk_insert;
mod column;
mod conditional;
mod dialect;
mod dump;
mod executor;
mod lexer;
mod params;
mod prepare;
mod query;
mod rebind;
mod util;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use bind::*;
pub use bulk_insert::*;
pub use column::*;
pub use conditional::*;
pub use dialect::*;
pub use dump::*;
pub use executor::*;
pub use lexer::*;
pub use params::*;
pub use prepare::*;
pub use query::*;
pub use rebind::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
