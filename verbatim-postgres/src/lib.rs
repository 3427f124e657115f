mod connection;
mod driver;
mod util;
mod value_holder;

pub use connection::*;
pub use driver::*;
pub(crate) use value_holder::*;
