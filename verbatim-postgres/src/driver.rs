use verbatim_core::{Dialect, DialectRegistry};

pub struct PostgresDriver {}

impl PostgresDriver {
    pub const NAME: &'static str = "postgres";
    pub const DIALECT: Dialect = Dialect::PostgreSQL;

    pub const fn new() -> Self {
        Self {}
    }

    /// Make the URL schemes this driver accepts known to `registry`.
    pub fn register(&self, registry: &mut DialectRegistry) {
        registry
            .register(Self::NAME, Self::DIALECT)
            .register("postgresql", Self::DIALECT);
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}
