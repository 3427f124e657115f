/// A table column and the type name the database declares for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    /// Name usable in a cast, `int4`, `text`, `timestamptz`...
    pub type_name: String,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
