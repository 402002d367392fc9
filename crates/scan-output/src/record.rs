//! Statically declared record schemas.

/// A result row type with a fixed, ordered list of named fields.
///
/// `field_values` must return exactly one value per entry of [`Record::FIELDS`],
/// in the same order.
pub trait Record: Send + 'static {
    /// Column names, in output order.
    const FIELDS: &'static [&'static str];

    /// Stringified column values, in output order.
    fn field_values(&self) -> Vec<String>;
}

/// What a sink learns about its criterion when it is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: &'static [&'static str],
}

impl Schema {
    /// Schema for record type `R` written under `name`.
    #[must_use]
    pub fn of<R: Record>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: R::FIELDS,
        }
    }

    /// Display name of the criterion owning the sink.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}
