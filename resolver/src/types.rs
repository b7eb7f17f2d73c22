use std::collections::HashMap;

/// Named fields a source can contribute to a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Domain,
    AltName,
    Nickname,
}

impl Field {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Field::Domain => "domain",
            Field::AltName => "x-name",
            Field::Nickname => "nickname",
        }
    }
}

pub type FieldValues = HashMap<Field, String>;

/// Result of asking a source about an identifier.
///
/// `Values` is definitive and gets cached, even when every value is empty.
/// `Unknown` means the source could not tell right now and must be retried
/// on a later request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverOutcome<T> {
    Values(T),
    Unknown,
}

/// The fixed set of fields a single source lookup produces.
pub trait FieldRecord: Send + Sync + 'static {
    const FIELDS: &'static [Field];

    fn into_values(self) -> Vec<(Field, String)>;
}

/// Key under which a single field of an identifier is cached.
pub fn cache_key(identifier: &str, field: Field) -> String {
    format!("{identifier}:{}", field.as_str())
}
