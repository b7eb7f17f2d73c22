use crate::types::{Field, FieldValues};

/// An explicitly claimed alternate name beats a directory nickname, which
/// beats a bare domain.
pub const PRIORITY: [Field; 3] = [Field::AltName, Field::Nickname, Field::Domain];

/// Picks the first non-empty value in priority order, or an empty string.
pub fn merge(values: &FieldValues) -> String {
    PRIORITY
        .iter()
        .filter_map(|field| values.get(field))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entries: &[(Field, &str)]) -> FieldValues {
        entries
            .iter()
            .map(|(field, value)| (*field, value.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_priority() {
        assert_eq!(merge(&values(&[])), "");

        assert_eq!(merge(&values(&[(Field::Domain, "example.com")])), "example.com");

        assert_eq!(
            merge(&values(&[
                (Field::Domain, "example.com"),
                (Field::Nickname, "~alice")
            ])),
            "~alice"
        );

        assert_eq!(
            merge(&values(&[
                (Field::Domain, "example.com"),
                (Field::Nickname, "~alice"),
                (Field::AltName, "Example Inc"),
            ])),
            "Example Inc"
        );
    }

    #[test]
    fn test_merge_skips_empty_values() {
        // Cached negatives are present but empty and must not shadow lower fields
        assert_eq!(
            merge(&values(&[
                (Field::AltName, ""),
                (Field::Nickname, ""),
                (Field::Domain, "example.com"),
            ])),
            "example.com"
        );

        assert_eq!(
            merge(&values(&[(Field::AltName, ""), (Field::Domain, "")])),
            ""
        );
    }
}
