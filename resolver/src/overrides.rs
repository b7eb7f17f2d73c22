use std::collections::HashMap;
use std::sync::Arc;

// Some well-known addresses
const WELL_KNOWN: &[(&str, &str)] = &[
    ("rfYv1TXnwgDDK4WQNbFALykYuEBnrR4pDX", "Dividend Rippler"),
    ("rNPRNzBB92BVpAhhZr4iXDTveCgV5Pofm9", "Ripple Israel"),
    ("r3ADD8kXSUKHd6zTCKfnKT3zV9EZHjzp1S", "Ripple Union"),
    ("rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B", "Bitstamp"),
    ("razqQKzJRdB4UxFPWf5NEpEG3WMkmwgcXA", "RippleChina"),
    ("rnuF96W4SZoCJmbHYBFoJZpR8eCaxNvekK", "RippleCN"),
    ("rJHygWcTLVpSXkowott6kzgZU6viQSVYM1", "Justcoin"),
    ("rGDWKWni6exeneJdNbEZ3nVX3Rrw5VG1p1", "Goodwill LETS"),
    ("rMwjYedjc7qqtKYVLiAccJSmCwih4LnE2q", "SnapSwap"),
    ("ra9eZxMbJrUcgV8ui7aPc161FgrqWScQxV", "Peercover"),
];

/// Locally known names. These are authoritative and answer a request
/// without touching the cache or any source.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    names: Arc<HashMap<String, String>>,
}

impl Overrides {
    /// The built-in table, with `extra` entries added on top. Entries in
    /// `extra` replace built-in ones with the same identifier.
    pub fn new(extra: HashMap<String, String>) -> Self {
        let mut names: HashMap<String, String> = WELL_KNOWN
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();
        names.extend(extra);

        Overrides {
            names: Arc::new(names),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.names.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known() {
        let overrides = Overrides::new(HashMap::new());
        assert_eq!(overrides.len(), WELL_KNOWN.len());
        assert_eq!(
            overrides.get("rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B"),
            Some("Bitstamp")
        );
        assert_eq!(overrides.get("rUnknown"), None);
    }

    #[test]
    fn test_extra_entries() {
        let overrides = Overrides::new(HashMap::from([
            ("rCustom".to_string(), "Custom Gateway".to_string()),
            (
                "rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B".to_string(),
                "Bitstamp Ltd".to_string(),
            ),
        ]));

        assert_eq!(overrides.get("rCustom"), Some("Custom Gateway"));
        assert_eq!(
            overrides.get("rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B"),
            Some("Bitstamp Ltd")
        );
        assert_eq!(overrides.len(), WELL_KNOWN.len() + 1);
    }

    #[test]
    fn test_empty_default() {
        assert!(Overrides::default().is_empty());
        assert_eq!(Overrides::default().get("rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B"), None);
    }
}
