//! Parser for ripple.txt verification documents.
//!
//! The format is a list of `[section]` headers, each followed by one value
//! per line. Blank lines and `#` comments are skipped, as is anything before
//! the first header.
//!
//! ```text
//! [domain]
//! example.com
//!
//! [accounts]
//! r9cZA1mLK5R5Am25ArfXFmqgNwjZgnfk59
//!
//! [x-name]
//! Example Gateway
//! ```
use std::collections::HashMap;

const ACCOUNTS: &str = "accounts";
const ALT_NAME: &str = "x-name";

#[derive(Debug, Default, PartialEq)]
pub struct RippleTxt {
    sections: HashMap<String, Vec<String>>,
}

impl RippleTxt {
    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, Vec<String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_ascii_lowercase();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            if let Some(name) = &current {
                sections.entry(name.clone()).or_default().push(line.to_string());
            }
        }

        RippleTxt { sections }
    }

    /// Values of a section, empty if the section is absent. Section names are
    /// case-insensitive.
    pub fn values(&self, section: &str) -> &[String] {
        self.sections
            .get(&section.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the document vouches for `account`.
    pub fn lists_account(&self, account: &str) -> bool {
        self.values(ACCOUNTS).iter().any(|a| a == account)
    }

    pub fn alt_name(&self) -> Option<&str> {
        self.values(ALT_NAME).first().map(String::as_str)
    }
}
