// Raw script variables recovered from a page, before any decoding.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// Matches an array literal and captures everything but its last two
/// cells, which every firmware fills with `0`.
static SENTINEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*),0,0\]").expect("sentinel pattern is valid"));

pub const STATE: &str = "state";
pub const LINK_STATUS: &str = "link_status";
pub const PKTS: &str = "pkts";

/// Mapping from script variable name to its raw, comma-joined value.
///
/// Both firmware layouts produce the same three keys ([`STATE`],
/// [`LINK_STATUS`], [`PKTS`]) with the sentinel cells already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    values: BTreeMap<String, String>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Raw text of a variable.
    pub fn get(&self, name: &str) -> Result<&str, Error> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::malformed("port statistics", format!("missing `{name}` array")))
    }

    /// The comma-separated cells of a variable.
    pub fn cells(&self, name: &str) -> Result<Vec<&str>, Error> {
        Ok(self.get(name)?.split(',').map(str::trim).collect())
    }
}

/// Strip the two trailing sentinel zero-cells from an array literal,
/// returning the inner cells as one comma-joined string.
pub(crate) fn strip_sentinel<'a>(name: &str, literal: &'a str) -> Result<&'a str, Error> {
    SENTINEL_RE
        .captures(literal)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            Error::malformed(
                "port statistics",
                format!("`{name}` is not an array ending in two sentinel cells"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_two_trailing_zeros() {
        assert_eq!(strip_sentinel("state", "[1,1,0,0,0]").ok(), Some("1,1,0"));
    }

    #[test]
    fn rejects_missing_sentinel() {
        let err = strip_sentinel("state", "[1,1,1]");
        assert!(matches!(err, Err(Error::MalformedResponse { .. })));
    }

    #[test]
    fn missing_field_is_malformed() {
        let fields = RawFields::new();
        assert!(matches!(
            fields.get(STATE),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn cells_split_on_commas() {
        let mut fields = RawFields::new();
        fields.insert(PKTS, "10, 0,20,0");
        assert_eq!(fields.cells(PKTS).ok(), Some(vec!["10", "0", "20", "0"]));
    }
}
