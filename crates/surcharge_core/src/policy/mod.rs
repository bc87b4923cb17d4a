//! Skip policy: which curves are excluded from detection and extrapolation.
//!
//! Some carriers publish tables that were converted upstream (EUR to USD,
//! litres to gallons, weekly averages). Their step widths are artefacts of
//! the conversion, so heuristics must not run on them. Which curves those
//! are is business knowledge, injected here as a [`SkipPolicy`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Wildcard matching any market, carrier or fuel category.
pub const WILDCARD: &str = "*";

/// Decides whether a curve is excluded from heuristic processing.
pub trait SkipPolicy {
    /// `true` if the `(market, carrier, fuel_category)` curve is skipped.
    fn skips(&self, market: &str, carrier: &str, fuel_category: &str) -> bool;
}

/// Never skips.
impl SkipPolicy for () {
    fn skips(&self, _market: &str, _carrier: &str, _fuel_category: &str) -> bool {
        false
    }
}

/// A set of carrier names, skipped in every market and category.
impl SkipPolicy for HashSet<String> {
    fn skips(&self, _market: &str, carrier: &str, _fuel_category: &str) -> bool {
        self.contains(carrier)
    }
}

impl<F> SkipPolicy for F
where
    F: Fn(&str, &str, &str) -> bool,
{
    fn skips(&self, market: &str, carrier: &str, fuel_category: &str) -> bool {
        self(market, carrier, fuel_category)
    }
}

/// One `(market, carrier, fuel_category)` combination to skip.
///
/// Any field may be [`WILDCARD`]. Carrier matching ignores case; market
/// and fuel category match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkipEntry {
    /// Market code or `*`
    pub market: String,
    /// Carrier name or `*`
    pub carrier: String,
    /// Fuel category or `*`
    pub fuel_category: String,
}

impl SkipEntry {
    /// Entry from borrowed parts.
    pub fn new(
        market: impl Into<String>,
        carrier: impl Into<String>,
        fuel_category: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            carrier: carrier.into(),
            fuel_category: fuel_category.into(),
        }
    }

    /// Parse `market:carrier:fuel_category`.
    ///
    /// ```
    /// use surcharge_core::policy::SkipEntry;
    ///
    /// let entry = SkipEntry::parse("DE:DHL:road").unwrap();
    /// assert_eq!(entry.carrier, "DHL");
    /// assert!(SkipEntry::parse("DE:DHL").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':').map(str::trim);
        let entry = Self::new(parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || [&entry.market, &entry.carrier, &entry.fuel_category]
            .iter()
            .any(|p| p.is_empty())
        {
            return None;
        }
        Some(entry)
    }

    /// Whether this entry covers the given curve.
    pub fn matches(&self, market: &str, carrier: &str, fuel_category: &str) -> bool {
        field_matches(&self.market, market)
            && (self.carrier == WILDCARD || self.carrier.eq_ignore_ascii_case(carrier))
            && field_matches(&self.fuel_category, fuel_category)
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || pattern == value
}

/// A configured list of skipped combinations.
///
/// # Example
///
/// ```
/// use surcharge_core::policy::{SkipEntry, SkipList, SkipPolicy};
///
/// let list = SkipList::new(vec![
///     SkipEntry::new("DE", "DHL", "road"),
///     SkipEntry::new("*", "Hermes", "*"),
/// ]);
/// assert!(list.skips("DE", "dhl", "road"));
/// assert!(!list.skips("DE", "DHL", "air"));
/// assert!(list.skips("US", "Hermes", "ground"));
///
/// let set = list.carriers_for("DE", "road");
/// assert!(set.contains("DHL"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipList {
    entries: Vec<SkipEntry>,
}

impl SkipList {
    /// List from entries.
    pub fn new(entries: Vec<SkipEntry>) -> Self {
        Self { entries }
    }

    /// Configured entries.
    pub fn entries(&self) -> &[SkipEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, ignoring exact duplicates.
    pub fn push(&mut self, entry: SkipEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Append every entry of `other`.
    pub fn extend(&mut self, other: SkipList) {
        for entry in other.entries {
            self.push(entry);
        }
    }

    /// Carrier names configured for one market and fuel category, as
    /// spelled in the entries.
    ///
    /// Wildcard carrier entries are not expanded. For a skip set keyed by
    /// the carrier names found in the data, use [`SkipList::skip_set`].
    pub fn carriers_for(&self, market: &str, fuel_category: &str) -> HashSet<String> {
        self.entries
            .iter()
            .filter(|e| e.carrier != WILDCARD)
            .filter(|e| field_matches(&e.market, market))
            .filter(|e| field_matches(&e.fuel_category, fuel_category))
            .map(|e| e.carrier.clone())
            .collect()
    }
}

impl SkipList {
    /// The members of `carriers` skipped in one market and fuel category.
    ///
    /// Names keep the spelling of `carriers`, so the set can be checked
    /// exactly by batch detection over wide rows. Case-insensitive carrier
    /// matching and wildcards are resolved here.
    pub fn skip_set<S: AsRef<str>>(
        &self,
        market: &str,
        fuel_category: &str,
        carriers: &[S],
    ) -> HashSet<String> {
        carriers
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| self.skips(market, c, fuel_category))
            .map(str::to_string)
            .collect()
    }
}

impl SkipPolicy for SkipList {
    fn skips(&self, market: &str, carrier: &str, fuel_category: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.matches(market, carrier, fuel_category))
    }
}

impl FromIterator<SkipEntry> for SkipList {
    fn from_iter<I: IntoIterator<Item = SkipEntry>>(iter: I) -> Self {
        let mut list = SkipList::default();
        for entry in iter {
            list.push(entry);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_never_skips() {
        assert!(!().skips("US", "UPS", "ground"));
    }

    #[test]
    fn test_carrier_set_policy() {
        let set: HashSet<String> = ["UPS".to_string()].into();
        assert!(set.skips("any", "UPS", "any"));
        assert!(!set.skips("any", "FedEx", "any"));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |market: &str, _: &str, _: &str| market == "DE";
        assert!(policy.skips("DE", "DHL", "road"));
        assert!(!policy.skips("US", "DHL", "road"));
    }

    #[test]
    fn test_entry_parse() {
        assert_eq!(
            SkipEntry::parse(" US : FedEx : ground "),
            Some(SkipEntry::new("US", "FedEx", "ground"))
        );
        assert_eq!(SkipEntry::parse("a:b:c:d"), None);
        assert_eq!(SkipEntry::parse("a::c"), None);
        assert_eq!(SkipEntry::parse(""), None);
    }

    #[test]
    fn test_wildcards() {
        let entry = SkipEntry::new("*", "DHL", "*");
        assert!(entry.matches("DE", "DHL", "road"));
        assert!(entry.matches("US", "dhl", "air"));
        assert!(!entry.matches("US", "UPS", "air"));
    }

    #[test]
    fn test_skip_set_uses_data_spelling() {
        let list = SkipList::new(vec![
            SkipEntry::new("US", "dhl", "ground"),
            SkipEntry::new("*", "*", "air"),
        ]);
        let names = ["DHL", "UPS"];

        let set = list.skip_set("US", "ground", &names);
        assert_eq!(set, HashSet::from(["DHL".to_string()]));
        assert!(!list.carriers_for("US", "ground").contains("DHL"));

        let all = list.skip_set("DE", "air", &names);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_push_dedups() {
        let mut list = SkipList::default();
        list.push(SkipEntry::new("DE", "DHL", "road"));
        list.push(SkipEntry::new("DE", "DHL", "road"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_carriers_for_filters_context() {
        let list: SkipList = [
            SkipEntry::new("DE", "DHL", "road"),
            SkipEntry::new("US", "UPS", "ground"),
            SkipEntry::new("*", "FedEx", "road"),
            SkipEntry::new("DE", "*", "air"),
        ]
        .into_iter()
        .collect();

        let set = list.carriers_for("DE", "road");
        assert_eq!(set.len(), 2);
        assert!(set.contains("DHL"));
        assert!(set.contains("FedEx"));
        assert!(list.carriers_for("DE", "air").is_empty());
        assert!(list.skips("DE", "anyone", "air"));
    }

    #[test]
    fn test_deserialize_as_plain_array() {
        #[derive(Deserialize)]
        struct Wrapper {
            skip_list: SkipList,
        }
        let json = r#"{"skip_list": [{"market": "DE", "carrier": "DHL", "fuel_category": "road"}]}"#;
        let parsed: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.skip_list.entries()[0].carrier, "DHL");
    }
}
