//! Vulnerability records and id-deduplicated vulnerability lists.

use super::{severity_ordering, Severity};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A vulnerability as attached to a component.
///
/// Identity is `id`: the same vulnerability may be attached to any number of
/// components independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    /// Vulnerability identifier (CVE, GHSA, ...)
    pub id: String,
    /// Normalized severity
    pub severity: Severity,
    /// Score of the selected rating, 0 when absent
    pub score: f64,
    /// Vector string of the selected rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<String>,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VulnerabilityRecord {
    /// Create a record with no vector or description.
    #[must_use]
    pub fn new(id: impl Into<String>, severity: Severity, score: f64) -> Self {
        Self {
            id: id.into(),
            severity,
            score,
            vector: None,
            description: None,
        }
    }
}

/// Ordered vulnerability sequence with at most one entry per id.
///
/// The first insertion of an id wins; later records with the same id are
/// ignored. Lookups and inserts are constant time, so merging lists costs the
/// size of the merged list. Serialized as a plain sequence of records.
#[derive(Debug, Clone, Default)]
pub struct VulnerabilityList {
    records: IndexMap<String, VulnerabilityRecord>,
}

impl VulnerabilityList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless its id is already present. Returns `true` if added.
    pub fn insert(&mut self, record: VulnerabilityRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    /// Merge every record of `other`, in order, skipping known ids.
    pub fn extend_from(&mut self, other: &Self) {
        for (id, record) in &other.records {
            if !self.records.contains_key(id) {
                self.records.insert(id.clone(), record.clone());
            }
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VulnerabilityRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Values<'_, String, VulnerabilityRecord> {
        self.records.values()
    }

    /// Ids in list order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Records sorted by severity rank, most severe first. Ties keep list order.
    #[must_use]
    pub fn sorted_by_severity(&self) -> Vec<VulnerabilityRecord> {
        let mut sorted: Vec<VulnerabilityRecord> = self.records.values().cloned().collect();
        sorted.sort_by(|a, b| severity_ordering(&a.severity, &b.severity));
        sorted
    }
}

// Lists are equal when they hold the same records in the same order.
impl PartialEq for VulnerabilityList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Serialize for VulnerabilityList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.values())
    }
}

impl<'de> Deserialize<'de> for VulnerabilityList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<VulnerabilityRecord>::deserialize(deserializer)
            .map(|records| records.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VulnerabilityList {
    type Item = &'a VulnerabilityRecord;
    type IntoIter = indexmap::map::Values<'a, String, VulnerabilityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}

impl FromIterator<VulnerabilityRecord> for VulnerabilityList {
    fn from_iter<I: IntoIterator<Item = VulnerabilityRecord>>(iter: I) -> Self {
        let mut list = Self::new();
        for record in iter {
            list.insert(record);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(id: &str, severity: Severity) -> VulnerabilityRecord {
        VulnerabilityRecord::new(id, severity, 0.0)
    }

    #[test]
    fn test_insert_dedups_by_id() {
        let mut list = VulnerabilityList::new();
        assert!(list.insert(vuln("CVE-1", Severity::High)));
        assert!(!list.insert(vuln("CVE-1", Severity::Low)));
        assert_eq!(list.len(), 1);
        // first insertion wins
        assert_eq!(list.get("CVE-1").map(|v| v.severity), Some(Severity::High));
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut a: VulnerabilityList = vec![vuln("A", Severity::Low)].into_iter().collect();
        let b: VulnerabilityList = vec![
            vuln("B", Severity::High),
            vuln("A", Severity::Critical),
            vuln("C", Severity::Medium),
        ]
        .into_iter()
        .collect();
        a.extend_from(&b);
        assert_eq!(a.ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(a.get("A").map(|v| v.severity), Some(Severity::Low));
    }

    #[test]
    fn test_large_overlapping_merge() {
        let evens: VulnerabilityList = (0..20_000)
            .step_by(2)
            .map(|i| vuln(&format!("CVE-{i}"), Severity::Low))
            .collect();
        let all: VulnerabilityList = (0..20_000)
            .map(|i| vuln(&format!("CVE-{i}"), Severity::High))
            .collect();

        let mut merged = evens.clone();
        for _ in 0..50 {
            merged.extend_from(&all);
            merged.extend_from(&evens);
        }
        assert_eq!(merged.len(), 20_000);
        assert_eq!(merged.ids().next(), Some("CVE-0"));
        assert_eq!(merged.ids().nth(10_000), Some("CVE-1"));
        assert_eq!(merged.get("CVE-2").map(|v| v.severity), Some(Severity::Low));
        assert_eq!(merged.get("CVE-3").map(|v| v.severity), Some(Severity::High));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: VulnerabilityList = vec![vuln("A", Severity::Low), vuln("B", Severity::Low)]
            .into_iter()
            .collect();
        let ba: VulnerabilityList = vec![vuln("B", Severity::Low), vuln("A", Severity::Low)]
            .into_iter()
            .collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_serializes_as_sequence() {
        let list: VulnerabilityList = vec![vuln("B", Severity::High), vuln("A", Severity::Low)]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&list).expect("serialize");
        assert_eq!(json[0]["id"], "B");
        assert_eq!(json[1]["id"], "A");

        let duplicated = serde_json::json!([
            {"id": "A", "severity": "high", "score": 7.5},
            {"id": "A", "severity": "low", "score": 1.0}
        ]);
        let back: VulnerabilityList = serde_json::from_value(duplicated).expect("deserialize");
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("A").map(|v| v.severity), Some(Severity::High));
    }

    #[test]
    fn test_sorted_by_severity_is_stable() {
        let list: VulnerabilityList = vec![
            vuln("L1", Severity::Low),
            vuln("U1", Severity::Unknown),
            vuln("C1", Severity::Critical),
            vuln("L2", Severity::Low),
            vuln("I1", Severity::Info),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = list
            .sorted_by_severity()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["C1", "L1", "L2", "I1", "U1"]);
    }
}
