//! Mapping of vulnerability records onto graph components.
//!
//! Severity resolution order for one record:
//! 1. the record's own `severity` label,
//! 2. the first rating carrying a `severity` label,
//! 3. with [`SeverityConfig::derive_from_score`], the CVSS band of the first rating score,
//! 4. `unknown`.
//!
//! When [`SeverityConfig::preferred_rating_methods`] is non-empty, ratings whose
//! `method` is listed are searched first, in list order, before the remaining
//! ratings in document order.

use crate::config::SeverityConfig;
use crate::model::{ComponentGraph, Severity, VulnerabilityRecord};
use crate::parsers::fields::{array_field, nested_str_field, number_field, str_field, text_field};
use serde_json::Value;

/// Identifier used when a record has neither `id` nor `source.name`.
pub const UNKNOWN_VULNERABILITY_ID: &str = "Unknown";

/// Outcome of mapping a batch of vulnerability records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingStats {
    /// New (component, vulnerability) attachments
    pub attached: usize,
    /// Records that affected no known component
    pub dropped: usize,
}

/// Attach every record in `records` to the components it affects, then
/// recompute each node's `max_severity` from its direct vulnerabilities.
pub fn map_vulnerabilities(
    graph: &mut ComponentGraph,
    records: &[Value],
    config: &SeverityConfig,
) -> MappingStats {
    let mut stats = MappingStats::default();

    for record in records {
        let vulnerability = vulnerability_from_record(record, config);
        let mut hit = false;

        for target in affected_refs(record) {
            let Some(node) = graph.get_mut(target) else {
                continue;
            };
            hit = true;
            if node.add_direct_vulnerability(vulnerability.clone()) {
                stats.attached += 1;
            }
        }

        if !hit {
            stats.dropped += 1;
            tracing::debug!(
                vulnerability = %vulnerability.id,
                "Vulnerability affects no known component"
            );
        }
    }

    for node in graph.nodes_mut() {
        node.refresh_max_severity();
    }

    tracing::debug!(
        attached = stats.attached,
        dropped = stats.dropped,
        "Mapped vulnerabilities"
    );
    stats
}

/// Normalize one vulnerability record.
#[must_use]
pub fn vulnerability_from_record(record: &Value, config: &SeverityConfig) -> VulnerabilityRecord {
    let id = str_field(record, "id")
        .or_else(|| nested_str_field(record, "source", "name"))
        .unwrap_or(UNKNOWN_VULNERABILITY_ID);

    let ratings = ordered_ratings(record, &config.preferred_rating_methods);
    let labelled = ratings
        .iter()
        .copied()
        .find(|r| str_field(r, "severity").is_some());
    let scored = ratings
        .iter()
        .copied()
        .find_map(|r| number_field(r, "score").map(|score| (r, score)));

    let severity = if let Some(label) = str_field(record, "severity") {
        Severity::normalize(Some(label))
    } else if let Some(rating) = labelled {
        Severity::normalize(str_field(rating, "severity"))
    } else if let Some((_, score)) = scored.filter(|_| config.derive_from_score) {
        Severity::from_score(score)
    } else {
        Severity::Unknown
    };

    let vector = labelled
        .or(scored.map(|(r, _)| r))
        .and_then(|r| str_field(r, "vector"))
        .map(str::to_string);

    VulnerabilityRecord {
        id: id.to_string(),
        severity,
        score: scored.map_or(0.0, |(_, score)| score),
        vector,
        description: text_field(record, "description"),
    }
}

/// Component references named in `affects[].ref`.
pub fn affected_refs(record: &Value) -> impl Iterator<Item = &str> {
    array_field(record, "affects")
        .iter()
        .filter_map(|affect| str_field(affect, "ref"))
}

fn ordered_ratings<'a>(record: &'a Value, preferred: &[String]) -> Vec<&'a Value> {
    let ratings: Vec<&Value> = array_field(record, "ratings")
        .iter()
        .filter(|r| r.is_object())
        .collect();
    if preferred.is_empty() {
        return ratings;
    }

    let method_rank = |rating: &Value| {
        str_field(rating, "method")
            .and_then(|method| preferred.iter().position(|p| p == method))
            .unwrap_or(preferred.len())
    };
    let mut ordered = ratings;
    // stable: unlisted methods keep document order after the listed ones
    ordered.sort_by_key(|r| method_rank(*r));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_graph;
    use crate::parsers::RawSbom;
    use serde_json::json;

    fn default_config() -> SeverityConfig {
        SeverityConfig::default()
    }

    #[test]
    fn test_id_fallbacks() {
        let config = default_config();
        assert_eq!(vulnerability_from_record(&json!({"id": "CVE-1"}), &config).id, "CVE-1");
        assert_eq!(
            vulnerability_from_record(&json!({"source": {"name": "NVD"}}), &config).id,
            "NVD"
        );
        assert_eq!(vulnerability_from_record(&json!({}), &config).id, "Unknown");
    }

    #[test]
    fn test_severity_and_score_from_ratings() {
        let record = json!({
            "id": "CVE-1",
            "ratings": [
                {"score": "5.5"},
                {"severity": "HIGH", "score": 8.1, "vector": "AV:N"}
            ]
        });
        let vuln = vulnerability_from_record(&record, &default_config());
        assert_eq!(vuln.severity, Severity::High);
        assert!((vuln.score - 5.5).abs() < f64::EPSILON);
        assert_eq!(vuln.vector.as_deref(), Some("AV:N"));
    }

    #[test]
    fn test_top_level_severity_wins() {
        let record = json!({"id": "V", "severity": "Informational", "ratings": [{"severity": "critical"}]});
        let vuln = vulnerability_from_record(&record, &default_config());
        assert_eq!(vuln.severity, Severity::Info);
    }

    #[test]
    fn test_missing_severity_is_unknown_unless_derived() {
        let record = json!({"id": "V", "ratings": [{"score": 9.1}]});
        assert_eq!(
            vulnerability_from_record(&record, &default_config()).severity,
            Severity::Unknown
        );

        let config = SeverityConfig {
            derive_from_score: true,
            ..SeverityConfig::default()
        };
        assert_eq!(vulnerability_from_record(&record, &config).severity, Severity::Critical);
    }

    #[test]
    fn test_preferred_rating_methods() {
        let record = json!({
            "id": "V",
            "ratings": [
                {"method": "CVSSv2", "severity": "medium", "score": 5.0},
                {"method": "OWASP", "severity": "low", "score": 2.0},
                {"method": "CVSSv31", "severity": "critical", "score": 9.8}
            ]
        });
        let config = SeverityConfig {
            preferred_rating_methods: vec!["CVSSv31".to_string(), "CVSSv2".to_string()],
            ..SeverityConfig::default()
        };
        let vuln = vulnerability_from_record(&record, &config);
        assert_eq!(vuln.severity, Severity::Critical);
        assert!((vuln.score - 9.8).abs() < f64::EPSILON);

        // without preferences the first labelled rating wins
        let vuln = vulnerability_from_record(&record, &default_config());
        assert_eq!(vuln.severity, Severity::Medium);
    }

    #[test]
    fn test_mapping_dedups_and_drops_dangling() {
        let doc = json!({
            "components": [{"bom-ref": "a"}, {"bom-ref": "b"}],
            "vulnerabilities": [
                {"id": "V1", "ratings": [{"severity": "low"}], "affects": [{"ref": "a"}, {"ref": "a"}]},
                {"id": "V1", "ratings": [{"severity": "critical"}], "affects": [{"ref": "a"}]},
                {"id": "V2", "ratings": [{"severity": "high"}], "affects": [{"ref": "a"}, {"ref": "b"}]},
                {"id": "V3", "ratings": [{"severity": "critical"}], "affects": [{"ref": "ghost"}]}
            ]
        });
        let raw = RawSbom::from_document(&doc);
        let mut graph = build_graph(&raw);
        let stats = map_vulnerabilities(&mut graph, raw.vulnerabilities, &default_config());

        assert_eq!(stats, MappingStats { attached: 3, dropped: 1 });
        let a = graph.get("a").expect("a");
        assert_eq!(a.direct_vulnerabilities.ids().collect::<Vec<_>>(), vec!["V1", "V2"]);
        // the first V1 record wins, so its low severity is kept
        assert_eq!(a.direct_vulnerabilities.get("V1").map(|v| v.severity), Some(Severity::Low));
        assert_eq!(a.max_severity, Severity::High);
        assert_eq!(graph.get("b").map(|n| n.max_severity), Some(Severity::High));
    }

    #[test]
    fn test_unknown_only_stays_clean() {
        let doc = json!({
            "components": [{"bom-ref": "a"}],
            "vulnerabilities": [{"id": "V", "affects": [{"ref": "a"}]}]
        });
        let raw = RawSbom::from_document(&doc);
        let mut graph = build_graph(&raw);
        map_vulnerabilities(&mut graph, raw.vulnerabilities, &default_config());

        let a = graph.get("a").expect("a");
        assert!(a.is_directly_vulnerable());
        assert_eq!(a.max_severity, Severity::Clean);
    }
}
