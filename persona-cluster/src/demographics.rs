//! Demographic summary of a cluster.

use persona_core::{Demographics, RespondentRecord};
use std::collections::BTreeMap;

/// Majority value for every demographic key seen among `members`.
///
/// Ties go to the value that appeared first in member order. Members without
/// a key simply do not vote on it.
pub fn aggregate_demographics(members: &[RespondentRecord]) -> Demographics {
    // key -> [(value, count, first_seen)]
    let mut tallies: BTreeMap<&str, Vec<(&str, usize, usize)>> = BTreeMap::new();

    for (position, member) in members.iter().enumerate() {
        for (key, value) in &member.demographics {
            let values = tallies.entry(key.as_str()).or_default();
            match values.iter_mut().find(|(v, _, _)| *v == value.as_str()) {
                Some(entry) => entry.1 += 1,
                None => values.push((value.as_str(), 1, position)),
            }
        }
    }

    tallies
        .into_iter()
        .filter_map(|(key, values)| {
            values
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
                .map(|(value, _, _)| (key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::ProfileVector;

    fn member(id: &str, attrs: &[(&str, &str)]) -> RespondentRecord {
        RespondentRecord::new(id, ProfileVector::new()).with_demographics(
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_majority_wins() {
        let members = vec![
            member("a", &[("role", "engineer"), ("region", "emea")]),
            member("b", &[("role", "manager"), ("region", "emea")]),
            member("c", &[("role", "engineer")]),
        ];
        let summary = aggregate_demographics(&members);
        assert_eq!(summary.get("role").map(String::as_str), Some("engineer"));
        assert_eq!(summary.get("region").map(String::as_str), Some("emea"));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let members = vec![
            member("a", &[("role", "designer")]),
            member("b", &[("role", "engineer")]),
        ];
        let summary = aggregate_demographics(&members);
        assert_eq!(summary.get("role").map(String::as_str), Some("designer"));
    }

    #[test]
    fn test_empty_members() {
        assert!(aggregate_demographics(&[]).is_empty());
        assert!(aggregate_demographics(&[member("a", &[])]).is_empty());
    }
}
