use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::camp::{ChildMeasurement, Discipline};
use crate::error::{CampError, CampResult};

/// One child's aggregate for a discipline. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub child_id: u64,
    pub child_name: String,
    pub aggregated_value: f64,
    pub total_attempts: usize,
}

struct ChildValues<'a> {
    child_id: u64,
    child_name: &'a str,
    values: Vec<f64>,
}

/// Rank children by their aggregated measurements for `discipline`.
///
/// Measurements are grouped per child in first-appearance order, collapsed
/// with the discipline's aggregation method and stable-sorted by aggregated
/// value, highest first. Children without measurements are absent. Every
/// measurement must belong to `discipline` and carry a finite value.
pub fn compute_ranking(
    discipline: &Discipline,
    measurements: &[ChildMeasurement],
) -> CampResult<Vec<AggregateResult>> {
    let groups = group_by_child(discipline, measurements)?;
    let method = discipline.aggregation_method;

    let mut results: Vec<AggregateResult> = groups
        .into_iter()
        .map(|group| AggregateResult {
            child_id: group.child_id,
            child_name: group.child_name.to_string(),
            aggregated_value: method.aggregate(&group.values),
            total_attempts: group.values.len(),
        })
        .collect();

    // Stable: ties keep grouping order
    results.sort_by(|a, b| {
        b.aggregated_value
            .partial_cmp(&a.aggregated_value)
            .unwrap_or(Ordering::Equal)
    });

    tracing::debug!(
        discipline_id = discipline.id,
        method = %method,
        measurements = measurements.len(),
        children = results.len(),
        "Computed ranking"
    );

    Ok(results)
}

fn group_by_child<'a>(
    discipline: &Discipline,
    measurements: &'a [ChildMeasurement],
) -> CampResult<Vec<ChildValues<'a>>> {
    let mut groups: Vec<ChildValues<'a>> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for m in measurements {
        if m.discipline_id != discipline.id {
            return Err(CampError::PrecondAssertion(format!(
                "measurement for discipline {} passed to ranking of discipline {}",
                m.discipline_id, discipline.id
            )));
        }
        if !m.value.is_finite() {
            return Err(CampError::PrecondAssertion(format!(
                "non-finite value {} for child {} in discipline {}",
                m.value, m.child_id, discipline.id
            )));
        }

        let slot = *index.entry(m.child_id).or_insert_with(|| {
            groups.push(ChildValues {
                child_id: m.child_id,
                child_name: &m.child_name,
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].values.push(m.value);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp::ResultType;
    use crate::ranking::AggregationMethod;
    use chrono::Utc;

    fn discipline(method: AggregationMethod) -> Discipline {
        Discipline {
            id: 1,
            name: "Test".to_string(),
            result_type: ResultType::MultipleAttempts,
            aggregation_method: method,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn m(child_id: u64, name: &str, value: f64) -> ChildMeasurement {
        ChildMeasurement {
            child_id,
            child_name: name.to_string(),
            discipline_id: 1,
            value,
            attempt_number: 1,
        }
    }

    #[test]
    fn test_scenario_long_jump_best() {
        let d = discipline(AggregationMethod::Best);
        let input = vec![m(1, "A", 3.2), m(1, "A", 4.1), m(1, "A", 3.9)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].aggregated_value, 4.1);
        assert_eq!(ranking[0].total_attempts, 3);
    }

    #[test]
    fn test_scenario_situps_sum() {
        let d = discipline(AggregationMethod::Sum);
        let input = vec![m(2, "B", 10.0), m(2, "B", 15.0)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking[0].aggregated_value, 25.0);
        assert_eq!(ranking[0].total_attempts, 2);
    }

    #[test]
    fn test_scenario_archery_mean() {
        let d = discipline(AggregationMethod::Mean);
        let input = vec![m(3, "C", 7.0), m(3, "C", 9.0), m(3, "C", 8.0)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking[0].aggregated_value, 8.0);
        assert_eq!(ranking[0].total_attempts, 3);
    }

    #[test]
    fn test_empty_measurements_give_empty_ranking() {
        let d = discipline(AggregationMethod::Sum);
        let ranking = compute_ranking(&d, &[]).unwrap();
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_sorted_descending_across_children() {
        let d = discipline(AggregationMethod::Sum);
        let input = vec![
            m(1, "Low", 1.0),
            m(2, "High", 10.0),
            m(3, "Mid", 4.0),
            m(1, "Low", 1.0),
            m(3, "Mid", 2.0),
        ];
        let ranking = compute_ranking(&d, &input).unwrap();
        let names: Vec<_> = ranking.iter().map(|r| r.child_name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
        for pair in ranking.windows(2) {
            assert!(pair[0].aggregated_value >= pair[1].aggregated_value);
        }
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let d = discipline(AggregationMethod::Best);
        let input = vec![m(5, "Eve", 3.0), m(2, "Bob", 3.0), m(9, "Zed", 3.0)];
        let ranking = compute_ranking(&d, &input).unwrap();
        let ids: Vec<_> = ranking.iter().map(|r| r.child_id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_best_is_maximum_even_for_timed_values() {
        // Sprint times: lower is faster, but best stays the literal maximum.
        let d = discipline(AggregationMethod::Best);
        let input = vec![m(1, "Runner", 12.4), m(1, "Runner", 11.8)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking[0].aggregated_value, 12.4);
    }

    #[test]
    fn test_each_child_appears_once() {
        let d = discipline(AggregationMethod::Mean);
        let input = vec![
            m(1, "A", 1.0),
            m(2, "B", 2.0),
            m(1, "A", 3.0),
            m(2, "B", 4.0),
            m(3, "C", 5.0),
        ];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking.len(), 3);
        let mut ids: Vec<_> = ranking.iter().map(|r| r.child_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_duplicate_attempt_numbers_are_all_counted() {
        let d = discipline(AggregationMethod::Sum);
        let input = vec![m(1, "A", 5.0), m(1, "A", 5.0)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking[0].total_attempts, 2);
        assert_eq!(ranking[0].aggregated_value, 10.0);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let d = discipline(AggregationMethod::Mean);
        let input = vec![m(1, "A", 0.1), m(2, "B", 0.2), m(1, "A", 0.3), m(3, "C", 0.2)];
        let first = compute_ranking(&d, &input).unwrap();
        let second = compute_ranking(&d, &input).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_mixed_disciplines_rejected() {
        let d = discipline(AggregationMethod::Sum);
        let mut foreign = m(1, "A", 2.0);
        foreign.discipline_id = 99;
        let err = compute_ranking(&d, &[m(1, "A", 1.0), foreign]).unwrap_err();
        assert!(matches!(err, CampError::PrecondAssertion(_)));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let d = discipline(AggregationMethod::Sum);
        let err = compute_ranking(&d, &[m(1, "A", f64::NAN)]).unwrap_err();
        assert!(matches!(err, CampError::PrecondAssertion(_)));

        let err = compute_ranking(&d, &[m(1, "A", f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, CampError::PrecondAssertion(_)));
    }

    #[test]
    fn test_uses_first_seen_child_name() {
        let d = discipline(AggregationMethod::Sum);
        let input = vec![m(1, "Ana", 1.0), m(1, "Ana B.", 1.0)];
        let ranking = compute_ranking(&d, &input).unwrap();
        assert_eq!(ranking[0].child_name, "Ana");
    }
}
