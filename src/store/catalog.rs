use chrono::Utc;

use super::types::CampState;
use crate::camp::{ChildMeasurement, Discipline, Measurement};
use crate::error::{CampError, CampResult};

/// Read access to discipline definitions.
pub trait DisciplineCatalog {
    /// Fetch a validated discipline. `NotFound` if absent, `InvalidDiscipline`
    /// if the stored definition cannot be interpreted.
    fn get_discipline(&self, id: u64) -> CampResult<Discipline>;
}

/// Append-only access to recorded measurements.
pub trait MeasurementStore {
    /// All measurements of one discipline joined with child names, in
    /// recording order.
    fn list_measurements(&self, discipline_id: u64) -> Vec<ChildMeasurement>;

    /// Append a new measurement. Never replaces an existing one.
    fn append_measurement(&mut self, new: NewMeasurement) -> CampResult<Measurement>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub child_id: u64,
    pub discipline_id: u64,
    pub value: f64,
    pub attempt_number: u32,
}

impl DisciplineCatalog for CampState {
    fn get_discipline(&self, id: u64) -> CampResult<Discipline> {
        let row = self
            .get_discipline_row(id)
            .ok_or(CampError::not_found("Discipline", id))?;
        Discipline::try_from(row)
    }
}

impl MeasurementStore for CampState {
    fn list_measurements(&self, discipline_id: u64) -> Vec<ChildMeasurement> {
        self.measurements
            .iter()
            .filter(|m| m.discipline_id == discipline_id)
            // Inner join: rows of deleted children never surface
            .filter_map(|m| {
                let child = self.get_child(m.child_id)?;
                Some(ChildMeasurement {
                    child_id: m.child_id,
                    child_name: child.name.clone(),
                    discipline_id: m.discipline_id,
                    value: m.value,
                    attempt_number: m.attempt_number,
                })
            })
            .collect()
    }

    fn append_measurement(&mut self, new: NewMeasurement) -> CampResult<Measurement> {
        self.require_child(new.child_id)?;
        if self.get_discipline_row(new.discipline_id).is_none() {
            return Err(CampError::not_found("Discipline", new.discipline_id));
        }

        let measurement = Measurement {
            id: Self::issue_id(&mut self.last_ids.measurement),
            child_id: new.child_id,
            discipline_id: new.discipline_id,
            value: new.value,
            attempt_number: new.attempt_number,
            recorded_at: Utc::now(),
        };
        self.measurements.push(measurement.clone());
        Ok(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp::{Gender, ResultType};
    use crate::ranking::{discipline_results, record_measurement, AggregationMethod, RecordMeasurement};
    use crate::store::{NewChild, NewDiscipline};
    use chrono::NaiveDate;

    fn camp_with(method: AggregationMethod) -> (CampState, u64) {
        let mut state = CampState::new();
        let d = state
            .create_discipline(NewDiscipline {
                name: "Event".to_string(),
                result_type: ResultType::MultipleAttempts,
                aggregation_method: method,
            })
            .unwrap();
        (state, d.id)
    }

    fn add_child(state: &mut CampState, name: &str) -> u64 {
        state
            .create_child(NewChild {
                name: name.to_string(),
                birth_date: NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(),
                gender: Gender::Female,
            })
            .unwrap()
            .id
    }

    fn record(state: &mut CampState, child_id: u64, discipline_id: u64, value: f64) {
        record_measurement(
            state,
            RecordMeasurement {
                child_id,
                discipline_id,
                value,
                attempt_number: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_append_checks_foreign_keys() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let child = add_child(&mut state, "Ada");

        let err = state
            .append_measurement(NewMeasurement {
                child_id: 404,
                discipline_id: d,
                value: 1.0,
                attempt_number: 1,
            })
            .unwrap_err();
        assert_eq!(err, CampError::not_found("Child", 404));

        let err = state
            .append_measurement(NewMeasurement {
                child_id: child,
                discipline_id: 405,
                value: 1.0,
                attempt_number: 1,
            })
            .unwrap_err();
        assert_eq!(err, CampError::not_found("Discipline", 405));
        assert!(state.measurements.is_empty());
    }

    #[test]
    fn test_list_measurements_joins_names_in_order() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let ada = add_child(&mut state, "Ada");
        let ben = add_child(&mut state, "Ben");
        record(&mut state, ben, d, 2.0);
        record(&mut state, ada, d, 1.0);

        let listed = state.list_measurements(d);
        let names: Vec<_> = listed.iter().map(|m| m.child_name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Ada"]);
    }

    #[test]
    fn test_scenario_long_jump_through_store() {
        let (mut state, d) = camp_with(AggregationMethod::Best);
        let a = add_child(&mut state, "A");
        for v in [3.2, 4.1, 3.9] {
            record(&mut state, a, d, v);
        }
        let results = discipline_results(&state, &state, d).unwrap();
        assert_eq!(results.results[0].aggregated_value, 4.1);
        assert_eq!(results.results[0].total_attempts, 3);
    }

    #[test]
    fn test_scenario_situps_through_store() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let b = add_child(&mut state, "B");
        record(&mut state, b, d, 10.0);
        record(&mut state, b, d, 15.0);
        let results = discipline_results(&state, &state, d).unwrap();
        assert_eq!(results.results[0].aggregated_value, 25.0);
        assert_eq!(results.results[0].total_attempts, 2);
    }

    #[test]
    fn test_scenario_archery_through_store() {
        let (mut state, d) = camp_with(AggregationMethod::Mean);
        let c = add_child(&mut state, "C");
        for v in [7.0, 9.0, 8.0] {
            record(&mut state, c, d, v);
        }
        let results = discipline_results(&state, &state, d).unwrap();
        assert_eq!(results.results[0].aggregated_value, 8.0);
        assert_eq!(results.results[0].total_attempts, 3);
    }

    #[test]
    fn test_scenario_no_measurements() {
        let (state, d) = camp_with(AggregationMethod::Mean);
        let results = discipline_results(&state, &state, d).unwrap();
        assert!(results.results.is_empty());
    }

    #[test]
    fn test_scenario_corrupted_method() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let a = add_child(&mut state, "A");
        record(&mut state, a, d, 1.0);
        state.disciplines[0].aggregation_method = "weighted".to_string();

        let err = discipline_results(&state, &state, d).unwrap_err();
        assert!(matches!(err, CampError::InvalidDiscipline(_)));
    }

    #[test]
    fn test_ranking_after_child_deleted() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let a = add_child(&mut state, "A");
        let b = add_child(&mut state, "B");
        record(&mut state, a, d, 5.0);
        record(&mut state, b, d, 3.0);

        state.delete_child(a);
        let results = discipline_results(&state, &state, d).unwrap();
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].child_name, "B");
    }

    #[test]
    fn test_child_without_measurements_is_not_ranked() {
        let (mut state, d) = camp_with(AggregationMethod::Sum);
        let a = add_child(&mut state, "A");
        let b = add_child(&mut state, "B");
        state.assign_child_to_discipline(b, d).unwrap();
        record(&mut state, a, d, 5.0);

        let results = discipline_results(&state, &state, d).unwrap();
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].child_id, a);
    }
}
