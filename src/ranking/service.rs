use serde::{Deserialize, Serialize};

use super::aggregation::AggregationMethod;
use super::engine::{compute_ranking, AggregateResult};
use super::validation::validate_measurement;
use crate::camp::{Measurement, ResultType};
use crate::error::{CampError, CampResult};
use crate::store::{DisciplineCatalog, MeasurementStore, NewMeasurement};

/// Request to record one attempt. `attempt_number` defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeasurement {
    pub child_id: u64,
    pub discipline_id: u64,
    pub value: f64,
    #[serde(default)]
    pub attempt_number: Option<u32>,
}

/// A discipline's metadata together with its ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineResults {
    pub id: u64,
    pub name: String,
    pub result_type: ResultType,
    pub aggregation_method: AggregationMethod,
    pub results: Vec<AggregateResult>,
}

/// Look up a discipline, read all of its measurements and rank them.
///
/// The aggregation method in force now applies to every historical
/// measurement. Fails with `NotFound` for an unknown discipline and with
/// `InvalidDiscipline` when the stored definition is corrupt; no partial
/// ranking is returned in either case.
pub fn discipline_results<C, M>(
    catalog: &C,
    store: &M,
    discipline_id: u64,
) -> CampResult<DisciplineResults>
where
    C: DisciplineCatalog + ?Sized,
    M: MeasurementStore + ?Sized,
{
    let discipline = catalog.get_discipline(discipline_id)?;
    let measurements = store.list_measurements(discipline_id);
    let results = compute_ranking(&discipline, &measurements)?;

    Ok(DisciplineResults {
        id: discipline.id,
        name: discipline.name,
        result_type: discipline.result_type,
        aggregation_method: discipline.aggregation_method,
        results,
    })
}

/// Append a measurement. Never updates or deduplicates: recording the same
/// child, discipline and attempt number twice yields two measurements.
pub fn record_measurement<M>(store: &mut M, input: RecordMeasurement) -> CampResult<Measurement>
where
    M: MeasurementStore + ?Sized,
{
    validate_measurement(&input).map_err(|errors| CampError::Validation(errors.join("; ")))?;

    let measurement = store.append_measurement(NewMeasurement {
        child_id: input.child_id,
        discipline_id: input.discipline_id,
        value: input.value,
        attempt_number: input.attempt_number.unwrap_or(1),
    })?;

    tracing::info!(
        measurement_id = measurement.id,
        child_id = measurement.child_id,
        discipline_id = measurement.discipline_id,
        value = measurement.value,
        attempt = measurement.attempt_number,
        "Recorded measurement"
    );

    Ok(measurement)
}
