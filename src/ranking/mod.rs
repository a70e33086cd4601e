pub mod aggregation;
pub mod engine;
pub mod service;
pub mod validation;

pub use aggregation::AggregationMethod;
pub use engine::{compute_ranking, AggregateResult};
pub use service::{discipline_results, record_measurement, DisciplineResults, RecordMeasurement};
pub use validation::{validate_measurement, validate_name};
