pub mod catalog;
pub mod children;
pub mod disciplines;
pub mod filter;
pub mod groups;
pub mod storage;
pub mod types;

pub use catalog::{DisciplineCatalog, MeasurementStore, NewMeasurement};
pub use children::{ChildUpdate, NewChild};
pub use disciplines::{DisciplineUpdate, NewDiscipline};
pub use filter::{filter_children, ChildFilter};
pub use storage::{get_store_path, load_state, save_state};
pub use types::{CampState, IdCounters, STORE_VERSION};
