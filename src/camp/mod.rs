pub mod types;

pub use types::{
    Child, ChildDiscipline, ChildGroup, ChildMeasurement, ChildWithDisciplines, ChildWithGroups,
    Discipline, DisciplineRow, DisciplineWithChildren, Gender, Group, GroupWithChildren,
    Measurement, ResultType,
};
