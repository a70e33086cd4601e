use chrono::Utc;

use super::types::CampState;
use crate::camp::{ChildDiscipline, DisciplineRow, DisciplineWithChildren, ResultType};
use crate::error::{CampError, CampResult};
use crate::ranking::{validate_name, AggregationMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscipline {
    pub name: String,
    pub result_type: ResultType,
    pub aggregation_method: AggregationMethod,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisciplineUpdate {
    pub name: Option<String>,
    pub result_type: Option<ResultType>,
    pub aggregation_method: Option<AggregationMethod>,
}

impl CampState {
    pub fn create_discipline(&mut self, input: NewDiscipline) -> CampResult<DisciplineRow> {
        validate_name("name", &input.name).map_err(CampError::Validation)?;

        let now = Utc::now();
        let row = DisciplineRow {
            id: Self::issue_id(&mut self.last_ids.discipline),
            name: input.name,
            result_type: input.result_type.as_str().to_string(),
            aggregation_method: input.aggregation_method.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.disciplines.push(row.clone());

        tracing::info!(
            discipline_id = row.id,
            name = %row.name,
            method = %row.aggregation_method,
            "Created discipline"
        );
        Ok(row)
    }

    /// All disciplines in creation order
    pub fn get_disciplines(&self) -> &[DisciplineRow] {
        &self.disciplines
    }

    pub fn get_discipline_row(&self, id: u64) -> Option<&DisciplineRow> {
        self.disciplines.iter().find(|d| d.id == id)
    }

    /// Changing the aggregation method re-ranks every measurement already
    /// recorded for the discipline.
    pub fn update_discipline(&mut self, id: u64, update: DisciplineUpdate) -> CampResult<DisciplineRow> {
        if let Some(ref name) = update.name {
            validate_name("name", name).map_err(CampError::Validation)?;
        }

        let row = self
            .disciplines
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(CampError::not_found("Discipline", id))?;

        if let Some(name) = update.name {
            row.name = name;
        }
        if let Some(result_type) = update.result_type {
            row.result_type = result_type.as_str().to_string();
        }
        if let Some(method) = update.aggregation_method {
            row.aggregation_method = method.as_str().to_string();
        }
        row.updated_at = Utc::now();

        tracing::info!(discipline_id = id, "Updated discipline");
        Ok(row.clone())
    }

    /// Delete a discipline with its enrolments and measurements.
    pub fn delete_discipline(&mut self, id: u64) -> CampResult<DisciplineRow> {
        let pos = self
            .disciplines
            .iter()
            .position(|d| d.id == id)
            .ok_or(CampError::not_found("Discipline", id))?;
        let row = self.disciplines.remove(pos);

        self.child_disciplines.retain(|cd| cd.discipline_id != id);
        let measurements_before = self.measurements.len();
        self.measurements.retain(|m| m.discipline_id != id);

        tracing::info!(
            discipline_id = id,
            measurements_removed = measurements_before - self.measurements.len(),
            "Deleted discipline"
        );
        Ok(row)
    }

    pub fn get_discipline_with_children(&self, id: u64) -> CampResult<DisciplineWithChildren> {
        let discipline = self
            .get_discipline_row(id)
            .ok_or(CampError::not_found("Discipline", id))?
            .clone();
        let children = self
            .child_disciplines
            .iter()
            .filter(|cd| cd.discipline_id == id)
            .filter_map(|cd| self.get_child(cd.child_id).cloned())
            .collect();
        Ok(DisciplineWithChildren { discipline, children })
    }

    /// Enrol a child. Enrolment is informational; results can be recorded
    /// without it.
    pub fn assign_child_to_discipline(
        &mut self,
        child_id: u64,
        discipline_id: u64,
    ) -> CampResult<ChildDiscipline> {
        self.require_child(child_id)?;
        if self.get_discipline_row(discipline_id).is_none() {
            return Err(CampError::not_found("Discipline", discipline_id));
        }
        if self
            .child_disciplines
            .iter()
            .any(|cd| cd.child_id == child_id && cd.discipline_id == discipline_id)
        {
            return Err(CampError::Conflict(format!(
                "Child {} is already enrolled in discipline {}",
                child_id, discipline_id
            )));
        }

        let enrolment = ChildDiscipline {
            child_id,
            discipline_id,
            assigned_at: Utc::now(),
        };
        self.child_disciplines.push(enrolment.clone());

        tracing::info!(child_id, discipline_id, "Enrolled child in discipline");
        Ok(enrolment)
    }

    /// Remove an enrolment. Recorded measurements are kept.
    pub fn remove_child_from_discipline(
        &mut self,
        child_id: u64,
        discipline_id: u64,
    ) -> CampResult<ChildDiscipline> {
        let pos = self
            .child_disciplines
            .iter()
            .position(|cd| cd.child_id == child_id && cd.discipline_id == discipline_id)
            .ok_or(CampError::not_found("Enrolment of child", child_id))?;
        let enrolment = self.child_disciplines.remove(pos);

        tracing::info!(child_id, discipline_id, "Withdrew child from discipline");
        Ok(enrolment)
    }
}
