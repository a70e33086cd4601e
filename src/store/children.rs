use chrono::{NaiveDate, Utc};

use super::filter::{filter_children, ChildFilter};
use super::types::CampState;
use crate::camp::{Child, ChildWithDisciplines, ChildWithGroups, Gender};
use crate::error::{CampError, CampResult};
use crate::ranking::validate_name;

#[derive(Debug, Clone, PartialEq)]
pub struct NewChild {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildUpdate {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl CampState {
    pub fn create_child(&mut self, input: NewChild) -> CampResult<Child> {
        validate_name("name", &input.name).map_err(CampError::Validation)?;

        let now = Utc::now();
        let child = Child {
            id: Self::issue_id(&mut self.last_ids.child),
            name: input.name,
            birth_date: input.birth_date,
            gender: input.gender,
            created_at: now,
            updated_at: now,
        };
        self.children.push(child.clone());

        tracing::info!(child_id = child.id, name = %child.name, "Created child");
        Ok(child)
    }

    /// All children in creation order, optionally filtered
    pub fn get_children(&self, filter: Option<&ChildFilter>) -> Vec<Child> {
        match filter {
            Some(f) if !f.is_empty() => filter_children(&self.children, f),
            _ => self.children.clone(),
        }
    }

    pub fn get_child(&self, id: u64) -> Option<&Child> {
        self.children.iter().find(|c| c.id == id)
    }

    pub(crate) fn require_child(&self, id: u64) -> CampResult<&Child> {
        self.get_child(id).ok_or(CampError::not_found("Child", id))
    }

    /// Apply a partial update. `updated_at` is bumped even when no field
    /// changes.
    pub fn update_child(&mut self, id: u64, update: ChildUpdate) -> CampResult<Child> {
        if let Some(ref name) = update.name {
            validate_name("name", name).map_err(CampError::Validation)?;
        }

        let child = self
            .children
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CampError::not_found("Child", id))?;

        if let Some(name) = update.name {
            child.name = name;
        }
        if let Some(birth_date) = update.birth_date {
            child.birth_date = birth_date;
        }
        if let Some(gender) = update.gender {
            child.gender = gender;
        }
        child.updated_at = Utc::now();

        tracing::info!(child_id = id, "Updated child");
        Ok(child.clone())
    }

    /// Delete a child together with its memberships, enrolments and
    /// measurements. Returns false if the child did not exist.
    pub fn delete_child(&mut self, id: u64) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.id != id);
        if self.children.len() == before {
            return false;
        }

        self.child_groups.retain(|cg| cg.child_id != id);
        self.child_disciplines.retain(|cd| cd.child_id != id);
        let measurements_before = self.measurements.len();
        self.measurements.retain(|m| m.child_id != id);

        tracing::info!(
            child_id = id,
            measurements_removed = measurements_before - self.measurements.len(),
            "Deleted child"
        );
        true
    }

    pub fn get_child_with_groups(&self, id: u64) -> Option<ChildWithGroups> {
        let child = self.get_child(id)?.clone();
        let groups = self
            .child_groups
            .iter()
            .filter(|cg| cg.child_id == id)
            .filter_map(|cg| self.get_group(cg.group_id).cloned())
            .collect();
        Some(ChildWithGroups { child, groups })
    }

    pub fn get_child_with_disciplines(&self, id: u64) -> Option<ChildWithDisciplines> {
        let child = self.get_child(id)?.clone();
        let disciplines = self
            .child_disciplines
            .iter()
            .filter(|cd| cd.child_id == id)
            .filter_map(|cd| self.get_discipline_row(cd.discipline_id).cloned())
            .collect();
        Some(ChildWithDisciplines { child, disciplines })
    }
}
