use chrono::Utc;

use super::types::CampState;
use crate::camp::{ChildGroup, Group, GroupWithChildren};
use crate::error::{CampError, CampResult};
use crate::ranking::validate_name;

impl CampState {
    /// Create a group. Group names are unique.
    pub fn create_group(&mut self, name: &str) -> CampResult<Group> {
        validate_name("name", name).map_err(CampError::Validation)?;
        self.ensure_group_name_free(name, None)?;

        let now = Utc::now();
        let group = Group {
            id: Self::issue_id(&mut self.last_ids.group),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.groups.push(group.clone());

        tracing::info!(group_id = group.id, name = %group.name, "Created group");
        Ok(group)
    }

    /// All groups in creation order
    pub fn get_groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get_group(&self, id: u64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn update_group(&mut self, id: u64, name: &str) -> CampResult<Group> {
        validate_name("name", name).map_err(CampError::Validation)?;
        self.ensure_group_name_free(name, Some(id))?;

        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(CampError::not_found("Group", id))?;
        group.name = name.to_string();
        group.updated_at = Utc::now();

        tracing::info!(group_id = id, name = %name, "Renamed group");
        Ok(group.clone())
    }

    /// Delete a group and its memberships. Children are kept.
    /// Returns false if the group did not exist.
    pub fn delete_group(&mut self, id: u64) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return false;
        }
        self.child_groups.retain(|cg| cg.group_id != id);

        tracing::info!(group_id = id, "Deleted group");
        true
    }

    pub fn get_group_with_children(&self, id: u64) -> Option<GroupWithChildren> {
        let group = self.get_group(id)?.clone();
        let children = self
            .child_groups
            .iter()
            .filter(|cg| cg.group_id == id)
            .filter_map(|cg| self.get_child(cg.child_id).cloned())
            .collect();
        Some(GroupWithChildren { group, children })
    }

    pub fn assign_child_to_group(&mut self, child_id: u64, group_id: u64) -> CampResult<ChildGroup> {
        self.require_child(child_id)?;
        if self.get_group(group_id).is_none() {
            return Err(CampError::not_found("Group", group_id));
        }
        if self
            .child_groups
            .iter()
            .any(|cg| cg.child_id == child_id && cg.group_id == group_id)
        {
            return Err(CampError::Conflict(format!(
                "Child {} is already assigned to group {}",
                child_id, group_id
            )));
        }

        let membership = ChildGroup {
            child_id,
            group_id,
            assigned_at: Utc::now(),
        };
        self.child_groups.push(membership.clone());

        tracing::info!(child_id, group_id, "Assigned child to group");
        Ok(membership)
    }

    /// Returns false if there was no such membership.
    pub fn remove_child_from_group(&mut self, child_id: u64, group_id: u64) -> bool {
        let before = self.child_groups.len();
        self.child_groups
            .retain(|cg| !(cg.child_id == child_id && cg.group_id == group_id));
        let removed = self.child_groups.len() != before;
        if removed {
            tracing::info!(child_id, group_id, "Removed child from group");
        }
        removed
    }

    fn ensure_group_name_free(&self, name: &str, except: Option<u64>) -> CampResult<()> {
        let taken = self
            .groups
            .iter()
            .any(|g| g.name == name && Some(g.id) != except);
        if taken {
            Err(CampError::Conflict(format!("Group name '{}' is already taken", name)))
        } else {
            Ok(())
        }
    }
}
