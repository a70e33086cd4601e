use chrono::NaiveDate;

use crate::camp::{Child, Gender};

/// Criteria for listing children. Every criterion that is set must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildFilter {
    /// Case-insensitive substring of the child's name
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl ChildFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.birth_date.is_none() && self.gender.is_none()
    }

    pub fn matches(&self, child: &Child) -> bool {
        if let Some(ref needle) = self.name {
            if !child.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(date) = self.birth_date {
            if child.birth_date != date {
                return false;
            }
        }
        if let Some(gender) = self.gender {
            if child.gender != gender {
                return false;
            }
        }
        true
    }
}

/// Keep only the children matching `filter`, preserving order
pub fn filter_children<'a, I>(children: I, filter: &ChildFilter) -> Vec<Child>
where
    I: IntoIterator<Item = &'a Child>,
{
    children
        .into_iter()
        .filter(|child| filter.matches(child))
        .cloned()
        .collect()
}
