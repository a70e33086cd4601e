use serde::{Deserialize, Serialize};

use crate::camp::{Child, ChildDiscipline, ChildGroup, DisciplineRow, Group, Measurement};

pub const STORE_VERSION: u32 = 1;

/// Last surrogate id issued per table. Ids are never reused, even after
/// deletions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdCounters {
    pub child: u64,
    pub group: u64,
    pub discipline: u64,
    pub measurement: u64,
}

/// Whole camp database as persisted in the store file.
///
/// Tables keep insertion order, which doubles as creation order for the
/// list operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampState {
    pub version: u32,
    #[serde(default)]
    pub last_ids: IdCounters,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub disciplines: Vec<DisciplineRow>,
    #[serde(default)]
    pub child_groups: Vec<ChildGroup>,
    #[serde(default)]
    pub child_disciplines: Vec<ChildDiscipline>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl Default for CampState {
    fn default() -> Self {
        Self::new()
    }
}

impl CampState {
    /// Create a new empty store with the current version
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            last_ids: IdCounters::default(),
            children: Vec::new(),
            groups: Vec::new(),
            disciplines: Vec::new(),
            child_groups: Vec::new(),
            child_disciplines: Vec::new(),
            measurements: Vec::new(),
        }
    }

    pub(crate) fn issue_id(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }
}
