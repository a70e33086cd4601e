use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CampError, CampResult};
use crate::ranking::AggregationMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: u64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    /// Age in whole years on the given day.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Child-group membership. The `(child_id, group_id)` pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildGroup {
    pub child_id: u64,
    pub group_id: u64,
    pub assigned_at: DateTime<Utc>,
}

/// Child-discipline enrolment. The `(child_id, discipline_id)` pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDiscipline {
    pub child_id: u64,
    pub discipline_id: u64,
    pub assigned_at: DateTime<Utc>,
}

/// Shape of the measurements a discipline expects. Descriptive only: it
/// never changes how measurements are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultType {
    #[serde(rename = "one_time")]
    SingleResult,
    #[serde(rename = "multiple_times")]
    MultipleAttempts,
    #[serde(rename = "number")]
    CountScore,
    #[serde(rename = "multiple_numbers")]
    MultipleScores,
}

impl ResultType {
    pub const ALL: [ResultType; 4] = [
        ResultType::SingleResult,
        ResultType::MultipleAttempts,
        ResultType::CountScore,
        ResultType::MultipleScores,
    ];

    /// Parse a stored name (`one_time`, `multiple_times`, `number`,
    /// `multiple_numbers`) or its kebab-case display alias.
    pub fn parse(s: &str) -> CampResult<Self> {
        match s.trim() {
            "one_time" | "single-result" => Ok(ResultType::SingleResult),
            "multiple_times" | "multiple-attempts" => Ok(ResultType::MultipleAttempts),
            "number" | "count" | "count-score" => Ok(ResultType::CountScore),
            "multiple_numbers" | "multiple-scores" => Ok(ResultType::MultipleScores),
            other => Err(CampError::InvalidDiscipline(format!(
                "unknown result type '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::SingleResult => "one_time",
            ResultType::MultipleAttempts => "multiple_times",
            ResultType::CountScore => "number",
            ResultType::MultipleScores => "multiple_numbers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultType::SingleResult => "Single Result",
            ResultType::MultipleAttempts => "Multiple Attempts",
            ResultType::CountScore => "Count/Score",
            ResultType::MultipleScores => "Multiple Scores",
        }
    }

    /// Whether callers should ask for an attempt number when recording.
    pub fn expects_attempts(&self) -> bool {
        matches!(self, ResultType::MultipleAttempts | ResultType::MultipleScores)
    }
}

impl FromStr for ResultType {
    type Err = CampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultType::parse(s)
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discipline as persisted. `result_type` and `aggregation_method` stay raw
/// strings here; [`Discipline::try_from`] is the only way to obtain a typed
/// definition and rejects anything unrecognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineRow {
    pub id: u64,
    pub name: String,
    pub result_type: String,
    pub aggregation_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated discipline definition handed to the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: u64,
    pub name: String,
    pub result_type: ResultType,
    pub aggregation_method: AggregationMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&DisciplineRow> for Discipline {
    type Error = CampError;

    fn try_from(row: &DisciplineRow) -> Result<Self, Self::Error> {
        let with_id = |e: CampError| match e {
            CampError::InvalidDiscipline(msg) => {
                CampError::InvalidDiscipline(format!("discipline {} ({}): {}", row.id, row.name, msg))
            }
            other => other,
        };
        Ok(Discipline {
            id: row.id,
            name: row.name.clone(),
            result_type: ResultType::parse(&row.result_type).map_err(with_id)?,
            aggregation_method: AggregationMethod::parse(&row.aggregation_method).map_err(with_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// One recorded attempt. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: u64,
    pub child_id: u64,
    pub discipline_id: u64,
    pub value: f64,
    pub attempt_number: u32,
    pub recorded_at: DateTime<Utc>,
}

/// A measurement joined with its child's display name, as read by the
/// ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildMeasurement {
    pub child_id: u64,
    pub child_name: String,
    pub discipline_id: u64,
    pub value: f64,
    pub attempt_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildWithGroups {
    #[serde(flatten)]
    pub child: Child,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildWithDisciplines {
    #[serde(flatten)]
    pub child: Child,
    pub disciplines: Vec<DisciplineRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupWithChildren {
    #[serde(flatten)]
    pub group: Group,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineWithChildren {
    #[serde(flatten)]
    pub discipline: DisciplineRow,
    pub children: Vec<Child>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(result_type: &str, method: &str) -> DisciplineRow {
        DisciplineRow {
            id: 3,
            name: "Long Jump".to_string(),
            result_type: result_type.to_string(),
            aggregation_method: method.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_discipline_from_valid_row() {
        let discipline = Discipline::try_from(&row("multiple_times", "best_result")).unwrap();
        assert_eq!(discipline.result_type, ResultType::MultipleAttempts);
        assert_eq!(discipline.aggregation_method, AggregationMethod::Best);
        assert_eq!(discipline.name, "Long Jump");
    }

    #[test]
    fn test_discipline_from_corrupted_method() {
        let err = Discipline::try_from(&row("one_time", "median")).unwrap_err();
        match err {
            CampError::InvalidDiscipline(msg) => {
                assert!(msg.contains("discipline 3"));
                assert!(msg.contains("median"));
            }
            other => panic!("Expected InvalidDiscipline, got {:?}", other),
        }
    }

    #[test]
    fn test_discipline_from_corrupted_result_type() {
        let err = Discipline::try_from(&row("laps", "sum")).unwrap_err();
        assert!(matches!(err, CampError::InvalidDiscipline(_)));
    }

    #[test]
    fn test_result_type_aliases() {
        assert_eq!(ResultType::parse("single-result").unwrap(), ResultType::SingleResult);
        assert_eq!(ResultType::parse("count").unwrap(), ResultType::CountScore);
        assert_eq!(ResultType::parse("multiple-scores").unwrap(), ResultType::MultipleScores);
    }

    #[test]
    fn test_result_type_as_str_parses_back() {
        for rt in ResultType::ALL {
            assert_eq!(ResultType::parse(rt.as_str()).unwrap(), rt);
        }
    }

    #[test]
    fn test_expects_attempts() {
        assert!(!ResultType::SingleResult.expects_attempts());
        assert!(ResultType::MultipleAttempts.expects_attempts());
        assert!(!ResultType::CountScore.expects_attempts());
        assert!(ResultType::MultipleScores.expects_attempts());
    }

    #[test]
    fn test_child_age_before_and_after_birthday() {
        let child = Child {
            id: 1,
            name: "Ada".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2014, 6, 15).unwrap(),
            gender: Gender::Female,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(child.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), 9);
        assert_eq!(child.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), 10);
    }

    #[test]
    fn test_gender_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Other).unwrap(), "\"other\"");
    }
}
