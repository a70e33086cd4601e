use crate::error::{CampError, CampResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a child's measurements collapse into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationMethod {
    #[serde(rename = "best_result")]
    Best,
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "mean")]
    Mean,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 3] = [
        AggregationMethod::Best,
        AggregationMethod::Sum,
        AggregationMethod::Mean,
    ];

    /// Parse a stored or user-supplied method name.
    ///
    /// Accepts the stored names (`best_result`, `sum`, `mean`) and the short
    /// alias `best`. Anything else is an invalid discipline definition.
    pub fn parse(s: &str) -> CampResult<Self> {
        match s.trim() {
            "best_result" | "best" => Ok(AggregationMethod::Best),
            "sum" => Ok(AggregationMethod::Sum),
            "mean" => Ok(AggregationMethod::Mean),
            other => Err(CampError::InvalidDiscipline(format!(
                "unknown aggregation method '{}'",
                other
            ))),
        }
    }

    /// Name as persisted in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Best => "best_result",
            AggregationMethod::Sum => "sum",
            AggregationMethod::Mean => "mean",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregationMethod::Best => "Best Result",
            AggregationMethod::Sum => "Sum",
            AggregationMethod::Mean => "Average",
        }
    }

    /// Short caption shown next to an aggregated value.
    pub fn value_label(&self) -> &'static str {
        match self {
            AggregationMethod::Best => "Best",
            AggregationMethod::Sum => "Total",
            AggregationMethod::Mean => "Average",
        }
    }

    /// Collapse one child's values. The engine never passes an empty slice;
    /// if one arrives anyway the result is 0.0 for every method.
    pub fn aggregate(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            // Literal maximum, also for timed disciplines.
            AggregationMethod::Best => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregationMethod::Sum => values.iter().sum(),
            AggregationMethod::Mean => {
                let n = values.len() as f64;
                let sum: f64 = values.iter().sum();
                if sum.is_finite() {
                    sum / n
                } else {
                    // Finite inputs whose sum overflows
                    values.iter().map(|v| v / n).sum()
                }
            }
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = CampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationMethod::parse(s)
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stored_names() {
        assert_eq!(AggregationMethod::parse("best_result").unwrap(), AggregationMethod::Best);
        assert_eq!(AggregationMethod::parse("sum").unwrap(), AggregationMethod::Sum);
        assert_eq!(AggregationMethod::parse("mean").unwrap(), AggregationMethod::Mean);
    }

    #[test]
    fn test_parse_best_alias_and_whitespace() {
        assert_eq!(AggregationMethod::parse(" best ").unwrap(), AggregationMethod::Best);
    }

    #[test]
    fn test_parse_unknown_is_invalid_discipline() {
        let err = AggregationMethod::parse("median").unwrap_err();
        assert!(matches!(err, CampError::InvalidDiscipline(_)));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(AggregationMethod::parse("SUM").is_err());
    }

    #[test]
    fn test_as_str_parses_back() {
        for method in AggregationMethod::ALL {
            assert_eq!(AggregationMethod::parse(method.as_str()).unwrap(), method);
        }
    }

    #[test]
    fn test_best_takes_maximum() {
        assert_eq!(AggregationMethod::Best.aggregate(&[3.2, 4.1, 3.9]), 4.1);
    }

    #[test]
    fn test_best_with_negative_values() {
        assert_eq!(AggregationMethod::Best.aggregate(&[-5.0, -2.5, -9.0]), -2.5);
    }

    #[test]
    fn test_sum() {
        assert_eq!(AggregationMethod::Sum.aggregate(&[10.0, 15.0]), 25.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(AggregationMethod::Mean.aggregate(&[7.0, 9.0, 8.0]), 8.0);
    }

    #[test]
    fn test_mean_of_large_values_stays_finite() {
        assert_eq!(AggregationMethod::Mean.aggregate(&[1e308, 1e308]), 1e308);
        let mean = AggregationMethod::Mean.aggregate(&[f64::MAX, f64::MAX, 0.0]);
        assert!(mean.is_finite());
        assert!(mean > 1e308);
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(AggregationMethod::Mean.aggregate(&[6.5]), 6.5);
    }

    #[test]
    fn test_empty_values() {
        for method in AggregationMethod::ALL {
            assert_eq!(method.aggregate(&[]), 0.0);
        }
    }

    #[test]
    fn test_serde_uses_stored_names() {
        let json = serde_json::to_string(&AggregationMethod::Best).unwrap();
        assert_eq!(json, "\"best_result\"");
        let parsed: AggregationMethod = serde_json::from_str("\"mean\"").unwrap();
        assert_eq!(parsed, AggregationMethod::Mean);
    }
}
