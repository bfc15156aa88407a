//! Domain models for findash

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub department: String,
    pub date: NaiveDate,
    pub revenue: f64,
    pub expenses: f64,
    /// Taken as given; not re-derived from revenue and expenses
    pub profit: f64,
}

/// Profit classification of a record against the mean profit of its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Performance {
    High,
    Low,
}

impl Performance {
    /// `High` only when profit is strictly above the mean
    pub fn classify(profit: f64, mean_profit: f64) -> Self {
        if profit > mean_profit {
            Self::High
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
        }
    }
}

impl std::str::FromStr for Performance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown performance label: {}", s)),
        }
    }
}

impl std::fmt::Display for Performance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summed metric for one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub department: String,
    pub amount: f64,
}

/// Grand totals over a record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl Totals {
    pub fn from_records(records: &[Record]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.revenue += r.revenue;
            acc.expenses += r.expenses;
            acc.profit += r.profit;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(department: &str, revenue: f64, expenses: f64, profit: f64) -> Record {
        Record {
            department: department.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            revenue,
            expenses,
            profit,
        }
    }

    #[test]
    fn test_performance_classify_strict() {
        assert_eq!(Performance::classify(11.0, 10.0), Performance::High);
        assert_eq!(Performance::classify(10.0, 10.0), Performance::Low);
        assert_eq!(Performance::classify(-5.0, 10.0), Performance::Low);
    }

    #[test]
    fn test_performance_from_str() {
        assert_eq!("HIGH".parse::<Performance>().unwrap(), Performance::High);
        assert_eq!("low".parse::<Performance>().unwrap(), Performance::Low);
        assert!("medium".parse::<Performance>().is_err());
        assert_eq!(Performance::High.to_string(), "High");
    }

    #[test]
    fn test_totals_from_records() {
        let records = vec![
            record("Sales", 100.0, 60.0, 40.0),
            record("Ops", 30.0, 50.0, -20.0),
        ];
        let totals = Totals::from_records(&records);
        assert_eq!(totals.revenue, 130.0);
        assert_eq!(totals.expenses, 110.0);
        assert_eq!(totals.profit, 20.0);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(Totals::from_records(&[]), Totals::default());
    }
}
