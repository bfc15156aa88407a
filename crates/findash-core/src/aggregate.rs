//! KPI aggregation over a record set
//!
//! All functions are pure: they read the loaded records and return new values.
//! Department groupings come back ordered by department name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{CategoryTotal, Performance, Record, Totals};

/// A record from the date-sorted set together with its performance label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecord {
    pub record: Record,
    pub performance: Performance,
}

/// Everything the charts, narrative and workbook need from one record set
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub totals: Totals,
    pub revenue_by_department: Vec<CategoryTotal>,
    pub profit_by_department: Vec<CategoryTotal>,
    /// Records sorted ascending by date, labeled against `mean_profit`
    pub records: Vec<LabeledRecord>,
    pub mean_profit: f64,
}

impl FinancialSummary {
    /// Compute every aggregate for a non-empty record set
    pub fn compute(records: &[Record]) -> Result<Self> {
        let mean_profit =
            mean_profit(records).ok_or_else(|| Error::InvalidData("no records".into()))?;

        let sorted = sort_by_date(records);

        Ok(Self {
            totals: Totals::from_records(records),
            revenue_by_department: sum_by_department(records, |r| r.revenue),
            profit_by_department: sum_by_department(records, |r| r.profit),
            records: classify_performance(sorted, mean_profit),
            mean_profit,
        })
    }

    /// Number of distinct departments
    pub fn department_count(&self) -> usize {
        self.revenue_by_department.len()
    }

    /// Count of (High, Low) labeled records
    pub fn performance_counts(&self) -> (usize, usize) {
        let high = self
            .records
            .iter()
            .filter(|r| r.performance == Performance::High)
            .count();
        (high, self.records.len() - high)
    }
}

/// Sum a metric per department; one entry per distinct department
pub fn sum_by_department<F>(records: &[Record], metric: F) -> Vec<CategoryTotal>
where
    F: Fn(&Record) -> f64,
{
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *sums.entry(record.department.as_str()).or_insert(0.0) += metric(record);
    }

    sums.into_iter()
        .map(|(department, amount)| CategoryTotal {
            department: department.to_string(),
            amount,
        })
        .collect()
}

/// Copy of the records sorted ascending by date; equal dates keep file order
pub fn sort_by_date(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);
    sorted
}

/// Mean profit, or None for an empty set
pub fn mean_profit(records: &[Record]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|r| r.profit).sum();
    Some(total / records.len() as f64)
}

/// Label each record High/Low against a precomputed mean
pub fn classify_performance(records: Vec<Record>, mean_profit: f64) -> Vec<LabeledRecord> {
    records
        .into_iter()
        .map(|record| {
            let performance = Performance::classify(record.profit, mean_profit);
            LabeledRecord {
                record,
                performance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(department: &str, day: u32, revenue: f64, profit: f64) -> Record {
        Record {
            department: department.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            revenue,
            expenses: revenue - profit,
            profit,
        }
    }

    fn sample_sets() -> Vec<Vec<Record>> {
        vec![
            vec![record("Sales", 1, 100.0, 40.0)],
            vec![
                record("Sales", 2, 100.0, 40.0),
                record("Sales", 1, 50.0, 10.0),
                record("Ops", 1, 30.0, -5.0),
            ],
            vec![
                record("B", 3, 12.5, 2.5),
                record("A", 3, 7.25, 7.25),
                record("C", 1, 0.0, -1.0),
                record("A", 2, 99.99, 33.33),
                record("B", 5, 1000.0, 100.0),
            ],
        ]
    }

    #[test]
    fn test_category_revenue_partitions_total() {
        for records in sample_sets() {
            let summary = FinancialSummary::compute(&records).unwrap();
            let by_department: f64 = summary
                .revenue_by_department
                .iter()
                .map(|c| c.amount)
                .sum();
            assert!((by_department - summary.totals.revenue).abs() < 1e-9);

            let profit_by_department: f64 =
                summary.profit_by_department.iter().map(|c| c.amount).sum();
            assert!((profit_by_department - summary.totals.profit).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_entry_per_department_sorted_by_name() {
        let records = &sample_sets()[2];
        let totals = sum_by_department(records, |r| r.revenue);
        let names: Vec<&str> = totals.iter().map(|c| c.department.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!((totals[0].amount - 107.24).abs() < 1e-9);
    }

    #[test]
    fn test_performance_covers_every_record() {
        for records in sample_sets() {
            let summary = FinancialSummary::compute(&records).unwrap();
            let (high, low) = summary.performance_counts();
            assert_eq!(high + low, records.len());

            for labeled in &summary.records {
                let expected = labeled.record.profit > summary.mean_profit;
                assert_eq!(labeled.performance == Performance::High, expected);
            }
        }
    }

    #[test]
    fn test_profit_equal_to_mean_is_low() {
        let records = vec![record("A", 1, 10.0, 5.0), record("B", 2, 10.0, 5.0)];
        let summary = FinancialSummary::compute(&records).unwrap();
        assert_eq!(summary.performance_counts(), (0, 2));
    }

    #[test]
    fn test_sort_by_date_stable() {
        let records = vec![
            record("Late", 9, 1.0, 1.0),
            record("First", 1, 1.0, 1.0),
            record("Second", 1, 1.0, 1.0),
            record("Mid", 5, 1.0, 1.0),
        ];
        let sorted = sort_by_date(&records);
        let names: Vec<&str> = sorted.iter().map(|r| r.department.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Mid", "Late"]);
    }

    #[test]
    fn test_sort_by_date_idempotent() {
        for records in sample_sets() {
            let once = sort_by_date(&records);
            let twice = sort_by_date(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_sort_does_not_touch_input() {
        let records = sample_sets().remove(1);
        let before = records.clone();
        let _ = FinancialSummary::compute(&records).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_compute_empty_is_error() {
        assert!(matches!(
            FinancialSummary::compute(&[]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_sales_ops_scenario() {
        let records = vec![
            record("Sales", 1, 100.0, 40.0),
            record("Sales", 2, 50.0, 10.0),
            record("Ops", 1, 30.0, 5.0),
        ];
        let summary = FinancialSummary::compute(&records).unwrap();

        assert_eq!(summary.totals.revenue, 180.0);
        assert_eq!(summary.department_count(), 2);
        assert_eq!(
            summary.revenue_by_department,
            vec![
                CategoryTotal {
                    department: "Ops".to_string(),
                    amount: 30.0
                },
                CategoryTotal {
                    department: "Sales".to_string(),
                    amount: 150.0
                },
            ]
        );
    }
}
