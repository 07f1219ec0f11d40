//! Result matrix for long-term premium analysis

use crate::api::PlanStat;
use serde::{Deserialize, Serialize};

/// Income value marking the synthesized "no subsidy" row
pub const UNSUBSIDIZED_ROW_INCOME: i64 = -1;

/// Plan statistics and subsidy for one income in one projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCell {
    pub stats: Vec<PlanStat>,
    /// Monthly subsidy applied to `stats`
    pub aptc: f64,
}

impl AnalysisCell {
    /// Same plans priced without the subsidy
    ///
    /// Only premiums move; out-of-pocket estimates do not depend on the subsidy.
    pub fn unsubsidized(&self) -> Self {
        let stats = self
            .stats
            .iter()
            .map(|plan| PlanStat {
                premiums: plan.premiums.shifted(self.aptc),
                ..plan.clone()
            })
            .collect();
        Self { stats, aptc: 0.0 }
    }
}

/// One income level across all projection years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub income: i64,
    /// One entry per column; `None` when ineligible or the request failed
    pub values: Vec<Option<AnalysisCell>>,
}

impl AnalysisRow {
    pub fn new(income: i64) -> Self {
        Self {
            income,
            values: Vec::new(),
        }
    }

    pub fn is_unsubsidized(&self) -> bool {
        self.income == UNSUBSIDIZED_ROW_INCOME
    }

    pub fn computed_cells(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Income × projection-year matrix ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResultMatrix {
    /// One header per projection year
    pub column_headers: Vec<String>,
    pub rows: Vec<AnalysisRow>,
}

impl AnalysisResultMatrix {
    pub fn new(column_headers: Vec<String>, rows: Vec<AnalysisRow>) -> Self {
        Self { column_headers, rows }
    }

    /// Append the "no subsidy" row derived from the first income row
    ///
    /// Skipped when the first row has no data at all. Returns whether a row was added.
    pub fn append_unsubsidized_row(&mut self) -> bool {
        let Some(first) = self.rows.first() else {
            return false;
        };
        if first.computed_cells() == 0 {
            return false;
        }

        let values = (0..self.column_headers.len())
            .map(|col| {
                first
                    .values
                    .get(col)
                    .and_then(|cell| cell.as_ref())
                    .map(AnalysisCell::unsubsidized)
            })
            .collect();

        self.rows.push(AnalysisRow {
            income: UNSUBSIDIZED_ROW_INCOME,
            values,
        });
        true
    }

    /// Rows for actual incomes (synthetic row excluded)
    pub fn income_rows(&self) -> impl Iterator<Item = &AnalysisRow> {
        self.rows.iter().filter(|r| !r.is_unsubsidized())
    }

    pub fn unsubsidized_row(&self) -> Option<&AnalysisRow> {
        self.rows.iter().find(|r| r.is_unsubsidized())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&AnalysisCell> {
        self.rows.get(row)?.values.get(col)?.as_ref()
    }

    pub fn computed_cells(&self) -> usize {
        self.income_rows().map(AnalysisRow::computed_cells).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CostRange;
    use approx::assert_relative_eq;

    fn cell(min: f64, mean: f64, max: f64, aptc: f64) -> AnalysisCell {
        AnalysisCell {
            stats: vec![PlanStat {
                metal_level: "Silver".to_string(),
                total: 8,
                premiums: CostRange { min, mean, max },
                oopc: CostRange { min: 500.0, mean: 1_500.0, max: 4_000.0 },
            }],
            aptc,
        }
    }

    #[test]
    fn test_unsubsidized_adds_subsidy_to_premiums() {
        let unsubsidized = cell(100.0, 150.0, 200.0, 30.0).unsubsidized();
        let premiums = unsubsidized.stats[0].premiums;

        assert_relative_eq!(premiums.min, 130.0);
        assert_relative_eq!(premiums.mean, 180.0);
        assert_relative_eq!(premiums.max, 230.0);
        assert_relative_eq!(unsubsidized.aptc, 0.0);
        assert_relative_eq!(unsubsidized.stats[0].oopc.mean, 1_500.0);
    }

    #[test]
    fn test_unsubsidized_row_follows_first_row() {
        let mut matrix = AnalysisResultMatrix::new(
            vec!["Y0".into(), "Y1".into()],
            vec![
                AnalysisRow {
                    income: 20_000,
                    values: vec![None, Some(cell(10.0, 20.0, 30.0, 5.0))],
                },
                AnalysisRow {
                    income: 40_000,
                    values: vec![Some(cell(10.0, 20.0, 30.0, 1.0)), Some(cell(10.0, 20.0, 30.0, 1.0))],
                },
            ],
        );

        assert!(matrix.append_unsubsidized_row());
        let row = matrix.unsubsidized_row().unwrap();
        assert_eq!(row.income, UNSUBSIDIZED_ROW_INCOME);
        // The first row had no data for Y0, so neither does the synthetic row
        assert!(row.values[0].is_none());
        assert_relative_eq!(matrix.cell(2, 1).unwrap().stats[0].premiums.min, 15.0);
        assert_eq!(matrix.computed_cells(), 3);
    }

    #[test]
    fn test_no_unsubsidized_row_without_data() {
        let mut matrix = AnalysisResultMatrix::new(
            vec!["Y0".into()],
            vec![AnalysisRow {
                income: 20_000,
                values: vec![None],
            }],
        );
        assert!(!matrix.append_unsubsidized_row());
        assert_eq!(matrix.rows.len(), 1);
    }
}
