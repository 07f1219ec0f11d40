//! Long-term premium analysis across projected years and income levels
//!
//! One pass over years × incomes. Cells run strictly one after another with a pacing
//! delay between them; the two requests inside a cell run concurrently. Individual
//! cell failures leave an empty cell and never abort the run.

use super::labels::{household_label, needs_initials};
use super::matrix::{AnalysisCell, AnalysisResultMatrix, AnalysisRow};
use super::state::{project_household, ProjectedYear};
use crate::api::{
    fallback, ApiHousehold, EstimateRequest, FallbackNotice, FallbackPolicy, Market, MarketplaceApi, Place,
    PlanStatsRequest,
};
use crate::config::ForecastConfig;
use crate::error::{ApiError, ForecastError, Result};
use crate::household::{FutureEvent, Household, Person};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

pub const STATUS_INITIALIZING: &str = "Initializing analysis...";
pub const STATUS_STOPPED: &str = "Analysis stopped by user.";

/// Inclusive income range for the long-term analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRange {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl Default for IncomeRange {
    fn default() -> Self {
        Self {
            start: 50_000,
            end: 150_000,
            step: 25_000,
        }
    }
}

impl IncomeRange {
    /// Incomes from `start` to `end` inclusive, `step` apart
    pub fn incomes(&self) -> Result<Vec<i64>> {
        if self.start < 0 {
            return Err(ForecastError::NegativeIncome(self.start));
        }
        if self.step <= 0 {
            return Err(ForecastError::InvalidIncomeStep(self.step));
        }

        let mut incomes: Vec<i64> = (self.start..=self.end).step_by(self.step as usize).collect();
        if incomes.is_empty() && self.start <= self.end {
            incomes.push(self.start);
        }
        if incomes.is_empty() {
            return Err(ForecastError::EmptyIncomeRange);
        }
        Ok(incomes)
    }
}

/// Everything needed to plan a long-term analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub household: Household,
    pub future_events: Vec<FutureEvent>,
    pub income_range: IncomeRange,
    pub coverage_year: i32,
    pub place: Option<Place>,
}

/// Large runs need explicit confirmation before any request goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreflightWarning {
    pub total_calls: usize,
    pub estimated_seconds: u64,
}

impl fmt::Display for PreflightWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "This analysis will make {} API calls and may take about {} seconds.",
            self.total_calls, self.estimated_seconds
        )
    }
}

/// Projected years, incomes and headers for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub incomes: Vec<i64>,
    pub years: Vec<ProjectedYear>,
    pub headers: Vec<String>,
    pub force_initials: bool,
    pub coverage_year: i32,
    pub place: Place,
}

impl AnalysisPlan {
    /// Project the household and lay out the matrix; no requests are made
    pub fn build(request: &AnalysisRequest, config: &ForecastConfig) -> Result<Self> {
        let place = request.place.clone().ok_or(ForecastError::LocationUnset)?;
        let incomes = request.income_range.incomes()?;

        let years = project_household(&request.household, &request.future_events, config);
        let force_initials = needs_initials(&years);
        let headers = years
            .iter()
            .map(|year| household_label(&year.active_members(), force_initials))
            .collect();

        Ok(Self {
            incomes,
            years,
            headers,
            force_initials,
            coverage_year: request.coverage_year,
            place,
        })
    }

    pub fn total_calls(&self) -> usize {
        self.incomes.len() * self.years.len()
    }

    pub fn preflight_warning(&self, config: &ForecastConfig) -> Option<PreflightWarning> {
        let total_calls = self.total_calls();
        (total_calls > config.preflight_call_threshold).then(|| PreflightWarning {
            total_calls,
            estimated_seconds: config.estimated_seconds(total_calls),
        })
    }
}

/// Cells finished so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Live feedback for one successfully computed cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellLogEntry {
    pub ages: Vec<u32>,
    pub income: i64,
    pub subsidy: f64,
}

impl fmt::Display for CellLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ages: Vec<String> = self.ages.iter().map(u32::to_string).collect();
        write!(
            f,
            "Ages: {}\nIncome: {}\nSubsidy: {}",
            ages.join(", "),
            format_currency(self.income as f64),
            format_currency(self.subsidy)
        )
    }
}

/// Whole-dollar US currency, e.g. `$1,234`
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Receives progress while an analysis runs
pub trait AnalysisObserver {
    fn on_status(&mut self, _message: &str) {}
    fn on_progress(&mut self, _progress: Progress) {}
    fn on_cell(&mut self, _entry: &CellLogEntry) {}
    /// Progress and log state can be cleared
    fn on_finished(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {}

/// Completed analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub matrix: AnalysisResultMatrix,
    /// Set when any cell had to use an earlier coverage year
    pub fallback: Option<FallbackNotice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisReport),
    /// Cancelled by the caller; partial results are discarded
    Stopped { completed_cells: usize },
}

/// Runs an [`AnalysisPlan`] against the marketplace
pub struct AnalysisEngine<'a, A> {
    api: &'a A,
    config: ForecastConfig,
    fallback: FallbackPolicy,
}

impl<'a, A: MarketplaceApi> AnalysisEngine<'a, A> {
    pub fn new(api: &'a A, config: ForecastConfig, fallback: FallbackPolicy) -> Self {
        Self { api, config, fallback }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Plan a run; see [`AnalysisPlan::build`]
    pub fn plan(&self, request: &AnalysisRequest) -> Result<AnalysisPlan> {
        AnalysisPlan::build(request, &self.config)
    }

    /// Execute every cell of `plan`
    ///
    /// `cancel` is checked before each year and before each cell. A request already in
    /// flight finishes, but its result is dropped along with everything else.
    pub async fn run(
        &self,
        plan: &AnalysisPlan,
        cancel: &CancellationToken,
        observer: &mut dyn AnalysisObserver,
    ) -> AnalysisOutcome {
        let total = plan.total_calls();
        log::info!(
            "Starting analysis: {} years x {} incomes for coverage year {}",
            plan.years.len(),
            plan.incomes.len(),
            plan.coverage_year
        );
        observer.on_status(STATUS_INITIALIZING);
        observer.on_progress(Progress { completed: 0, total });

        let mut rows: Vec<AnalysisRow> = plan.incomes.iter().map(|&income| AnalysisRow::new(income)).collect();
        let mut fallback_notice: Option<FallbackNotice> = None;
        let mut completed = 0;

        'years: for year in &plan.years {
            if cancel.is_cancelled() {
                break;
            }
            let members = year.active_members();
            let eligible = year.has_eligible_member();

            for row in rows.iter_mut() {
                if cancel.is_cancelled() {
                    break 'years;
                }

                let cell = if eligible {
                    match self.fetch_cell(plan, year, &members, row.income).await {
                        Ok((cell, notice)) => {
                            if fallback_notice.is_none() {
                                fallback_notice = notice;
                            }
                            observer.on_cell(&CellLogEntry {
                                ages: members.iter().map(|p| p.age).collect(),
                                income: row.income,
                                subsidy: cell.aptc,
                            });
                            Some(cell)
                        }
                        Err(e) => {
                            log::error!(
                                "Failed API call for income {} in year +{}: {}",
                                row.income,
                                year.offset,
                                e
                            );
                            None
                        }
                    }
                } else {
                    log::debug!("Year +{} has no eligible members, skipping income {}", year.offset, row.income);
                    None
                };

                row.values.push(cell);
                completed += 1;
                observer.on_progress(Progress { completed, total });
                tokio::time::sleep(self.config.cell_delay()).await;
            }
        }

        if cancel.is_cancelled() {
            log::info!("Analysis stopped after {} of {} cells", completed, total);
            observer.on_status(STATUS_STOPPED);
            return AnalysisOutcome::Stopped {
                completed_cells: completed,
            };
        }

        let mut matrix = AnalysisResultMatrix::new(plan.headers.clone(), rows);
        matrix.append_unsubsidized_row();

        if let Some(notice) = &fallback_notice {
            log::warn!(
                "Analysis used {} data because {} was unavailable",
                notice.used_year,
                notice.requested_year
            );
        }
        log::info!("Analysis finished: {} of {} cells computed", matrix.computed_cells(), total);
        observer.on_finished();

        AnalysisOutcome::Completed(AnalysisReport {
            matrix,
            fallback: fallback_notice,
        })
    }

    /// Estimate and plan stats for one cell, requested together
    async fn fetch_cell(
        &self,
        plan: &AnalysisPlan,
        year: &ProjectedYear,
        members: &[&Person],
        income: i64,
    ) -> std::result::Result<(AnalysisCell, Option<FallbackNotice>), ApiError> {
        let household = ApiHousehold::new(income, members, year.household.has_married_couple);
        let estimate_request = EstimateRequest {
            household: household.clone(),
            place: plan.place.clone(),
            year: plan.coverage_year,
        };
        let stats_request = PlanStatsRequest {
            market: Market::Individual,
            household,
            place: plan.place.clone(),
            year: plan.coverage_year,
        };

        let (estimate, stats) = tokio::try_join!(
            fallback::eligibility_estimate(self.api, &self.fallback, &estimate_request),
            fallback::plan_stats(self.api, &self.fallback, &stats_request),
        )?;

        let used_year = if stats.fallback_occurred {
            Some(stats.used_year)
        } else if estimate.fallback_occurred {
            Some(estimate.used_year)
        } else {
            None
        };
        let notice = used_year.map(|used_year| FallbackNotice {
            requested_year: plan.coverage_year,
            used_year,
        });

        let cell = AnalysisCell {
            aptc: estimate.data.aptc(),
            stats: stats.data,
        };
        Ok((cell, notice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{sample_place, Call, ScriptedApi};
    use crate::household::Gender;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn policy_on(y: i32, m: u32, d: u32) -> FallbackPolicy {
        FallbackPolicy::at(NaiveDate::from_ymd_opt(y, m, d).unwrap(), &ForecastConfig::default())
    }

    /// Couple close to retirement: four projection years until Bo turns 65
    fn near_retirement() -> Household {
        Household::new(
            vec![
                Person::adult("1", "Ann", 63, Gender::Female),
                Person::adult("2", "Bo", 62, Gender::Male),
            ],
            true,
        )
    }

    fn request(household: Household, range: IncomeRange) -> AnalysisRequest {
        AnalysisRequest {
            household,
            future_events: Vec::new(),
            income_range: range,
            coverage_year: 2026,
            place: Some(sample_place()),
        }
    }

    #[derive(Default)]
    struct Recorder {
        statuses: Vec<String>,
        progress: Vec<Progress>,
        cells: Vec<CellLogEntry>,
        finished: bool,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl AnalysisObserver for Recorder {
        fn on_status(&mut self, message: &str) {
            self.statuses.push(message.to_string());
        }

        fn on_progress(&mut self, progress: Progress) {
            self.progress.push(progress);
            if let Some((after, token)) = &self.cancel_after {
                if progress.completed == *after {
                    token.cancel();
                }
            }
        }

        fn on_cell(&mut self, entry: &CellLogEntry) {
            self.cells.push(entry.clone());
        }

        fn on_finished(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn test_income_range() {
        let range = IncomeRange::default();
        assert_eq!(range.incomes().unwrap(), vec![50_000, 75_000, 100_000, 125_000, 150_000]);

        let single = IncomeRange { start: 40_000, end: 40_000, step: 10_000 };
        assert_eq!(single.incomes().unwrap(), vec![40_000]);

        let uneven = IncomeRange { start: 0, end: 25_000, step: 10_000 };
        assert_eq!(uneven.incomes().unwrap(), vec![0, 10_000, 20_000]);

        let backwards = IncomeRange { start: 150_000, end: 50_000, step: 25_000 };
        assert!(matches!(backwards.incomes(), Err(ForecastError::EmptyIncomeRange)));

        let zero_step = IncomeRange { start: 0, end: 10, step: 0 };
        assert!(matches!(zero_step.incomes(), Err(ForecastError::InvalidIncomeStep(0))));
    }

    #[test]
    fn test_plan_headers_and_preflight() {
        let config = ForecastConfig::default();
        let plan = AnalysisPlan::build(&request(near_retirement(), IncomeRange::default()), &config).unwrap();

        assert_eq!(plan.years.len(), 4);
        assert_eq!(plan.total_calls(), 20);
        assert_eq!(plan.headers[0], "Ann 63 / Bo 62");
        assert!(!plan.force_initials);
        assert!(plan.preflight_warning(&config).is_none());

        let wide = IncomeRange { start: 0, end: 200_000, step: 1_000 };
        let plan = AnalysisPlan::build(&request(near_retirement(), wide), &config).unwrap();
        let warning = plan.preflight_warning(&config).unwrap();
        assert_eq!(warning.total_calls, 804);
        assert_eq!(warning.estimated_seconds, 281);
    }

    #[test]
    fn test_plan_requires_location() {
        let mut req = request(near_retirement(), IncomeRange::default());
        req.place = None;
        let err = AnalysisPlan::build(&req, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::LocationUnset));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_builds_matrix() {
        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();
        let mut recorder = Recorder::default();

        let AnalysisOutcome::Completed(report) = engine.run(&plan, &CancellationToken::new(), &mut recorder).await else {
            panic!("analysis should complete");
        };

        let matrix = &report.matrix;
        assert_eq!(matrix.column_headers.len(), 4);
        assert_eq!(matrix.rows.len(), 6);
        assert_eq!(matrix.income_rows().count(), 5);
        assert!(matrix.rows[5].is_unsubsidized());
        assert_eq!(matrix.computed_cells(), 20);
        assert!(report.fallback.is_none());

        // Row-major by income within each year
        let incomes: Vec<i64> = api
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::PlanStats { income, .. } => Some(*income),
                _ => None,
            })
            .take(5)
            .collect();
        assert_eq!(incomes, vec![50_000, 75_000, 100_000, 125_000, 150_000]);

        let first = matrix.cell(0, 0).unwrap();
        assert_relative_eq!(first.aptc, ScriptedApi::aptc_for(50_000));
        let synthetic = matrix.cell(5, 0).unwrap();
        assert_relative_eq!(synthetic.aptc, 0.0);
        assert_relative_eq!(
            synthetic.stats[0].premiums.mean,
            first.stats[0].premiums.mean + first.aptc
        );

        assert_eq!(recorder.progress.len(), 21);
        assert_eq!(recorder.progress.last(), Some(&Progress { completed: 20, total: 20 }));
        assert_eq!(recorder.cells.len(), 20);
        assert_eq!(recorder.cells[0].ages, vec![63, 62]);
        assert_eq!(recorder.statuses, vec![STATUS_INITIALIZING.to_string()]);
        assert!(recorder.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cells_are_paced() {
        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();

        let started = tokio::time::Instant::now();
        engine.run(&plan, &CancellationToken::new(), &mut NoopObserver).await;

        assert!(started.elapsed() >= std::time::Duration::from_millis(20 * 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backwards_range_makes_no_calls() {
        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let range = IncomeRange { start: 150_000, end: 50_000, step: 25_000 };

        assert!(matches!(
            engine.plan(&request(near_retirement(), range)),
            Err(ForecastError::EmptyIncomeRange)
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cell_becomes_empty() {
        let api = ScriptedApi::new().failing_income(75_000);
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();

        let AnalysisOutcome::Completed(report) = engine.run(&plan, &CancellationToken::new(), &mut NoopObserver).await else {
            panic!("analysis should complete");
        };

        let row = &report.matrix.rows[1];
        assert_eq!(row.income, 75_000);
        assert!(row.values.iter().all(Option::is_none));
        assert_eq!(report.matrix.computed_cells(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aged_out_years_are_empty_without_calls() {
        // A lone dependent ages out after one year; nobody is left to cover
        let mut parent = Person::adult("1", "Pat", 64, Gender::Female).as_parent();
        parent.aptc_eligible = false;
        let kid = Person::child("2", "Kid", 25, Gender::Male, 25);
        let household = Household::new(vec![parent, kid], false);

        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let range = IncomeRange { start: 30_000, end: 30_000, step: 1 };
        let plan = engine.plan(&request(household, range)).unwrap();
        assert_eq!(plan.years.len(), 2);

        let AnalysisOutcome::Completed(report) = engine.run(&plan, &CancellationToken::new(), &mut NoopObserver).await else {
            panic!("analysis should complete");
        };

        assert!(report.matrix.rows[0].values[0].is_some());
        assert!(report.matrix.rows[0].values[1].is_none());
        assert_eq!(api.plan_stats_calls(), 1);
        assert_eq!(report.matrix.column_headers[1], "Pat 65");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_partial_results() {
        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();

        let token = CancellationToken::new();
        let mut recorder = Recorder {
            cancel_after: Some((7, token.clone())),
            ..Default::default()
        };

        let outcome = engine.run(&plan, &token, &mut recorder).await;

        assert_eq!(outcome, AnalysisOutcome::Stopped { completed_cells: 7 });
        assert_eq!(api.plan_stats_calls(), 7);
        assert_eq!(recorder.statuses.last().map(String::as_str), Some(STATUS_STOPPED));
        assert!(!recorder.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let api = ScriptedApi::new();
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2026, 3, 1));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();

        let token = CancellationToken::new();
        token.cancel();

        let outcome = engine.run(&plan, &token, &mut NoopObserver).await;
        assert_eq!(outcome, AnalysisOutcome::Stopped { completed_cells: 0 });
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_notice_reported_once() {
        let api = ScriptedApi::new().unavailable_year(2026);
        let engine = AnalysisEngine::new(&api, ForecastConfig::default(), policy_on(2025, 11, 20));
        let plan = engine.plan(&request(near_retirement(), IncomeRange::default())).unwrap();

        let AnalysisOutcome::Completed(report) = engine.run(&plan, &CancellationToken::new(), &mut NoopObserver).await else {
            panic!("analysis should complete");
        };

        assert_eq!(
            report.fallback,
            Some(FallbackNotice {
                requested_year: 2026,
                used_year: 2025
            })
        );
        assert_eq!(report.matrix.computed_cells(), 20);
    }

    #[test]
    fn test_log_entry_format() {
        let entry = CellLogEntry {
            ages: vec![42, 41, 5],
            income: 90_000,
            subsidy: 1_234.4,
        };
        assert_eq!(entry.to_string(), "Ages: 42, 41, 5\nIncome: $90,000\nSubsidy: $1,234");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(-2_500.0), "-$2,500");
    }
}
