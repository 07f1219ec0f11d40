//! Interactive session state
//!
//! A [`Session`] holds what a user has entered so far (location, household, future
//! events and incomes) together with the two result caches. Every setter clears the
//! cache slots its input feeds, so a later calculation with unchanged inputs is free and
//! one with changed inputs always goes back to the marketplace.

use crate::api::{County, FallbackPolicy, MarketplaceApi, Place};
use crate::cache::{Invalidation, InputFingerprint, LongTermInputs, ResultCache};
use crate::calculator::{SingleYearCalculator, SingleYearRequest, SingleYearResult};
use crate::config::{coverage_year, ForecastConfig};
use crate::error::{ForecastError, Result};
use crate::household::{validate_household, FutureEvent, Household, Person, Scenario};
use crate::location::{self, LocationLookup};
use crate::projection::{
    AnalysisEngine, AnalysisObserver, AnalysisOutcome, AnalysisPlan, AnalysisReport, AnalysisRequest, IncomeRange,
    PreflightWarning,
};
use tokio_util::sync::CancellationToken;

/// Result of asking the session for a long-term analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    /// The run is large; call again with `confirmed = true` to proceed
    NeedsConfirmation(PreflightWarning),
    Completed(AnalysisReport),
    /// Cancelled before finishing; nothing was cached
    Stopped { completed_cells: usize },
}

#[derive(Debug)]
pub struct Session {
    config: ForecastConfig,
    policy: FallbackPolicy,
    coverage_year: i32,

    zipcode: String,
    place: Option<Place>,
    county_choices: Vec<County>,

    people: Vec<Person>,
    has_married_couple: bool,
    future_events: Vec<FutureEvent>,

    income: i64,
    income_range: IncomeRange,

    cache: ResultCache,
}

impl Session {
    /// Empty session evaluated against today's date
    pub fn new(config: ForecastConfig) -> Self {
        let policy = FallbackPolicy::new(&config);
        Self::with_policy(config, policy)
    }

    /// Empty session evaluated against the date held by `policy`
    pub fn with_policy(config: ForecastConfig, policy: FallbackPolicy) -> Self {
        let coverage_year = coverage_year(policy.today(), config.fallback_window_start_month);
        log::debug!("New session for coverage year {}", coverage_year);
        Self {
            config,
            policy,
            coverage_year,
            zipcode: String::new(),
            place: None,
            county_choices: Vec::new(),
            people: Vec::new(),
            has_married_couple: false,
            future_events: Vec::new(),
            income: 90_000,
            income_range: IncomeRange::default(),
            cache: ResultCache::new(),
        }
    }

    /// Session pre-filled from a scenario file
    pub fn from_scenario(config: ForecastConfig, policy: FallbackPolicy, scenario: Scenario) -> Self {
        let mut session = Self::with_policy(config, policy);
        session.zipcode = scenario.zipcode;
        session.place = scenario.place;
        session.people = scenario.people;
        session.has_married_couple = scenario.has_married_couple;
        session.future_events = scenario.future_events;
        session.income = scenario.income;
        session.income_range = scenario.income_range;
        session
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn coverage_year(&self) -> i32 {
        self.coverage_year
    }

    pub fn zipcode(&self) -> &str {
        &self.zipcode
    }

    pub fn place(&self) -> Option<&Place> {
        self.place.as_ref()
    }

    /// Counties awaiting a choice after a multi-county ZIP lookup
    pub fn county_choices(&self) -> &[County] {
        &self.county_choices
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn has_married_couple(&self) -> bool {
        self.has_married_couple
    }

    pub fn future_events(&self) -> &[FutureEvent] {
        &self.future_events
    }

    pub fn income(&self) -> i64 {
        self.income
    }

    pub fn income_range(&self) -> IncomeRange {
        self.income_range
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn household(&self) -> Household {
        Household::new(self.people.clone(), self.has_married_couple)
    }

    /// Look up `zip` and make it the session's location
    ///
    /// The previous location is dropped even when the lookup fails. A multi-county ZIP
    /// leaves the location unset until [`Session::select_county`] is called.
    pub async fn set_zipcode<A: MarketplaceApi>(&mut self, api: &A, zip: &str) -> Result<LocationLookup> {
        self.zipcode = zip.to_string();
        self.place = None;
        self.county_choices.clear();
        self.cache.invalidate(Invalidation::Household);

        let lookup = location::resolve_zip(api, &self.policy, zip, self.coverage_year).await?;
        match &lookup {
            LocationLookup::Resolved(place) => self.place = Some(place.clone()),
            LocationLookup::ChooseCounty(counties) => self.county_choices = counties.clone(),
        }
        Ok(lookup)
    }

    /// Settle a multi-county ZIP on the county with `fips`
    pub fn select_county(&mut self, fips: &str) -> Result<&Place> {
        let place = location::select_county(&self.county_choices, fips)?;
        self.county_choices.clear();
        self.cache.invalidate(Invalidation::Household);
        Ok(self.place.insert(place))
    }

    /// Use an already resolved location
    pub fn set_place(&mut self, place: Place) {
        self.zipcode = place.zipcode.clone();
        self.place = Some(place);
        self.county_choices.clear();
        self.cache.invalidate(Invalidation::Household);
    }

    pub fn set_people(&mut self, people: Vec<Person>) {
        self.people = people;
        self.cache.invalidate(Invalidation::Household);
    }

    pub fn add_person(&mut self, person: Person) {
        self.people.push(person);
        self.cache.invalidate(Invalidation::Household);
    }

    /// Edit the member with `id` in place; false when there is no such member
    pub fn update_person(&mut self, id: &str, edit: impl FnOnce(&mut Person)) -> bool {
        let Some(person) = self.people.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        edit(person);
        self.cache.invalidate(Invalidation::Household);
        true
    }

    pub fn remove_person(&mut self, id: &str) -> Option<Person> {
        let index = self.people.iter().position(|p| p.id == id)?;
        self.cache.invalidate(Invalidation::Household);
        Some(self.people.remove(index))
    }

    pub fn set_married_couple(&mut self, married: bool) {
        self.has_married_couple = married;
        self.cache.invalidate(Invalidation::Household);
    }

    pub fn set_future_events(&mut self, events: Vec<FutureEvent>) {
        self.future_events = events;
        self.cache.invalidate(Invalidation::Household);
    }

    pub fn add_future_event(&mut self, event: FutureEvent) {
        self.future_events.push(event);
        self.cache.invalidate(Invalidation::Household);
    }

    pub fn remove_future_event(&mut self, index: usize) -> Option<FutureEvent> {
        if index >= self.future_events.len() {
            return None;
        }
        self.cache.invalidate(Invalidation::Household);
        Some(self.future_events.remove(index))
    }

    /// Single-year income; the long-term result stays cached
    pub fn set_income(&mut self, income: i64) {
        self.income = income;
        self.cache.invalidate(Invalidation::SingleYearIncome);
    }

    /// Long-term income range; the single-year result stays cached
    pub fn set_income_range(&mut self, range: IncomeRange) {
        self.income_range = range;
        self.cache.invalidate(Invalidation::IncomeRange);
    }

    /// Every household rule the current inputs break
    pub fn validation_errors(&self) -> Vec<String> {
        validate_household(&self.people, self.has_married_couple, &self.future_events)
    }

    fn ensure_valid(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::Validation(errors))
        }
    }

    /// Estimate for the current income and coverage year, served from cache when unchanged
    pub async fn calculate_single_year<A: MarketplaceApi>(&mut self, api: &A) -> Result<SingleYearResult> {
        let place = self.place.clone().ok_or(ForecastError::LocationUnset)?;
        self.ensure_valid()?;

        let request = SingleYearRequest {
            zipcode: self.zipcode.clone(),
            place,
            household: self.household(),
            income: self.income,
            coverage_year: self.coverage_year,
        };
        SingleYearCalculator::new(api, self.policy)
            .calculate_cached(&request, &mut self.cache.single_year)
            .await
    }

    fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            household: self.household(),
            future_events: self.future_events.clone(),
            income_range: self.income_range,
            coverage_year: self.coverage_year,
            place: self.place.clone(),
        }
    }

    fn long_term_fingerprint(&self) -> Result<InputFingerprint> {
        InputFingerprint::of(&LongTermInputs {
            zipcode: &self.zipcode,
            place: self.place.as_ref(),
            people: &self.people,
            has_married_couple: self.has_married_couple,
            future_events: &self.future_events,
            income_range: self.income_range,
        })
    }

    /// Plan the long-term analysis without making any request
    pub fn prepare_analysis(&self) -> Result<AnalysisPlan> {
        if self.place.is_none() {
            return Err(ForecastError::LocationUnset);
        }
        self.ensure_valid()?;
        AnalysisPlan::build(&self.analysis_request(), &self.config)
    }

    /// Run the long-term analysis for the current inputs
    ///
    /// Unchanged inputs return the cached report. A run above the pre-flight threshold
    /// returns [`AnalysisStatus::NeedsConfirmation`] unless `confirmed` is set.
    pub async fn generate_analysis<A: MarketplaceApi>(
        &mut self,
        api: &A,
        confirmed: bool,
        cancel: &CancellationToken,
        observer: &mut dyn AnalysisObserver,
    ) -> Result<AnalysisStatus> {
        let fingerprint = self.long_term_fingerprint()?;
        if let Some(report) = self.cache.long_term.get(&fingerprint) {
            log::debug!("Long-term analysis served from cache");
            return Ok(AnalysisStatus::Completed(report.clone()));
        }

        let plan = self.prepare_analysis()?;
        if let Some(warning) = plan.preflight_warning(&self.config) {
            if !confirmed {
                log::info!("{}", warning);
                return Ok(AnalysisStatus::NeedsConfirmation(warning));
            }
        }

        let engine = AnalysisEngine::new(api, self.config.clone(), self.policy);
        match engine.run(&plan, cancel, observer).await {
            AnalysisOutcome::Completed(report) => {
                self.cache.long_term.store(fingerprint, report.clone());
                Ok(AnalysisStatus::Completed(report))
            }
            AnalysisOutcome::Stopped { completed_cells } => Ok(AnalysisStatus::Stopped { completed_cells }),
        }
    }
}
