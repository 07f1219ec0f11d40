//! Resolve a ZIP code to a rating location
//!
//! A ZIP can straddle several counties; the caller then has to pick one. States running
//! their own exchange are rejected with a pointer to that exchange.

use crate::api::{fallback, County, FallbackPolicy, MarketplaceApi, Place};
use crate::config::state_marketplace;
use crate::error::{ForecastError, Result};

/// Outcome of a ZIP lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LocationLookup {
    /// The ZIP maps to exactly one supported county
    Resolved(Place),
    /// The ZIP spans several counties; pick one with [`select_county`]
    ChooseCounty(Vec<County>),
}

/// True for exactly five ASCII digits
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Reject states whose plans are not on the federal marketplace
pub fn ensure_supported_state(state: &str) -> Result<()> {
    match state_marketplace(state) {
        Some(exchange) => Err(ForecastError::UnsupportedState {
            state: exchange.state.to_string(),
            program: exchange.name,
            url: exchange.url,
        }),
        None => Ok(()),
    }
}

/// Look up the counties for `zip` in `coverage_year`
pub async fn resolve_zip<A: MarketplaceApi>(
    api: &A,
    policy: &FallbackPolicy,
    zip: &str,
    coverage_year: i32,
) -> Result<LocationLookup> {
    if !is_valid_zip(zip) {
        return Err(ForecastError::InvalidZip(zip.to_string()));
    }

    let response = fallback::counties_by_zip(api, policy, zip, coverage_year)
        .await
        .map_err(ForecastError::LocationLookup)?;
    let mut counties = response.data.counties;

    match counties.len() {
        0 => Err(ForecastError::ZipNotFound(zip.to_string())),
        1 => {
            let county = counties.remove(0);
            ensure_supported_state(&county.state)?;
            log::info!("ZIP {} resolved to {} ({})", zip, county.name, county.fips);
            Ok(LocationLookup::Resolved(county.to_place()))
        }
        n => {
            log::info!("ZIP {} spans {} counties", zip, n);
            Ok(LocationLookup::ChooseCounty(counties))
        }
    }
}

/// Pick one of the counties returned for a multi-county ZIP
pub fn select_county(counties: &[County], fips: &str) -> Result<Place> {
    let county = counties
        .iter()
        .find(|c| c.fips == fips)
        .ok_or_else(|| ForecastError::UnknownCounty(fips.to_string()))?;
    ensure_supported_state(&county.state)?;
    Ok(county.to_place())
}
