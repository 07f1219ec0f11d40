//! Marketplace calendar and state-run exchange table

use chrono::{Datelike, NaiveDate};

/// A state that runs its own exchange instead of HealthCare.gov
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMarketplace {
    pub state: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

/// States whose plans are not served by the federal marketplace API
pub const STATE_MARKETPLACES: [StateMarketplace; 18] = [
    StateMarketplace { state: "CA", name: "Covered California", url: "https://www.coveredca.com/" },
    StateMarketplace { state: "CO", name: "Connect for Health Colorado", url: "https://connectforhealthco.com/" },
    StateMarketplace { state: "CT", name: "Access Health CT", url: "https://www.accesshealthct.com/" },
    StateMarketplace { state: "DC", name: "DC Health Link", url: "https://www.dchealthlink.com/" },
    StateMarketplace { state: "ID", name: "Your Health Idaho", url: "https://www.yourhealthidaho.org/" },
    StateMarketplace { state: "KY", name: "kynect", url: "https://kynect.ky.gov/" },
    StateMarketplace { state: "ME", name: "CoverME.gov", url: "https://www.coverme.gov/" },
    StateMarketplace { state: "MD", name: "Maryland Health Connection", url: "https://www.marylandhealthconnection.gov/" },
    StateMarketplace { state: "MA", name: "Massachusetts Health Connector", url: "https://www.mahealthconnector.org/" },
    StateMarketplace { state: "MN", name: "MNsure", url: "https://www.mnsure.org/" },
    StateMarketplace { state: "NV", name: "Nevada Health Link", url: "https://www.nevadahealthlink.com/" },
    StateMarketplace { state: "NJ", name: "Get Covered NJ", url: "https://www.getcovered.nj.gov/" },
    StateMarketplace { state: "NY", name: "NY State of Health", url: "https://nystateofhealth.ny.gov/" },
    StateMarketplace { state: "PA", name: "Pennie", url: "https://www.pennie.com/" },
    StateMarketplace { state: "RI", name: "HealthSource RI", url: "https://healthsourceri.com/" },
    StateMarketplace { state: "VT", name: "Vermont Health Connect", url: "https://portal.healthconnect.vermont.gov/" },
    StateMarketplace { state: "VA", name: "Virginia's Insurance Marketplace", url: "https://www.marketplace.virginia.gov/" },
    StateMarketplace { state: "WA", name: "Washington Healthplanfinder", url: "https://www.wahealthplanfinder.org/" },
];

/// Look up the state-run exchange for a state abbreviation
pub fn state_marketplace(state: &str) -> Option<&'static StateMarketplace> {
    STATE_MARKETPLACES
        .iter()
        .find(|m| m.state.eq_ignore_ascii_case(state))
}

/// Latest coverage year with published data on `today`
///
/// Open enrollment data for year Y is published on Nov 1 of Y-1.
pub fn coverage_year(today: NaiveDate, window_start_month: u32) -> i32 {
    if today.month() >= window_start_month {
        today.year() + 1
    } else {
        today.year()
    }
}
