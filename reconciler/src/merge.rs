//! Catalog merge
//!
//! An operator is offered only when the availability feed reports it
//! operational **and** the active configuration enables it, both from the
//! same API generation. Absence from either feed means unavailable, and a
//! mismatched pair offers nothing.

use crate::catalog::{CatalogCountry, CatalogOperator};
use momo_protocol::normalizer::{ActiveConfig, AvailabilityIndex, OperationLimits};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog operator enriched with feed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCatalogEntry {
    /// Correspondent / provider code
    pub operator_code: String,
    /// Catalog display name
    pub name: String,
    /// Country name
    pub country: String,
    /// Settlement currency
    pub currency: String,
    /// Dialling prefix
    pub dial_code: String,
    /// Flag image
    pub flag: String,
    /// Operator logo file
    pub image: String,
    /// Operational and configured
    pub available: bool,
    /// Name shown to the customer, from the active configuration
    pub owner_name: Option<String>,
    /// Display name from the active configuration
    pub display_name: Option<String>,
    /// Logo URL from the active configuration
    pub logo: Option<String>,
    /// Configured currencies
    pub currencies: Vec<String>,
    /// Configured limits per operation type
    pub operations: BTreeMap<String, OperationLimits>,
}

/// One country of the merged catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCountry {
    /// Country name
    pub country: String,
    /// ISO-3 code
    pub iso3: String,
    /// Operators in catalog order
    pub operators: Vec<MergedCatalogEntry>,
}

impl MergedCountry {
    /// Operators currently offered
    pub fn available(&self) -> impl Iterator<Item = &MergedCatalogEntry> {
        self.operators.iter().filter(|op| op.available)
    }
}

fn merge_operator(
    country: &CatalogCountry,
    operator: &CatalogOperator,
    availability: &AvailabilityIndex,
    config: &ActiveConfig,
    versions_match: bool,
) -> MergedCatalogEntry {
    let configured = config
        .get(country.iso3, operator.code)
        .or_else(|| config.find(operator.code));

    let mut entry = MergedCatalogEntry {
        operator_code: operator.code.to_string(),
        name: operator.name.to_string(),
        country: country.name.to_string(),
        currency: country.currency.to_string(),
        dial_code: country.dial_code.to_string(),
        flag: country.flag.to_string(),
        image: operator.image.to_string(),
        available: versions_match
            && availability.is_operational(operator.code)
            && configured.is_some(),
        owner_name: None,
        display_name: None,
        logo: None,
        currencies: Vec::new(),
        operations: BTreeMap::new(),
    };

    if let Some(configured) = configured {
        entry.owner_name = configured.owner_name.clone();
        entry.display_name = configured.display_name.clone();
        entry.logo = configured.logo.clone();
        entry.currencies = configured.currencies.clone();
        entry.operations = configured.operations.clone();
    }
    entry
}

/// Merge every catalog operator with the two feeds.
///
/// `versions_match` is false when the feeds came from different API
/// generations; every operator is then unavailable, display metadata is
/// still copied.
pub fn merge_catalog(
    catalog: &[CatalogCountry],
    availability: &AvailabilityIndex,
    config: &ActiveConfig,
    versions_match: bool,
) -> Vec<MergedCountry> {
    catalog
        .iter()
        .map(|country| MergedCountry {
            country: country.name.to_string(),
            iso3: country.iso3.to_string(),
            operators: country
                .operators
                .iter()
                .map(|op| merge_operator(country, op, availability, config, versions_match))
                .collect(),
        })
        .collect()
}
