//! Filter configuration and construction by (entity, role).
//!
//! [`FilterRegistry`] is an explicit value: build it once with
//! [`FilterRegistry::with_defaults`] and pass it by reference to whatever
//! assembles pipelines. New entities are added with
//! [`FilterRegistry::register`] without touching the filter core.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use feed_model::contract_list::header;
use feed_model::{
    ColumnRef, DateMode, FeedError, FilterConfig, IdentityMode, IdentityRule, canonical_entity,
    canonical_role, registration_label,
};

use crate::contract_filter::ContractFilter;
use crate::entities::{FaithFilter, FaithSmsFilter, MirailFilter, PlazaFilter};

/// Per-run adjustments applied on top of the registered configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOverrides {
    pub date_mode: Option<DateMode>,
    pub excluded_categories: Option<BTreeSet<String>>,
    pub required_phone_column: Option<ColumnRef>,
    pub excluded_amounts: Option<Vec<f64>>,
    /// Enables the compound client-code and balance suppression (mirail).
    pub debt_exclusion: bool,
    /// Requires hyphenated 090/080/070 mobiles (faith_sms).
    pub strict_mobile: bool,
}

impl FilterOverrides {
    pub fn apply(&self, mut config: FilterConfig) -> FilterConfig {
        if let Some(mode) = self.date_mode {
            config.date_mode = mode;
        }
        if let Some(categories) = &self.excluded_categories {
            config.excluded_categories = categories.clone();
        }
        if let Some(column) = &self.required_phone_column {
            config.required_phone_column = column.clone();
        }
        if let Some(amounts) = &self.excluded_amounts {
            config.excluded_amounts = amounts.clone();
        }
        config
    }
}

pub type FilterBuilder = fn(FilterConfig, &FilterOverrides) -> Box<dyn ContractFilter>;

struct FilterEntry {
    config: FilterConfig,
    build: FilterBuilder,
}

#[derive(Default)]
pub struct FilterRegistry {
    entries: BTreeMap<(String, String), FilterEntry>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in entity.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_mirail(&mut registry);
        register_faith(&mut registry);
        register_plaza(&mut registry);
        registry
    }

    /// Registers a configuration and builder, replacing any existing entry.
    pub fn register(&mut self, entity: &str, role: &str, config: FilterConfig, build: FilterBuilder) {
        self.entries.insert(
            (canonical_entity(entity), canonical_role(role)),
            FilterEntry { config, build },
        );
    }

    pub fn contains(&self, entity: &str, role: &str) -> bool {
        self.entries
            .contains_key(&(canonical_entity(entity), canonical_role(role)))
    }

    /// The registered configuration with `overrides` applied.
    pub fn config(
        &self,
        entity: &str,
        role: &str,
        overrides: &FilterOverrides,
    ) -> feed_model::Result<FilterConfig> {
        let entry = self.entry(entity, role)?;
        Ok(overrides.apply(entry.config.clone()))
    }

    pub fn create(
        &self,
        entity: &str,
        role: &str,
        overrides: &FilterOverrides,
    ) -> feed_model::Result<Box<dyn ContractFilter>> {
        let entry = self.entry(entity, role)?;
        Ok((entry.build)(overrides.apply(entry.config.clone()), overrides))
    }

    /// Known registrations as `entity/role`, sorted.
    pub fn registrations(&self) -> Vec<String> {
        self.entries
            .keys()
            .map(|(entity, role)| registration_label(entity, role))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, entity: &str, role: &str) -> feed_model::Result<&FilterEntry> {
        let key = (canonical_entity(entity), canonical_role(role));
        self.entries
            .get(&key)
            .ok_or_else(|| FeedError::UnknownRegistration {
                kind: "filter",
                entity: key.0.clone(),
                role: key.1.clone(),
                known: self.registrations(),
            })
    }
}

fn build_mirail(config: FilterConfig, overrides: &FilterOverrides) -> Box<dyn ContractFilter> {
    Box::new(MirailFilter::new(config, overrides.debt_exclusion))
}

fn build_faith(config: FilterConfig, _overrides: &FilterOverrides) -> Box<dyn ContractFilter> {
    Box::new(FaithFilter::new(config))
}

fn build_faith_sms(config: FilterConfig, overrides: &FilterOverrides) -> Box<dyn ContractFilter> {
    Box::new(FaithSmsFilter::new(config, overrides.strict_mobile))
}

fn build_plaza(config: FilterConfig, _overrides: &FilterOverrides) -> Box<dyn ContractFilter> {
    Box::new(PlazaFilter::new(config))
}

fn set_of(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

/// Phone column per role for the three-role contract list entities.
fn role_phone_columns() -> [(&'static str, &'static str); 3] {
    [
        ("contract", header::TEL_MOBILE),
        ("guarantor", header::TEL_MOBILE_1),
        ("emergency_contact", header::EMERGENCY_MOBILE),
    ]
}

fn register_mirail(registry: &mut FilterRegistry) {
    for (role, phone) in role_phone_columns() {
        let config = FilterConfig {
            identity: IdentityRule::new(IdentityMode::Mixed, ["", "5"]),
            date_mode: DateMode::BeforeToday,
            excluded_categories: set_of(&["弁護士介入"]),
            required_phone_column: ColumnRef::name(phone),
            excluded_amounts: vec![2.0, 3.0, 5.0, 12.0],
        };
        registry.register("mirail", role, config, build_mirail);
    }
}

fn faith_config(phone: &str) -> FilterConfig {
    FilterConfig {
        identity: IdentityRule::new(IdentityMode::Numeric, ["1", "2", "3", "4"]),
        date_mode: DateMode::BeforeToday,
        excluded_categories: set_of(&["死亡決定", "破産決定", "弁護士介入"]),
        required_phone_column: ColumnRef::name(phone),
        excluded_amounts: vec![2.0, 3.0, 5.0],
    }
}

fn register_faith(registry: &mut FilterRegistry) {
    for (role, phone) in role_phone_columns() {
        registry.register("faith", role, faith_config(phone), build_faith);
    }
    registry.register(
        "faith_sms",
        "contract",
        faith_config(header::TEL_MOBILE),
        build_faith_sms,
    );
}

fn register_plaza(registry: &mut FilterRegistry) {
    let roles = [
        ("main", header::TEL_MOBILE, DateMode::TodayAndBefore),
        ("guarantor", header::TEL_MOBILE_1, DateMode::BeforeToday),
        ("contact", header::EMERGENCY_MOBILE, DateMode::BeforeToday),
    ];
    for (role, phone, date_mode) in roles {
        let config = FilterConfig {
            identity: IdentityRule::new(IdentityMode::String, ["6"]),
            date_mode,
            excluded_categories: set_of(&["督促停止", "弁護士介入"]),
            required_phone_column: ColumnRef::name(phone),
            excluded_amounts: vec![2.0, 3.0, 5.0, 12.0],
        };
        registry.register("plaza", role, config, build_plaza);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_entity_role() {
        let registry = FilterRegistry::with_defaults();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains("mirail", "emergency"));
        assert!(registry.contains("PLAZA", "main"));
        assert!(registry.contains("faith_sms", "contract"));
    }

    #[test]
    fn plaza_main_includes_today() {
        let registry = FilterRegistry::with_defaults();
        let main = registry
            .config("plaza", "main", &FilterOverrides::default())
            .unwrap();
        let guarantor = registry
            .config("plaza", "guarantor", &FilterOverrides::default())
            .unwrap();
        assert_eq!(main.date_mode, DateMode::TodayAndBefore);
        assert_eq!(guarantor.date_mode, DateMode::BeforeToday);
        assert_eq!(guarantor.required_phone_column, ColumnRef::name("TEL携帯.1"));
    }

    #[test]
    fn overrides_replace_selected_fields() {
        let registry = FilterRegistry::with_defaults();
        let overrides = FilterOverrides {
            excluded_amounts: Some(vec![7.0]),
            date_mode: Some(DateMode::TodayIncluded),
            ..FilterOverrides::default()
        };
        let config = registry.config("faith", "contract", &overrides).unwrap();
        assert_eq!(config.excluded_amounts, vec![7.0]);
        assert_eq!(config.date_mode, DateMode::TodayIncluded);
        assert_eq!(config.identity.mode, IdentityMode::Numeric);
    }

    #[test]
    fn unknown_pair_lists_known_registrations() {
        let registry = FilterRegistry::with_defaults();
        let err = registry
            .create("acme", "contract", &FilterOverrides::default())
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.starts_with("unknown filter registration: acme/contract"));
        assert!(message.contains("mirail/contract"));
        assert!(message.contains("plaza/main"));
        assert!(err.is_configuration());
    }

    #[test]
    fn created_filter_reports_entity() {
        let registry = FilterRegistry::with_defaults();
        let filter = registry
            .create("mirail", "guarantor", &FilterOverrides::default())
            .unwrap();
        assert_eq!(filter.entity(), "mirail");
        assert_eq!(filter.config().required_phone_column, ColumnRef::name("TEL携帯.1"));
    }
}
