//! Mapper construction by (entity, role).

use std::collections::BTreeMap;

use feed_model::{FeedError, PhoneTarget, canonical_entity, canonical_role, registration_label};

use crate::entities::{
    ArkLatePaymentMapper, ArkRegistrationMapper, AutocallHistoryMapper, CapcoDebtUpdateMapper, CapcoRegistrationMapper, FaithMapper,
    HistoryTarget, MirailMapper, PlazaMapper, PositionalDialerMapper,
};
use crate::mapper::{Mapper, MapperContext};

/// Builds a mapper for a registered role.
pub type MapperBuilder = fn(role: &str, context: &MapperContext) -> Box<dyn Mapper>;

#[derive(Default)]
pub struct MapperRegistry {
    entries: BTreeMap<(String, String), MapperBuilder>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in mapper.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for role in ["contract", "guarantor", "emergency_contact"] {
            registry.register("mirail", role, build_mirail);
            registry.register("mirail_autocall", role, build_positional);
            registry.register("faith", role, build_faith);
        }
        for role in ["main", "guarantor", "contact"] {
            registry.register("plaza", role, build_plaza);
        }
        registry.register("capco", "registration", build_capco_registration);
        registry.register("capco", "debt_update", build_capco_debt_update);
        registry.register("ark", "registration", build_ark_registration);
        registry.register("ark", "late_payment", build_ark_late_payment);
        for target in HistoryTarget::ALL {
            registry.register("autocall_history", target.as_str(), build_history);
        }
        registry
    }

    pub fn register(&mut self, entity: &str, role: &str, build: MapperBuilder) {
        self.entries
            .insert((canonical_entity(entity), canonical_role(role)), build);
    }

    pub fn contains(&self, entity: &str, role: &str) -> bool {
        self.entries
            .contains_key(&(canonical_entity(entity), canonical_role(role)))
    }

    pub fn create(
        &self,
        entity: &str,
        role: &str,
        context: &MapperContext,
    ) -> feed_model::Result<Box<dyn Mapper>> {
        let key = (canonical_entity(entity), canonical_role(role));
        match self.entries.get(&key) {
            Some(build) => Ok(build(&key.1, context)),
            None => Err(FeedError::UnknownRegistration {
                kind: "mapper",
                entity: key.0,
                role: key.1,
                known: self.registrations(),
            }),
        }
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
}

fn phone_target(role: &str) -> PhoneTarget {
    match role {
        "guarantor" => PhoneTarget::Guarantor,
        "emergency_contact" | "contact" => PhoneTarget::EmergencyContact,
        _ => PhoneTarget::Contract,
    }
}

fn build_mirail(role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(MirailMapper::new(phone_target(role)))
}

fn build_positional(role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(PositionalDialerMapper::new(phone_target(role)))
}

fn build_faith(role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(FaithMapper::new(phone_target(role)))
}

fn build_plaza(role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(PlazaMapper::new(phone_target(role)))
}

fn build_capco_registration(_role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(CapcoRegistrationMapper::new())
}

fn build_capco_debt_update(_role: &str, context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(CapcoDebtUpdateMapper::new(context))
}

fn build_ark_registration(_role: &str, context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(ArkRegistrationMapper::new(context.region))
}

fn build_ark_late_payment(_role: &str, context: &MapperContext) -> Box<dyn Mapper> {
    Box::new(ArkLatePaymentMapper::new(context))
}

fn build_history(role: &str, _context: &MapperContext) -> Box<dyn Mapper> {
    let target = role.parse().unwrap_or(HistoryTarget::Contract);
    Box::new(AutocallHistoryMapper::new(target))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::entities::ArkRegion;

    fn context() -> MapperContext {
        MapperContext::new(NaiveDateTime::default())
    }

    #[test]
    fn defaults_cover_every_entity() {
        let registry = MapperRegistry::with_defaults();
        assert_eq!(registry.len(), 20);
        assert!(registry.contains("Mirail", "emergency"));
        assert!(registry.contains("plaza", "contact"));
        assert!(registry.contains("autocall_history", "workplace"));
    }

    #[test]
    fn roles_resolve_to_their_phone_columns() {
        let registry = MapperRegistry::with_defaults();
        let mapper = registry.create("mirail", "emergency", &context()).unwrap();
        assert_eq!(mapper.name(), "mirail_emergency_contact");
        let plaza = registry.create("plaza", "main", &context()).unwrap();
        assert_eq!(plaza.name(), "plaza_main");
        let history = registry
            .create("autocall_history", "workplace", &context())
            .unwrap();
        assert_eq!(history.name(), "autocall_history_workplace");
    }

    #[test]
    fn ark_registration_takes_region_from_context() {
        let registry = MapperRegistry::with_defaults();
        let context = context().with_region(ArkRegion::Osaka);
        let mapper = registry.create("Ark", "registration", &context).unwrap();
        assert_eq!(mapper.name(), "ark_registration");
        assert_eq!(mapper.output_label(), "アーク_新規登録_大阪");
        let output = mapper.map_one(&feed_model::Record::new());
        assert_eq!(output.get("更新契約手数料"), Some("2"));
        assert_eq!(output.get("委託先法人ID"), Some("5"));
    }

    #[test]
    fn unknown_pair_lists_known_registrations() {
        let registry = MapperRegistry::with_defaults();
        let err = registry
            .create("faith_sms", "contract", &context())
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.starts_with("unknown mapper registration: faith_sms/contract"));
        assert!(message.contains("capco/debt_update"));
        assert!(message.contains("plaza/main"));
        assert!(message.contains("ark/late_payment"));
        assert!(err.is_configuration());
    }
}
