use feed_model::contract_list::{PhoneTarget, header};
use feed_model::Record;

use crate::entities::dialer::{
    DIAL_NUMBER, DUNNING_STATUS, PHONE, dialer_defaults, dialer_rules,
};
use crate::mapper::Mapper;
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::format_hyphenated_mobile;

/// Mirail dialer list for one phone target.
#[derive(Debug, Clone)]
pub struct MirailMapper {
    target: PhoneTarget,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl MirailMapper {
    pub fn new(target: PhoneTarget) -> Self {
        let phone = match target {
            PhoneTarget::Contract => header::TEL_MOBILE,
            PhoneTarget::Guarantor => header::TEL_MOBILE_1,
            PhoneTarget::EmergencyContact => header::TEL_MOBILE_2,
        };
        Self {
            target,
            rules: dialer_rules(phone),
            defaults: dialer_defaults(),
        }
    }
}

impl Mapper for MirailMapper {
    fn name(&self) -> &'static str {
        match self.target {
            PhoneTarget::Contract => "mirail_contract",
            PhoneTarget::Guarantor => "mirail_guarantor",
            PhoneTarget::EmergencyContact => "mirail_emergency_contact",
        }
    }

    fn output_label(&self) -> String {
        format!("ミライル_{}", self.target.label())
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    /// Unhyphenated 11-digit numbers are hyphenated in both phone fields.
    fn apply_custom_rules(&self, output: &mut Record, _input: &Record) {
        output.set(DUNNING_STATUS, "TEL");
        let Some(phone) = output.get_non_empty(PHONE) else {
            return;
        };
        if !phone.contains('-') && phone.chars().count() == 11 {
            let formatted = format_hyphenated_mobile(phone);
            output.set(PHONE, formatted.clone());
            output.set(DIAL_NUMBER, formatted);
        }
    }
}
