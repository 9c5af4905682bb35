use feed_filter::normalize::parse_amount;
use feed_model::contract_list::{PhoneTarget, header};
use feed_model::Record;

use crate::entities::dialer::{
    BALANCE, DUNNING_STATUS, dialer_defaults, dialer_rules, mirror_dial_number,
};
use crate::mapper::Mapper;
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::thousands;

/// Plaza dialer list. Roles are main, guarantor and contact; the contact
/// number lives in the emergency-contact mobile column.
#[derive(Debug, Clone)]
pub struct PlazaMapper {
    target: PhoneTarget,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl PlazaMapper {
    pub fn new(target: PhoneTarget) -> Self {
        let phone = match target {
            PhoneTarget::Contract => header::TEL_MOBILE,
            PhoneTarget::Guarantor => header::TEL_MOBILE_1,
            PhoneTarget::EmergencyContact => header::EMERGENCY_MOBILE,
        };
        Self {
            target,
            rules: dialer_rules(phone),
            defaults: dialer_defaults(),
        }
    }
}

impl Mapper for PlazaMapper {
    fn name(&self) -> &'static str {
        match self.target {
            PhoneTarget::Contract => "plaza_main",
            PhoneTarget::Guarantor => "plaza_guarantor",
            PhoneTarget::EmergencyContact => "plaza_contact",
        }
    }

    fn output_label(&self) -> String {
        format!("プラザ_{}", self.target.label())
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    fn apply_custom_rules(&self, output: &mut Record, _input: &Record) {
        output.set(DUNNING_STATUS, "TEL");
        mirror_dial_number(output);
        if let Some(amount) = output.get_non_empty(BALANCE).and_then(parse_amount) {
            output.set(BALANCE, thousands(amount));
        }
    }
}
