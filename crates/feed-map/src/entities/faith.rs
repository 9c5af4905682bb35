use feed_model::contract_list::{PhoneTarget, header};
use feed_model::Record;

use crate::entities::dialer::{
    BALANCE, CLIENT, DUNNING_STATUS, dialer_defaults, dialer_rules, mirror_dial_number,
};
use crate::mapper::Mapper;
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::FAITH_CLIENT_NAME;

/// Faith dialer list. The client column is derived from the trustee id and
/// the balance column is always blank.
#[derive(Debug, Clone)]
pub struct FaithMapper {
    target: PhoneTarget,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl FaithMapper {
    pub fn new(target: PhoneTarget) -> Self {
        let phone = match target {
            PhoneTarget::Contract => header::TEL_MOBILE,
            PhoneTarget::Guarantor => header::TEL_MOBILE_1,
            PhoneTarget::EmergencyContact => header::TEL_MOBILE_2,
        };
        Self {
            target,
            rules: dialer_rules(phone).transform(CLIENT, FAITH_CLIENT_NAME),
            defaults: dialer_defaults(),
        }
    }
}

impl Mapper for FaithMapper {
    fn name(&self) -> &'static str {
        match self.target {
            PhoneTarget::Contract => "faith_contract",
            PhoneTarget::Guarantor => "faith_guarantor",
            PhoneTarget::EmergencyContact => "faith_emergency_contact",
        }
    }

    fn output_label(&self) -> String {
        format!("フェイス_{}", self.target.label())
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    fn apply_custom_rules(&self, output: &mut Record, _input: &Record) {
        output.set(DUNNING_STATUS, "TEL");
        output.set(BALANCE, "");
        mirror_dial_number(output);
    }
}
