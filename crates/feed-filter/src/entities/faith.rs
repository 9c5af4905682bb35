use anyhow::Result;
use polars::prelude::DataFrame;

use feed_model::contract_list::header;
use feed_model::{ColumnRef, FilterConfig};

use crate::contract_filter::{ContractFilter, FilterRun, apply_predicate};
use crate::predicate::Predicate;

/// Residence status an SMS batch is restricted to.
pub const VACATED_STATUS: &str = "退去済み";

pub struct FaithFilter {
    config: FilterConfig,
}

impl FaithFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }
}

impl ContractFilter for FaithFilter {
    fn entity(&self) -> &'static str {
        "faith"
    }

    fn config(&self) -> &FilterConfig {
        &self.config
    }
}

/// SMS variant: vacated contracts only, optionally with strictly formatted mobiles.
pub struct FaithSmsFilter {
    config: FilterConfig,
    strict_mobile: bool,
}

impl FaithSmsFilter {
    pub fn new(config: FilterConfig, strict_mobile: bool) -> Self {
        Self {
            config,
            strict_mobile,
        }
    }
}

impl ContractFilter for FaithSmsFilter {
    fn entity(&self) -> &'static str {
        "faith_sms"
    }

    fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn apply_entity_filters(&self, df: &mut DataFrame, run: &mut FilterRun) -> Result<()> {
        let residence = Predicate::Equals {
            column: ColumnRef::name(header::RESIDENCE_STATUS),
            value: VACATED_STATUS.to_string(),
        };
        apply_predicate(df, &residence, "入居ステータス", run)?;
        if self.strict_mobile {
            let mobile = Predicate::StrictMobile {
                column: self.config.required_phone_column.clone(),
            };
            apply_predicate(df, &mobile, "携帯電話形式", run)?;
        }
        Ok(())
    }
}
