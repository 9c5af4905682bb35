use anyhow::Result;
use polars::prelude::DataFrame;

use feed_model::contract_list::header;
use feed_model::{ColumnRef, FilterConfig};

use crate::contract_filter::{ContractFilter, FilterRun, apply_predicate};
use crate::predicate::Predicate;

/// Client codes whose fixed-fee balances are suppressed.
pub const SUPPRESSED_CLIENT_CODES: [f64; 2] = [1.0, 4.0];
/// Balances treated as fixed fees rather than arrears.
pub const SUPPRESSED_DEBT_AMOUNTS: [f64; 2] = [10000.0, 11000.0];

pub const DEBT_EXCLUSION_LABEL: &str = "ミライル特殊残債";

pub fn debt_suppression(code_column: ColumnRef, amount_column: ColumnRef) -> Predicate {
    Predicate::Suppression {
        code_column,
        amount_column,
        codes: SUPPRESSED_CLIENT_CODES.to_vec(),
        amounts: SUPPRESSED_DEBT_AMOUNTS.to_vec(),
    }
}

pub struct MirailFilter {
    config: FilterConfig,
    debt_exclusion: bool,
}

impl MirailFilter {
    pub fn new(config: FilterConfig, debt_exclusion: bool) -> Self {
        Self {
            config,
            debt_exclusion,
        }
    }
}

impl ContractFilter for MirailFilter {
    fn entity(&self) -> &'static str {
        "mirail"
    }

    fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn apply_entity_filters(&self, df: &mut DataFrame, run: &mut FilterRun) -> Result<()> {
        if !self.debt_exclusion {
            return Ok(());
        }
        let predicate = debt_suppression(
            ColumnRef::name(header::CLIENT_CD),
            ColumnRef::name(header::DEBT_AMOUNT),
        );
        apply_predicate(df, &predicate, DEBT_EXCLUSION_LABEL, run)
    }
}
