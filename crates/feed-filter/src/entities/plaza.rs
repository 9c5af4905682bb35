use feed_model::FilterConfig;

use crate::contract_filter::ContractFilter;

pub struct PlazaFilter {
    config: FilterConfig,
}

impl PlazaFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }
}

impl ContractFilter for PlazaFilter {
    fn entity(&self) -> &'static str {
        "plaza"
    }

    fn config(&self) -> &FilterConfig {
        &self.config
    }
}
