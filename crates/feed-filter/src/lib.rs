//! Row filtering for contract list feeds.
//!
//! Two front ends share one predicate core ([`predicate::Predicate`]):
//!
//! - [`ContractFilter`] addresses columns by header name and runs the five
//!   common predicates followed by an entity hook.
//! - [`FilterEngine`] addresses columns by position and runs a caller-ordered
//!   list of steps with detailed exclusion reporting.

pub mod contract_filter;
pub mod engine;
pub mod entities;
pub mod normalize;
pub mod predicate;
pub mod registry;
pub mod report;

pub use contract_filter::{
    ContractFilter, FilterRun, amount_filter, apply_common_filters, apply_predicate, category_filter,
    common_predicates, date_filter, identity_filter, phone_filter,
};
pub use engine::{
    EngineReport, EngineStep, ExclusionDetail, FilterEngine, StepKind, StepOutcome,
    mirail_autocall_steps,
};
pub use entities::{FaithFilter, FaithSmsFilter, MirailFilter, PlazaFilter};
pub use predicate::{Predicate, is_strict_mobile};
pub use registry::{FilterBuilder, FilterOverrides, FilterRegistry};
pub use report::{FilterReport, StageCount};
