//! Field mapping from contract feeds into output templates.
//!
//! Each output field is described by a [`MappingRule`] in a [`RuleTable`]; a
//! [`Mapper`] resolves the table against an input record, falls back to its
//! [`DefaultTable`] on absence or failure, then applies entity-specific
//! custom rules.

pub mod entities;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod rules;
pub mod transforms;

pub use entities::{
    ArkLatePaymentMapper, ArkRegion, ArkRegistrationMapper, AutocallHistoryMapper,
    CapcoDebtUpdateMapper, CapcoRegistrationMapper, DIALER_COLUMNS, FaithMapper, HistoryTarget,
    MirailMapper, PlazaMapper, PositionalDialerMapper,
};
pub use error::TransformError;
pub use mapper::{Mapper, MapperContext, resolve_field, resolve_record};
pub use registry::{MapperBuilder, MapperRegistry};
pub use rules::{DefaultTable, MappingRule, NamedTransform, RuleTable, TransformFn};
pub use transforms::extract_clean_phone_number;
