pub mod contract_list;
pub mod error;
pub mod filter_config;
pub mod record;
pub mod registration;

pub use contract_list::PhoneTarget;
pub use error::{FeedError, Result};
pub use filter_config::{DateMode, FilterConfig, IdentityMode, IdentityRule};
pub use record::{ColumnRef, Record};
pub use registration::{canonical_entity, canonical_role, registration_label};
