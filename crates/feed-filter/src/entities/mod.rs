//! Entity filters. Each adds zero to two rules after the common five.

pub mod faith;
pub mod mirail;
pub mod plaza;

pub use faith::{FaithFilter, FaithSmsFilter};
pub use mirail::MirailFilter;
pub use plaza::PlazaFilter;
