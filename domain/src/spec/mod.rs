//! Specification tables: ranked rows and the parser that produces them.

pub mod parsing;
pub mod row;

pub use parsing::{ParseProfile, TableParser};
pub use row::{PricingImpact, SpecRow, TABLE_COLUMNS};
