//! Core data types: genomic features and row display orders

mod feature;
mod row_order;

pub use feature::{Feature, Strand};
pub use row_order::RowOrder;
