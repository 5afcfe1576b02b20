//! Schedulers that turn sparse inputs into month-indexed sequences
//!
//! - Absorption: unit sales per month from a sales velocity
//! - Cost curves: lump-sum cost spread linearly or along a logistic s-curve

mod sequence;
mod absorption;
mod curve;

pub use sequence::MonthlySequence;
pub use absorption::schedule_absorption;
pub use curve::distribute;
