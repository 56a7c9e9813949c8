pub use range_set::RangeSet;

mod range;
pub mod range_set;
