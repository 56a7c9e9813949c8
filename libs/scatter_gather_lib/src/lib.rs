pub use block_map::BlockMap;
pub use error::{Error, Result};
pub use gather::GatherStream;
pub use pair::{pair, pair_with_timeout, PairOptions, DEFAULT_TIMEOUT};
pub use scatter::ScatterStream;
pub use types::{Availability, Endpoint};

pub mod block_map;
mod buffer;
mod error;
mod gather;
mod pair;
mod position;
mod scatter;
pub mod types;
#[cfg(test)]
mod tests;
