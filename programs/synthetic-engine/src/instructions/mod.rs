pub mod adapters;
pub mod initialize;
pub mod price_feed;
pub mod open_position;
pub mod collateral;
pub mod debt;
pub mod liquidate;

pub use adapters::*;
pub use initialize::*;
pub use price_feed::*;
pub use open_position::*;
pub use collateral::*;
pub use debt::*;
pub use liquidate::*;
