pub mod ids;
pub mod level;
pub mod orderbook;
pub mod side;
pub mod store;

pub use ids::{IdSource, SequenceIds};
pub use level::PriceLevel;
pub use orderbook::MatchingEngine;
pub use side::BookSide;
pub use store::OrderStore;
