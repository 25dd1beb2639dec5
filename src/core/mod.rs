// Core pipeline exports
pub mod bookings;
pub mod fetch;
pub mod parser;
pub mod prompt;
pub mod reconcile;
pub mod recommender;

pub use bookings::{find_conflict, BookingError, StayRange};
pub use fetch::{fetch_all, fetch_both, FetchErrors, FetchFailure, FetchStage};
pub use parser::{parse_identifiers, serialize_identifiers, MalformedIdentifierError};
pub use prompt::RankingContract;
pub use reconcile::{reconcile, InventoryIndex, Reconciled};
pub use recommender::{PropertyReader, Ranker, RecommendError, Recommender};
