pub mod filter;
pub mod ledger;
pub mod model;
pub mod players;
pub mod summary;

pub use filter::{filter_ledger, LedgerFilter};
pub use ledger::compute_wpa_ledger;
pub use players::aggregate_players;
pub use summary::{summarize_game, GameSummary};
