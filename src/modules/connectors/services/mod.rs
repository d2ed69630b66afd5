pub mod gmail;
pub mod provider_trait;
pub mod rista;

pub use gmail::GmailPayoutClient;
pub use provider_trait::{Aggregator, PayoutMailbox, PayoutStatement, PosProvider};
pub use rista::RistaClient;
