pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AccountKind, ConnectedAccount};
pub use repositories::AccountRepository;
pub use services::{Aggregator, GmailPayoutClient, PayoutMailbox, PayoutStatement, PosProvider, RistaClient};
