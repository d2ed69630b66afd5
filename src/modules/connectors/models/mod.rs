pub mod connected_account;

pub use connected_account::{AccountKind, ConnectedAccount};
