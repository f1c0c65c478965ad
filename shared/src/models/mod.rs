//! Domain models for the shrimp processing ERP core

mod conversion;
mod conversion_sync;
mod floor_balance;
mod ledger;
mod master;

pub use conversion::*;
pub use conversion_sync::*;
pub use floor_balance::*;
pub use ledger::*;
pub use master::*;
