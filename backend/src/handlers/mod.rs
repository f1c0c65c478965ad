//! HTTP handlers for the shrimp processing ERP API

mod conversion;
mod floor_balance;
mod health;
mod master_data;

pub use conversion::*;
pub use floor_balance::*;
pub use health::*;
pub use master_data::*;
