//! Business logic services for the shrimp processing ERP

pub mod conversion;
pub mod floor_balance;
pub mod master_data;

pub use conversion::ConversionService;
pub use floor_balance::FloorBalanceService;
pub use master_data::MasterDataService;
