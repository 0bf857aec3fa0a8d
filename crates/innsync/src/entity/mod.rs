//! SeaORM entity definitions for the property mirror schema.

pub mod prelude;
pub mod property;
pub mod property_details;
pub mod review;
pub mod run_status;
pub mod sync_log;
pub mod sync_setting;
pub mod sync_status;
pub mod translation;
