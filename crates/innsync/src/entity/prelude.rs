//! Common re-exports for convenient entity usage.

pub use super::property::{
    ActiveModel as PropertyActiveModel, Column as PropertyColumn, Entity as Property,
    Model as PropertyModel,
};
pub use super::property_details::{
    ActiveModel as PropertyDetailsActiveModel, Column as PropertyDetailsColumn,
    Entity as PropertyDetails, Model as PropertyDetailsModel,
};
pub use super::review::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Entity as Review,
    Model as ReviewModel,
};
pub use super::run_status::RunStatus;
pub use super::sync_log::{
    ActiveModel as SyncLogActiveModel, Column as SyncLogColumn, Entity as SyncLog,
    Model as SyncLogModel,
};
pub use super::sync_setting::{
    ActiveModel as SyncSettingActiveModel, Column as SyncSettingColumn, Entity as SyncSetting,
    Model as SyncSettingModel,
};
pub use super::sync_status::SyncStatus;
pub use super::translation::{
    ActiveModel as TranslationActiveModel, Column as TranslationColumn, Entity as Translation,
    Model as TranslationModel,
};
