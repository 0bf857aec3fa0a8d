//! Initial migration to create the property mirror schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_properties(manager).await?;
        self.create_property_details(manager).await?;
        self.create_reviews(manager).await?;
        self.create_translations(manager).await?;
        self.create_sync_logs(manager).await?;
        self.create_sync_settings(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            SyncSettings::Table.into_table_ref(),
            SyncLogs::Table.into_table_ref(),
            Translations::Table.into_table_ref(),
            Reviews::Table.into_table_ref(),
            PropertyDetails::Table.into_table_ref(),
            Properties::Table.into_table_ref(),
        ] {
            manager.drop_table(Table::drop().table(table).to_owned()).await?;
        }
        Ok(())
    }
}

impl Migration {
    async fn create_properties(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::HotelId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Properties::CupidId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    // Header
                    .col(ColumnDef::new(Properties::HotelName).string().not_null())
                    .col(
                        ColumnDef::new(Properties::HotelType)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::HotelTypeId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::Chain)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::ChainId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::Latitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Properties::Longitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Properties::Stars)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::Rating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Properties::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::AirportCode)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    // Address
                    .col(
                        ColumnDef::new(Properties::City)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::State)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::Country)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::PostalCode)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Properties::MainImageTh)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    // Sync bookkeeping
                    .col(
                        ColumnDef::new(Properties::LastSynced)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Properties::SyncStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Properties::DataVersion)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Properties::LastUpdated)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_city_country")
                    .table(Properties::Table)
                    .col(Properties::City)
                    .col(Properties::Country)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_rating")
                    .table(Properties::Table)
                    .col((Properties::Rating, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_last_synced")
                    .table(Properties::Table)
                    .col(Properties::LastSynced)
                    .to_owned(),
            )
            .await
    }

    async fn create_property_details(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PropertyDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PropertyDetails::PropertyId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Address)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::CheckinInfo)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Facilities)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Policies)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Rooms)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Photos)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::ContactInfo)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::Metadata)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PropertyDetails::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_details_property")
                            .from(PropertyDetails::Table, PropertyDetails::PropertyId)
                            .to(Properties::Table, Properties::HotelId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_reviews(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::PropertyId).big_integer().not_null())
                    .col(ColumnDef::new(Reviews::ReviewId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::AverageScore)
                            .integer()
                            .not_null()
                            .check(
                                Expr::col(Reviews::AverageScore)
                                    .gte(1)
                                    .and(Expr::col(Reviews::AverageScore).lte(10)),
                            ),
                    )
                    .col(
                        ColumnDef::new(Reviews::Country)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::ReviewType)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::Name)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::Date)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::Headline)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::Language)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Reviews::Pros).text().not_null().default(""))
                    .col(ColumnDef::new(Reviews::Cons).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Reviews::Source)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_property")
                            .from(Reviews::Table, Reviews::PropertyId)
                            .to(Properties::Table, Properties::HotelId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_property_review")
                    .table(Reviews::Table)
                    .col(Reviews::PropertyId)
                    .col(Reviews::ReviewId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_score")
                    .table(Reviews::Table)
                    .col(Reviews::AverageScore)
                    .to_owned(),
            )
            .await
    }

    async fn create_translations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Translations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Translations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Translations::PropertyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Translations::Language)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Translations::HotelName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Translations::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Translations::MarkdownDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Translations::ImportantInfo)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Translations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Translations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_property")
                            .from(Translations::Table, Translations::PropertyId)
                            .to(Properties::Table, Properties::HotelId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_translations_property_language")
                    .table(Translations::Table)
                    .col(Translations::PropertyId)
                    .col(Translations::Language)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn create_sync_logs(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::SyncId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::SyncType)
                            .string()
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Status)
                            .string()
                            .not_null()
                            .default("running"),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::TotalProperties)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::UpdatedProperties)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::FailedProperties)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(SyncLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_logs_started_at")
                    .table(SyncLogs::Table)
                    .col((SyncLogs::StartedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn create_sync_settings(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncSettings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SyncSettings::SettingKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SyncSettings::SettingValue).string().not_null())
                    .col(
                        ColumnDef::new(SyncSettings::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SyncSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    HotelId,
    CupidId,
    HotelName,
    HotelType,
    HotelTypeId,
    Chain,
    ChainId,
    Latitude,
    Longitude,
    Stars,
    Rating,
    ReviewCount,
    AirportCode,
    City,
    State,
    Country,
    PostalCode,
    MainImageTh,
    LastSynced,
    SyncStatus,
    DataVersion,
    LastUpdated,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PropertyDetails {
    Table,
    PropertyId,
    Address,
    CheckinInfo,
    Facilities,
    Policies,
    Rooms,
    Photos,
    ContactInfo,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    PropertyId,
    ReviewId,
    AverageScore,
    Country,
    ReviewType,
    Name,
    Date,
    Headline,
    Language,
    Pros,
    Cons,
    Source,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Translations {
    Table,
    Id,
    PropertyId,
    Language,
    HotelName,
    Description,
    MarkdownDescription,
    ImportantInfo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SyncLogs {
    Table,
    Id,
    SyncId,
    SyncType,
    Status,
    StartedAt,
    CompletedAt,
    TotalProperties,
    UpdatedProperties,
    FailedProperties,
    ErrorMessage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SyncSettings {
    Table,
    Id,
    SettingKey,
    SettingValue,
    Description,
    UpdatedAt,
}
