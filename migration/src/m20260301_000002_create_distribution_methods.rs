use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

use crate::m20260301_000001_create_poaps::Poaps;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DistributionMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DistributionMethods::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::PoapId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::Kind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DistributionMethods::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_distribution_methods_poap")
                            .from(DistributionMethods::Table, DistributionMethods::PoapId)
                            .to(Poaps::Table, Poaps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_distribution_methods_poap_kind")
                            .col(DistributionMethods::PoapId)
                            .col(DistributionMethods::Kind),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClaimLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClaimLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClaimLinks::DistributionMethodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClaimLinks::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ClaimLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ClaimLinks::Claimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ClaimLinks::ClaimedBy).string_len(64).null())
                    .col(
                        ColumnDef::new(ClaimLinks::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_links_method")
                            .from(ClaimLinks::Table, ClaimLinks::DistributionMethodId)
                            .to(DistributionMethods::Table, DistributionMethods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_claim_links_method")
                            .col(ClaimLinks::DistributionMethodId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SecretWords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecretWords::DistributionMethodId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SecretWords::Word).string_len(128).not_null())
                    .col(
                        ColumnDef::new(SecretWords::ClaimCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SecretWords::MaxClaims).integer().null())
                    .col(
                        ColumnDef::new(SecretWords::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SecretWords::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_secret_words_method")
                            .from(SecretWords::Table, SecretWords::DistributionMethodId)
                            .to(DistributionMethods::Table, DistributionMethods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LocationRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocationRules::DistributionMethodId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LocationRules::Label).string_len(128).null())
                    .col(ColumnDef::new(LocationRules::Latitude).double().not_null())
                    .col(ColumnDef::new(LocationRules::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(LocationRules::RadiusMeters)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LocationRules::ClaimCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LocationRules::MaxClaims).integer().null())
                    .col(
                        ColumnDef::new(LocationRules::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LocationRules::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_rules_method")
                            .from(LocationRules::Table, LocationRules::DistributionMethodId)
                            .to(DistributionMethods::Table, DistributionMethods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Airdrops::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Airdrops::DistributionMethodId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Airdrops::Addresses).json().not_null())
                    .col(
                        ColumnDef::new(Airdrops::ClaimCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_airdrops_method")
                            .from(Airdrops::Table, Airdrops::DistributionMethodId)
                            .to(DistributionMethods::Table, DistributionMethods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Airdrops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LocationRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SecretWords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClaimLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DistributionMethods::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum DistributionMethods {
    Table,
    Id,
    PoapId,
    Kind,
    Disabled,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClaimLinks {
    Table,
    Id,
    DistributionMethodId,
    Token,
    ExpiresAt,
    Claimed,
    ClaimedBy,
    ClaimedAt,
}

#[derive(DeriveIden)]
enum SecretWords {
    Table,
    DistributionMethodId,
    Word,
    ClaimCount,
    MaxClaims,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
enum LocationRules {
    Table,
    DistributionMethodId,
    Label,
    Latitude,
    Longitude,
    RadiusMeters,
    ClaimCount,
    MaxClaims,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
enum Airdrops {
    Table,
    DistributionMethodId,
    Addresses,
    ClaimCount,
}
