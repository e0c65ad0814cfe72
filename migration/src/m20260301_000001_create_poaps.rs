use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poaps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poaps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poaps::Title).string_len(128).not_null())
                    .col(ColumnDef::new(Poaps::Description).text().not_null())
                    .col(ColumnDef::new(Poaps::ImageUrl).string_len(512).not_null())
                    .col(ColumnDef::new(Poaps::Website).string_len(512).null())
                    .col(
                        ColumnDef::new(Poaps::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Poaps::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Poaps::Attendees).integer().null())
                    .col(
                        ColumnDef::new(Poaps::CreatorWallet)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Poaps::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Poaps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Poaps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name("idx_poaps_creator")
                            .col(Poaps::CreatorWallet)
                            .col(Poaps::CreatedAt),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PoapTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PoapTokens::PoapId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PoapTokens::MintAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PoapTokens::MetadataUri)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PoapTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PoapTokens::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poap_tokens_poap")
                            .from(PoapTokens::Table, PoapTokens::PoapId)
                            .to(Poaps::Table, Poaps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PoapTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Poaps::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Poaps {
    Table,
    Id,
    Title,
    Description,
    ImageUrl,
    Website,
    StartDate,
    EndDate,
    Attendees,
    CreatorWallet,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PoapTokens {
    Table,
    PoapId,
    MintAddress,
    MetadataUri,
    CreatedAt,
    UpdatedAt,
}
