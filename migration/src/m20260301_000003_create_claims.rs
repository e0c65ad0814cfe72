use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

use crate::m20260301_000001_create_poaps::Poaps;
use crate::m20260301_000002_create_distribution_methods::DistributionMethods;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The composite key is what stops a wallet claiming the same POAP twice
        manager
            .create_table(
                Table::create()
                    .table(PoapClaims::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PoapClaims::PoapId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PoapClaims::WalletAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PoapClaims::DistributionMethodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PoapClaims::MethodKind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PoapClaims::TransactionSignature)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PoapClaims::ClaimedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PoapClaims::PoapId)
                            .col(PoapClaims::WalletAddress),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poap_claims_poap")
                            .from(PoapClaims::Table, PoapClaims::PoapId)
                            .to(Poaps::Table, Poaps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poap_claims_method")
                            .from(PoapClaims::Table, PoapClaims::DistributionMethodId)
                            .to(DistributionMethods::Table, DistributionMethods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Wallet collection lookups
                    .index(
                        Index::create()
                            .name("idx_poap_claims_wallet")
                            .col(PoapClaims::WalletAddress)
                            .col(PoapClaims::ClaimedAt),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PoapClaims::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PoapClaims {
    Table,
    PoapId,
    WalletAddress,
    DistributionMethodId,
    MethodKind,
    TransactionSignature,
    ClaimedAt,
}
