use sea_orm_migration::{prelude::*, schema::*};

use super::m20251201_000001_create_accounts::Account;
use super::m20251201_000002_create_stations::Station;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Renter::Table)
                    .if_not_exists()
                    .col(pk_auto(Renter::Id))
                    .col(integer(Renter::AccountId).not_null().unique_key())
                    .col(integer(Renter::TotalRental).not_null().default(0))
                    .col(
                        decimal_len(Renter::TotalSpent, 12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(boolean(Renter::IsVerified).not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_renter_account")
                            .from(Renter::Table, Renter::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StationStaff::Table)
                    .if_not_exists()
                    .col(pk_auto(StationStaff::Id))
                    .col(integer(StationStaff::AccountId).not_null().unique_key())
                    .col(integer_null(StationStaff::StationId))
                    .col(integer(StationStaff::HandoverTimes).not_null().default(0))
                    .col(integer(StationStaff::ReceiveTimes).not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_station_staff_account")
                            .from(StationStaff::Table, StationStaff::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_station_staff_station")
                            .from(StationStaff::Table, StationStaff::StationId)
                            .to(Station::Table, Station::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StationStaff::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Renter::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Renter {
    Table,
    Id,
    AccountId,
    TotalRental,
    TotalSpent,
    IsVerified,
}

#[derive(DeriveIden)]
pub enum StationStaff {
    Table,
    Id,
    AccountId,
    StationId,
    HandoverTimes,
    ReceiveTimes,
}
