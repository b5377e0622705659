use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251201_000002_create_stations::Station;
use super::m20251201_000003_create_profiles::{Renter, StationStaff};
use super::m20251201_000004_create_bikes::Bike;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(RentalStatus::Enum)
                    .values([
                        RentalStatus::Pending,
                        RentalStatus::Reserved,
                        RentalStatus::OnGoing,
                        RentalStatus::Cancelled,
                        RentalStatus::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rental::Table)
                    .if_not_exists()
                    .col(pk_auto(Rental::Id))
                    .col(integer(Rental::BikeId).not_null())
                    .col(string_len(Rental::LicensePlate, 20).not_null())
                    .col(integer(Rental::RenterId).not_null())
                    .col(integer(Rental::StationId).not_null())
                    .col(integer_null(Rental::AssignedStaffId))
                    .col(
                        ColumnDef::new(Rental::Status)
                            .custom(RentalStatus::Enum)
                            .not_null(),
                    )
                    .col(decimal_len(Rental::InitialBattery, 5, 2).not_null())
                    .col(decimal_len_null(Rental::FinalBattery, 5, 2))
                    .col(string_len_null(Rental::InitBikeCondition, 500))
                    .col(string_len_null(Rental::FinalBikeCondition, 500))
                    .col(timestamp_with_time_zone(Rental::StartDate).not_null())
                    .col(timestamp_with_time_zone(Rental::EndDate).not_null())
                    .col(timestamp_with_time_zone_null(Rental::ReservedDate))
                    .col(timestamp_with_time_zone_null(Rental::RentalDate))
                    .col(timestamp_with_time_zone_null(Rental::ReturnDate))
                    .col(decimal_len(Rental::Deposit, 12, 2).not_null())
                    .col(decimal_len_null(Rental::Fee, 12, 2))
                    .col(string_len_null(Rental::Note, 1000))
                    .col(
                        timestamp_with_time_zone(Rental::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_bike")
                            .from(Rental::Table, Rental::BikeId)
                            .to(Bike::Table, Bike::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_renter")
                            .from(Rental::Table, Rental::RenterId)
                            .to(Renter::Table, Renter::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_station")
                            .from(Rental::Table, Rental::StationId)
                            .to(Station::Table, Station::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_staff")
                            .from(Rental::Table, Rental::AssignedStaffId)
                            .to(StationStaff::Table, StationStaff::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The handover/return queues are always filtered by status
        manager
            .create_index(
                Index::create()
                    .name("idx_rental_status")
                    .table(Rental::Table)
                    .col(Rental::Status)
                    .to_owned(),
            )
            .await?;

        // Overlap guard scans rentals of one plate
        manager
            .create_index(
                Index::create()
                    .name("idx_rental_license_plate")
                    .table(Rental::Table)
                    .col(Rental::LicensePlate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rental::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RentalStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Rental {
    Table,
    Id,
    BikeId,
    LicensePlate,
    RenterId,
    StationId,
    AssignedStaffId,
    Status,
    InitialBattery,
    FinalBattery,
    InitBikeCondition,
    FinalBikeCondition,
    StartDate,
    EndDate,
    ReservedDate,
    RentalDate,
    ReturnDate,
    Deposit,
    Fee,
    Note,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum RentalStatus {
    #[sea_orm(iden = "rental_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "reserved")]
    Reserved,
    #[sea_orm(iden = "on_going")]
    OnGoing,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "completed")]
    Completed,
}
