use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251201_000002_create_stations::Station;
use super::m20251201_000004_create_bikes::Bike;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(StockStatus::Enum)
                    .values([
                        StockStatus::Available,
                        StockStatus::Rented,
                        StockStatus::Maintenance,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BikeStock::Table)
                    .if_not_exists()
                    .col(pk_auto(BikeStock::Id))
                    .col(integer(BikeStock::BikeId).not_null())
                    .col(integer(BikeStock::StationId).not_null())
                    .col(string_len(BikeStock::Color, 30).not_null())
                    .col(
                        string_len(BikeStock::LicensePlate, 20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(integer(BikeStock::BatteryCapacity).not_null().default(100))
                    .col(
                        ColumnDef::new(BikeStock::Status)
                            .custom(StockStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(BikeStock::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(BikeStock::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bike_stock_bike")
                            .from(BikeStock::Table, BikeStock::BikeId)
                            .to(Bike::Table, Bike::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bike_stock_station")
                            .from(BikeStock::Table, BikeStock::StationId)
                            .to(Station::Table, Station::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BikeStock::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(StockStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BikeStock {
    Table,
    Id,
    BikeId,
    StationId,
    Color,
    LicensePlate,
    BatteryCapacity,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum StockStatus {
    #[sea_orm(iden = "stock_status")]
    Enum,
    #[sea_orm(iden = "available")]
    Available,
    #[sea_orm(iden = "rented")]
    Rented,
    #[sea_orm(iden = "maintenance")]
    Maintenance,
}
