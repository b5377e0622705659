use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brand::Table)
                    .if_not_exists()
                    .col(pk_auto(Brand::Id))
                    .col(string_len(Brand::Name, 100).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bike::Table)
                    .if_not_exists()
                    .col(pk_auto(Bike::Id))
                    .col(string_len(Bike::Name, 100).not_null())
                    .col(integer(Bike::BrandId).not_null())
                    .col(string_len(Bike::Description, 500).not_null())
                    .col(string_len(Bike::BatteryCapacity, 50).not_null())
                    .col(decimal_len(Bike::PricePerDay, 12, 2).not_null())
                    .col(boolean(Bike::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Bike::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bike_brand")
                            .from(Bike::Table, Bike::BrandId)
                            .to(Brand::Table, Brand::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bike::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brand::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Brand {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum Bike {
    Table,
    Id,
    Name,
    BrandId,
    Description,
    BatteryCapacity,
    PricePerDay,
    IsActive,
    CreatedAt,
}
