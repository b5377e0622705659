use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Station::Table)
                    .if_not_exists()
                    .col(pk_auto(Station::Id))
                    .col(string_len(Station::Name, 255).not_null())
                    .col(string_len(Station::Address, 500).not_null())
                    .col(integer(Station::Capacity).not_null())
                    .col(string_len(Station::ContactNumber, 20).not_null())
                    .col(
                        string_len(Station::OpeningHours, 100)
                            .not_null()
                            .default("24/7"),
                    )
                    .col(boolean(Station::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Station::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the two launch stations
        let insert = Query::insert()
            .into_table(Station::Table)
            .columns([
                Station::Name,
                Station::Address,
                Station::Capacity,
                Station::ContactNumber,
            ])
            .values_panic([
                "District 1 Station".into(),
                "12 Nguyen Hue, District 1".into(),
                40.into(),
                "0901234567".into(),
            ])
            .values_panic([
                "Thu Duc Station".into(),
                "35 Vo Van Ngan, Thu Duc".into(),
                25.into(),
                "0907654321".into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Station::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Station {
    Table,
    Id,
    Name,
    Address,
    Capacity,
    ContactNumber,
    OpeningHours,
    IsActive,
    CreatedAt,
}
