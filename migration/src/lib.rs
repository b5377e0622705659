pub use sea_orm_migration::prelude::*;

mod m20251201_000001_create_accounts;
mod m20251201_000002_create_stations;
mod m20251201_000003_create_profiles;
mod m20251201_000004_create_bikes;
mod m20251201_000005_create_bike_stocks;
mod m20251201_000006_create_rentals;
mod m20251201_000007_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251201_000001_create_accounts::Migration),
            Box::new(m20251201_000002_create_stations::Migration),
            Box::new(m20251201_000003_create_profiles::Migration),
            Box::new(m20251201_000004_create_bikes::Migration),
            Box::new(m20251201_000005_create_bike_stocks::Migration),
            Box::new(m20251201_000006_create_rentals::Migration),
            Box::new(m20251201_000007_create_payments::Migration),
        ]
    }
}
