use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create role enum
        manager
            .create_type(
                Type::create()
                    .as_enum(AccountRole::Enum)
                    .values([AccountRole::Admin, AccountRole::Staff, AccountRole::Renter])
                    .to_owned(),
            )
            .await?;

        // Create account status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(AccountStatus::Enum)
                    .values([
                        AccountStatus::Inactive,
                        AccountStatus::Active,
                        AccountStatus::Suspended,
                        AccountStatus::Deleted,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(pk_auto(Account::Id))
                    .col(string_len(Account::FullName, 100).not_null())
                    .col(string_len(Account::Email, 255).not_null().unique_key())
                    .col(string_len(Account::PasswordHash, 255).not_null())
                    .col(string_len(Account::Phone, 20).not_null())
                    .col(
                        ColumnDef::new(Account::Role)
                            .custom(AccountRole::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Account::Status)
                            .custom(AccountStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Account::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AccountStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AccountRole::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Account {
    Table,
    Id,
    FullName,
    Email,
    PasswordHash,
    Phone,
    Role,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AccountRole {
    #[sea_orm(iden = "account_role")]
    Enum,
    #[sea_orm(iden = "admin")]
    Admin,
    #[sea_orm(iden = "staff")]
    Staff,
    #[sea_orm(iden = "renter")]
    Renter,
}

#[derive(DeriveIden)]
pub enum AccountStatus {
    #[sea_orm(iden = "account_status")]
    Enum,
    #[sea_orm(iden = "inactive")]
    Inactive,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "suspended")]
    Suspended,
    #[sea_orm(iden = "deleted")]
    Deleted,
}
