use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251201_000003_create_profiles::Renter;
use super::m20251201_000006_create_rentals::Rental;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentMethod::Enum)
                    .values([PaymentMethod::PayOs, PaymentMethod::Cash])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentKind::Enum)
                    .values([PaymentKind::Deposit, PaymentKind::Fee, PaymentKind::Refund])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentStatus::Enum)
                    .values([
                        PaymentStatus::Pending,
                        PaymentStatus::Completed,
                        PaymentStatus::Failed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(integer(Payment::RenterId).not_null())
                    .col(integer(Payment::RentalId).not_null())
                    .col(decimal_len(Payment::Amount, 12, 2).not_null())
                    .col(
                        ColumnDef::new(Payment::Method)
                            .custom(PaymentMethod::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payment::Kind)
                            .custom(PaymentKind::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payment::Status)
                            .custom(PaymentStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len_null(Payment::Note, 500))
                    .col(
                        timestamp_with_time_zone(Payment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Payment::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_renter")
                            .from(Payment::Table, Payment::RenterId)
                            .to(Renter::Table, Renter::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_rental")
                            .from(Payment::Table, Payment::RentalId)
                            .to(Rental::Table, Rental::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentKind::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentMethod::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payment {
    Table,
    Id,
    RenterId,
    RentalId,
    Amount,
    Method,
    Kind,
    Status,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PaymentMethod {
    #[sea_orm(iden = "payment_method")]
    Enum,
    #[sea_orm(iden = "pay_os")]
    PayOs,
    #[sea_orm(iden = "cash")]
    Cash,
}

#[derive(DeriveIden)]
pub enum PaymentKind {
    #[sea_orm(iden = "payment_kind")]
    Enum,
    #[sea_orm(iden = "deposit")]
    Deposit,
    #[sea_orm(iden = "fee")]
    Fee,
    #[sea_orm(iden = "refund")]
    Refund,
}

#[derive(DeriveIden)]
pub enum PaymentStatus {
    #[sea_orm(iden = "payment_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "failed")]
    Failed,
}
