use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle states of a rental. Transition legality lives in
/// [`crate::lifecycle`]; nothing mutates `status` outside those guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rental_status")]
pub enum RentalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "on_going")]
    OnGoing,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rental")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bike_id: i32,
    pub license_plate: String,
    pub renter_id: i32,
    pub station_id: i32,
    pub assigned_staff_id: Option<i32>,
    pub status: RentalStatus,
    pub initial_battery: Decimal,
    pub final_battery: Option<Decimal>,
    pub init_bike_condition: Option<String>,
    pub final_bike_condition: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub reserved_date: Option<DateTimeWithTimeZone>,
    /// Actual handover instant, set when the rental goes OnGoing.
    pub rental_date: Option<DateTimeWithTimeZone>,
    /// Actual return instant; its presence is the authoritative return guard.
    pub return_date: Option<DateTimeWithTimeZone>,
    pub deposit: Decimal,
    pub fee: Option<Decimal>,
    pub note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bike::Entity",
        from = "Column::BikeId",
        to = "super::bike::Column::Id"
    )]
    Bike,
    #[sea_orm(
        belongs_to = "super::renter::Entity",
        from = "Column::RenterId",
        to = "super::renter::Column::Id"
    )]
    Renter,
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id"
    )]
    Station,
    #[sea_orm(
        belongs_to = "super::station_staff::Entity",
        from = "Column::AssignedStaffId",
        to = "super::station_staff::Column::Id"
    )]
    Staff,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::renter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Renter.def()
    }
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl Related<super::station_staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
