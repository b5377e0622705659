use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "station")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub contact_number: String,
    pub opening_hours: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bike_stock::Entity")]
    BikeStocks,
    #[sea_orm(has_many = "super::station_staff::Entity")]
    Staff,
    #[sea_orm(has_many = "super::rental::Entity")]
    Rentals,
}

impl Related<super::bike_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BikeStocks.def()
    }
}

impl Related<super::station_staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rentals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
