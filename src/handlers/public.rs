use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::entities::bike_stock::{self, StockStatus};
use crate::entities::{bike, brand, station};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StationInfo {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub contact_number: String,
    pub opening_hours: String,
}

/// List active stations
pub async fn list_stations(State(state): State<AppState>) -> AppResult<Json<Vec<StationInfo>>> {
    let stations = station::Entity::find()
        .filter(station::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let responses: Vec<StationInfo> = stations
        .into_iter()
        .map(|s| StationInfo {
            id: s.id,
            name: s.name,
            address: s.address,
            capacity: s.capacity,
            contact_number: s.contact_number,
            opening_hours: s.opening_hours,
        })
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Serialize)]
pub struct BikeInfo {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub battery_capacity: String,
    pub price_per_day: Decimal,
}

/// List active bike models with their brand names
pub async fn list_bikes(State(state): State<AppState>) -> AppResult<Json<Vec<BikeInfo>>> {
    let bikes = bike::Entity::find()
        .filter(bike::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;
    let brands = brand::Entity::find().all(&state.db).await?;

    let responses: Vec<BikeInfo> = bikes
        .into_iter()
        .map(|b| {
            let brand_name = brands
                .iter()
                .find(|br| br.id == b.brand_id)
                .map(|br| br.name.clone())
                .unwrap_or_default();
            BikeInfo {
                id: b.id,
                name: b.name,
                brand: brand_name,
                description: b.description,
                battery_capacity: b.battery_capacity,
                price_per_day: b.price_per_day,
            }
        })
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub available: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StockInfo {
    pub id: i32,
    pub bike_id: i32,
    pub station_id: i32,
    pub station_name: String,
    pub color: String,
    pub license_plate: String,
    pub battery_capacity: i32,
    pub status: StockStatus,
}

/// List stock units of a bike model, optionally only the available ones
pub async fn list_stocks_by_bike(
    State(state): State<AppState>,
    Path(bike_id): Path<i32>,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<StockInfo>>> {
    bike::Entity::find_by_id(bike_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike model not found".to_string()))?;

    let mut finder = bike_stock::Entity::find()
        .filter(bike_stock::Column::BikeId.eq(bike_id));

    if query.available.unwrap_or(false) {
        finder = finder.filter(bike_stock::Column::Status.eq(StockStatus::Available));
    }

    let stocks = finder.all(&state.db).await?;
    let stations = station::Entity::find().all(&state.db).await?;

    let responses: Vec<StockInfo> = stocks
        .into_iter()
        .map(|s| {
            let station_name = stations
                .iter()
                .find(|st| st.id == s.station_id)
                .map(|st| st.name.clone())
                .unwrap_or_default();
            StockInfo {
                id: s.id,
                bike_id: s.bike_id,
                station_id: s.station_id,
                station_name,
                color: s.color,
                license_plate: s.license_plate,
                battery_capacity: s.battery_capacity,
                status: s.status,
            }
        })
        .collect();

    Ok(Json(responses))
}
