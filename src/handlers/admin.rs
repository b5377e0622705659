use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::account::{self, AccountStatus, Role};
use crate::entities::bike_stock::{self, StockStatus};
use crate::entities::payment::{self, PaymentStatus};
use crate::entities::rental::{self, RentalStatus};
use crate::entities::{bike, brand, renter, station, station_staff};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::hash_password;
use crate::handlers::renter::RentalResponse;
use crate::lifecycle;
use crate::AppState;

// ============ Station Management ============

#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub contact_number: String,
    pub opening_hours: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub contact_number: Option<String>,
    pub opening_hours: Option<String>,
    pub is_active: Option<bool>,
}

/// List all stations, inactive ones included
pub async fn list_stations(State(state): State<AppState>) -> AppResult<Json<Vec<station::Model>>> {
    let stations = station::Entity::find()
        .order_by_asc(station::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(stations))
}

pub async fn create_station(
    State(state): State<AppState>,
    Json(payload): Json<CreateStationRequest>,
) -> AppResult<Json<station::Model>> {
    if payload.capacity <= 0 {
        return Err(AppError::Validation(
            "Station capacity must be positive".to_string(),
        ));
    }

    let result = station::ActiveModel {
        name: Set(payload.name),
        address: Set(payload.address),
        capacity: Set(payload.capacity),
        contact_number: Set(payload.contact_number),
        opening_hours: Set(payload.opening_hours),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(result))
}

pub async fn update_station(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStationRequest>,
) -> AppResult<Json<station::Model>> {
    let found = station::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Station not found".to_string()))?;

    let mut active: station::ActiveModel = found.into();

    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(capacity) = payload.capacity {
        if capacity <= 0 {
            return Err(AppError::Validation(
                "Station capacity must be positive".to_string(),
            ));
        }
        active.capacity = Set(capacity);
    }
    if let Some(contact) = payload.contact_number {
        active.contact_number = Set(contact);
    }
    if let Some(hours) = payload.opening_hours {
        active.opening_hours = Set(hours);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(Json(active.update(&state.db).await?))
}

// ============ Brand and Bike Model Management ============

#[derive(Debug, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
}

pub async fn list_brands(State(state): State<AppState>) -> AppResult<Json<Vec<brand::Model>>> {
    Ok(Json(brand::Entity::find().all(&state.db).await?))
}

pub async fn create_brand(
    State(state): State<AppState>,
    Json(payload): Json<CreateBrandRequest>,
) -> AppResult<Json<brand::Model>> {
    let existing = brand::Entity::find()
        .filter(brand::Column::Name.eq(&payload.name))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Brand already exists".to_string()));
    }

    let result = brand::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct CreateBikeRequest {
    pub name: String,
    pub brand_id: i32,
    pub description: String,
    pub battery_capacity: String,
    pub price_per_day: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBikeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub battery_capacity: Option<String>,
    pub price_per_day: Option<Decimal>,
    pub is_active: Option<bool>,
}

pub async fn list_bikes(State(state): State<AppState>) -> AppResult<Json<Vec<bike::Model>>> {
    let bikes = bike::Entity::find()
        .order_by_asc(bike::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(bikes))
}

pub async fn create_bike(
    State(state): State<AppState>,
    Json(payload): Json<CreateBikeRequest>,
) -> AppResult<Json<bike::Model>> {
    brand::Entity::find_by_id(payload.brand_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid brand".to_string()))?;

    if payload.price_per_day <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Price per day must be positive".to_string(),
        ));
    }

    let result = bike::ActiveModel {
        name: Set(payload.name),
        brand_id: Set(payload.brand_id),
        description: Set(payload.description),
        battery_capacity: Set(payload.battery_capacity),
        price_per_day: Set(payload.price_per_day),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(result))
}

pub async fn update_bike(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBikeRequest>,
) -> AppResult<Json<bike::Model>> {
    let found = bike::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike model not found".to_string()))?;

    let mut active: bike::ActiveModel = found.into();

    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(battery) = payload.battery_capacity {
        active.battery_capacity = Set(battery);
    }
    if let Some(price) = payload.price_per_day {
        if price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price per day must be positive".to_string(),
            ));
        }
        active.price_per_day = Set(price);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(Json(active.update(&state.db).await?))
}

// ============ Stock Management ============

#[derive(Debug, Deserialize)]
pub struct CreateStockRequest {
    pub bike_id: i32,
    pub station_id: i32,
    pub color: String,
    pub license_plate: String,
    pub battery_capacity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub station_id: Option<i32>,
    pub color: Option<String>,
    pub battery_capacity: Option<i32>,
    pub status: Option<StockStatus>,
}

pub async fn list_stocks(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<bike_stock::Model>>> {
    let stocks = bike_stock::Entity::find()
        .order_by_asc(bike_stock::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(stocks))
}

pub async fn create_stock(
    State(state): State<AppState>,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<Json<bike_stock::Model>> {
    bike::Entity::find_by_id(payload.bike_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid bike model".to_string()))?;

    station::Entity::find_by_id(payload.station_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid station".to_string()))?;

    // License plates identify a unit fleet-wide
    let existing = bike_stock::Entity::find()
        .filter(bike_stock::Column::LicensePlate.eq(&payload.license_plate))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "A bike unit with this license plate already exists".to_string(),
        ));
    }

    let result = bike_stock::ActiveModel {
        bike_id: Set(payload.bike_id),
        station_id: Set(payload.station_id),
        color: Set(payload.color),
        license_plate: Set(payload.license_plate),
        battery_capacity: Set(payload.battery_capacity),
        status: Set(StockStatus::Available),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(result))
}

/// Update a stock unit. Units out with a renter cannot be edited or moved.
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStockRequest>,
) -> AppResult<Json<bike_stock::Model>> {
    let found = bike_stock::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike unit not found".to_string()))?;

    if found.status == StockStatus::Rented {
        return Err(AppError::Conflict(
            "Cannot modify a bike unit that is currently rented".to_string(),
        ));
    }

    if payload.status == Some(StockStatus::Rented) {
        return Err(AppError::Validation(
            "Rented status is set by the handover flow, not directly".to_string(),
        ));
    }

    let mut active: bike_stock::ActiveModel = found.into();

    if let Some(station_id) = payload.station_id {
        station::Entity::find_by_id(station_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid station".to_string()))?;
        active.station_id = Set(station_id);
    }
    if let Some(color) = payload.color {
        active.color = Set(color);
    }
    if let Some(battery) = payload.battery_capacity {
        active.battery_capacity = Set(battery);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    Ok(Json(active.update(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct StockCountResponse {
    pub station_id: i32,
    pub total: u64,
    pub available: u64,
}

/// Count the stock units parked at a station
pub async fn station_stock_count(
    State(state): State<AppState>,
    Path(station_id): Path<i32>,
) -> AppResult<Json<StockCountResponse>> {
    station::Entity::find_by_id(station_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Station not found".to_string()))?;

    let total = bike_stock::Entity::find()
        .filter(bike_stock::Column::StationId.eq(station_id))
        .count(&state.db)
        .await?;

    let available = bike_stock::Entity::find()
        .filter(bike_stock::Column::StationId.eq(station_id))
        .filter(bike_stock::Column::Status.eq(StockStatus::Available))
        .count(&state.db)
        .await?;

    Ok(Json(StockCountResponse {
        station_id,
        total,
        available,
    }))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let found = bike_stock::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike unit not found".to_string()))?;

    if found.status == StockStatus::Rented {
        return Err(AppError::Conflict(
            "Cannot delete a bike unit that is currently rented".to_string(),
        ));
    }

    bike_stock::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Bike unit deleted" })))
}

// ============ Rental Management ============

#[derive(Debug, Deserialize)]
pub struct RentalFilter {
    pub status: Option<RentalStatus>,
    pub renter_id: Option<i32>,
}

/// Non-lifecycle rental fields an admin may correct. Status never changes
/// through this endpoint; the lifecycle transitions own it.
#[derive(Debug, Deserialize)]
pub struct UpdateRentalRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub deposit: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub note: Option<String>,
}

pub async fn list_rentals(
    State(state): State<AppState>,
    Query(filter): Query<RentalFilter>,
) -> AppResult<Json<Vec<RentalResponse>>> {
    let mut finder = rental::Entity::find().order_by_desc(rental::Column::CreatedAt);

    if let Some(status) = filter.status {
        finder = finder.filter(rental::Column::Status.eq(status));
    }
    if let Some(renter_id) = filter.renter_id {
        finder = finder.filter(rental::Column::RenterId.eq(renter_id));
    }

    let rentals = finder.all(&state.db).await?;
    Ok(Json(rentals.into_iter().map(Into::into).collect()))
}

pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRentalRequest>,
) -> AppResult<Json<RentalResponse>> {
    let found = rental::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

    let start = payload
        .start_date
        .unwrap_or_else(|| found.start_date.with_timezone(&Utc));
    let end = payload
        .end_date
        .unwrap_or_else(|| found.end_date.with_timezone(&Utc));
    let reserved = found.reserved_date.map(|d| d.with_timezone(&Utc));
    lifecycle::validate_schedule(start, end, reserved)?;

    // Rescheduling must honor the same double-booking guard as creation
    if payload.start_date.is_some() || payload.end_date.is_some() {
        let others = rental::Entity::find()
            .filter(rental::Column::LicensePlate.eq(&found.license_plate))
            .filter(rental::Column::Id.ne(found.id))
            .filter(rental::Column::Status.ne(RentalStatus::Cancelled))
            .all(&state.db)
            .await?;

        for other in &others {
            if lifecycle::intervals_overlap(
                other.start_date.with_timezone(&Utc),
                other.end_date.with_timezone(&Utc),
                start,
                end,
            ) {
                return Err(AppError::Conflict(
                    "This bike unit is already booked for an overlapping period".to_string(),
                ));
            }
        }
    }

    let mut active: rental::ActiveModel = found.into();

    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date.into());
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date.into());
    }
    if let Some(deposit) = payload.deposit {
        if deposit <= Decimal::ZERO {
            return Err(AppError::Validation("Deposit must be positive".to_string()));
        }
        active.deposit = Set(deposit);
    }
    if let Some(fee) = payload.fee {
        if fee < Decimal::ZERO {
            return Err(AppError::Validation("Fee cannot be negative".to_string()));
        }
        active.fee = Set(Some(fee));
    }
    if payload.note.is_some() {
        active.note = Set(payload.note);
    }

    Ok(Json(active.update(&state.db).await?.into()))
}

/// Remove a rental record entirely. Only rentals that never reached the
/// road, or were cancelled, may go.
pub async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let found = rental::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

    lifecycle::ensure_can_delete(found.status)?;

    state
        .db
        .transaction::<_, (), AppError>(move |txn| {
            Box::pin(async move {
                payment::Entity::delete_many()
                    .filter(payment::Column::RentalId.eq(found.id))
                    .exec(txn)
                    .await?;
                rental::Entity::delete_by_id(found.id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

    Ok(Json(serde_json::json!({ "message": "Rental deleted" })))
}

// ============ Staff Management ============

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub station_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StaffResponse {
    pub id: i32,
    pub account_id: i32,
    pub full_name: String,
    pub email: String,
    pub station_id: Option<i32>,
    pub handover_times: i32,
    pub receive_times: i32,
}

pub async fn list_staff(State(state): State<AppState>) -> AppResult<Json<Vec<StaffResponse>>> {
    let staff = station_staff::Entity::find().all(&state.db).await?;
    let accounts = account::Entity::find()
        .filter(account::Column::Role.eq(Role::Staff))
        .all(&state.db)
        .await?;

    let responses: Vec<StaffResponse> = staff
        .into_iter()
        .map(|s| {
            let acct = accounts.iter().find(|a| a.id == s.account_id);
            StaffResponse {
                id: s.id,
                account_id: s.account_id,
                full_name: acct.map(|a| a.full_name.clone()).unwrap_or_default(),
                email: acct.map(|a| a.email.clone()).unwrap_or_default(),
                station_id: s.station_id,
                handover_times: s.handover_times,
                receive_times: s.receive_times,
            }
        })
        .collect();

    Ok(Json(responses))
}

/// Create a staff account together with its staff profile
pub async fn create_staff(
    State(state): State<AppState>,
    Json(payload): Json<CreateStaffRequest>,
) -> AppResult<Json<StaffResponse>> {
    let existing = account::Entity::find()
        .filter(account::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    if let Some(station_id) = payload.station_id {
        station::Entity::find_by_id(station_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid station".to_string()))?;
    }

    let password_hash = hash_password(&payload.password)?;

    let (acct, staff) = state
        .db
        .transaction::<_, (account::Model, station_staff::Model), AppError>(move |txn| {
            Box::pin(async move {
                let acct = account::ActiveModel {
                    email: Set(payload.email),
                    password_hash: Set(password_hash),
                    full_name: Set(payload.full_name),
                    phone: Set(payload.phone),
                    role: Set(Role::Staff),
                    status: Set(AccountStatus::Active),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let staff = station_staff::ActiveModel {
                    account_id: Set(acct.id),
                    station_id: Set(payload.station_id),
                    handover_times: Set(0),
                    receive_times: Set(0),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok((acct, staff))
            })
        })
        .await?;

    tracing::info!(staff_id = staff.id, "staff account created");

    Ok(Json(StaffResponse {
        id: staff.id,
        account_id: acct.id,
        full_name: acct.full_name,
        email: acct.email,
        station_id: staff.station_id,
        handover_times: staff.handover_times,
        receive_times: staff.receive_times,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AssignStationRequest {
    pub station_id: Option<i32>,
}

/// Assign a staff member to a station, or detach with null
pub async fn assign_station(
    State(state): State<AppState>,
    Path(staff_id): Path<i32>,
    Json(payload): Json<AssignStationRequest>,
) -> AppResult<Json<station_staff::Model>> {
    let staff = station_staff::Entity::find_by_id(staff_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;

    if let Some(station_id) = payload.station_id {
        station::Entity::find_by_id(station_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid station".to_string()))?;
    }

    let mut active: station_staff::ActiveModel = staff.into();
    active.station_id = Set(payload.station_id);

    Ok(Json(active.update(&state.db).await?))
}

// ============ Renter Management ============

#[derive(Debug, Serialize)]
pub struct RenterResponse {
    pub id: i32,
    pub account_id: i32,
    pub full_name: String,
    pub email: String,
    pub total_rental: i32,
    pub total_spent: Decimal,
    pub is_verified: bool,
}

pub async fn list_renters(State(state): State<AppState>) -> AppResult<Json<Vec<RenterResponse>>> {
    let renters = renter::Entity::find().all(&state.db).await?;
    let accounts = account::Entity::find()
        .filter(account::Column::Role.eq(Role::Renter))
        .all(&state.db)
        .await?;

    let responses: Vec<RenterResponse> = renters
        .into_iter()
        .map(|r| {
            let acct = accounts.iter().find(|a| a.id == r.account_id);
            RenterResponse {
                id: r.id,
                account_id: r.account_id,
                full_name: acct.map(|a| a.full_name.clone()).unwrap_or_default(),
                email: acct.map(|a| a.email.clone()).unwrap_or_default(),
                total_rental: r.total_rental,
                total_spent: r.total_spent,
                is_verified: r.is_verified,
            }
        })
        .collect();

    Ok(Json(responses))
}

/// Mark a renter's identity documents as verified
pub async fn verify_renter(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<renter::Model>> {
    let found = renter::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Renter not found".to_string()))?;

    let mut active: renter::ActiveModel = found.into();
    active.is_verified = Set(true);

    Ok(Json(active.update(&state.db).await?))
}

// ============ Payments and Statistics ============

#[derive(Debug, Deserialize)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub rental_id: Option<i32>,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
) -> AppResult<Json<Vec<payment::Model>>> {
    let mut finder = payment::Entity::find().order_by_desc(payment::Column::CreatedAt);

    if let Some(status) = filter.status {
        finder = finder.filter(payment::Column::Status.eq(status));
    }
    if let Some(rental_id) = filter.rental_id {
        finder = finder.filter(payment::Column::RentalId.eq(rental_id));
    }

    Ok(Json(finder.all(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub total_rentals: u64,
    pub pending: u64,
    pub reserved: u64,
    pub on_going: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total_revenue: Decimal,
    pub pending_payments: u64,
}

/// Platform-wide counters: rentals by status, revenue from completed
/// payments, and how many payments still await settlement.
pub async fn statistics(State(state): State<AppState>) -> AppResult<Json<StatisticsResponse>> {
    let rentals = rental::Entity::find().all(&state.db).await?;
    let payments = payment::Entity::find().all(&state.db).await?;

    let count = |status: RentalStatus| rentals.iter().filter(|r| r.status == status).count() as u64;

    let total_revenue = payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .map(|p| p.amount)
        .sum();

    let pending_payments = payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending)
        .count() as u64;

    Ok(Json(StatisticsResponse {
        total_rentals: rentals.len() as u64,
        pending: count(RentalStatus::Pending),
        reserved: count(RentalStatus::Reserved),
        on_going: count(RentalStatus::OnGoing),
        completed: count(RentalStatus::Completed),
        cancelled: count(RentalStatus::Cancelled),
        total_revenue,
        pending_payments,
    }))
}
