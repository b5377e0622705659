use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::bike_stock::{self, StockStatus};
use crate::entities::payment::{self, PaymentKind, PaymentMethod, PaymentStatus};
use crate::entities::rental::{self, RentalStatus};
use crate::entities::{bike, renter, station};
use crate::error::{AppError, AppResult};
use crate::lifecycle;
use crate::utils::jwt::Claims;
use crate::AppState;

async fn renter_of_caller(
    state: &AppState,
    claims: &Claims,
) -> AppResult<renter::Model> {
    renter::Entity::find()
        .filter(renter::Column::AccountId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Renter profile not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub bike_id: i32,
    pub station_id: i32,
    pub license_plate: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reserved_date: Option<DateTime<Utc>>,
    pub deposit: Decimal,
    pub deposit_method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: i32,
    pub bike_id: i32,
    pub license_plate: String,
    pub station_id: i32,
    pub status: RentalStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rental_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub deposit: Decimal,
    pub fee: Option<Decimal>,
}

impl From<rental::Model> for RentalResponse {
    fn from(r: rental::Model) -> Self {
        RentalResponse {
            id: r.id,
            bike_id: r.bike_id,
            license_plate: r.license_plate,
            station_id: r.station_id,
            status: r.status,
            start_date: r.start_date.with_timezone(&Utc),
            end_date: r.end_date.with_timezone(&Utc),
            rental_date: r.rental_date.map(|d| d.with_timezone(&Utc)),
            return_date: r.return_date.map(|d| d.with_timezone(&Utc)),
            deposit: r.deposit,
            fee: r.fee,
        }
    }
}

/// Reserve a bike unit. Creates the rental together with its deposit
/// payment; a PayOS deposit leaves the rental Pending until the payment
/// settles, cash reserves immediately.
pub async fn create_rental(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRentalRequest>,
) -> AppResult<Json<RentalResponse>> {
    let renter = renter_of_caller(&state, &claims).await?;

    let bike = bike::Entity::find_by_id(payload.bike_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike model not found".to_string()))?;

    if !bike.is_active {
        return Err(AppError::Validation(
            "This bike model is not available for rental".to_string(),
        ));
    }

    let station = station::Entity::find_by_id(payload.station_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Station not found".to_string()))?;

    if !station.is_active {
        return Err(AppError::Validation("Station is not active".to_string()));
    }

    lifecycle::validate_schedule(payload.start_date, payload.end_date, payload.reserved_date)?;

    if payload.deposit <= Decimal::ZERO {
        return Err(AppError::Validation("Deposit must be positive".to_string()));
    }

    let status = match payload.deposit_method {
        PaymentMethod::Cash => RentalStatus::Reserved,
        PaymentMethod::PayOs => RentalStatus::Pending,
    };

    // The stock check and the double-booking scan must see a state no
    // concurrent create can change under them, so both run inside the
    // transaction with the stock row locked; competing creates on the same
    // plate serialize on that lock.
    let created = state
        .db
        .transaction::<_, rental::Model, AppError>(|txn| {
            Box::pin(async move {
                let stock = bike_stock::Entity::find()
                    .filter(bike_stock::Column::LicensePlate.eq(&payload.license_plate))
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("No bike unit with that license plate".to_string())
                    })?;

                if stock.bike_id != bike.id || stock.station_id != station.id {
                    return Err(AppError::Validation(
                        "License plate does not match the chosen bike model and station"
                            .to_string(),
                    ));
                }

                if stock.status != StockStatus::Available {
                    return Err(AppError::Validation(
                        "This bike unit is not available".to_string(),
                    ));
                }

                // No overlapping non-cancelled rental on this plate
                let others = rental::Entity::find()
                    .filter(rental::Column::LicensePlate.eq(&payload.license_plate))
                    .filter(rental::Column::Status.ne(RentalStatus::Cancelled))
                    .all(txn)
                    .await?;

                for other in &others {
                    if lifecycle::intervals_overlap(
                        other.start_date.with_timezone(&Utc),
                        other.end_date.with_timezone(&Utc),
                        payload.start_date,
                        payload.end_date,
                    ) {
                        return Err(AppError::Conflict(
                            "This bike unit is already booked for an overlapping period"
                                .to_string(),
                        ));
                    }
                }

                let created = rental::ActiveModel {
                    bike_id: Set(payload.bike_id),
                    license_plate: Set(payload.license_plate),
                    renter_id: Set(renter.id),
                    station_id: Set(payload.station_id),
                    status: Set(status),
                    initial_battery: Set(Decimal::from(stock.battery_capacity)),
                    start_date: Set(payload.start_date.into()),
                    end_date: Set(payload.end_date.into()),
                    reserved_date: Set(payload.reserved_date.map(Into::into)),
                    deposit: Set(payload.deposit),
                    note: Set(payload.note),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                payment::ActiveModel {
                    renter_id: Set(renter.id),
                    rental_id: Set(created.id),
                    amount: Set(payload.deposit),
                    method: Set(payload.deposit_method),
                    kind: Set(PaymentKind::Deposit),
                    status: Set(PaymentStatus::Pending),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok(created)
            })
        })
        .await?;

    tracing::info!(rental_id = created.id, status = ?created.status, "rental created");

    Ok(Json(created.into()))
}

#[derive(Debug, Deserialize)]
pub struct RentalFilter {
    pub status: Option<RentalStatus>,
}

/// List the caller's rentals
pub async fn my_rentals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<RentalFilter>,
) -> AppResult<Json<Vec<RentalResponse>>> {
    let renter = renter_of_caller(&state, &claims).await?;

    let mut finder = rental::Entity::find()
        .filter(rental::Column::RenterId.eq(renter.id));

    if let Some(status) = filter.status {
        finder = finder.filter(rental::Column::Status.eq(status));
    }

    let rentals = finder.all(&state.db).await?;

    Ok(Json(rentals.into_iter().map(Into::into).collect()))
}

/// Get one of the caller's rentals
pub async fn get_rental(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(rental_id): Path<i32>,
) -> AppResult<Json<RentalResponse>> {
    let renter = renter_of_caller(&state, &claims).await?;

    let rental = rental::Entity::find_by_id(rental_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

    if rental.renter_id != renter.id {
        return Err(AppError::Forbidden(
            "You can only view your own rentals".to_string(),
        ));
    }

    Ok(Json(rental.into()))
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub kind: PaymentKind,
    pub note: Option<String>,
}

/// Record a pending payment against one of the caller's rentals
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(rental_id): Path<i32>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<Json<payment::Model>> {
    let renter = renter_of_caller(&state, &claims).await?;

    let rental = rental::Entity::find_by_id(rental_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

    if rental.renter_id != renter.id {
        return Err(AppError::Forbidden(
            "You can only pay for your own rentals".to_string(),
        ));
    }

    if rental.status == RentalStatus::Cancelled {
        return Err(AppError::Validation(
            "Cannot pay for a cancelled rental".to_string(),
        ));
    }

    if payload.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Payment amount must be positive".to_string(),
        ));
    }

    let created = payment::ActiveModel {
        renter_id: Set(renter.id),
        rental_id: Set(rental.id),
        amount: Set(payload.amount),
        method: Set(payload.method),
        kind: Set(payload.kind),
        status: Set(PaymentStatus::Pending),
        note: Set(payload.note),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(created))
}
