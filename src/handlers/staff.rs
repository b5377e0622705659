use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
};
use serde::Deserialize;

use crate::entities::bike_stock::{self, StockStatus};
use crate::entities::payment::{self, PaymentKind, PaymentStatus};
use crate::entities::rental::{self, RentalStatus};
use crate::entities::{renter, station_staff};
use crate::error::{AppError, AppResult};
use crate::handlers::public::StockInfo;
use crate::handlers::renter::RentalResponse;
use crate::lifecycle::{self, Caller};
use crate::utils::jwt::Claims;
use crate::AppState;

fn caller_of(claims: &Claims) -> Caller {
    Caller {
        account_id: claims.sub,
        role: claims.role,
    }
}

/// Load and exclusively lock the aggregate rows a transition touches, so
/// concurrent attempts on the same rental or stock unit serialize.
async fn lock_rental(
    txn: &DatabaseTransaction,
    rental_id: i32,
) -> AppResult<rental::Model> {
    rental::Entity::find_by_id(rental_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))
}

async fn lock_stock_by_plate(
    txn: &DatabaseTransaction,
    plate: &str,
) -> AppResult<bike_stock::Model> {
    bike_stock::Entity::find()
        .filter(bike_stock::Column::LicensePlate.eq(plate))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Bike unit not found".to_string()))
}

async fn lock_staff(
    txn: &DatabaseTransaction,
    staff_id: i32,
) -> AppResult<station_staff::Model> {
    station_staff::Entity::find_by_id(staff_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct HandoverRequest {
    pub staff_id: i32,
    pub initial_battery: Decimal,
    pub init_bike_condition: Option<String>,
    pub note: Option<String>,
}

/// Confirm rental start: Reserved -> OnGoing. Records the handover
/// snapshot, flips the stock unit to Rented and bumps the staff handover
/// counter, all in one transaction.
pub async fn confirm_rental_start(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(rental_id): Path<i32>,
    Json(payload): Json<HandoverRequest>,
) -> AppResult<Json<RentalResponse>> {
    let caller = caller_of(&claims);

    let updated = state
        .db
        .transaction::<_, rental::Model, AppError>(move |txn| {
            Box::pin(async move {
                let rental = lock_rental(txn, rental_id).await?;
                let staff = lock_staff(txn, payload.staff_id).await?;

                lifecycle::ensure_self_or_admin(caller, staff.account_id)?;
                lifecycle::ensure_staff_at_station(caller, staff.station_id, rental.station_id)?;
                lifecycle::ensure_can_handover(rental.status)?;

                let stock = lock_stock_by_plate(txn, &rental.license_plate).await?;
                lifecycle::ensure_unit_available(stock.status)?;

                let now = Utc::now();

                let mut active: rental::ActiveModel = rental.into();
                active.status = Set(RentalStatus::OnGoing);
                active.assigned_staff_id = Set(Some(staff.id));
                active.initial_battery = Set(payload.initial_battery);
                active.init_bike_condition = Set(payload.init_bike_condition);
                active.rental_date = Set(Some(now.into()));
                if payload.note.is_some() {
                    active.note = Set(payload.note);
                }
                let updated = active.update(txn).await?;

                let mut stock_active: bike_stock::ActiveModel = stock.into();
                stock_active.status = Set(StockStatus::Rented);
                stock_active.updated_at = Set(now.into());
                stock_active.update(txn).await?;

                let handover_times = staff.handover_times;
                let mut staff_active: station_staff::ActiveModel = staff.into();
                staff_active.handover_times = Set(handover_times + 1);
                staff_active.update(txn).await?;

                Ok(updated)
            })
        })
        .await?;

    tracing::info!(rental_id = updated.id, "rental handed over");

    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub staff_id: i32,
    pub final_battery: Decimal,
    pub final_bike_condition: String,
    pub fee: Option<Decimal>,
    pub note: Option<String>,
}

/// Complete a rental: OnGoing -> Completed. The return-date check is
/// authoritative over the status, and completion is refused while a payment
/// is still pending. Stock goes back to Available, the staff receive
/// counter and the renter's lifetime stats update in the same transaction.
pub async fn complete_rental(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(rental_id): Path<i32>,
    Json(payload): Json<ReturnRequest>,
) -> AppResult<Json<RentalResponse>> {
    let caller = caller_of(&claims);

    let updated = state
        .db
        .transaction::<_, rental::Model, AppError>(move |txn| {
            Box::pin(async move {
                let rental = lock_rental(txn, rental_id).await?;
                let staff = lock_staff(txn, payload.staff_id).await?;

                lifecycle::ensure_self_or_admin(caller, staff.account_id)?;
                lifecycle::ensure_staff_at_station(caller, staff.station_id, rental.station_id)?;
                lifecycle::ensure_can_return(
                    rental.status,
                    rental.return_date.map(|d| d.with_timezone(&Utc)),
                )?;

                let payments = payment::Entity::find()
                    .filter(payment::Column::RentalId.eq(rental.id))
                    .all(txn)
                    .await?;
                lifecycle::ensure_payments_settled(&payments)?;

                let stock = lock_stock_by_plate(txn, &rental.license_plate).await?;

                let renter_row = renter::Entity::find_by_id(rental.renter_id)
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Renter not found".to_string()))?;

                let now = Utc::now();
                let deposit = rental.deposit;

                let mut active: rental::ActiveModel = rental.into();
                active.status = Set(RentalStatus::Completed);
                active.final_battery = Set(Some(payload.final_battery));
                active.final_bike_condition = Set(Some(payload.final_bike_condition));
                active.return_date = Set(Some(now.into()));
                if let Some(fee) = payload.fee {
                    active.fee = Set(Some(fee));
                }
                if payload.note.is_some() {
                    active.note = Set(payload.note);
                }
                let updated = active.update(txn).await?;

                let mut stock_active: bike_stock::ActiveModel = stock.into();
                stock_active.status = Set(StockStatus::Available);
                stock_active.updated_at = Set(now.into());
                stock_active.update(txn).await?;

                let receive_times = staff.receive_times;
                let mut staff_active: station_staff::ActiveModel = staff.into();
                staff_active.receive_times = Set(receive_times + 1);
                staff_active.update(txn).await?;

                let spent = deposit + updated.fee.unwrap_or(Decimal::ZERO);
                let total_rental = renter_row.total_rental;
                let total_spent = renter_row.total_spent;
                let mut renter_active: renter::ActiveModel = renter_row.into();
                renter_active.total_rental = Set(total_rental + 1);
                renter_active.total_spent = Set(total_spent + spent);
                renter_active.update(txn).await?;

                Ok(updated)
            })
        })
        .await?;

    tracing::info!(rental_id = updated.id, "rental completed");

    Ok(Json(updated.into()))
}

/// Cancel a Pending or Reserved rental
pub async fn cancel_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<i32>,
) -> AppResult<Json<RentalResponse>> {
    let updated = state
        .db
        .transaction::<_, rental::Model, AppError>(move |txn| {
            Box::pin(async move {
                let rental = lock_rental(txn, rental_id).await?;

                lifecycle::ensure_can_cancel(rental.status)?;

                let mut active: rental::ActiveModel = rental.into();
                active.status = Set(RentalStatus::Cancelled);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

    tracing::info!(rental_id = updated.id, "rental cancelled");

    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
pub struct AssignedRentalFilter {
    pub status: Option<RentalStatus>,
    pub staff_id: Option<i32>,
}

/// List rentals assigned to a staff member. Staff see their own; admins may
/// pass an explicit staff id.
pub async fn assigned_rentals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<AssignedRentalFilter>,
) -> AppResult<Json<Vec<RentalResponse>>> {
    let caller = caller_of(&claims);

    let staff = match filter.staff_id {
        Some(id) => station_staff::Entity::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?,
        None => station_staff::Entity::find()
            .filter(station_staff::Column::AccountId.eq(claims.sub))
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff profile not found".to_string()))?,
    };

    lifecycle::ensure_self_or_admin(caller, staff.account_id)?;

    let mut finder = rental::Entity::find()
        .filter(rental::Column::AssignedStaffId.eq(staff.id));

    if let Some(status) = filter.status {
        finder = finder.filter(rental::Column::Status.eq(status));
    }

    let rentals = finder.all(&state.db).await?;

    Ok(Json(rentals.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct QueueFilter {
    pub status: Option<RentalStatus>,
}

/// The work queue for the caller's station: Reserved rentals awaiting
/// handover and OnGoing ones awaiting return, newest last.
pub async fn station_queue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<QueueFilter>,
) -> AppResult<Json<Vec<RentalResponse>>> {
    let staff = station_staff::Entity::find()
        .filter(station_staff::Column::AccountId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff profile not found".to_string()))?;

    let station_id = staff.station_id.ok_or_else(|| {
        AppError::Validation("Staff member is not assigned to a station".to_string())
    })?;

    let statuses = match filter.status {
        Some(status) => vec![status],
        None => vec![RentalStatus::Reserved, RentalStatus::OnGoing],
    };

    let rentals = rental::Entity::find()
        .filter(rental::Column::StationId.eq(station_id))
        .filter(rental::Column::Status.is_in(statuses))
        .all(&state.db)
        .await?;

    Ok(Json(rentals.into_iter().map(Into::into).collect()))
}

/// Stock units at the caller's station
pub async fn station_stocks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<StockInfo>>> {
    let staff = station_staff::Entity::find()
        .filter(station_staff::Column::AccountId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff profile not found".to_string()))?;

    let station_id = staff.station_id.ok_or_else(|| {
        AppError::Validation("Staff member is not assigned to a station".to_string())
    })?;

    let station = crate::entities::station::Entity::find_by_id(station_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Station not found".to_string()))?;

    let stocks = bike_stock::Entity::find()
        .filter(bike_stock::Column::StationId.eq(station_id))
        .all(&state.db)
        .await?;

    let responses: Vec<StockInfo> = stocks
        .into_iter()
        .map(|s| StockInfo {
            id: s.id,
            bike_id: s.bike_id,
            station_id: s.station_id,
            station_name: station.name.clone(),
            color: s.color,
            license_plate: s.license_plate,
            battery_capacity: s.battery_capacity,
            status: s.status,
        })
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct SettlePaymentRequest {
    pub status: PaymentStatus,
    pub note: Option<String>,
}

/// Settle a pending payment as Completed or Failed. Settling the deposit of
/// a Pending rental promotes it to Reserved in the same transaction.
pub async fn settle_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
    Json(payload): Json<SettlePaymentRequest>,
) -> AppResult<Json<payment::Model>> {
    if payload.status == PaymentStatus::Pending {
        return Err(AppError::Validation(
            "A payment can only be settled as Completed or Failed".to_string(),
        ));
    }

    let settled = state
        .db
        .transaction::<_, payment::Model, AppError>(move |txn| {
            Box::pin(async move {
                let pay = payment::Entity::find_by_id(payment_id)
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

                if pay.status != PaymentStatus::Pending {
                    return Err(AppError::Validation(
                        "Payment has already been settled".to_string(),
                    ));
                }

                let rental_id = pay.rental_id;
                let kind = pay.kind;

                let mut active: payment::ActiveModel = pay.into();
                active.status = Set(payload.status);
                if payload.note.is_some() {
                    active.note = Set(payload.note);
                }
                active.updated_at = Set(Utc::now().into());
                let settled = active.update(txn).await?;

                // A settled deposit confirms the reservation
                if kind == PaymentKind::Deposit && payload.status == PaymentStatus::Completed {
                    let rental = lock_rental(txn, rental_id).await?;
                    if rental.status == RentalStatus::Pending {
                        let mut active: rental::ActiveModel = rental.into();
                        active.status = Set(RentalStatus::Reserved);
                        active.update(txn).await?;
                    }
                }

                Ok(settled)
            })
        })
        .await?;

    tracing::info!(payment_id = settled.id, status = ?settled.status, "payment settled");

    Ok(Json(settled))
}
