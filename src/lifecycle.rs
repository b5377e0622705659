//! The rental state machine and its guards.
//!
//! Everything here is pure: handlers load the rows, call a guard, and only
//! write if it passed. Guards therefore run entirely before any mutation,
//! and a failed one leaves nothing half-updated.

use chrono::{DateTime, Utc};

use crate::entities::account::Role;
use crate::entities::bike_stock::StockStatus;
use crate::entities::payment::{self, PaymentStatus};
use crate::entities::rental::RentalStatus;
use crate::error::{AppError, AppResult};

/// Identity of the caller, resolved from the bearer token by the transport
/// layer. Core operations take this explicitly instead of reading ambient
/// request state.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub account_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl RentalStatus {
    /// Forward-only transition relation: Pending -> Reserved -> OnGoing ->
    /// Completed, with Cancelled reachable from the two pre-handover states.
    pub fn can_transition(self, to: RentalStatus) -> bool {
        use RentalStatus::*;
        match (self, to) {
            (Pending, Reserved) => true,
            (Pending, Cancelled) => true,
            (Reserved, OnGoing) => true,
            (Reserved, Cancelled) => true,
            (OnGoing, Completed) => true,
            // Terminal states, backward edges, and self-loops
            (Pending | Reserved | OnGoing | Cancelled | Completed, _) => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RentalStatus::Cancelled | RentalStatus::Completed)
    }

    pub fn label(self) -> &'static str {
        match self {
            RentalStatus::Pending => "Pending",
            RentalStatus::Reserved => "Reserved",
            RentalStatus::OnGoing => "OnGoing",
            RentalStatus::Cancelled => "Cancelled",
            RentalStatus::Completed => "Completed",
        }
    }
}

/// Staff may only act as themself; admins may act as anyone.
pub fn ensure_self_or_admin(caller: Caller, staff_account_id: i32) -> AppResult<()> {
    if caller.is_admin() || caller.account_id == staff_account_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Staff can only perform this action as themselves".to_string(),
        ))
    }
}

/// Date checks on rental creation. `start` is the planned rental start,
/// `end` the planned return; a reservation instant, when supplied, must be
/// strictly after the rental start.
pub fn validate_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    reserved: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if end <= start {
        return Err(AppError::Validation(
            "Return date must be after the rental start date".to_string(),
        ));
    }

    if let Some(reserved) = reserved {
        if reserved <= start {
            return Err(AppError::Validation(
                "Reserved date must be after the rental date".to_string(),
            ));
        }
    }

    Ok(())
}

/// Half-open interval overlap on `[start, end)`, used by the double-booking
/// guard keyed on license plate.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Handover is only legal from Reserved.
pub fn ensure_can_handover(status: RentalStatus) -> AppResult<()> {
    if status == RentalStatus::Reserved {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Handover requires status 'Reserved', current status: {}",
            status.label()
        )))
    }
}

/// A unit leaves the station only while Available. The rental's own status
/// is not enough: with back-to-back reservations on one plate, a late
/// return leaves the unit Rented while the next rental is already Reserved,
/// and handing that one over would put one bike in two OnGoing rentals.
pub fn ensure_unit_available(status: StockStatus) -> AppResult<()> {
    if status == StockStatus::Available {
        Ok(())
    } else {
        Err(AppError::Conflict(
            "This bike unit is not currently available at the station".to_string(),
        ))
    }
}

/// A set return date is the authoritative "already returned" signal, checked
/// before the status, which is only secondary.
pub fn ensure_can_return(
    status: RentalStatus,
    return_date: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if return_date.is_some() {
        return Err(AppError::Validation(
            "This rental has already been returned".to_string(),
        ));
    }

    if status != RentalStatus::OnGoing {
        return Err(AppError::Validation(format!(
            "Return requires status 'OnGoing', current status: {}",
            status.label()
        )));
    }

    Ok(())
}

/// Handover and return happen at the rental's station, so the acting staff
/// member must be assigned there. Admins may act across stations.
pub fn ensure_staff_at_station(
    caller: Caller,
    staff_station_id: Option<i32>,
    rental_station_id: i32,
) -> AppResult<()> {
    if caller.is_admin() || staff_station_id == Some(rental_station_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Staff can only process rentals at their own station".to_string(),
        ))
    }
}

/// Completion is gated on payments: nothing still Pending may remain.
pub fn ensure_payments_settled(payments: &[payment::Model]) -> AppResult<()> {
    if payments.iter().any(|p| p.status == PaymentStatus::Pending) {
        Err(AppError::Validation(
            "Rental has a pending payment that must be settled first".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn ensure_can_cancel(status: RentalStatus) -> AppResult<()> {
    if status.can_transition(RentalStatus::Cancelled) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Only Pending or Reserved rentals can be cancelled, current status: {}",
            status.label()
        )))
    }
}

/// Hard delete is an administrative override, but OnGoing rentals must be
/// returned and Completed ones are history.
pub fn ensure_can_delete(status: RentalStatus) -> AppResult<()> {
    match status {
        RentalStatus::Pending | RentalStatus::Reserved | RentalStatus::Cancelled => Ok(()),
        RentalStatus::OnGoing | RentalStatus::Completed => Err(AppError::Validation(format!(
            "Cannot delete a rental with status {}",
            status.label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn transitions_are_forward_only() {
        use RentalStatus::*;

        assert!(Pending.can_transition(Reserved));
        assert!(Reserved.can_transition(OnGoing));
        assert!(OnGoing.can_transition(Completed));
        assert!(Pending.can_transition(Cancelled));
        assert!(Reserved.can_transition(Cancelled));

        // No backward edges, no skipping into terminal states
        assert!(!Reserved.can_transition(Pending));
        assert!(!OnGoing.can_transition(Reserved));
        assert!(!OnGoing.can_transition(Cancelled));
        assert!(!Completed.can_transition(OnGoing));
        assert!(!Cancelled.can_transition(Reserved));
        assert!(!Pending.can_transition(Completed));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        use RentalStatus::*;
        for to in [Pending, Reserved, OnGoing, Cancelled, Completed] {
            assert!(!Cancelled.can_transition(to));
            assert!(!Completed.can_transition(to));
        }
        assert!(Cancelled.is_terminal());
        assert!(Completed.is_terminal());
        assert!(!OnGoing.is_terminal());
    }

    #[test]
    fn handover_requires_reserved() {
        use RentalStatus::*;
        assert!(ensure_can_handover(Reserved).is_ok());
        for status in [Pending, OnGoing, Cancelled, Completed] {
            let err = ensure_can_handover(status).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn return_date_presence_beats_status() {
        // Even a rental still showing OnGoing is rejected once returned
        let already = ensure_can_return(RentalStatus::OnGoing, Some(Utc::now()));
        assert!(matches!(already, Err(AppError::Validation(msg)) if msg.contains("already")));

        assert!(ensure_can_return(RentalStatus::OnGoing, None).is_ok());
        assert!(ensure_can_return(RentalStatus::Reserved, None).is_err());
        assert!(ensure_can_return(RentalStatus::Completed, None).is_err());
    }

    #[test]
    fn self_restriction_applies_to_staff_not_admin() {
        let staff = Caller { account_id: 100, role: Role::Staff };
        let admin = Caller { account_id: 1, role: Role::Admin };

        assert!(ensure_self_or_admin(staff, 100).is_ok());
        assert!(ensure_self_or_admin(admin, 100).is_ok());

        let err = ensure_self_or_admin(staff, 101).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn schedule_validation() {
        let start = ts("2025-01-01T10:00");
        let end = ts("2025-01-05T10:00");

        assert!(validate_schedule(start, end, None).is_ok());

        // Reserved after rental start is fine
        assert!(validate_schedule(start, end, Some(ts("2025-01-02T10:00"))).is_ok());

        // Reserved before rental start is rejected
        let err = validate_schedule(start, end, Some(ts("2025-01-01T09:00"))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // End must be strictly after start
        assert!(validate_schedule(start, start, None).is_err());
        assert!(validate_schedule(end, start, None).is_err());
    }

    #[test]
    fn interval_overlap_is_half_open() {
        let a = (ts("2025-01-01T10:00"), ts("2025-01-03T10:00"));
        let b = (ts("2025-01-02T10:00"), ts("2025-01-04T10:00"));
        let c = (ts("2025-01-03T10:00"), ts("2025-01-05T10:00"));

        assert!(intervals_overlap(a.0, a.1, b.0, b.1));
        // Back-to-back bookings share an endpoint but do not overlap
        assert!(!intervals_overlap(a.0, a.1, c.0, c.1));
        assert!(!intervals_overlap(c.0, c.1, a.0, a.1));
    }

    fn payment_with(status: PaymentStatus) -> payment::Model {
        payment::Model {
            id: 1,
            renter_id: 1,
            rental_id: 1,
            amount: Decimal::new(50_000, 0),
            method: payment::PaymentMethod::Cash,
            kind: payment::PaymentKind::Deposit,
            status,
            note: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn completion_blocked_by_pending_payment() {
        let pending = vec![payment_with(PaymentStatus::Pending)];
        assert!(ensure_payments_settled(&pending).is_err());

        let settled = vec![
            payment_with(PaymentStatus::Completed),
            payment_with(PaymentStatus::Failed),
        ];
        assert!(ensure_payments_settled(&settled).is_ok());

        // No payment rows at all: cash-on-return, completion allowed
        assert!(ensure_payments_settled(&[]).is_ok());
    }

    #[test]
    fn handover_requires_an_available_unit() {
        assert!(ensure_unit_available(StockStatus::Available).is_ok());

        // A late return leaves the unit Rented while the next rental on the
        // same plate is already Reserved; that handover must be refused
        let err = ensure_unit_available(StockStatus::Rented).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(ensure_unit_available(StockStatus::Maintenance).is_err());
    }

    #[test]
    fn staff_act_only_at_their_own_station() {
        let staff = Caller { account_id: 100, role: Role::Staff };
        let admin = Caller { account_id: 1, role: Role::Admin };

        assert!(ensure_staff_at_station(staff, Some(3), 3).is_ok());
        assert!(ensure_staff_at_station(staff, Some(2), 3).is_err());
        // Unassigned staff cannot process any station's queue
        assert!(ensure_staff_at_station(staff, None, 3).is_err());
        // Admins work across stations
        assert!(ensure_staff_at_station(admin, None, 3).is_ok());
    }

    #[test]
    fn cancel_and_delete_guards() {
        use RentalStatus::*;

        assert!(ensure_can_cancel(Pending).is_ok());
        assert!(ensure_can_cancel(Reserved).is_ok());
        assert!(ensure_can_cancel(OnGoing).is_err());
        assert!(ensure_can_cancel(Completed).is_err());

        assert!(ensure_can_delete(Cancelled).is_ok());
        assert!(ensure_can_delete(Reserved).is_ok());
        assert!(ensure_can_delete(OnGoing).is_err());
        assert!(ensure_can_delete(Completed).is_err());
    }
}
