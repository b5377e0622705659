use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{admin, auth, public, renter, staff};
use crate::middleware::auth::{auth_middleware, require_admin, require_renter, require_staff};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Role-specific governor layers, keyed by account id
    let staff_governor = create_role_governor(RateLimitedRole::Staff);
    let renter_governor = create_role_governor(RateLimitedRole::Renter);
    // IP-based governor for unauthenticated routes
    let public_governor = create_public_governor();

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public catalog: stations, bike models, per-model stock availability
    let public_routes = Router::new()
        .route("/stations", get(public::list_stations))
        .route("/bikes", get(public::list_bikes))
        .route("/bikes/{id}/stocks", get(public::list_stocks_by_bike))
        .layer(public_governor);

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Station management
        .route("/stations", get(admin::list_stations))
        .route("/stations", post(admin::create_station))
        .route("/stations/{id}", put(admin::update_station))
        // Brand and bike model management
        .route("/brands", get(admin::list_brands))
        .route("/brands", post(admin::create_brand))
        .route("/bikes", get(admin::list_bikes))
        .route("/bikes", post(admin::create_bike))
        .route("/bikes/{id}", put(admin::update_bike))
        // Stock management
        .route("/stocks", get(admin::list_stocks))
        .route("/stocks", post(admin::create_stock))
        .route("/stocks/{id}", put(admin::update_stock))
        .route("/stocks/{id}", delete(admin::delete_stock))
        .route("/stations/{id}/stock-count", get(admin::station_stock_count))
        // Rental management
        .route("/rentals", get(admin::list_rentals))
        .route("/rentals/{id}", patch(admin::update_rental))
        .route("/rentals/{id}", delete(admin::delete_rental))
        .route("/rentals/{id}/cancel", put(staff::cancel_rental))
        // Staff management
        .route("/staff", get(admin::list_staff))
        .route("/staff", post(admin::create_staff))
        .route("/staff/{id}/station", put(admin::assign_station))
        // Renter management
        .route("/renters", get(admin::list_renters))
        .route("/renters/{id}/verify", post(admin::verify_renter))
        // Payments and statistics
        .route("/payments", get(admin::list_payments))
        .route("/statistics", get(admin::statistics))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Staff routes (staff role; admins pass too and may act on any staff)
    let staff_routes = Router::new()
        .route("/rentals", get(staff::assigned_rentals))
        .route("/rentals/queue", get(staff::station_queue))
        .route("/rentals/{id}/handover", put(staff::confirm_rental_start))
        .route("/rentals/{id}/return", put(staff::complete_rental))
        .route("/rentals/{id}/cancel", put(staff::cancel_rental))
        .route("/station/stocks", get(staff::station_stocks))
        .route("/payments/{id}/settle", put(staff::settle_payment))
        .layer(staff_governor)
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Renter routes (requires auth + renter role)
    let renter_routes = Router::new()
        .route("/", post(renter::create_rental))
        .route("/", get(renter::my_rentals))
        .route("/{id}", get(renter::get_rental))
        .route("/{id}/payments", post(renter::create_payment))
        .layer(renter_governor)
        .layer(middleware::from_fn(require_renter))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/rentals", renter_routes)
        .with_state(state)
}
