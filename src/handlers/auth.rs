use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::entities::account::{self, AccountStatus, Role};
use crate::entities::renter;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountInfo,
}

#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Register a new renter account with its renter profile
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Check if email already exists
    let existing = account::Entity::find()
        .filter(account::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    // Account and renter profile are created together
    let acct = state
        .db
        .transaction::<_, account::Model, AppError>(|txn| {
            Box::pin(async move {
                let acct = account::ActiveModel {
                    email: Set(payload.email),
                    password_hash: Set(password_hash),
                    full_name: Set(payload.full_name),
                    phone: Set(payload.phone),
                    role: Set(Role::Renter),
                    status: Set(AccountStatus::Active),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                renter::ActiveModel {
                    account_id: Set(acct.id),
                    total_rental: Set(0),
                    total_spent: Set(Default::default()),
                    is_verified: Set(false),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok(acct)
            })
        })
        .await?;

    let token = create_token(
        acct.id,
        &acct.email,
        acct.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        account: AccountInfo {
            id: acct.id,
            email: acct.email,
            full_name: acct.full_name,
            role: acct.role,
        },
    }))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let acct = account::Entity::find()
        .filter(account::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if acct.status != AccountStatus::Active {
        return Err(AppError::Forbidden("Account is not active".to_string()));
    }

    let parsed_hash = PasswordHash::new(&acct.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = create_token(
        acct.id,
        &acct.email,
        acct.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        account: AccountInfo {
            id: acct.id,
            email: acct.email,
            full_name: acct.full_name,
            role: acct.role,
        },
    }))
}
