use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::{JwtConfig, hash_password, verify_password},
        middleware::AuthUser,
    },
    dto::auth::{AuthResponse, LoginRequest, SignupRequest},
    error::AppError,
    models::users::User,
    repositories::Store,
    telemetry::{BusinessEvent, redact_email},
};

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct UserServices;

impl UserServices {
    pub async fn signup(
        store: &Store,
        jwt_config: &JwtConfig,
        req: SignupRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&req.email);
        if !is_valid_email(&email) {
            return Err(AppError::ValidationError(
                "Email format is invalid".to_string(),
            ));
        }
        if req.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        let user = User {
            id: Uuid::now_v7(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        store.users.insert_user(&user).await?;

        BusinessEvent::UserRegistered {
            user_id: user.id,
            email_redacted: redact_email(&user.email),
        }
        .log();

        issue_token(jwt_config, user)
    }

    pub async fn login(
        store: &Store,
        jwt_config: &JwtConfig,
        req: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&req.email);
        let Some(user) = store.users.find_user_by_email(&email).await? else {
            BusinessEvent::LoginFailed {
                email_redacted: redact_email(&email),
                reason: "unknown_email".to_string(),
            }
            .log();
            return Err(AppError::InvalidCredentials(
                "Invalid credentials".to_string(),
            ));
        };

        let password_matches = verify_password(&req.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        if !password_matches {
            BusinessEvent::LoginFailed {
                email_redacted: redact_email(&email),
                reason: "wrong_password".to_string(),
            }
            .log();
            return Err(AppError::InvalidCredentials(
                "Invalid credentials".to_string(),
            ));
        }

        BusinessEvent::UserLoggedIn { user_id: user.id }.log();
        issue_token(jwt_config, user)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn verify_requester(
        store: &Store,
        jwt_config: &JwtConfig,
        token: &str,
    ) -> Result<AuthUser, AppError> {
        let claims = jwt_config
            .verify_token(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
        let user_id = claims
            .user_id()
            .ok_or(AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user = store
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized("User not found".to_string()))?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
        })
    }
}

fn issue_token(jwt_config: &JwtConfig, user: User) -> Result<AuthResponse, AppError> {
    let token = jwt_config
        .create_token(user.id, user.email)
        .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

    Ok(AuthResponse {
        token,
        user_id: user.id,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.contains('.')
}
