//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::models::{User, UserRole};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{self, collections, Store};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Defaults to the local part of the email when absent
    pub username: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for refreshing tokens
#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Response carrying the user and a fresh token pair
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// "access" or "refresh"
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// User record as stored, including the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

fn map_validation_errors(errors: validator::ValidationErrors) -> AppError {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            let message = error
                .message
                .clone()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            return AppError::validation(field, message);
        }
    }
    AppError::validation("input", "Invalid input")
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        input.validate().map_err(map_validation_errors)?;

        let email = input.email.trim().to_lowercase();

        let users: Vec<UserRecord> =
            store::fetch_all(self.store.as_ref(), collections::USERS).await?;
        if users.iter().any(|user| user.email.eq_ignore_ascii_case(&email)) {
            return Err(AppError::Conflict {
                resource: "user".to_string(),
                message: "An account with this email already exists".to_string(),
            });
        }

        let username = input
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                email
                    .split('@')
                    .next()
                    .unwrap_or("user")
                    .to_string()
            });

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|err| AppError::Internal(format!("Password hashing failed: {}", err)))?;

        let user = UserRecord {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            role: input.role,
            is_active: true,
            created_at: Utc::now(),
        };

        store::put(
            self.store.as_ref(),
            collections::USERS,
            &user.id.to_string(),
            &user,
        )
        .await?;

        self.respond_with_tokens(&user)
    }

    /// Authenticate with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let users: Vec<UserRecord> =
            store::fetch_all(self.store.as_ref(), collections::USERS).await?;
        let user = users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(input.email.trim()))
            .ok_or(AppError::InvalidCredentials)?;

        let password_matches = verify(&input.password, &user.password_hash)
            .map_err(|err| AppError::Internal(format!("Password verification failed: {}", err)))?;
        if !password_matches || !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        self.respond_with_tokens(&user)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, input: RefreshInput) -> AppResult<AuthResponse> {
        let claims = self.decode_token(&input.refresh_token)?;
        if claims.token_type != "refresh" {
            return Err(AppError::InvalidToken);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let user: UserRecord = store::fetch_one(
            self.store.as_ref(),
            collections::USERS,
            &user_id.to_string(),
        )
        .await?
        .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        self.respond_with_tokens(&user)
    }

    /// Load the profile of an authenticated user
    pub async fn me(&self, user_id: Uuid) -> AppResult<User> {
        let user: UserRecord = store::fetch_one(
            self.store.as_ref(),
            collections::USERS,
            &user_id.to_string(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        Ok(user.to_user())
    }

    /// Decode and validate a token issued by this service
    pub fn decode_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }

    fn respond_with_tokens(&self, user: &UserRecord) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            user: user.to_user(),
            access_token: self.issue_token(user, "access", self.access_token_expiry)?,
            refresh_token: self.issue_token(user, "refresh", self.refresh_token_expiry)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn issue_token(
        &self,
        user: &UserRecord,
        token_type: &str,
        expiry_seconds: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            token_type: token_type.to_string(),
            exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| AppError::Internal(format!("Token creation failed: {}", err)))
    }
}
