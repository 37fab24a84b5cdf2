use classbook_auth::create_access_token;
use classbook_config::JwtConfig;
use classbook_core::{AppError, verify_password};
use classbook_db::SchoolStore;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::model::{LoginRequest, LoginResponse};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(store, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn SchoolStore,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        dto.validate().map_err(|e| AppError::from_validation(&e))?;

        let Some(user) = store.find_user_by_email(dto.email.trim()).await? else {
            warn!("Login attempt for unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let access_token = create_access_token(user.id.get(), &user.email, jwt_config)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse::bearer(
            access_token,
            jwt_config.access_token_expiry,
        ))
    }
}
