use crate::auth::verify_token;
use crate::config::Config;
use crate::error::ServiceError;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// The acting identity resolved from a `Bearer` JWT. Ownership checks on
/// mutating operations live in the services, which receive the `user_id`.
pub struct AuthenticatedUser {
    pub user_id: i64,
    #[allow(dead_code)]
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(header_value) = auth_header {
            if let Ok(header_str) = header_value.to_str() {
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    let config = req.app_data::<web::Data<Config>>();
                    if let Some(config) = config {
                        match verify_token(token, &config.jwt.secret) {
                            Ok(claims) => {
                                if let Ok(user_id) = claims.sub.parse::<i64>() {
                                    return ready(Ok(AuthenticatedUser {
                                        user_id,
                                        username: claims.username,
                                    }));
                                }
                            }
                            Err(_) => {
                                return ready(Err(ServiceError::Unauthenticated(
                                    "Invalid or expired token",
                                )));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ServiceError::Unauthenticated(
            "Missing or invalid authorization header",
        )))
    }
}
