use crate::config::Config;
use crate::model::role::Role;
use crate::models::{Claims, TokenType};
use crate::workflow::ActorIdentity;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

pub struct AuthUser {
    pub email: String,
    pub name: String,
    pub role: Role,

    /// Present only if this user is linked to a student register number
    pub register_no: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        // refresh tokens only mint new tokens; they never reach the API
        if data.claims.token_type != TokenType::Access {
            return ready(Err(ErrorUnauthorized("Invalid token type")));
        }

        let role = match Role::from_label(&data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            email: data.claims.sub,
            name: data.claims.name,
            role,
            register_no: data.claims.register_no,
        }))
    }
}

impl AuthUser {
    pub fn require_student(&self) -> actix_web::Result<()> {
        if self.role == Role::Student {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Students only"))
        }
    }

    /// The explicit identity every engine operation takes.
    pub fn actor(&self) -> ActorIdentity {
        ActorIdentity {
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            register_no: self.register_no.clone(),
        }
    }
}
