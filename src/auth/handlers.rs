use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::role::Role,
    models::{LoginReqDto, RefreshTokenDoc, RegisterReq, TokenType, UserDoc},
    store::{Collection, SharedStore, decode, encode},
};
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::utils::email_cache;
use crate::utils::email_filter;
// auth end points

/// Inserts a new user document and updates the Cuckoo filter
async fn insert_user(
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    register_no: Option<String>,
    store: &SharedStore,
) -> Result<(), HttpResponse> {
    let hashed = hash_password(password);

    let user = UserDoc {
        id: String::new(),
        version: 0,
        name: name.to_string(),
        email: email.to_string(),
        password: hashed,
        role: role.to_string(),
        register_no,
        last_login_at: None,
    };

    match store.insert(Collection::Users, encode(&user)).await {
        Ok(_) => {
            // if insert succeeds, populate filter and keep cache warm
            email_filter::insert(email);
            email_cache::mark_taken(email).await;
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to register user");
            Err(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })))
        }
    }
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, store: &SharedStore) -> bool {
    let email = email.to_lowercase();

    // 1️⃣ Cuckoo filter — fast negative
    // if the filter says not present, the email is definitely free
    if !email_filter::might_exist(&email) {
        return true;
    }

    // 2️⃣ Moka cache — fast positive
    if email_cache::is_taken(&email).await {
        return false;
    }

    // 3️⃣ Store fallback
    let exists = match store.find_eq(Collection::Users, "email", &email).await {
        Ok(records) => !records.is_empty(),
        Err(_) => true, // fail-safe
    };

    !exists
}

/// User registration handler
pub async fn register(user: web::Json<RegisterReq>, store: web::Data<SharedStore>) -> impl Responder {
    let name = user.name.trim();
    let email = user.email.trim().to_lowercase();
    let password = &user.password;

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Name, email and password must not be empty"
        }));
    }

    let role = match Role::from_label(user.role.trim()) {
        Some(r) => r,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid role. Allowed: student, faculty, hod"
            }));
        }
    };

    // students are tied to their OD requests by register number
    let register_no = match role {
        Role::Student => match user
            .register_no
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            Some(r) => Some(r.to_string()),
            None => {
                return HttpResponse::BadRequest().json(json!({
                    "error": "Students must provide a register number"
                }));
            }
        },
        _ => None,
    };

    if !is_email_available(&email, store.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Email already taken"
        }));
    }

    // Safe to insert after the store check
    match insert_user(name, &email, password, role, register_no, store.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "User registered successfully"
        })),
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<SharedStore>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    let email = user.email.trim().to_lowercase();

    debug!("Fetching user from store");

    // 2️⃣ Fetch user
    let record = match store.find_eq(Collection::Users, "email", &email).await {
        Ok(records) => match records.into_iter().next() {
            Some(r) => r,
            None => {
                info!("Invalid credentials: user not found");
                return HttpResponse::Unauthorized().body("Invalid credentials");
            }
        },
        Err(e) => {
            error!(error = %e, "Store error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let db_user: UserDoc = match decode(Collection::Users, &record) {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Malformed user document");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 3️⃣ Verify password
    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified");

    // 4️⃣ Generate access token
    debug!("Generating access token");

    let access_token = generate_access_token(
        db_user.email.clone(),
        db_user.name.clone(),
        db_user.role.clone(),
        db_user.register_no.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // 5️⃣ Generate refresh token
    debug!("Generating refresh token");

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.email.clone(),
        db_user.name.clone(),
        db_user.role.clone(),
        db_user.register_no.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    // 6️⃣ Store refresh token
    debug!(jti = %refresh_claims.jti, "Storing refresh token");

    if let Err(e) = store
        .insert(
            Collection::RefreshTokens,
            encode(&RefreshTokenDoc {
                id: String::new(),
                version: 0,
                jti: refresh_claims.jti.clone(),
                email: db_user.email.clone(),
                expires_at: refresh_claims.exp,
                revoked: false,
            }),
        )
        .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 7️⃣ Update last_login_at (non-fatal)
    debug!("Updating last_login_at");

    let mut patch = serde_json::Map::new();
    patch.insert("last_login_at".into(), json!(Utc::now().to_rfc3339()));

    if let Err(e) = store
        .update(Collection::Users, &db_user.id, db_user.version, patch)
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

/// Echo the authenticated identity
#[get("/me")]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "email": auth.email,
        "name": auth.name,
        "role": auth.role.to_string(),
        "register_no": auth.register_no,
    }))
}

pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<SharedStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // 🔍 find refresh token in the store
    let record = match store
        .find_eq(Collection::RefreshTokens, "jti", &claims.jti)
        .await
    {
        Ok(records) => records.into_iter().next(),
        Err(e) => {
            error!(error = %e, "Store error while fetching refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let record = match record {
        Some(r) => r,
        None => return HttpResponse::Unauthorized().finish(),
    };

    let token_doc: RefreshTokenDoc = match decode::<RefreshTokenDoc>(Collection::RefreshTokens, &record) {
        Ok(doc) if !doc.revoked => doc,
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Malformed refresh token document");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 🔥 revoke old refresh token
    let mut patch = serde_json::Map::new();
    patch.insert("revoked".into(), json!(true));

    if let Err(e) = store
        .update(
            Collection::RefreshTokens,
            &token_doc.id,
            token_doc.version,
            patch,
        )
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🔄 issue new refresh token
    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.sub.clone(),
        claims.name.clone(),
        claims.role.clone(),
        claims.register_no.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = store
        .insert(
            Collection::RefreshTokens,
            encode(&RefreshTokenDoc {
                id: String::new(),
                version: 0,
                jti: new_claims.jti.clone(),
                email: claims.sub.clone(),
                expires_at: new_claims.exp,
                revoked: false,
            }),
        )
        .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🎫 new access token
    let access_token = generate_access_token(
        claims.sub.clone(),
        claims.name.clone(),
        claims.role.clone(),
        claims.register_no,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    store: web::Data<SharedStore>,
    config: web::Data<Config>,
) -> impl Responder {
    // 1️⃣ extract Authorization header
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    // 2️⃣ verify JWT
    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // 3️⃣ only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // 4️⃣ revoke refresh token (idempotent)
    if let Ok(records) = store
        .find_eq(Collection::RefreshTokens, "jti", &claims.jti)
        .await
    {
        if let Some(record) = records.into_iter().next() {
            if let Ok(doc) = decode::<RefreshTokenDoc>(Collection::RefreshTokens, &record) {
                let mut patch = serde_json::Map::new();
                patch.insert("revoked".into(), json!(true));

                let _ = store
                    .update(Collection::RefreshTokens, &doc.id, doc.version, patch)
                    .await;
            }
        }
    }

    // 5️⃣ success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}
