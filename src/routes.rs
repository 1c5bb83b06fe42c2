use crate::{
    api::{od_request, reference, track},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let track_limiter = Arc::new(build_limiter(config.rate_track_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Public status tracking, no session required
    cfg.service(
        web::resource("/track")
            .wrap(track_limiter)
            .route(web::get().to(track::track_status)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::me)
            .service(
                web::scope("/od")
                    // /od
                    .service(
                        web::resource("")
                            .route(web::get().to(od_request::list_od))
                            .route(web::post().to(od_request::submit_od)),
                    )
                    // /od/{id}
                    .service(web::resource("/{id}").route(web::get().to(od_request::get_od)))
                    // /od/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(od_request::approve_od)),
                    )
                    // /od/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(od_request::reject_od)),
                    )
                    // /od/{id}/forward
                    .service(
                        web::resource("/{id}/forward")
                            .route(web::put().to(od_request::forward_od)),
                    ),
            )
            .service(web::resource("/departments").route(web::get().to(reference::list_departments)))
            .service(web::resource("/faculty").route(web::get().to(reference::list_faculty))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
