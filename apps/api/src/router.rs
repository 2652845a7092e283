use axum::{
    Router,
    routing::get,
};

use consultation_cell::consultation_routes;
use escalation_cell::escalation_routes;
use professional_cell::professional_routes;
use video_conferencing_cell::video_conferencing_routes;

use crate::state::AppServices;

pub fn create_router(services: &AppServices) -> Router {
    let config = services.config.clone();

    Router::new()
        .route("/", get(|| async { "StixConnect API is running!" }))
        .nest("/consultations", consultation_routes(config.clone(), services.engine.clone()))
        .nest("/professionals", professional_routes(config.clone(), services.resolver.clone()))
        .nest("/escalation", escalation_routes(config.clone(), services.escalation.clone()))
        .nest("/video", video_conferencing_routes(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
    use tower::ServiceExt;

    fn offline_services(config: &TestConfig) -> AppServices {
        let mut app_config = config.to_app_config();
        app_config.supabase_url = String::new();
        app_config.cloudflare_realtime_app_id = String::new();
        AppServices::build(app_config)
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let config = TestConfig::default();
        let app = create_router(&offline_services(&config));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cells_are_mounted_under_their_prefixes() {
        let config = TestConfig::default();
        let app = create_router(&offline_services(&config));
        let attendant = TestUser::attendant("desk@example.com");

        for uri in ["/consultations", "/professionals/candidates?role=doctor", "/escalation/queue"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .header("Authorization", JwtTestUtils::bearer(&attendant, &config))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }
}
