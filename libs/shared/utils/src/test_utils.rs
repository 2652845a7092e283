use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Actor, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub cloudflare_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            cloudflare_base_url: "https://test.cloudflare.com/v1".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            supabase_service_role_key: "test-service-role-key".to_string(),
            cloudflare_realtime_app_id: "test-app-id".to_string(),
            cloudflare_realtime_api_token: "test-token".to_string(),
            cloudflare_realtime_base_url: self.cloudflare_base_url.clone(),
            video_join_base_url: "https://video.test/join".to_string(),
            upstream_timeout_ms: 200,
            escalation_interval_seconds: 1,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn attendant(email: &str) -> Self {
        Self::new(email, "attendant")
    }

    pub fn nurse(email: &str) -> Self {
        Self::new(email, "nurse")
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn uuid(&self) -> Uuid {
        Uuid::parse_str(&self.id).expect("test user ids are uuids")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_actor(&self) -> Actor {
        Actor::from_user(&self.to_user()).expect("test user has a workflow role")
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn bearer(user: &TestUser, config: &TestConfig) -> String {
        format!("Bearer {}", Self::create_test_token(user, &config.jwt_secret, Some(1)))
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn professional_response(
        id: &str,
        role: &str,
        specialty: Option<&str>,
        active_consultations: u32,
        avg_attendance_minutes: f64,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": format!("Test {}", role),
            "role": role,
            "specialty": specialty,
            "availability": "online",
            "is_active": true,
            "active_consultations": active_consultations,
            "patient_limit": 3,
            "avg_attendance_minutes": avg_attendance_minutes
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
