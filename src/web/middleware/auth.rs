use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::models::UserRole;

/// Identity attached to every authenticated request. Session issuance is
/// external; we only consume the token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
struct JwtPayload {
    sub: String,
    role: String,
}

pub async fn require_auth(mut request: Request, next: Next) -> Response {
    // Extract cookies from request
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find(|c| c.starts_with("access_token="))
                .and_then(|c| c.strip_prefix("access_token="))
        });

    if let Some(token) = token {
        // Parse JWT payload (middle part)
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            if let Ok(payload_bytes) = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]) {
                if let Ok(payload) = serde_json::from_slice::<JwtPayload>(&payload_bytes) {
                    if let Some(role) = UserRole::parse(&payload.role) {
                        request.extensions_mut().insert(AuthenticatedUser {
                            id: payload.sub,
                            role,
                        });
                        return next.run(request).await;
                    }
                }
            }
        }
    }

    // No token, or an unparseable one: the client must re-authenticate.
    Response::builder()
        .status(401)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"error":"unauthorized","message":"please log in"}"#,
        ))
        .unwrap()
}
