//! Authentication header building
//!
//! Shared by the HTTP-based adapters. Credential fields not required by the
//! auth kind are ignored; incomplete credentials yield no headers rather
//! than malformed ones.

use crate::connector::Headers;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bus_core::{AuthKind, ConnectionAuthentication};

/// Build an `Authorization` header from credential material.
pub fn build_auth_headers(auth: &ConnectionAuthentication) -> Headers {
    let mut headers = Headers::new();

    match auth.kind {
        AuthKind::Basic => {
            if let (Some(username), Some(password)) = (&auth.username, &auth.password) {
                if !username.is_empty() && !password.is_empty() {
                    let credentials = STANDARD.encode(format!("{username}:{password}"));
                    headers.insert("Authorization".to_string(), format!("Basic {credentials}"));
                }
            }
        }
        AuthKind::BearerToken => {
            if let Some(token) = &auth.token {
                if !token.is_empty() {
                    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                }
            }
        }
    }

    headers
}
