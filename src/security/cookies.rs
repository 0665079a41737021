// ABOUTME: Secure HTTP cookie utilities for session management
// ABOUTME: Provides httpOnly, Secure, SameSite cookie helpers for the auth token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Secure cookie utilities.
//!
//! The auth token travels in an httpOnly cookie so browser clients never
//! touch it from JavaScript; API clients use the Authorization header
//! instead and ignore these helpers.

use std::env;
use std::fmt::Write;

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth_token";

/// `SameSite` cookie policy
#[derive(Debug, Clone, Copy)]
pub enum SameSitePolicy {
    /// Cookie only sent in first-party context
    Strict,
    /// Cookie sent on top-level navigation
    Lax,
}

/// Build a Set-Cookie value with the given security attributes
fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    http_only: bool,
    same_site: SameSitePolicy,
) -> String {
    let mut cookie = format!("{name}={value}");
    let _ = write!(cookie, "; Max-Age={max_age_secs}; Path=/");

    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if infer_secure_flag() {
        cookie.push_str("; Secure");
    }
    match same_site {
        SameSitePolicy::Strict => cookie.push_str("; SameSite=Strict"),
        SameSitePolicy::Lax => cookie.push_str("; SameSite=Lax"),
    }

    cookie
}

/// Set the httpOnly auth cookie
pub fn set_auth_cookie(headers: &mut HeaderMap, token: &str, max_age_secs: i64) {
    let cookie = build_cookie(AUTH_COOKIE, token, max_age_secs, true, SameSitePolicy::Lax);
    if let Ok(header_value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, header_value);
    }
}

/// Clear the auth cookie
pub fn clear_auth_cookie(headers: &mut HeaderMap) {
    let cookie = build_cookie(AUTH_COOKIE, "", 0, true, SameSitePolicy::Lax);
    if let Ok(header_value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, header_value);
    }
}

/// Derive the `Secure` cookie flag from the `BASE_URL` environment variable.
///
/// Returns `true` when `BASE_URL` starts with `https://` or is unset
/// (fail-secure), `false` for plain HTTP dev environments.
fn infer_secure_flag() -> bool {
    env::var("BASE_URL").map_or(true, |url| url.starts_with("https://"))
}

/// Extract a cookie value from request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();

            if name == cookie_name {
                Some(value.to_owned())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn auth_cookie_is_http_only() {
        let mut headers = HeaderMap::new();
        set_auth_cookie(&mut headers, "tok", 3600);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("auth_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn cookie_values_are_extracted_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=1; auth_token=abc; trailing=2".parse().unwrap(),
        );
        assert_eq!(
            get_cookie_value(&headers, "auth_token"),
            Some("abc".to_owned())
        );
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }
}
