// ABOUTME: Cursor-based pagination for efficient data traversal
// ABOUTME: Base64 keyset cursors over (timestamp, id) with a typed page wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Keyset pagination primitives.
//!
//! Cursors encode a `(timestamp, id)` position as base64 so listing
//! endpoints stay stable when rows are inserted mid-traversal. Offset
//! pagination is still offered on small collections; activity listings
//! use cursors.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size when the client does not specify one
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Hard ceiling on page size
pub const MAX_PAGE_SIZE: usize = 200;

/// Opaque pagination cursor encoding a `(timestamp, id)` position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// Encode a position into a cursor
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, id: &str) -> Self {
        let raw = format!("{}|{id}", timestamp.to_rfc3339());
        Self(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Decode the cursor back into its position, if well-formed
    #[must_use]
    pub fn decode(&self) -> Option<(DateTime<Utc>, String)> {
        let raw = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (ts, id) = raw.split_once('|')?;
        let timestamp = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
        if id.is_empty() {
            return None;
        }
        Some((timestamp, id.to_owned()))
    }

    /// The encoded form sent over the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Pagination parameters supplied by the client
#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    /// Resume position from a previous page, if any
    pub cursor: Option<Cursor>,
    /// Requested page size (clamped to [`MAX_PAGE_SIZE`])
    pub limit: usize,
}

impl PaginationParams {
    /// Build parameters from optional query values, clamping the limit
    #[must_use]
    pub fn new(cursor: Option<String>, limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Self {
            cursor: cursor.map(Cursor::from),
            limit,
        }
    }
}

/// One page of results with a continuation cursor
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Cursor for the next page, present when `has_more` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    /// Whether more items exist past this page
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// Assemble a page
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            items,
            next_cursor,
            has_more,
        }
    }
}
