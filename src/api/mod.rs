//! Client for the Forem (dev.to) content API.
//!
//! - [`client`] - HTTP requests, status handling, size limits, JSON decoding
//! - [`wire`] - Raw response shapes, mapped into [`crate::models`] by callers

mod client;
pub mod wire;

pub use client::{
    build_http_client, parse_base_url, ApiClient, ApiError, Endpoint, PageQuery,
    DEFAULT_BASE_URL, DISCUSSIONS_PAGE_SIZE, PAGE_SIZE, POPULAR_TAGS_PAGE_SIZE,
    USER_ARTICLES_PAGE_SIZE,
};
