// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod cache;
mod client;
mod error;
mod fetcher;

pub use cache::{DEFAULT_CACHE_TTL, ResponseCache};
pub use client::Client;
pub use error::ApiError;
pub use fetcher::{
    Fetcher, LIST_PATH, LOGIN_PATH, LoginData, LoginResponse, OPTIONS_PATH, login_outcome,
};
