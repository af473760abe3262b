// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod detail;
pub mod ids;
pub mod list;
pub mod login;
pub mod mapper;
pub mod model;
pub mod pagination;
pub mod query;
pub mod route;
pub mod session;
pub mod state;
pub mod url_state;

pub use ids::*;
pub use model::*;
pub use state::*;
