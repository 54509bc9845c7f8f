//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`response`]**: The JSON error envelope
//!
//! # API Structure
//!
//! Everything lives under `/api/v0`:
//!
//! - **Status** (`/status`): Unauthenticated host information
//! - **Login** (`/login`): Password check without issuing a session
//! - **Sessions** (`/sessions`): Issue, inspect and revoke API keys
//! - **Users** (`/users`, `/users/{id}`): User management
//! - **Notifications** (`/notifications`): The caller's notifications
//!
//! The OpenAPI document is served at `/api/v0/openapi.json`.

pub mod handlers;
pub mod models;
pub mod openapi;
pub mod response;
