//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts, looked up by ID or username
//! - [`Sessions`]: Session API keys and their expiry
//! - [`Notifications`]: Per-user notifications
//!
//! # Common Pattern
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut repo = Sessions::new(&mut conn);
//! let session = repo.get_by_key(key).await?;
//! ```

pub mod notifications;
pub mod repository;
pub mod sessions;
pub mod users;

pub use notifications::Notifications;
pub use repository::Repository;
pub use sessions::Sessions;
pub use users::Users;
