use thiserror::Error;

/// Primary result code SQLite reports for writes against a read-only database.
/// Extended codes (`SQLITE_READONLY_*`) keep it in their low byte.
const SQLITE_READONLY: i32 = 8;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { message: String },

    /// The store refused a write because it is opened read-only
    #[error("Database is read-only: {message}")]
    ReadOnly { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    pub fn is_read_only(&self) -> bool {
        matches!(self, DbError::ReadOnly { .. })
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref().is_some_and(is_read_only_code) {
                    DbError::ReadOnly {
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_unique_violation() {
                    // SQLite reports no constraint metadata, only "UNIQUE constraint failed: users.email"
                    let (table, constraint) = match extract_unique_column(db_err.message()) {
                        Some((table, column)) => (Some(table.to_string()), Some(format!("{table}.{column}"))),
                        None => (None, None),
                    };

                    DbError::UniqueViolation {
                        constraint,
                        table,
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Whether an SQLite result code (primary or extended, as reported by the driver) means the
/// database is read-only.
fn is_read_only_code(code: &str) -> bool {
    code.parse::<i32>().is_ok_and(|code| code & 0xff == SQLITE_READONLY)
}

/// Extract `(table, column)` from an SQLite unique violation message.
fn extract_unique_column(message: &str) -> Option<(&str, &str)> {
    let target = message.strip_prefix("UNIQUE constraint failed: ")?;
    // Composite constraints list several columns; the first one names the table
    let first = target.split(',').next()?.trim();
    first.split_once('.')
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
