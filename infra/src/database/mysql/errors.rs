//! Mapping of SQLx failures and row decoding into domain errors

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use hl_core::errors::DomainError;
use hl_core::repositories::account::constraints;

/// Name of the violated account constraint, from a MySQL duplicate-key message
/// such as `Duplicate entry 'x' for key 'accounts.uq_accounts_email'`
pub(crate) fn constraint_for(message: &str) -> &'static str {
    if message.contains("uq_accounts_email") {
        constraints::EMAIL
    } else if message.contains("uq_accounts_phone") {
        constraints::PHONE
    } else {
        constraints::PROVIDER
    }
}

/// Unique-key violations become `UniqueViolation`, everything else `Internal`
pub(crate) fn write_error(context: &str, error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::UniqueViolation {
            constraint: constraint_for(db.message()).to_string(),
        },
        _ => query_error(context, error),
    }
}

pub(crate) fn query_error(context: &str, error: sqlx::Error) -> DomainError {
    tracing::error!(error = %error, "{}", context);
    DomainError::internal(format!("{}: {}", context, error))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}
