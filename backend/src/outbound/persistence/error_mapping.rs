//! Shared Diesel error classification for the repository adapters.
//!
//! Repositories first classify a Diesel failure into a [`StoreFailure`] and
//! then pick their own port error for each class, so constraint names and
//! trigger messages are interpreted in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Message raised by the `check_booking` trigger.
pub(crate) const TOO_MANY_BOOKINGS: &str = "tooManyBookings";

/// What went wrong in the store, independent of the calling repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The database could not be reached or dropped the connection.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A trigger refused the booking for lack of places.
    Overbooked,
    /// Any other failure.
    Query(String),
}

impl StoreFailure {
    /// Whether a unique violation concerns a constraint containing `needle`.
    pub(crate) fn violates(&self, needle: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name.contains(needle)
        )
    }
}

impl From<PoolError> for StoreFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for StoreFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    constraint = info.constraint_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(_, info) if info.message().contains(TOO_MANY_BOOKINGS) => {
                Self::Overbooked
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

/// Map a failure onto a port error that only distinguishes connection and
/// query problems.
pub(crate) fn map_basic_failure<E, C, Q>(failure: StoreFailure, connection: C, query: Q) -> E
where
    C: FnOnce(String) -> E,
    Q: FnOnce(String) -> E,
{
    match failure {
        StoreFailure::Connection(message) => connection(message),
        StoreFailure::UniqueViolation { constraint } => query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        StoreFailure::Overbooked => query(TOO_MANY_BOOKINGS.to_owned()),
        StoreFailure::Query(message) => query(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Info {
        message: &'static str,
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.message
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(
        kind: DatabaseErrorKind,
        message: &'static str,
        constraint: Option<&'static str>,
    ) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { message, constraint }))
    }

    #[rstest]
    fn unique_violations_keep_their_constraint() {
        let failure = StoreFailure::from(database_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value",
            Some("users_email_key"),
        ));
        assert!(failure.violates("email"));
        assert!(!failure.violates("siren"));
    }

    #[rstest]
    fn trigger_refusals_become_overbooking() {
        let failure = StoreFailure::from(database_error(
            DatabaseErrorKind::Unknown,
            "tooManyBookings",
            None,
        ));
        assert_eq!(failure, StoreFailure::Overbooked);
    }

    #[rstest]
    #[case(PoolError::checkout("timed out"))]
    #[case(PoolError::build("bad url"))]
    fn pool_errors_are_connection_failures(#[case] error: PoolError) {
        assert!(matches!(StoreFailure::from(error), StoreFailure::Connection(_)));
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let failure = StoreFailure::from(database_error(
            DatabaseErrorKind::ClosedConnection,
            "server closed the connection",
            None,
        ));
        let mapped: String = map_basic_failure(failure, |m| format!("connection: {m}"), |m| m);
        assert!(mapped.starts_with("connection:"));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            StoreFailure::from(DieselError::NotFound),
            StoreFailure::Query("record not found".to_owned())
        );
    }
}
