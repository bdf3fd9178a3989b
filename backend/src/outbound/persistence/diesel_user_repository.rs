//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

type UserQuery = users::BoxedQuery<'static, diesel::pg::Pg>;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one<F>(&self, filter: F) -> Result<Option<User>, UserPersistenceError>
    where
        F: FnOnce(UserQuery) -> UserQuery,
    {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_error(err.into(), None))?;
        let row: Option<UserRow> = filter(users::table.into_boxed())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into(), None))?;
        Ok(row.map(User::from))
    }
}

fn map_error(failure: StoreFailure, email: Option<&Email>) -> UserPersistenceError {
    match (failure, email) {
        (failure, Some(email)) if failure.violates("email") => {
            UserPersistenceError::duplicate_email(email.as_str())
        }
        (failure, _) => map_basic_failure(
            failure,
            UserPersistenceError::connection,
            UserPersistenceError::query,
        ),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_error(err.into(), None))?;
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into(), Some(&user.email)))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_error(err.into(), None))?;
        let updated = diesel::update(users::table.find(*user.id.as_uuid()))
            .set(UserRow::from(user))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into(), Some(&user.email)))?;
        if updated == 0 {
            return Err(UserPersistenceError::query(format!("no user {}", user.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let id = *id.as_uuid();
        self.find_one(|query| query.filter(users::id.eq(id))).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let email = email.as_str().to_owned();
        self.find_one(|query| query.filter(users::email.eq(email))).await
    }

    async fn find_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let token = token.to_owned();
        self.find_one(|query| query.filter(users::validation_token.eq(token)))
            .await
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, UserPersistenceError> {
        let token = token.to_owned();
        self.find_one(|query| query.filter(users::reset_password_token.eq(token)))
            .await
    }
}
