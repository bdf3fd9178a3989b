//! PostgreSQL-backed `OffererRepository` implementation using Diesel ORM.
//!
//! Offerer creation stores the offerer, its virtual venue and the creator's
//! link in one transaction.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ManagedActivity, OffererRepository, OffererRepositoryError};
use crate::domain::{Offerer, OffererId, UserId, UserOfferer, Venue};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::{OffererRow, UserOffererRow, VenueRow};
use super::pool::DbPool;
use super::schema::{offerers, offers, user_offerers, venues};

/// Diesel-backed implementation of the `OffererRepository` port.
#[derive(Clone)]
pub struct DieselOffererRepository {
    pool: DbPool,
}

impl DieselOffererRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        query: offerers::BoxedQuery<'static, diesel::pg::Pg>,
    ) -> Result<Vec<Offerer>, OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<OffererRow> = query
            .select(OffererRow::as_select())
            .order_by(offerers::name)
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(rows.into_iter().map(Offerer::from).collect())
    }
}

fn map_error(failure: StoreFailure) -> OffererRepositoryError {
    map_basic_failure(
        failure,
        OffererRepositoryError::connection,
        OffererRepositoryError::query,
    )
}

fn map_write_error(failure: StoreFailure, siren: &str) -> OffererRepositoryError {
    if failure.violates("siren") {
        OffererRepositoryError::duplicate_siren(siren)
    } else if failure.violates("unique_user_offerer") {
        OffererRepositoryError::duplicate_link()
    } else {
        map_error(failure)
    }
}

fn links_from_rows(rows: Vec<UserOffererRow>) -> Result<Vec<UserOfferer>, OffererRepositoryError> {
    rows.into_iter()
        .map(|row| UserOfferer::try_from(row).map_err(OffererRepositoryError::query))
        .collect()
}

#[async_trait]
impl OffererRepository for DieselOffererRepository {
    async fn find_by_id(&self, id: &OffererId) -> Result<Option<Offerer>, OffererRepositoryError> {
        let found = self
            .load(offerers::table.filter(offerers::id.eq(*id.as_uuid())).into_boxed())
            .await?;
        Ok(found.into_iter().next())
    }

    async fn find_by_siren(&self, siren: &str) -> Result<Option<Offerer>, OffererRepositoryError> {
        let found = self
            .load(
                offerers::table
                    .filter(offerers::siren.eq(siren.to_owned()))
                    .into_boxed(),
            )
            .await?;
        Ok(found.into_iter().next())
    }

    async fn find_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<Offerer>, OffererRepositoryError> {
        let found = self
            .load(
                offerers::table
                    .filter(offerers::validation_token.eq(token.to_owned()))
                    .into_boxed(),
            )
            .await?;
        Ok(found.into_iter().next())
    }

    async fn list_all(&self) -> Result<Vec<Offerer>, OffererRepositoryError> {
        self.load(offerers::table.into_boxed()).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Offerer>, OffererRepositoryError> {
        let linked = user_offerers::table
            .filter(user_offerers::user_id.eq(*user_id.as_uuid()))
            .select(user_offerers::offerer_id);
        self.load(offerers::table.filter(offerers::id.eq_any(linked)).into_boxed())
            .await
    }

    async fn create_with_virtual_venue(
        &self,
        offerer: &Offerer,
        venue: &Venue,
        link: &UserOfferer,
    ) -> Result<(), OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let offerer_row = OffererRow::from(offerer);
        let venue_row = VenueRow::from(venue);
        let link_row = UserOffererRow::from(link);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(offerers::table)
                    .values(offerer_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(venues::table)
                    .values(venue_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(user_offerers::table)
                    .values(link_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err.into(), offerer.siren.as_str()))
    }

    async fn update(&self, offerer: &Offerer) -> Result<(), OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::update(offerers::table.find(*offerer.id.as_uuid()))
            .set(OffererRow::from(offerer))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err.into(), offerer.siren.as_str()))?;
        Ok(())
    }

    async fn count_offers(&self, id: &OffererId) -> Result<i64, OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        offers::table
            .inner_join(venues::table)
            .filter(venues::managing_offerer_id.eq(*id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))
    }

    async fn links_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserOfferer>, OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<UserOffererRow> = user_offerers::table
            .filter(user_offerers::user_id.eq(*user_id.as_uuid()))
            .select(UserOffererRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        links_from_rows(rows)
    }

    async fn insert_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(user_offerers::table)
            .values(UserOffererRow::from(link))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err.into(), ""))?;
        Ok(())
    }

    async fn find_link_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<UserOfferer>, OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<UserOffererRow> = user_offerers::table
            .filter(user_offerers::validation_token.eq(token))
            .select(UserOffererRow::as_select())
            .limit(1)
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(links_from_rows(rows)?.into_iter().next())
    }

    async fn update_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::update(user_offerers::table.find(*link.id.as_uuid()))
            .set(UserOffererRow::from(link))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }

    async fn managed_activity(
        &self,
        user_id: &UserId,
    ) -> Result<ManagedActivity, OffererRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let user_id = *user_id.as_uuid();
        let has_physical_venues = diesel::select(exists(
            venues::table
                .inner_join(offerers::table.inner_join(user_offerers::table))
                .filter(user_offerers::user_id.eq(user_id))
                .filter(venues::is_virtual.eq(false)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(err.into()))?;
        let has_offers = diesel::select(exists(
            offers::table
                .inner_join(
                    venues::table.inner_join(offerers::table.inner_join(user_offerers::table)),
                )
                .filter(user_offerers::user_id.eq(user_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(err.into()))?;
        Ok(ManagedActivity {
            has_physical_venues,
            has_offers,
        })
    }
}
