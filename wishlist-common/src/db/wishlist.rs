use chrono::Utc;
use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::wishlist_entry::{
    EditorRole, NewWishlistEntry, WishlistEdit, WishlistEntry, WishlistPatch,
};
use crate::schema::wishlist as wishlist_fields;
use crate::schema::wishlist::dsl::wishlist;

pub const MAX_ENTRIES_PER_DELETE: usize = 1000;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_entry(
        &self,
        user_id: i64,
        description: &str,
        source: &str,
        cost: &str,
        owner_notes: Option<&str>,
    ) -> Result<i64, DaoError> {
        let new_entry = NewWishlistEntry {
            seq: 1,
            user_id,
            description,
            source,
            cost,
            owner_notes,
            creation_time: Utc::now().naive_utc(),
        };

        Ok(dsl::insert_into(wishlist)
            .values(&new_entry)
            .returning(wishlist_fields::id)
            .get_result::<i64>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_entries_for_user(&self, user_id: i64) -> Result<Vec<WishlistEntry>, DaoError> {
        Ok(wishlist
            .filter(wishlist_fields::user_id.eq(user_id))
            .order(wishlist_fields::id.asc())
            .load::<WishlistEntry>(&mut self.db_thread_pool.get()?)?)
    }

    /// Applies `patch` to the entry if `expected_seq` still matches the stored sequence number,
    /// returning the new sequence number.
    ///
    /// Errors, in the order they are checked:
    /// - `QueryFailure(NotFound)` if the entry doesn't exist
    /// - `OutOfDate` if the sequence number has moved on
    /// - `CannotRunQuery` if the patch touches fields the requester may not edit
    pub fn update_entry(
        &self,
        entry_id: i64,
        requester_id: i64,
        expected_seq: i64,
        patch: &WishlistPatch,
    ) -> Result<i64, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            let (owner_id, current_seq) = wishlist
                .select((wishlist_fields::user_id, wishlist_fields::seq))
                .find(entry_id)
                .get_result::<(i64, i64)>(conn)?;

            if current_seq != expected_seq {
                return Err(DaoError::OutOfDate { current_seq });
            }

            let role = if owner_id == requester_id {
                EditorRole::Owner
            } else {
                EditorRole::Buyer
            };

            let edit = patch.as_edit(role).map_err(DaoError::CannotRunQuery)?;

            let target = wishlist
                .filter(wishlist_fields::id.eq(entry_id))
                .filter(wishlist_fields::seq.eq(expected_seq));
            let next_seq = wishlist_fields::seq.eq(wishlist_fields::seq + 1);

            let affected_row_count = match edit {
                WishlistEdit::Owner(changes) => diesel::update(target)
                    .set((&changes, next_seq))
                    .execute(conn)?,
                WishlistEdit::Buyer { buyer_notes } => diesel::update(target)
                    .set((wishlist_fields::buyer_notes.eq(buyer_notes), next_seq))
                    .execute(conn)?,
            };

            if affected_row_count == 0 {
                let current_seq = wishlist
                    .select(wishlist_fields::seq)
                    .find(entry_id)
                    .get_result::<i64>(conn)
                    .optional()?
                    .unwrap_or(current_seq);

                return Err(DaoError::OutOfDate { current_seq });
            }

            Ok(expected_seq + 1)
        })
    }

    /// Deletes the requester's entries among `entry_ids`. If any of the IDs belongs to another
    /// user, nothing is deleted and `DaoError::WontRunQuery` is returned.
    pub fn delete_entries(&self, requester_id: i64, entry_ids: &[i64]) -> Result<usize, DaoError> {
        if entry_ids.is_empty() {
            return Err(DaoError::CannotRunQuery("No entries to delete"));
        }

        if entry_ids.len() > MAX_ENTRIES_PER_DELETE {
            return Err(DaoError::CannotRunQuery("Too many entries to delete at once"));
        }

        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            let foreign_entry_count = wishlist
                .filter(wishlist_fields::id.eq_any(entry_ids))
                .filter(wishlist_fields::user_id.ne(requester_id))
                .count()
                .get_result::<i64>(conn)?;

            if foreign_entry_count > 0 {
                return Err(DaoError::WontRunQuery);
            }

            let deleted_count = diesel::delete(
                wishlist
                    .filter(wishlist_fields::id.eq_any(entry_ids))
                    .filter(wishlist_fields::user_id.eq(requester_id)),
            )
            .execute(conn)?;

            if deleted_count == 0 {
                return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
            }

            Ok(deleted_count)
        })
    }
}
