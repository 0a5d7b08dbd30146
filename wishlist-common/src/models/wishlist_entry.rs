use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable};

use crate::models::user::User;
use crate::schema::wishlist;

#[derive(Clone, Debug, PartialEq, Eq, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = wishlist)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WishlistEntry {
    pub id: i64,
    pub seq: i64,
    pub user_id: i64,

    pub description: String,
    pub source: String,
    pub cost: String,

    pub owner_notes: Option<String>,
    pub buyer_notes: Option<String>,

    pub creation_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = wishlist)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewWishlistEntry<'a> {
    pub seq: i64,
    pub user_id: i64,

    pub description: &'a str,
    pub source: &'a str,
    pub cost: &'a str,

    pub owner_notes: Option<&'a str>,

    pub creation_time: NaiveDateTime,
}

/// Columns only the owner of an entry may change. `None` fields are left out of the
/// generated `UPDATE`; `Some(None)` writes `NULL` to the notes column.
#[derive(Debug, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = wishlist)]
pub struct OwnerFieldChanges<'a> {
    pub description: Option<&'a str>,
    pub source: Option<&'a str>,
    pub cost: Option<&'a str>,
    pub owner_notes: Option<Option<&'a str>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorRole {
    Owner,
    Buyer,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WishlistEdit<'a> {
    Owner(OwnerFieldChanges<'a>),
    Buyer { buyer_notes: Option<&'a str> },
}

/// A requested change to a wishlist entry as it arrives from a client. Every mutable column
/// is optional; which of them may be present depends on who is making the change. The notes
/// columns are nullable, so `Some(None)` clears them.
#[derive(Clone, Debug, Default)]
pub struct WishlistPatch {
    pub description: Option<String>,
    pub source: Option<String>,
    pub cost: Option<String>,
    pub owner_notes: Option<Option<String>>,
    pub buyer_notes: Option<Option<String>>,
}

impl WishlistPatch {
    pub fn has_owner_fields(&self) -> bool {
        self.description.is_some()
            || self.source.is_some()
            || self.cost.is_some()
            || self.owner_notes.is_some()
    }

    pub fn as_edit(&self, role: EditorRole) -> Result<WishlistEdit<'_>, &'static str> {
        match (role, self.has_owner_fields(), self.buyer_notes.as_ref()) {
            (EditorRole::Owner, _, Some(_)) => Err("owner cannot edit buyer notes"),
            (EditorRole::Owner, false, None) => Err("no fields to update"),
            (EditorRole::Owner, true, None) => Ok(WishlistEdit::Owner(OwnerFieldChanges {
                description: self.description.as_deref(),
                source: self.source.as_deref(),
                cost: self.cost.as_deref(),
                owner_notes: self.owner_notes.as_ref().map(Option::as_deref),
            })),
            (EditorRole::Buyer, true, _) => Err("non-owner can only edit buyer notes"),
            (EditorRole::Buyer, false, None) => Err("no fields to update"),
            (EditorRole::Buyer, false, Some(buyer_notes)) => Ok(WishlistEdit::Buyer {
                buyer_notes: buyer_notes.as_deref(),
            }),
        }
    }
}
