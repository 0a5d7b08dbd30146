use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::comment::CommentWithAuthor;
use crate::db::user::UserIdAndName;
use crate::models::wishlist_entry::WishlistEntry;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputUser {
    pub id: i64,
    pub first: String,
    pub last: String,
}

impl From<UserIdAndName> for OutputUser {
    fn from(user: UserIdAndName) -> Self {
        Self {
            id: user.id,
            first: user.first_name,
            last: user.last_name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputUserList {
    pub users: Vec<OutputUser>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputComment {
    pub id: i64,
    pub user: OutputUser,
    pub comment: String,
    pub creation_time: NaiveDateTime,
}

impl From<CommentWithAuthor> for OutputComment {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            user: OutputUser {
                id: comment.user_id,
                first: comment.first_name,
                last: comment.last_name,
            },
            comment: comment.comment,
            creation_time: comment.creation_time,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputWishlistEntry {
    pub id: i64,
    pub seq: i64,
    pub description: String,
    pub source: String,
    pub cost: String,
    pub owner_notes: Option<String>,
    pub buyer_notes: Option<String>,
    pub comments: Vec<OutputComment>,
    pub creation_time: NaiveDateTime,
}

impl OutputWishlistEntry {
    /// The entry as its owner sees it: buyer notes and comments are withheld.
    pub fn for_owner(entry: WishlistEntry) -> Self {
        Self {
            id: entry.id,
            seq: entry.seq,
            description: entry.description,
            source: entry.source,
            cost: entry.cost,
            owner_notes: entry.owner_notes,
            buyer_notes: None,
            comments: Vec::new(),
            creation_time: entry.creation_time,
        }
    }

    pub fn for_other_user(entry: WishlistEntry, comments: Vec<OutputComment>) -> Self {
        Self {
            id: entry.id,
            seq: entry.seq,
            description: entry.description,
            source: entry.source,
            cost: entry.cost,
            owner_notes: entry.owner_notes,
            buyer_notes: entry.buyer_notes,
            comments,
            creation_time: entry.creation_time,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputWishlist {
    pub user: OutputUser,
    pub headers: Vec<String>,
    pub entries: Vec<OutputWishlistEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputId {
    pub id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputIdAndSeq {
    pub id: i64,
    pub seq: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputDeletedCount {
    pub deleted: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputInviteCode {
    pub invite_code: String,
    pub expiry_time: NaiveDateTime,
}
