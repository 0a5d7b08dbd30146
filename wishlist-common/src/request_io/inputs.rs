use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::models::wishlist_entry::WishlistPatch;
use crate::validators::{self, Validity};

#[derive(Clone, Debug, Deserialize, Serialize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct CredentialPair {
    pub email: String,
    pub password: String,
}

impl CredentialPair {
    pub fn validate(&self) -> Validity {
        validators::validate_required_text("email", &self.email, validators::MAX_EMAIL_LENGTH)
            .and(|| {
                validators::validate_required_text(
                    "password",
                    &self.password,
                    validators::MAX_PASSWORD_LENGTH,
                )
            })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct InputNewUser {
    pub first: String,
    pub last: String,
    pub email: String,
    pub password: String,
    pub invite_code: String,
}

impl InputNewUser {
    pub fn validate(&self) -> Validity {
        validators::validate_required_text("first", &self.first, validators::MAX_NAME_LENGTH)
            .and(|| {
                validators::validate_required_text(
                    "last",
                    &self.last,
                    validators::MAX_NAME_LENGTH,
                )
            })
            .and(|| {
                validators::validate_required_text(
                    "email",
                    &self.email,
                    validators::MAX_EMAIL_LENGTH,
                )
            })
            .and(|| validators::validate_email_address(&self.email))
            .and(|| {
                validators::validate_required_text(
                    "password",
                    &self.password,
                    validators::MAX_PASSWORD_LENGTH,
                )
            })
            .and(|| {
                validators::validate_required_text(
                    "invite_code",
                    &self.invite_code,
                    validators::MAX_TOKEN_LENGTH,
                )
            })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputWishlistOwner {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputWishlistEntry {
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub cost: String,
    pub owner_notes: Option<String>,
}

impl InputWishlistEntry {
    pub fn validate(&self) -> Validity {
        validators::validate_required_text(
            "description",
            &self.description,
            validators::MAX_DESCRIPTION_LENGTH,
        )
        .and(|| {
            validators::validate_optional_text(
                "source",
                &self.source,
                validators::MAX_SOURCE_LENGTH,
            )
        })
        .and(|| validators::validate_optional_text("cost", &self.cost, validators::MAX_COST_LENGTH))
        .and(|| {
            validators::validate_optional_text(
                "owner_notes",
                self.owner_notes.as_deref().unwrap_or_default(),
                validators::MAX_NOTES_LENGTH,
            )
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputWishlistPatch {
    pub id: i64,
    pub seq: i64,
    pub description: Option<String>,
    pub source: Option<String>,
    pub cost: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub owner_notes: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub buyer_notes: Option<Option<String>>,
}

impl InputWishlistPatch {
    pub fn validate(&self) -> Validity {
        if self.id == 0 {
            return Validity::Invalid(String::from("id is required"));
        }

        if self.seq == 0 {
            return Validity::Invalid(String::from("seq is required"));
        }

        let description = match self.description.as_deref() {
            Some(d) => validators::validate_required_text(
                "description",
                d,
                validators::MAX_DESCRIPTION_LENGTH,
            ),
            None => Validity::Valid,
        };

        description
            .and(|| {
                validators::validate_optional_text(
                    "source",
                    self.source.as_deref().unwrap_or_default(),
                    validators::MAX_SOURCE_LENGTH,
                )
            })
            .and(|| {
                validators::validate_optional_text(
                    "cost",
                    self.cost.as_deref().unwrap_or_default(),
                    validators::MAX_COST_LENGTH,
                )
            })
            .and(|| {
                validators::validate_optional_text(
                    "owner_notes",
                    self.owner_notes.as_ref().and_then(|n| n.as_deref()).unwrap_or_default(),
                    validators::MAX_NOTES_LENGTH,
                )
            })
            .and(|| {
                validators::validate_optional_text(
                    "buyer_notes",
                    self.buyer_notes.as_ref().and_then(|n| n.as_deref()).unwrap_or_default(),
                    validators::MAX_NOTES_LENGTH,
                )
            })
    }

    pub fn to_patch(&self) -> WishlistPatch {
        WishlistPatch {
            description: self.description.clone(),
            source: self.source.clone(),
            cost: self.cost.clone(),
            owner_notes: self.owner_notes.clone(),
            buyer_notes: self.buyer_notes.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputEntryIds {
    pub ids: Vec<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputComment {
    pub wishlist_id: i64,
    pub comment: String,
}

impl InputComment {
    pub fn validate(&self) -> Validity {
        validators::validate_required_text(
            "comment",
            &self.comment,
            validators::MAX_COMMENT_LENGTH,
        )
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputCommentId {
    pub id: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputInviteCodeRequest {
    pub user_id: Option<i64>,
    pub lifetime_days: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_are_rejected() {
        let body = r#"{"email": "jane@example.com", "password": "pw", "admin": true}"#;
        assert!(serde_json::from_str::<CredentialPair>(body).is_err());

        let body = r#"{"id": 1, "seq": 1, "price": "$5"}"#;
        assert!(serde_json::from_str::<InputWishlistPatch>(body).is_err());
    }

    #[test]
    fn test_new_user_validation() {
        let mut new_user = InputNewUser {
            first: String::from("Jane"),
            last: String::from("Doe"),
            email: String::from("jane@example.com"),
            password: String::from("hunter2"),
            invite_code: String::from("code"),
        };

        assert!(new_user.validate().is_valid());

        new_user.email = String::from("jane.example.com");
        assert!(!new_user.validate().is_valid());

        new_user.email = String::from("jane@example.com");
        new_user.last = String::new();
        assert_eq!(
            new_user.validate(),
            Validity::Invalid(String::from("last is required"))
        );
    }

    #[test]
    fn test_wishlist_patch_validation() {
        let body = r#"{"id": 4, "seq": 2, "buyer_notes": "on it"}"#;
        let patch = serde_json::from_str::<InputWishlistPatch>(body).unwrap();
        assert!(patch.validate().is_valid());

        let converted = patch.to_patch();
        assert_eq!(converted.buyer_notes, Some(Some(String::from("on it"))));
        assert!(!converted.has_owner_fields());

        // An explicit null clears the notes, an absent field leaves them alone
        let body = r#"{"id": 4, "seq": 2, "owner_notes": null}"#;
        let patch = serde_json::from_str::<InputWishlistPatch>(body).unwrap();
        assert!(patch.validate().is_valid());

        let converted = patch.to_patch();
        assert_eq!(converted.owner_notes, Some(None));
        assert_eq!(converted.buyer_notes, None);
        assert!(converted.has_owner_fields());

        let body = r#"{"id": 0, "seq": 2, "buyer_notes": "on it"}"#;
        let patch = serde_json::from_str::<InputWishlistPatch>(body).unwrap();
        assert!(!patch.validate().is_valid());

        let body = r#"{"id": 4, "seq": 0, "buyer_notes": "on it"}"#;
        let patch = serde_json::from_str::<InputWishlistPatch>(body).unwrap();
        assert!(!patch.validate().is_valid());

        let body = r#"{"id": 4, "seq": 1, "description": ""}"#;
        let patch = serde_json::from_str::<InputWishlistPatch>(body).unwrap();
        assert!(!patch.validate().is_valid());
    }

    #[test]
    fn test_wishlist_entry_defaults() {
        let body = r#"{"description": "Kite"}"#;
        let entry = serde_json::from_str::<InputWishlistEntry>(body).unwrap();

        assert!(entry.validate().is_valid());
        assert_eq!(entry.source, "");
        assert_eq!(entry.cost, "");
        assert_eq!(entry.owner_notes, None);

        let long_comment = InputComment {
            wishlist_id: 1,
            comment: "a".repeat(validators::MAX_COMMENT_LENGTH + 1),
        };
        assert!(!long_comment.validate().is_valid());
    }
}
