pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 320;
pub const MAX_PASSWORD_LENGTH: usize = 1024;
pub const MAX_TOKEN_LENGTH: usize = 64;

pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_SOURCE_LENGTH: usize = 2000;
pub const MAX_COST_LENGTH: usize = 100;
pub const MAX_NOTES_LENGTH: usize = 2000;
pub const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }

    /// Chains another check onto this one, keeping the first failure.
    pub fn and(self, next: impl FnOnce() -> Validity) -> Validity {
        match self {
            Validity::Valid => next(),
            invalid => invalid,
        }
    }
}

/// Checks that a required text field is present and that its length (in characters, not
/// bytes) doesn't exceed `max_length`.
pub fn validate_required_text(field_name: &str, value: &str, max_length: usize) -> Validity {
    if value.trim().is_empty() {
        return Validity::Invalid(format!("{field_name} is required"));
    }

    validate_optional_text(field_name, value, max_length)
}

pub fn validate_optional_text(field_name: &str, value: &str, max_length: usize) -> Validity {
    if value.chars().count() > max_length {
        return Validity::Invalid(format!(
            "{field_name} cannot be longer than {max_length} characters"
        ));
    }

    Validity::Valid
}

pub fn validate_email_address(email: &str) -> Validity {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Validity::Invalid(String::from("Email address is too long."));
    }

    for c in email.chars() {
        if c == ' ' || !c.is_ascii() {
            return Validity::Invalid(String::from(
                "Email address cannot contain a space or non-ASCII characters.",
            ));
        }
    }

    if email.contains("@.") {
        return Validity::Invalid(String::from(
            "Domain name in email address cannot begin with a period.",
        ));
    }

    let email = match email.split_once('@') {
        Some(s) => s,
        None => {
            return Validity::Invalid(String::from("Email address must contain an at symbol (@)."))
        }
    };

    if email.0.is_empty() || email.1.len() < 3 {
        return Validity::Invalid(String::from("Email username or domain name is too short."));
    }

    if email.1.contains('@') || !email.1.contains('.') {
        return Validity::Invalid(String::from(
            "Email address must have only one at symbol (@) and the domain must contain a period.",
        ));
    }

    if email.1.ends_with('.') {
        return Validity::Invalid(String::from("Email address cannot end with a period."));
    }

    Validity::Valid
}
