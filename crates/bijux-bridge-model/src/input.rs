// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{AccountType, Address, Contact, CustomerDraft};

pub const NAME_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PHONE_MAX_LEN: usize = 32;
pub const PHONE_MIN_DIGITS: usize = 7;
pub const ADDRESS_FIELD_MAX_LEN: usize = 128;
pub const ZIP_MAX_LEN: usize = 10;

/// Untrusted create payload. Every field is optional at this stage; blank
/// strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// All field violations found in one input, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid customer input: {rendered}")
    }
}

impl std::error::Error for ValidationErrors {}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn check_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.push(FieldError::new(field, format!("exceeds max length {max}")));
        return false;
    }
    true
}

fn check_address_part(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) -> bool {
    if !check_len(errors, field, value, max) {
        return false;
    }
    // Commas delimit segments of the legacy concatenated address.
    if value.contains(',') {
        errors.push(FieldError::new(field, "must not contain ','"));
        return false;
    }
    true
}

fn valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn valid_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
    allowed && value.chars().filter(char::is_ascii_digit).count() >= PHONE_MIN_DIGITS
}

impl CustomerInput {
    /// Checks every field and produces a draft ready for the dual write.
    ///
    /// A missing `accountType` becomes `SAVINGS`.
    pub fn validate(&self) -> Result<CustomerDraft, ValidationErrors> {
        let mut errors = Vec::new();

        let name = present(self.name.as_ref());
        match &name {
            None => errors.push(FieldError::new("name", "is required")),
            Some(n) => {
                check_len(&mut errors, "name", n, NAME_MAX_LEN);
            }
        }

        let email = present(self.email.as_ref());
        if let Some(e) = &email {
            if check_len(&mut errors, "email", e, EMAIL_MAX_LEN) && !valid_email(e) {
                errors.push(FieldError::new("email", "must be a valid email address"));
            }
        }

        let phone = present(self.phone.as_ref());
        if let Some(p) = &phone {
            if check_len(&mut errors, "phone", p, PHONE_MAX_LEN) && !valid_phone(p) {
                errors.push(FieldError::new(
                    "phone",
                    format!("must contain at least {PHONE_MIN_DIGITS} digits and only digits, spaces or +-()."),
                ));
            }
        }

        let street = present(self.street.as_ref());
        if let Some(s) = &street {
            check_address_part(&mut errors, "street", s, ADDRESS_FIELD_MAX_LEN);
        }
        let city = present(self.city.as_ref());
        if let Some(c) = &city {
            check_address_part(&mut errors, "city", c, ADDRESS_FIELD_MAX_LEN);
        }

        let state = present(self.state.as_ref());
        if let Some(s) = &state {
            if !((2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())) {
                errors.push(FieldError::new("state", "must be 2-3 ASCII letters"));
            }
        }

        let zip_code = present(self.zip_code.as_ref());
        if let Some(z) = &zip_code {
            let shaped = z.starts_with(|c: char| c.is_ascii_digit())
                && z.chars().all(|c| c.is_ascii_digit() || c == '-');
            if check_len(&mut errors, "zipCode", z, ZIP_MAX_LEN) && !shaped {
                errors.push(FieldError::new("zipCode", "must be digits with optional '-'"));
            }
        }

        if street.is_none() && (city.is_some() || state.is_some() || zip_code.is_some()) {
            errors.push(FieldError::new("street", "is required when other address fields are set"));
        }
        if city.is_none() && (state.is_some() || zip_code.is_some()) {
            errors.push(FieldError::new("city", "is required when state or zipCode is set"));
        }

        let account_type = match present(self.account_type.as_ref()) {
            None => Some(AccountType::Savings),
            Some(raw) => {
                let parsed = AccountType::parse_lenient(&raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "accountType",
                        "must be one of SAVINGS, CHECKING, PREMIUM",
                    ));
                }
                parsed
            }
        };

        match (name, account_type) {
            (Some(name), Some(account_type)) if errors.is_empty() => Ok(CustomerDraft {
                name,
                contact: Contact { email, phone },
                address: Address {
                    street,
                    city,
                    state,
                    zip_code,
                },
                account_type,
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}
