#![forbid(unsafe_code)]
//! Customer model SSOT for the migration gateway.
//!
//! Holds the unified customer, the flat legacy record, create-input
//! validation and the pure mapping between the two schemas.

mod customer;
mod input;
mod legacy;
mod progress;
mod transform;

pub use customer::{
    AccountType, Address, Contact, Customer, CustomerDraft, CustomerId, Source, Sourced,
    ValidationError, CUSTOMER_ID_MAX_LEN,
};
pub use input::{
    CustomerInput, FieldError, ValidationErrors, ADDRESS_FIELD_MAX_LEN, EMAIL_MAX_LEN,
    NAME_MAX_LEN, PHONE_MAX_LEN, PHONE_MIN_DIGITS, ZIP_MAX_LEN,
};
pub use legacy::{format_legacy_address, parse_legacy_address, LegacyAddressParts, LegacyCustomer};
pub use progress::{MigrationProgress, MigrationStatus};
pub use transform::{to_legacy, to_unified};

pub const CRATE_NAME: &str = "bijux-bridge-model";
