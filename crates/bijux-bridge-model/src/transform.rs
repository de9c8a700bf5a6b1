// SPDX-License-Identifier: Apache-2.0

//! Mapping between the legacy flat record and the unified customer.
//!
//! Both directions are pure. Blank legacy strings map to `None`; an account
//! type the enum does not recognize maps to `None` rather than a default.

use crate::legacy::{format_legacy_address, parse_legacy_address, LegacyAddressParts};
use crate::{AccountType, Address, Contact, Customer, LegacyCustomer};

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[must_use]
pub fn to_unified(legacy: &LegacyCustomer) -> Customer {
    let parts = legacy
        .address
        .as_deref()
        .map(parse_legacy_address)
        .unwrap_or_default();
    Customer {
        id: legacy.customer_id.clone(),
        name: legacy.full_name.trim().to_string(),
        contact: Contact {
            email: non_blank(legacy.email.as_deref()),
            phone: non_blank(legacy.phone_number.as_deref()),
        },
        address: Address {
            street: parts.street,
            city: parts.city,
            state: parts.state,
            zip_code: parts.zip_code,
        },
        account_type: legacy
            .account_type
            .as_deref()
            .and_then(AccountType::parse_lenient),
    }
}

/// Flattens a unified customer into the legacy shape.
///
/// `created_date` is legacy bookkeeping with no unified counterpart; the
/// caller supplies it so this stays free of wall-clock reads.
#[must_use]
pub fn to_legacy(customer: &Customer, created_date: Option<&str>) -> LegacyCustomer {
    let parts = LegacyAddressParts {
        street: customer.address.street.clone(),
        city: customer.address.city.clone(),
        state: customer.address.state.clone(),
        zip_code: customer.address.zip_code.clone(),
    };
    LegacyCustomer {
        customer_id: customer.id.clone(),
        full_name: customer.name.clone(),
        email: customer.contact.email.clone(),
        phone_number: customer.contact.phone.clone(),
        address: format_legacy_address(&parts),
        account_type: customer.account_type.map(|t| t.as_str().to_string()),
        created_date: created_date.map(ToString::to_string),
    }
}
