// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// Flat record shape of the legacy customer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyCustomer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Concatenated `street, city, STATE ZIP` string.
    pub address: Option<String>,
    pub account_type: Option<String>,
    pub created_date: Option<String>,
}

/// Structured view of the legacy concatenated address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyAddressParts {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

const SEGMENT_SEPARATOR: &str = ", ";

fn is_state_token(token: &str) -> bool {
    (2..=3).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_zip_token(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '-')
}

fn parse_region(segment: &str) -> Option<(Option<String>, Option<String>)> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    match tokens.as_slice() {
        [one] if is_state_token(one) => Some((Some((*one).to_string()), None)),
        [one] if is_zip_token(one) => Some((None, Some((*one).to_string()))),
        [state, zip] if is_state_token(state) && is_zip_token(zip) => {
            Some((Some((*state).to_string()), Some((*zip).to_string())))
        }
        _ => None,
    }
}

/// Splits a legacy address into its parts.
///
/// Segments are comma separated; the trailing region segment (`STATE`, `ZIP`
/// or `STATE ZIP`) is recognized only when at least three segments exist, the
/// segment before it is the city, and everything in front is the street.
#[must_use]
pub fn parse_legacy_address(raw: &str) -> LegacyAddressParts {
    let segments: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let n = segments.len();
    match n {
        0 => LegacyAddressParts::default(),
        1 => LegacyAddressParts {
            street: Some(segments[0].to_string()),
            ..LegacyAddressParts::default()
        },
        _ => {
            if n >= 3 {
                if let Some((state, zip_code)) = parse_region(segments[n - 1]) {
                    return LegacyAddressParts {
                        street: Some(segments[..n - 2].join(SEGMENT_SEPARATOR)),
                        city: Some(segments[n - 2].to_string()),
                        state,
                        zip_code,
                    };
                }
            }
            LegacyAddressParts {
                street: Some(segments[..n - 1].join(SEGMENT_SEPARATOR)),
                city: Some(segments[n - 1].to_string()),
                state: None,
                zip_code: None,
            }
        }
    }
}

/// Joins address parts back into the legacy concatenated form.
///
/// Returns `None` when no part is set.
#[must_use]
pub fn format_legacy_address(parts: &LegacyAddressParts) -> Option<String> {
    let region = match (parts.state.as_deref(), parts.zip_code.as_deref()) {
        (Some(s), Some(z)) => Some(format!("{s} {z}")),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(z)) => Some(z.to_string()),
        (None, None) => None,
    };
    let segments: Vec<&str> = [
        parts.street.as_deref(),
        parts.city.as_deref(),
        region.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join(SEGMENT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_segments_are_street_and_city() {
        let parts = parse_legacy_address("12 Oak Ave, Austin");
        assert_eq!(parts.street.as_deref(), Some("12 Oak Ave"));
        assert_eq!(parts.city.as_deref(), Some("Austin"));
        assert_eq!(parts.state, None);
        assert_eq!(parts.zip_code, None);
    }

    #[test]
    fn trailing_region_is_split_into_state_and_zip() {
        let parts = parse_legacy_address("Suite 4, 9 Elm St, Dallas, TX 75201");
        assert_eq!(parts.street.as_deref(), Some("Suite 4, 9 Elm St"));
        assert_eq!(parts.city.as_deref(), Some("Dallas"));
        assert_eq!(parts.state.as_deref(), Some("TX"));
        assert_eq!(parts.zip_code.as_deref(), Some("75201"));
    }

    #[test]
    fn non_region_tail_stays_city() {
        let parts = parse_legacy_address("Unit 2, 5 Pine Rd, Round Rock");
        assert_eq!(parts.street.as_deref(), Some("Unit 2, 5 Pine Rd"));
        assert_eq!(parts.city.as_deref(), Some("Round Rock"));
        assert_eq!(parts.state, None);
    }

    #[test]
    fn blank_segments_are_ignored() {
        assert_eq!(parse_legacy_address("  , ,"), LegacyAddressParts::default());
        let parts = parse_legacy_address(" 1 Main St ,, ");
        assert_eq!(parts.street.as_deref(), Some("1 Main St"));
        assert_eq!(parts.city, None);
    }

    #[test]
    fn format_skips_missing_parts() {
        let parts = LegacyAddressParts {
            street: Some("1 Main St".to_string()),
            city: Some("Austin".to_string()),
            state: None,
            zip_code: Some("78701".to_string()),
        };
        assert_eq!(
            format_legacy_address(&parts).as_deref(),
            Some("1 Main St, Austin, 78701")
        );
        assert_eq!(format_legacy_address(&LegacyAddressParts::default()), None);
    }
}
