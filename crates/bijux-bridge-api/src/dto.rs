// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use bijux_bridge_model::{
    Customer, CustomerInput, MigrationProgress, MigrationStatus, Source, Sourced,
};

/// `POST /api/customer` body as sent by the front end form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerRequestDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
}

impl From<CustomerRequestDto> for CustomerInput {
    fn from(dto: CustomerRequestDto) -> Self {
        Self {
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            street: dto.street,
            city: dto.city,
            state: dto.state,
            zip_code: dto.zip_code,
            account_type: dto.account_type,
        }
    }
}

/// Flat customer view returned by both lookup and create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerResponseDto {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub account_type: Option<String>,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CustomerResponseDto {
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<Sourced<Customer>> for CustomerResponseDto {
    fn from(sourced: Sourced<Customer>) -> Self {
        let Sourced { value: c, source } = sourced;
        Self {
            id: c.id.into_inner(),
            name: c.name,
            email: c.contact.email,
            phone: c.contact.phone,
            street: c.address.street,
            city: c.address.city,
            state: c.address.state,
            zip_code: c.address.zip_code,
            account_type: c.account_type.map(|t| t.as_str().to_string()),
            source,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MigrationStatsDto {
    pub legacy_records: u64,
    pub modern_records: u64,
    pub total_records: u64,
    pub migration_percentage: f64,
    pub status: MigrationStatus,
}

impl From<MigrationProgress> for MigrationStatsDto {
    fn from(p: MigrationProgress) -> Self {
        Self {
            legacy_records: p.legacy_records,
            modern_records: p.modern_records,
            total_records: p.total_records,
            migration_percentage: p.migration_percentage,
            status: p.status,
        }
    }
}
