#![forbid(unsafe_code)]

use serde_json::{json, Value};

pub mod dto;
pub mod error_mapping;
mod errors;

pub use dto::{CustomerRequestDto, CustomerResponseDto, MigrationStatsDto};
pub use errors::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "bijux-bridge-api";
pub const API_ROUTE_CUSTOMER: &str = "/api/customer";
pub const API_ROUTE_CUSTOMER_BY_ID: &str = "/api/customer/:id";
pub const API_ROUTE_STATS: &str = "/api/customer/stats";

#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "bijux-bridge API",
        "version": "v1"
      },
      "paths": {
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/readyz": {"get": {"responses": {"200": {"description": "ready"}, "503": {"description": "draining"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "prometheus metrics"}}}},
        "/api/customer/{id}": {
          "get": {
            "parameters": [
              {"name": "id", "in": "path", "required": true, "schema": {"type": "string", "pattern": "^[A-Za-z0-9_-]{1,64}$"}}
            ],
            "responses": {
              "200": {"description": "customer found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Customer"}}}},
              "400": {"description": "invalid id", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "not found in either store", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "503": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/customer": {
          "post": {
            "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": "#/components/schemas/CustomerRequest"}}}},
            "responses": {
              "201": {"description": "written to both stores", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Customer"}}}},
              "400": {"description": "validation failed", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "413": {"description": "body too large", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "502": {"description": "new store committed, legacy store write failed", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "503": {"description": "new store unavailable; nothing written, or outcome unknown after a timeout (details.new_store = unknown)", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/customer/stats": {
          "get": {
            "responses": {
              "200": {"description": "migration progress", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/MigrationStats"}}}},
              "503": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        }
      },
      "components": {
        "schemas": {
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details", "request_id"],
            "properties": {
              "code": {"type": "string"},
              "message": {"type": "string"},
              "details": {"type": "object"},
              "request_id": {"type": "string"}
            }
          },
          "CustomerRequest": {
            "type": "object",
            "required": ["name"],
            "properties": {
              "name": {"type": "string"},
              "email": {"type": "string", "nullable": true},
              "phone": {"type": "string", "nullable": true},
              "street": {"type": "string", "nullable": true},
              "city": {"type": "string", "nullable": true},
              "state": {"type": "string", "nullable": true},
              "zipCode": {"type": "string", "nullable": true},
              "accountType": {"type": "string", "enum": ["SAVINGS", "CHECKING", "PREMIUM"], "nullable": true}
            }
          },
          "Customer": {
            "type": "object",
            "required": ["id", "name", "source"],
            "properties": {
              "id": {"type": "string"},
              "name": {"type": "string"},
              "email": {"type": "string", "nullable": true},
              "phone": {"type": "string", "nullable": true},
              "street": {"type": "string", "nullable": true},
              "city": {"type": "string", "nullable": true},
              "state": {"type": "string", "nullable": true},
              "zipCode": {"type": "string", "nullable": true},
              "accountType": {"type": "string", "nullable": true},
              "source": {"type": "string", "enum": ["NEW_DB", "LEGACY_DB"]},
              "message": {"type": "string"}
            }
          },
          "MigrationStats": {
            "type": "object",
            "properties": {
              "legacyRecords": {"type": "integer"},
              "modernRecords": {"type": "integer"},
              "totalRecords": {"type": "integer"},
              "migrationPercentage": {"type": "number"},
              "status": {"type": "string", "enum": ["STARTED", "IN_PROGRESS", "COMPLETED"]}
            }
          }
        }
      }
    })
}
