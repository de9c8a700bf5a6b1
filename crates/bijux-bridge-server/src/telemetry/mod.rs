// SPDX-License-Identifier: Apache-2.0

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::GatewayMetrics;
