#![forbid(unsafe_code)]

use bijux_bridge_server::{
    build_router, init_tracing, open_legacy_store, open_new_store,
    validate_startup_config_contract, AdapterTimeouts, ApiConfig, AppState, GatewayConfig,
    MigrationGateway, RemoteStoreConfig, RetryPolicy, StoreSpec,
};
use std::env;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_list(name: &str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.iter().map(ToString::to_string).collect(),
    }
}

fn env_store_spec(name: &str) -> Result<StoreSpec, String> {
    match env::var(name) {
        Ok(raw) => StoreSpec::parse(&raw).map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(StoreSpec::Memory),
    }
}

fn load_config() -> Result<(ApiConfig, GatewayConfig), String> {
    let api_defaults = ApiConfig::default();
    let api = ApiConfig {
        max_body_bytes: env_usize("BRIDGE_MAX_BODY_BYTES", api_defaults.max_body_bytes),
        request_timeout: env_duration_ms(
            "BRIDGE_REQUEST_TIMEOUT_MS",
            api_defaults.request_timeout.as_millis() as u64,
        ),
        cors_allowed_origins: env_list("BRIDGE_CORS_ALLOWED_ORIGINS", &["*"]),
    };
    let remote_defaults = RemoteStoreConfig::default();
    let gateway = GatewayConfig {
        new_store: env_store_spec("BRIDGE_NEW_STORE")?,
        legacy_store: env_store_spec("BRIDGE_LEGACY_STORE")?,
        new_store_timeout: env_duration_ms("BRIDGE_NEW_STORE_TIMEOUT_MS", 2000),
        legacy_store_timeout: env_duration_ms("BRIDGE_LEGACY_STORE_TIMEOUT_MS", 2000),
        remote: RemoteStoreConfig {
            request_timeout: env_duration_ms(
                "BRIDGE_REMOTE_TIMEOUT_MS",
                remote_defaults.request_timeout.as_millis() as u64,
            ),
            auth_bearer: env::var("BRIDGE_REMOTE_AUTH_BEARER")
                .ok()
                .filter(|s| !s.is_empty()),
            retry: RetryPolicy {
                max_attempts: env_usize(
                    "BRIDGE_REMOTE_RETRY_ATTEMPTS",
                    remote_defaults.retry.max_attempts,
                ),
                base_backoff_ms: env_u64(
                    "BRIDGE_REMOTE_RETRY_BACKOFF_MS",
                    remote_defaults.retry.base_backoff_ms,
                ),
            },
        },
    };
    Ok((api, gateway))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing(env_bool("BRIDGE_LOG_JSON", true))?;

    let bind_addr = env::var("BRIDGE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let (api, gateway_cfg) = load_config()?;
    validate_startup_config_contract(&api, &gateway_cfg)
        .map_err(|e| format!("invalid startup config: {e}"))?;
    let effective = serde_json::json!({"api": &api, "gateway": &gateway_cfg});
    info!(config = %effective, "effective configuration");

    let new_store = open_new_store(&gateway_cfg.new_store, &gateway_cfg.remote)
        .map_err(|e| format!("new store open failed: {e}"))?;
    let legacy_store = open_legacy_store(&gateway_cfg.legacy_store, &gateway_cfg.remote)
        .map_err(|e| format!("legacy store open failed: {e}"))?;
    info!(
        new_backend = new_store.backend_tag(),
        legacy_backend = legacy_store.backend_tag(),
        "stores opened"
    );
    let gateway = MigrationGateway::new(
        new_store,
        legacy_store,
        AdapterTimeouts {
            new_store: gateway_cfg.new_store_timeout,
            legacy_store: gateway_cfg.legacy_store_timeout,
        },
    );
    let state = AppState::with_config(gateway, api);
    let app = build_router(state.clone());

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("bridge-server listening on {bind_addr}");

    let accepting = state.accepting_requests.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            accepting.store(false, Ordering::Relaxed);
            let drain_ms = env_u64("BRIDGE_SHUTDOWN_DRAIN_MS", 5000);
            info!(drain_ms, "shutdown signal received, draining");
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
