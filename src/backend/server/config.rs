/**
 * Server Configuration
 *
 * This module loads the relay configuration from environment variables
 * (after `.env` has been applied by `main`).
 *
 * # Variables
 *
 * - `SERVER_HOST` - bind address (default `0.0.0.0`)
 * - `SERVER_PORT` - bind port (default `3001`)
 * - `FRONTEND_URL` - CORS origin (default: any)
 * - `REQUIRE_SOCKET_AUTH` - `true`/`false` (default `false`)
 * - `ACCESS_JWT_SECRET` - HS256 secret for access tokens
 * - `WS_PING_INTERVAL_SECS` - keepalive period, `0` disables (default `30`)
 * - `WS_PONG_TIMEOUT_SECS` - pong deadline (default `10`)
 *
 * # Error Handling
 *
 * Unparseable values are errors rather than silently falling back to the
 * default, so a typo in deployment config stops startup.
 */

use std::str::FromStr;
use std::time::Duration;

use crate::shared::{ConfigError, RelayConfig};

/// Load the configuration from the process environment
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Build the configuration from any key/value source
pub fn config_from_lookup<F>(lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut builder = RelayConfig::builder();

    if let Some(host) = value("SERVER_HOST") {
        builder = builder.host(host);
    }
    if let Some(port) = parse::<u16>("SERVER_PORT", value("SERVER_PORT"))? {
        builder = builder.port(port);
    }
    if let Some(url) = value("FRONTEND_URL") {
        builder = builder.frontend_url(url);
    }
    if let Some(require) = parse_flag("REQUIRE_SOCKET_AUTH", value("REQUIRE_SOCKET_AUTH"))? {
        builder = builder.require_auth(require);
    }
    if let Some(secret) = value("ACCESS_JWT_SECRET") {
        builder = builder.jwt_secret(secret);
    }
    if let Some(secs) = parse::<u64>("WS_PING_INTERVAL_SECS", value("WS_PING_INTERVAL_SECS"))? {
        builder = builder.ping_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = parse::<u64>("WS_PONG_TIMEOUT_SECS", value("WS_PONG_TIMEOUT_SECS"))? {
        builder = builder.pong_timeout(Duration::from_secs(secs));
    }

    builder.build()
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|raw| {
        raw.parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw })
    })
    .transpose()
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    raw.map(|raw| match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    })
    .transpose()
}
