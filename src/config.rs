//! Configuration (spec §6) — environment-sourced, no file layering.

use std::env;

/// Action taken by Authorize/StartTransaction when the presented id tag is
/// not present in the authorization repository (spec §9 open question).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailPolicy {
    /// Unknown tags are rejected (`Invalid`).
    RejectUnknown,
    /// Unknown tags are accepted — useful for demo/permissive deployments.
    AcceptUnknown,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db_url: String,
    pub heartbeat_interval_secs: i64,
    pub call_timeout_secs: u64,
    pub meter_buffer: usize,
    pub auth_fail_policy: AuthFailPolicy,
    pub allow_unknown_stations: bool,
}

impl Config {
    /// Load from environment variables, falling back to the documented
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            db_url: env::var("DB_URL").unwrap_or_else(|_| "sqlite://ocpp.db?mode=rwc".to_string()),
            heartbeat_interval_secs: env::var("HEARTBEAT_INTERVAL_SEC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            call_timeout_secs: env::var("CALL_TIMEOUT_SEC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            meter_buffer: env::var("METER_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            auth_fail_policy: match env::var("AUTH_FAIL_POLICY").as_deref() {
                Ok("open") => AuthFailPolicy::AcceptUnknown,
                _ => AuthFailPolicy::RejectUnknown,
            },
            allow_unknown_stations: env::var("ALLOW_UNKNOWN_STATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_without_env() {
        env::remove_var("LISTEN_ADDR");
        env::remove_var("HEARTBEAT_INTERVAL_SEC");
        env::remove_var("AUTH_FAIL_POLICY");
        let cfg = Config::from_env();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.heartbeat_interval_secs, 30);
        assert_eq!(cfg.auth_fail_policy, AuthFailPolicy::RejectUnknown);
    }

    #[test]
    fn auth_fail_policy_reads_spec_vocabulary() {
        env::set_var("AUTH_FAIL_POLICY", "open");
        assert_eq!(Config::from_env().auth_fail_policy, AuthFailPolicy::AcceptUnknown);
        env::set_var("AUTH_FAIL_POLICY", "closed");
        assert_eq!(Config::from_env().auth_fail_policy, AuthFailPolicy::RejectUnknown);
        env::remove_var("AUTH_FAIL_POLICY");
    }
}
