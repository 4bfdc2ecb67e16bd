//! Probe variants and their configuration factory.
//!
//! A probe performs one check attempt against one target address. The
//! concrete method is selected by the `type` tag of the check configuration;
//! unknown or incomplete configurations are rejected here so a broken check
//! never aborts configuration loading.

use std::net::IpAddr;

use crate::config::schema::CheckConfig;
use crate::healthcheck::dummy::DummyProbe;
use crate::healthcheck::http::{HttpProbe, HttpScheme};
use crate::healthcheck::ping::PingProbe;
use crate::healthcheck::result::{CheckResult, ProbeOutcome};
use crate::healthcheck::script::ScriptProbe;

#[derive(Debug, Clone)]
pub enum Probe {
    Ping(PingProbe),
    Http(HttpProbe),
    Script(ScriptProbe),
    Dummy(DummyProbe),
}

impl Probe {
    /// Build a probe from a check configuration entry.
    ///
    /// Returns `None` (with a warning) when the type is unknown or required
    /// fields are missing; the caller skips such checks.
    pub fn from_config(cfg: &CheckConfig, target: IpAddr) -> Option<Probe> {
        match cfg.kind.as_str() {
            "ping" => Some(Probe::Ping(PingProbe::new(target, cfg.timeout()))),
            "http" | "https" => {
                let scheme = if cfg.kind == "https" { HttpScheme::Https } else { HttpScheme::Http };
                let path = cfg.url.clone().unwrap_or_else(|| "/".to_string());
                let ok_codes = parse_ok_codes(cfg.ok_codes.as_deref());
                match HttpProbe::new(target, scheme, path, cfg.host.clone(), cfg.port, ok_codes) {
                    Ok(probe) => Some(Probe::Http(probe)),
                    Err(e) => {
                        tracing::warn!(target = %target, error = %e, "failed to build HTTP client for check");
                        None
                    }
                }
            }
            "script" => match &cfg.script {
                Some(script) => Some(Probe::Script(ScriptProbe::new(script.clone()))),
                None => {
                    tracing::warn!(target = %target, "script check without a script, skipping");
                    None
                }
            },
            "dummy" => {
                let result = match cfg.result.as_deref() {
                    Some("bad") => CheckResult::Bad,
                    Some("good") | None => CheckResult::Good,
                    Some(other) => {
                        tracing::warn!(result = %other, "unknown dummy result, assuming good");
                        CheckResult::Good
                    }
                };
                Some(Probe::Dummy(DummyProbe::new(result)))
            }
            other => {
                tracing::warn!(kind = %other, target = %target, "unknown healthcheck type, skipping");
                None
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Probe::Ping(_) => "ping",
            Probe::Http(_) => "http",
            Probe::Script(_) => "script",
            Probe::Dummy(_) => "dummy",
        }
    }

    /// Perform one check attempt. Never panics and never blocks the loop
    /// beyond the runner's timeout; failures are folded into the outcome.
    pub async fn run(&self) -> ProbeOutcome {
        match self {
            Probe::Ping(p) => p.run().await,
            Probe::Http(p) => p.run().await,
            Probe::Script(p) => p.run().await,
            Probe::Dummy(p) => p.run().await,
        }
    }
}

/// Parse the comma-separated `ok_codes` list, falling back to `[200]` when
/// absent or unparseable.
fn parse_ok_codes(raw: Option<&str>) -> Vec<u16> {
    let codes: Vec<u16> = raw
        .map(|s| s.split(',').filter_map(|c| c.trim().parse().ok()).collect())
        .unwrap_or_default();

    if codes.is_empty() {
        if let Some(raw) = raw {
            tracing::warn!(ok_codes = %raw, "unable to parse ok codes, using default");
        }
        vec![200]
    } else {
        codes
    }
}
