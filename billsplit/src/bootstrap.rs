use billsplit_domain::{
    Money, SettlementContext, SettlementEngine, SharePolicy, ShareReconciler,
    services::{RoundingMode, SettlementRoundingError},
};
use rust_decimal::Decimal;
use std::{env, str::FromStr};
use tracing_subscriber::EnvFilter;

const SCALE_VAR: &str = "BILLSPLIT_SCALE";
const ROUNDING_VAR: &str = "BILLSPLIT_ROUNDING";
const SHARE_POLICY_VAR: &str = "BILLSPLIT_SHARE_POLICY";
const SHARE_TOLERANCE_VAR: &str = "BILLSPLIT_SHARE_TOLERANCE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}='{raw}' is invalid, expected {expected}")]
    InvalidValue {
        key: &'static str,
        raw: String,
        expected: &'static str,
    },
    #[error("BILLSPLIT_SCALE: {0}")]
    UnsupportedScale(#[from] SettlementRoundingError),
}

/// Settlement settings read from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub context: SettlementContext,
    pub reconciler: ShareReconciler,
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut context = match read(SCALE_VAR) {
            Some(raw) => SettlementContext::with_scale(parse_scale(raw)?),
            None => defaults.context,
        };
        context.validate()?;
        if let Some(raw) = read(ROUNDING_VAR) {
            context.rounding_mode = parse_rounding(raw)?;
        }

        let policy = match read(SHARE_POLICY_VAR) {
            Some(raw) => parse_share_policy(raw)?,
            None => defaults.reconciler.policy,
        };
        let tolerance = match read(SHARE_TOLERANCE_VAR) {
            Some(raw) => parse_tolerance(raw)?,
            None => defaults.reconciler.tolerance,
        };

        Ok(Self {
            context,
            reconciler: ShareReconciler::new(policy, tolerance),
        })
    }

    pub fn engine(&self) -> SettlementEngine {
        SettlementEngine::new(self.context, self.reconciler)
    }
}

fn parse_scale(raw: String) -> Result<u32, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: SCALE_VAR,
        raw,
        expected: "a non-negative integer",
    })
}

fn parse_rounding(raw: String) -> Result<RoundingMode, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "half-up" => Ok(RoundingMode::HalfUp),
        "half-even" => Ok(RoundingMode::HalfEven),
        _ => Err(ConfigError::InvalidValue {
            key: ROUNDING_VAR,
            raw,
            expected: "half-up or half-even",
        }),
    }
}

fn parse_share_policy(raw: String) -> Result<SharePolicy, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "reject" => Ok(SharePolicy::Reject),
        "payer-absorbs" => Ok(SharePolicy::PayerAbsorbs),
        "normalize" => Ok(SharePolicy::Normalize),
        _ => Err(ConfigError::InvalidValue {
            key: SHARE_POLICY_VAR,
            raw,
            expected: "reject, normalize or payer-absorbs",
        }),
    }
}

fn parse_tolerance(raw: String) -> Result<Money, ConfigError> {
    match Decimal::from_str(&raw) {
        Ok(value) if !value.is_sign_negative() => Ok(Money::from_decimal(value)),
        _ => Err(ConfigError::InvalidValue {
            key: SHARE_TOLERANCE_VAR,
            raw,
            expected: "a non-negative decimal",
        }),
    }
}

/// Structured logs on stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
