//! TLS negotiation for the server store.
//!
//! Connection strings use libpq's `sslmode` values. The driver only knows
//! `disable`, `prefer` and `require`, so the verifying modes are rewritten to
//! `require` and enforced through the certificate checks of the connector.

use crate::error::{DbError, DbResult};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static SSLMODE_RE: OnceLock<Regex> = OnceLock::new();

/// `sslmode=<value>` in a URL query or a key/value connection string
fn sslmode_regex() -> &'static Regex {
    SSLMODE_RE.get_or_init(|| {
        Regex::new(r"(^|[?&\s])sslmode=([^&\s]*)").expect("valid regex")
    })
}

/// Requested transport security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    Disable,
    /// Try TLS, fall back to plaintext when the server has none
    #[default]
    Prefer,
    /// TLS without certificate checks
    Require,
    /// TLS with a trusted certificate chain
    VerifyCa,
    /// TLS with a trusted chain issued for the host name
    VerifyFull,
}

impl SslMode {
    /// The value the driver is given for this mode
    fn driver_value(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => "require",
        }
    }
}

impl FromStr for SslMode {
    type Err = DbError;

    fn from_str(value: &str) -> DbResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            // `allow` differs from `prefer` only in which attempt goes first
            "allow" | "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(DbError::InvalidConfig(format!(
                "unknown sslmode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        })
    }
}

/// Read the requested mode out of `url` and return the string the driver
/// accepts alongside it. A missing parameter means `prefer`.
pub fn split_sslmode(url: &str) -> DbResult<(String, SslMode)> {
    let Some(caps) = sslmode_regex().captures(url) else {
        return Ok((url.to_string(), SslMode::default()));
    };
    let mode: SslMode = caps[2].parse()?;
    let rewritten = sslmode_regex().replace(url, |c: &regex::Captures<'_>| {
        format!("{}sslmode={}", &c[1], mode.driver_value())
    });
    Ok((rewritten.into_owned(), mode))
}

/// Build the connector enforcing the checks `mode` asks for
pub fn make_connector(mode: SslMode) -> DbResult<MakeTlsConnector> {
    let verify_chain = matches!(mode, SslMode::VerifyCa | SslMode::VerifyFull);
    let verify_host = mode == SslMode::VerifyFull;
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(!verify_chain)
        .danger_accept_invalid_hostnames(!verify_host)
        .build()
        .map_err(|e| DbError::ConnectionError(format!("TLS setup failed: {}", e)))?;
    Ok(MakeTlsConnector::new(connector))
}
