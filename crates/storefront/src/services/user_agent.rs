//! User-agent shaping for visitor records.
//!
//! Fields follow the stored format:
//! - device: `"{vendor} {category}"`, e.g. `Apple smartphone`; woothee has
//!   no device model, and the vendor is omitted when unknown
//! - browser: `"{name} {version}"`
//! - os: `"{name} {version}"`
//!
//! Missing names become `Unknown`; missing versions are dropped.

use woothee::parser::Parser;

const UNKNOWN: &str = "Unknown";
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

/// Device, browser and OS strings for one user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescription {
    pub device: String,
    pub browser: String,
    pub os: String,
}

fn known(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != WOOTHEE_UNKNOWN).then_some(value)
}

fn join(name: Option<&str>, detail: Option<&str>) -> String {
    format!("{} {}", name.unwrap_or(UNKNOWN), detail.unwrap_or_default())
        .trim()
        .to_owned()
}

/// Describe the client behind `user_agent`.
#[must_use]
pub fn describe(user_agent: &str) -> ClientDescription {
    let result = Parser::new().parse(user_agent).unwrap_or_default();

    let device = format!(
        "{} {}",
        known(result.vendor).unwrap_or_default(),
        known(result.category).unwrap_or(UNKNOWN)
    )
    .trim()
    .to_owned();

    ClientDescription {
        device,
        browser: join(known(result.name), known(result.version)),
        os: join(known(result.os), known(&result.os_version)),
    }
}
