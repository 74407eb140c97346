//! Acting identities passed to services

use serde::{Deserialize, Serialize};

/// Who is performing an operation
///
/// Services use this record for permission checks. `None` in place of an
/// accountability means system-level access without checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accountability {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub admin: bool,

    #[serde(default)]
    pub app: bool,

    /// Where the request came from (`operation:<name>` for flow operations)
    #[serde(default)]
    pub origin: Option<String>,

    #[serde(default)]
    pub ip: Option<String>,
}

impl Accountability {
    /// Admin identity attributed to a flow operation
    pub fn operation(name: &str) -> Self {
        Self {
            role: None,
            user: None,
            admin: true,
            app: true,
            origin: Some(format!("operation:{name}")),
            ip: None,
        }
    }
}

/// How a service should be authorized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountabilityMode {
    /// No accountability; full system access
    #[default]
    System,

    /// Synthesized admin accountability tagged with an operation name
    Operation(String),

    /// Caller-supplied accountability
    Custom(Accountability),
}

impl AccountabilityMode {
    pub fn resolve(self) -> Option<Accountability> {
        match self {
            AccountabilityMode::System => None,
            AccountabilityMode::Operation(name) => Some(Accountability::operation(&name)),
            AccountabilityMode::Custom(accountability) => Some(accountability),
        }
    }
}

impl From<Accountability> for AccountabilityMode {
    fn from(accountability: Accountability) -> Self {
        AccountabilityMode::Custom(accountability)
    }
}

impl From<Option<Accountability>> for AccountabilityMode {
    fn from(accountability: Option<Accountability>) -> Self {
        accountability.map_or(AccountabilityMode::System, AccountabilityMode::Custom)
    }
}
