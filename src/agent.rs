//! Agent identity and platform family
//!
//! An agent is one monitored endpoint. Its identifier is opaque to the query
//! layer beyond equality and ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new agent identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Platform family reported by an agent.
///
/// Drives schema variant resolution for tables whose columns depend on the
/// operating system the agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Both families in declaration order.
    pub const ALL: [Platform; 2] = [Platform::Windows, Platform::Unix];

    /// Maps a reported platform family to a known variant.
    ///
    /// Returns `None` for families this layer does not recognise; callers
    /// resolve those to the broadest schema variant.
    pub fn from_family(family: &str) -> Option<Self> {
        match family.trim().to_ascii_lowercase().as_str() {
            "windows" => Some(Platform::Windows),
            "unix" | "linux" | "darwin" | "bsd" | "freebsd" | "openbsd" | "netbsd" | "solaris"
            | "sunos" | "aix" | "hp-ux" | "ubuntu" | "debian" | "centos" | "rhel" | "fedora"
            | "sles" | "opensuse" | "arch" | "amzn" => Some(Platform::Unix),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Unix => "unix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_ordering() {
        let mut ids = vec![AgentId::new("003"), AgentId::new("001"), AgentId::new("002")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "001");
        assert_eq!(ids[2].to_string(), "003");
    }

    #[test]
    fn test_agent_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AgentId::new("007")).unwrap();
        assert_eq!(json, "\"007\"");
    }

    #[test]
    fn test_platform_family_resolution() {
        assert_eq!(Platform::from_family("Windows"), Some(Platform::Windows));
        assert_eq!(Platform::from_family("ubuntu"), Some(Platform::Unix));
        assert_eq!(Platform::from_family(" darwin "), Some(Platform::Unix));
        assert_eq!(Platform::from_family("plan9"), None);
    }
}
