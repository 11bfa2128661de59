//! Operator block configuration.

use serde::Deserialize;

use crate::security::password;

/// Operator block configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OperBlock {
    /// Operator name (used in OPER command).
    pub name: String,
    /// Password: argon2 PHC string, legacy `salt$hash`, bcrypt, or plaintext.
    pub password: String,
    /// Optional host restriction (e.g., "*@10.0.0.*" or "trusted.host").
    pub host: Option<String>,
    /// Display host applied on successful OPER.
    pub vhost: Option<String>,
    /// Extra WHOIS line shown for this operator.
    pub whois: Option<String>,
}

impl OperBlock {
    /// Verify the provided password against the stored credential.
    pub fn verify_password(&self, password: &str) -> bool {
        password::verify(password, &self.password)
    }

    /// Whether a client with the given `nick!user@host` may use this block.
    pub fn host_allows(&self, mask: &str) -> bool {
        match self.host.as_deref() {
            None | Some("") => true,
            Some(pattern) => tinyircd_proto::matches_host(mask, pattern),
        }
    }
}
