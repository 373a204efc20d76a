//! WebSocket origin validation
//!
//! Browsers always send an `Origin` header with the WebSocket upgrade, so
//! checking it is what keeps a third-party page from driving a session on
//! the user's behalf.

/// Origin validation policy
///
/// Controls which origins may open a session channel.
#[derive(Clone, Debug)]
pub struct OriginPolicy {
    mode: OriginPolicyMode,
    allowed: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum OriginPolicyMode {
    AllowAll,
    AllowList,
    DenyAll,
}

impl OriginPolicy {
    /// Create a policy that allows specific origins
    #[must_use]
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            mode: OriginPolicyMode::AllowList,
            allowed: allowed_origins
                .into_iter()
                .map(|o| normalize_origin(&o))
                .collect(),
        }
    }

    /// Policy of the `allowed_origins` configuration list (empty = any origin)
    #[must_use]
    pub fn from_config(allowed_origins: &[String]) -> Self {
        if allowed_origins.is_empty() {
            Self::allow_all()
        } else {
            Self::new(allowed_origins.to_vec())
        }
    }

    /// Create a policy that allows all origins
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            mode: OriginPolicyMode::AllowAll,
            allowed: Vec::new(),
        }
    }

    /// Create a policy that denies all origins
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            mode: OriginPolicyMode::DenyAll,
            allowed: Vec::new(),
        }
    }

    /// Add an allowed origin
    pub fn add_origin(&mut self, origin: &str) {
        let origin = normalize_origin(origin);
        if !self.allowed.contains(&origin) {
            self.allowed.push(origin);
        }
        if self.mode == OriginPolicyMode::DenyAll {
            self.mode = OriginPolicyMode::AllowList;
        }
    }

    /// Validate the `Origin` header of an upgrade request
    ///
    /// A request without the header only passes an allow-all policy.
    #[must_use]
    pub fn validate(&self, origin: Option<&str>) -> OriginValidationResult {
        match (&self.mode, origin) {
            (OriginPolicyMode::AllowAll, _) => OriginValidationResult::Allowed,
            (OriginPolicyMode::DenyAll, _) => OriginValidationResult::Denied {
                reason: "All origins denied".to_string(),
            },
            (OriginPolicyMode::AllowList, None) => OriginValidationResult::Denied {
                reason: "Missing Origin header".to_string(),
            },
            (OriginPolicyMode::AllowList, Some(origin)) => {
                let origin = normalize_origin(origin);
                if self.allowed.iter().any(|allowed| *allowed == origin) {
                    OriginValidationResult::Allowed
                } else {
                    OriginValidationResult::Denied {
                        reason: format!("Origin '{origin}' not in allow list"),
                    }
                }
            }
        }
    }

    /// Get the list of allowed origins
    #[must_use]
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed
    }

    /// Check if this policy allows all origins
    #[must_use]
    pub fn is_allow_all(&self) -> bool {
        self.mode == OriginPolicyMode::AllowAll
    }
}

/// Origins compare case-insensitively and without a trailing slash
fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Result of origin validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OriginValidationResult {
    /// Origin is allowed
    Allowed,
    /// Origin is denied
    Denied {
        /// Reason for denial
        reason: String,
    },
}

impl OriginValidationResult {
    /// Check if the origin is allowed
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Get the denial reason if denied
    #[must_use]
    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            Self::Denied { reason } => Some(reason),
            Self::Allowed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_policy_allow_list() {
        let policy = OriginPolicy::new(vec![
            "https://app.example.com".to_string(),
            "http://localhost:8000/".to_string(),
        ]);

        assert!(policy.validate(Some("https://app.example.com")).is_allowed());
        assert!(policy.validate(Some("HTTPS://App.Example.com/")).is_allowed());
        assert!(policy.validate(Some("http://localhost:8000")).is_allowed());
        assert!(!policy.validate(Some("https://evil.com")).is_allowed());
        assert!(!policy.validate(Some("http://app.example.com")).is_allowed());
        assert_eq!(
            policy.validate(None).denial_reason(),
            Some("Missing Origin header")
        );
    }

    #[test]
    fn test_empty_config_allows_all() {
        let policy = OriginPolicy::from_config(&[]);
        assert!(policy.is_allow_all());
        assert!(policy.validate(None).is_allowed());
        assert!(policy.validate(Some("http://localhost:3000")).is_allowed());

        let policy = OriginPolicy::from_config(&["https://one.com".to_string()]);
        assert!(!policy.is_allow_all());
        assert_eq!(policy.allowed_origins(), ["https://one.com"]);
    }

    #[test]
    fn test_origin_policy_deny_all_then_add() {
        let mut policy = OriginPolicy::deny_all();
        assert!(!policy.validate(Some("https://one.com")).is_allowed());

        policy.add_origin("https://one.com");
        policy.add_origin("https://one.com/");
        assert_eq!(policy.allowed_origins().len(), 1);
        assert!(policy.validate(Some("https://one.com")).is_allowed());
        assert!(!policy.validate(Some("https://two.com")).is_allowed());
    }
}
