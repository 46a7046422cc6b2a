use serde::{Deserialize, Serialize};

/// Owner id the backend reports for users who are not logged in.
pub const ANONYMOUS_USER: &str = "anonymousUser";

/// Identity returned by `GET /api/users/me`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    id: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            Self::anonymous()
        } else {
            Self { id: id.to_string() }
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_USER.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER
    }
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// GitHub account details, as served by `/api/users/me/details` and by
/// `https://api.github.com/user/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GithubProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl GithubProfile {
    /// Stand-in shown when a profile cannot be fetched.
    pub fn placeholder(owner_id: &str) -> Self {
        Self {
            login: format!("user {}", owner_id),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user() {
        assert!(CurrentUser::new("anonymousUser").is_anonymous());
        assert!(CurrentUser::new("  ").is_anonymous());
        let user = CurrentUser::new("154427648\n");
        assert_eq!(user.id(), "154427648");
        assert!(!user.is_anonymous());
    }

    #[test]
    fn test_profile_placeholder() {
        let profile = GithubProfile::placeholder("42");
        assert_eq!(profile.display_name(), "user 42");
        assert!(profile.avatar_url.is_none());
    }
}
