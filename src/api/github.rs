//! Best-effort lookup of GitHub profiles for question and score owners.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::models::{GithubProfile, ANONYMOUS_USER};

/// Read-only client for `GET {github}/user/{id}`.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self, super::ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("quiz-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.github_api_url.clone(),
        })
    }

    /// Fetch a profile; any failure degrades to a placeholder.
    pub async fn profile(&self, owner_id: &str) -> GithubProfile {
        match self.fetch(owner_id).await {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Error fetching GitHub user {}: {}", owner_id, e);
                GithubProfile::placeholder(owner_id)
            }
        }
    }

    async fn fetch(&self, owner_id: &str) -> Result<GithubProfile, reqwest::Error> {
        self.http
            .get(format!("{}/user/{}", self.base_url, owner_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Owner id -> profile cache shared by the leaderboard and detail views.
#[derive(Debug, Default)]
pub struct ProfileCache {
    profiles: HashMap<String, GithubProfile>,
    pending: HashSet<String>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids that still need a lookup; they are marked pending.
    pub fn claim_missing<'a, I>(&mut self, owner_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut claimed = Vec::new();
        for id in owner_ids {
            if id == ANONYMOUS_USER || id.is_empty() {
                continue;
            }
            if self.profiles.contains_key(id) || self.pending.contains(id) {
                continue;
            }
            self.pending.insert(id.to_string());
            claimed.push(id.to_string());
        }
        claimed
    }

    pub fn insert(&mut self, owner_id: String, profile: GithubProfile) {
        self.pending.remove(&owner_id);
        self.profiles.insert(owner_id, profile);
    }

    pub fn get(&self, owner_id: &str) -> Option<&GithubProfile> {
        self.profiles.get(owner_id)
    }

    /// Label shown in the "Authentication" column of a leaderboard.
    pub fn owner_label(&self, owner_id: &str) -> String {
        if owner_id == ANONYMOUS_USER {
            return "Anonymous".to_string();
        }
        match self.profiles.get(owner_id) {
            Some(profile) => format!("GitHub ({})", profile.login),
            None => "GitHub (Loading...)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_missing_skips_known_and_anonymous() {
        let mut cache = ProfileCache::new();
        let claimed = cache.claim_missing(["1", "anonymousUser", "2", "1"]);
        assert_eq!(claimed, vec!["1", "2"]);

        // pending ids are not claimed twice
        assert!(cache.claim_missing(["1", "2"]).is_empty());

        cache.insert(
            "1".to_string(),
            GithubProfile {
                login: "octocat".to_string(),
                ..GithubProfile::default()
            },
        );
        assert!(cache.claim_missing(["1"]).is_empty());
        assert_eq!(cache.owner_label("1"), "GitHub (octocat)");
        assert_eq!(cache.owner_label("2"), "GitHub (Loading...)");
        assert_eq!(cache.owner_label("anonymousUser"), "Anonymous");
    }
}
