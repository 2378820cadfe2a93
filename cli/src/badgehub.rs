use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use ottrcal_core::badges::{BadgeBackend, UnlockOutcome};
use ottrcal_core::models::BadgeCriterion;

/// Unlock record as the badge service returns it.
#[derive(Debug, Deserialize)]
pub struct UnlockRecord {
    pub badge_id: String,
}

#[derive(Debug, Serialize)]
struct UnlockRequest<'a> {
    badge_id: &'a str,
}

/// HTTP client for the badge service: a read-only criterion catalogue
/// plus a per-user unlock-record store.
pub struct BadgeHubClient {
    client: reqwest::Client,
    base_url: String,
    rt: tokio::runtime::Handle,
}

impl BadgeHubClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "ottrcal-cli/{} (wellness tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rt: tokio::runtime::Handle::current(),
        }
    }

    pub async fn fetch_catalogue_async(&self) -> Result<Vec<BadgeCriterion>> {
        let url = format!("{}/badges", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach badge service")?;
        if !resp.status().is_success() {
            bail!("Badge catalogue request failed with status {}", resp.status());
        }
        resp.json()
            .await
            .context("Failed to parse badge catalogue response")
    }

    pub async fn fetch_unlocked_async(&self, user_id: &str) -> Result<HashSet<String>> {
        let url = format!("{}/users/{user_id}/unlocks", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach badge service")?;
        if !resp.status().is_success() {
            bail!("Unlock list request failed with status {}", resp.status());
        }
        let records: Vec<UnlockRecord> = resp
            .json()
            .await
            .context("Failed to parse unlock list response")?;
        Ok(records.into_iter().map(|r| r.badge_id).collect())
    }

    pub async fn insert_unlock_async(
        &self,
        user_id: &str,
        badge_id: &str,
    ) -> Result<UnlockOutcome> {
        let url = format!("{}/users/{user_id}/unlocks", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&UnlockRequest { badge_id })
            .send()
            .await
            .context("Failed to reach badge service")?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Ok(UnlockOutcome::AlreadyExists);
        }
        if !resp.status().is_success() {
            bail!("Unlock write failed with status {}", resp.status());
        }
        Ok(UnlockOutcome::Inserted)
    }
}

impl BadgeBackend for BadgeHubClient {
    fn fetch_catalogue(&self) -> Result<Vec<BadgeCriterion>> {
        self.rt.block_on(self.fetch_catalogue_async())
    }

    fn fetch_unlocked(&self, user_id: &str) -> Result<HashSet<String>> {
        self.rt.block_on(self.fetch_unlocked_async(user_id))
    }

    fn insert_unlock(&self, user_id: &str, badge_id: &str) -> Result<UnlockOutcome> {
        self.rt.block_on(self.insert_unlock_async(user_id, badge_id))
    }
}
