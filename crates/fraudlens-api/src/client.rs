//! Dashboard HTTP client
//!
//! Typed wrappers over the transaction, stats, analysis, and report
//! endpoints. Shapes mirror the backend's response models; fields the
//! backend may omit are optional here rather than defaulted to fake data.

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use fraudlens_types::UserId;

use crate::cache::TtlCache;
use crate::{ApiError, ApiResult};

/// Rolling one-hour velocity features attached to each transaction
#[derive(Debug, Clone, Deserialize)]
pub struct VelocityWindow {
    pub num_transactions: u64,
    pub total_amount: f64,
    pub unique_merchants: u64,
}

/// Model output attached to a transaction when predictions are requested
#[derive(Debug, Clone, Deserialize)]
pub struct FraudPrediction {
    pub is_fraud: bool,
    pub probability: Option<f64>,
}

/// One transaction record from `GET /transactions/`
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    pub customer_id: String,
    pub card_number: String,
    // server-controlled format, naive ISO-8601 without an offset
    pub timestamp: String,
    pub merchant: String,
    pub merchant_category: String,
    pub merchant_type: String,
    pub amount: f64,
    pub currency: String,
    pub country: String,
    pub city: String,
    pub card_type: String,
    pub card_present: i64,
    pub device: String,
    pub channel: String,
    pub distance_from_home: i64,
    pub high_risk_merchant: bool,
    pub transaction_hour: i64,
    pub weekend_transaction: bool,
    pub velocity_last_hour: Option<VelocityWindow>,
    #[serde(default)]
    pub prediction: Option<FraudPrediction>,
}

/// One page of transaction records
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub records: Vec<TransactionRecord>,
    pub limit: u64,
    pub skip: u64,
}

/// Aggregate dashboard stats from `GET /stats/overview`
#[derive(Debug, Clone, Deserialize)]
pub struct StatsOverview {
    #[serde(flatten)]
    pub sections: serde_json::Map<String, serde_json::Value>,
}

/// Report metadata from the report endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// HTTP client for the dashboard collaborators
pub struct DashboardClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
    stats_cache: TtlCache<String, serde_json::Value>,
}

impl DashboardClient {
    /// Create a client against a backend base URL with a bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
            stats_cache: TtlCache::dashboard(),
        }
    }

    /// One page of transactions with fraud predictions included
    pub async fn transactions(&self, limit: u64, skip: u64) -> ApiResult<TransactionPage> {
        let url = format!(
            "{}/transactions/?include_predictions=true&limit={}&skip={}",
            self.base_url, limit, skip
        );
        debug!(%url, "fetching transactions page");
        let records = self.get_json::<Vec<TransactionRecord>>(&url).await?;
        Ok(TransactionPage {
            records,
            limit,
            skip,
        })
    }

    /// Total transaction count, cached for the dashboard TTL
    pub async fn transaction_count(&self) -> ApiResult<u64> {
        let url = format!("{}/transactions/count", self.base_url);
        if let Some(cached) = self.stats_cache.get(&url, Utc::now()) {
            if let Some(count) = cached.as_u64() {
                return Ok(count);
            }
        }
        let value = self.get_json::<serde_json::Value>(&url).await?;
        let count = value
            .as_u64()
            .or_else(|| value.get("count").and_then(|c| c.as_u64()))
            .ok_or_else(|| ApiError::Decode("count is not an integer".to_string()))?;
        self.stats_cache
            .put(url, serde_json::json!(count), Utc::now());
        Ok(count)
    }

    /// Aggregate stats overview, cached for the dashboard TTL
    pub async fn stats_overview(&self) -> ApiResult<StatsOverview> {
        let url = format!("{}/stats/overview", self.base_url);
        if let Some(cached) = self.stats_cache.get(&url, Utc::now()) {
            return serde_json::from_value(cached)
                .map_err(|e| ApiError::Decode(e.to_string()));
        }
        let value = self.get_json::<serde_json::Value>(&url).await?;
        self.stats_cache.put(url, value.clone(), Utc::now());
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Request an on-demand fraud analysis of one transaction
    pub async fn analyze_transaction(
        &self,
        user: UserId,
        transaction_id: &str,
    ) -> ApiResult<serde_json::Value> {
        let url = format!(
            "{}/transactions/analysis/{}?transaction_id={}",
            self.base_url, user, transaction_id
        );
        debug!(%url, "requesting fraud analysis");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Kick off report generation for a user
    pub async fn create_report(&self, user: UserId) -> ApiResult<ReportSummary> {
        let url = format!("{}/users/reports/{}", self.base_url, user);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch a generated report
    pub async fn report(&self, report_id: i64) -> ApiResult<ReportSummary> {
        let url = format!("{}/users/reports/{}", self.base_url, report_id);
        self.get_json(&url).await
    }

    /// Delete a generated report
    pub async fn delete_report(&self, report_id: i64) -> ApiResult<()> {
        let url = format!("{}/users/reports/{}", self.base_url, report_id);
        let resp = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_record_decodes_without_prediction() {
        let json = r#"{
            "customer_id": "C1", "card_number": "****1234",
            "timestamp": "2024-01-01T10:00:00Z",
            "merchant": "ACME", "merchant_category": "retail", "merchant_type": "pos",
            "amount": 120.5, "currency": "EUR", "country": "PT", "city": "Lisbon",
            "card_type": "credit", "card_present": 1, "device": "pos-terminal",
            "channel": "in_store", "distance_from_home": 3,
            "high_risk_merchant": false, "transaction_hour": 10,
            "weekend_transaction": false,
            "velocity_last_hour": {"num_transactions": 2, "total_amount": 200.0, "unique_merchants": 2}
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(record.prediction.is_none());
        assert_eq!(record.velocity_last_hour.unwrap().num_transactions, 2);
    }

    #[test]
    fn test_transaction_record_decodes_with_prediction() {
        let json = r#"{
            "customer_id": "C1", "card_number": "****1234",
            "timestamp": "2024-01-01T03:00:00Z",
            "merchant": "NightShop", "merchant_category": "retail", "merchant_type": "online",
            "amount": 900.0, "currency": "EUR", "country": "PT", "city": "Porto",
            "card_type": "credit", "card_present": 0, "device": "web",
            "channel": "online", "distance_from_home": 2000,
            "high_risk_merchant": true, "transaction_hour": 3,
            "weekend_transaction": true, "velocity_last_hour": null,
            "prediction": {"is_fraud": true, "probability": 0.93}
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        let prediction = record.prediction.unwrap();
        assert!(prediction.is_fraud);
        assert!(prediction.probability.unwrap() > 0.9);
    }

    #[test]
    fn test_stats_overview_keeps_open_shape() {
        let json = r#"{"countries": {"PT": 120}, "fraud_rate": 0.011}"#;
        let overview: StatsOverview = serde_json::from_str(json).unwrap();
        assert!(overview.sections.contains_key("countries"));
        assert!(overview.sections.contains_key("fraud_rate"));
    }
}
