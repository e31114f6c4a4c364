use reqwest::Client;
use serde_json::Value;

/// Registry data recovered for an entity name, merged additively into the
/// synthetic profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRecord {
    pub registration_number: Option<String>,
    pub jurisdiction: Option<String>,
    pub source: String,
}

/// Outbound client for the open registry and screening endpoints.
///
/// Strictly optional glue: every caller treats a miss or an error as "no
/// registry data" and proceeds on the synthetic path.
pub struct RegistryClient {
    client: Client,
    lei_url: String,
    screening_url: String,
    api_key: Option<String>,
}

impl RegistryClient {
    pub fn new(lei_url: &str, screening_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            lei_url: lei_url.to_string(),
            screening_url: screening_url.to_string(),
            api_key,
        }
    }

    /// Look up an entity in the GLEIF LEI database by legal name.
    /// `Ok(None)` is a clean miss; errors are transport/status faults.
    pub async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, EnrichError> {
        let resp = self
            .client
            .get(&self.lei_url)
            .query(&[("filter[entity.legalName]", name), ("page[size]", "1")])
            .send()
            .await
            .map_err(EnrichError::Http)?;

        if !resp.status().is_success() {
            return Err(EnrichError::Status(resp.status()));
        }

        let json: Value = resp.json().await.map_err(EnrichError::Http)?;
        let Some(record) = json["data"].get(0) else {
            return Ok(None);
        };
        let entity = &record["attributes"]["entity"];

        Ok(Some(RegistryRecord {
            registration_number: entity["registrationNumber"]
                .as_str()
                .map(|s| s.to_string()),
            jurisdiction: entity["jurisdiction"].as_str().map(|s| s.to_string()),
            source: "LEI Database".to_string(),
        }))
    }

    /// Check the consolidated screening list for a name match.
    pub async fn check_sanctions(&self, name: &str) -> Result<bool, EnrichError> {
        let mut request = self.client.get(&self.screening_url).query(&[("name", name)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let resp = request.send().await.map_err(EnrichError::Http)?;
        if !resp.status().is_success() {
            return Err(EnrichError::Status(resp.status()));
        }

        let json: Value = resp.json().await.map_err(EnrichError::Http)?;
        Ok(json["total"].as_u64().unwrap_or(0) > 0)
    }
}

#[derive(Debug)]
pub enum EnrichError {
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
}

impl std::fmt::Display for EnrichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichError::Http(e) => write!(f, "HTTP error: {e}"),
            EnrichError::Status(s) => write!(f, "unexpected status: {s}"),
        }
    }
}

impl std::error::Error for EnrichError {}
