//! Authenticated session with the imagery service.
//!
//! [`BackendSession`] is the only place the pipeline talks HTTP. It
//! implements [`ImageryBackend`], the seam every downstream component
//! depends on, so tests can substitute a scripted backend without a
//! network.

use crate::io::catalog::{CatalogQuery, SceneCollection};
use crate::types::{GeoError, GeoResult, SceneReference};
use serde::Serialize;
use std::time::Duration;

/// External imagery service seam: scene search plus map rendering.
pub trait ImageryBackend {
    /// Execute a catalog search, returning the usable scenes.
    fn search_scenes(&self, query: &CatalogQuery) -> GeoResult<Vec<SceneReference>>;

    /// Render a styled map for one scene and return the encoded image bytes.
    fn fetch_map(&self, request: &RenderRequest) -> GeoResult<Vec<u8>>;
}

/// Body for `POST /map`
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    pub scene_id: String,

    /// Layer label the service uses when naming the output, e.g. "ndvi"
    pub label: String,

    #[serde(flatten)]
    pub operation: RenderOperation,

    /// GeoJSON geometry the output is clipped to
    pub region: serde_json::Value,

    /// Output size in pixels, square
    pub dimensions: u32,
}

/// What the service computes before styling the output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RenderOperation {
    /// Stretch three reflectance bands into an RGB composite
    Composite {
        bands: [String; 3],
        min: f64,
        max: f64,
    },
    /// Compute `(a - b) / (a + b)` and map it through a color ramp
    NormalizedDifference {
        band_a: String,
        band_b: String,
        min: f64,
        max: f64,
        palette: Vec<String>,
    },
}

/// Connection settings for [`BackendSession`]
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Service root, e.g. `https://imagery.example.net/v1`
    pub endpoint: String,
    /// Project identifier sent with every request, if the service needs one
    pub project: Option<String>,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        BackendConfig {
            endpoint: endpoint.into(),
            project: None,
            request_timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Read connection settings from `GEOINFORME_*` environment variables.
    ///
    /// `GEOINFORME_ENDPOINT` is required; `GEOINFORME_PROJECT` and
    /// `GEOINFORME_TIMEOUT_SECS` are optional.
    pub fn from_env() -> GeoResult<Self> {
        let endpoint = std::env::var("GEOINFORME_ENDPOINT").map_err(|_| {
            GeoError::BackendUnavailable("GEOINFORME_ENDPOINT is not set".to_string())
        })?;
        let mut config = BackendConfig::new(endpoint);
        if let Ok(project) = std::env::var("GEOINFORME_PROJECT") {
            config.project = Some(project);
        }
        if let Ok(value) = std::env::var("GEOINFORME_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => log::warn!("Ignoring unparseable GEOINFORME_TIMEOUT_SECS='{}'", value),
            }
        }
        Ok(config)
    }
}

/// Blocking HTTP session to the imagery service
pub struct BackendSession {
    client: reqwest::blocking::Client,
    config: BackendConfig,
}

impl BackendSession {
    /// Build the HTTP client and verify the service answers.
    pub fn connect(config: BackendConfig) -> GeoResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("geoinforme/0.1.0 (Satellite Report Generator)")
            .build()
            .map_err(|e| {
                GeoError::BackendUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        let session = BackendSession { client, config };
        session.probe()?;
        log::info!("Connected to imagery service at {}", session.config.endpoint);
        Ok(session)
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// One cheap round trip so authentication and connectivity problems
    /// surface before a run starts.
    fn probe(&self) -> GeoResult<()> {
        let mut request = self.client.get(&self.config.endpoint);
        if let Some(project) = &self.config.project {
            request = request.header("x-project", project.as_str());
        }
        let response = request
            .send()
            .map_err(|e| GeoError::BackendUnavailable(format!("Service probe failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(GeoError::BackendUnavailable(format!(
                "Service probe returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }

    fn post_with_retry<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> GeoResult<reqwest::blocking::Response> {
        let url = join_url(&self.config.endpoint, path);
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            log::debug!("POST {} attempt {} of {}", url, attempt, self.config.max_retries);

            let mut request = self.client.post(&url).json(body);
            if let Some(project) = &self.config.project {
                request = request.header("x-project", project.as_str());
            }

            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error = GeoError::BackendUnavailable(format!(
                        "HTTP {} {} from {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or(""),
                        url
                    ));
                    // Client errors will not improve on retry
                    if status.is_client_error() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    last_error =
                        Some(GeoError::BackendUnavailable(format!("HTTP request failed: {}", e)));
                }
            }

            if attempt < self.config.max_retries {
                log::warn!("Request attempt {} failed, retrying...", attempt);
                std::thread::sleep(Duration::from_secs(2));
            }
        }

        Err(last_error.unwrap_or_else(|| {
            GeoError::BackendUnavailable("Request failed after all retries".to_string())
        }))
    }
}

impl ImageryBackend for BackendSession {
    fn search_scenes(&self, query: &CatalogQuery) -> GeoResult<Vec<SceneReference>> {
        let response = self.post_with_retry("search", query)?;
        let collection: SceneCollection = response.json().map_err(|e| {
            GeoError::BackendUnavailable(format!("Malformed search response: {}", e))
        })?;
        log::debug!("Catalog returned {} features", collection.len());
        Ok(collection.scenes())
    }

    fn fetch_map(&self, request: &RenderRequest) -> GeoResult<Vec<u8>> {
        let response = self.post_with_retry("map", request)?;
        let bytes = response.bytes().map_err(|e| {
            GeoError::BackendUnavailable(format!("Failed to read map response body: {}", e))
        })?;
        Ok(bytes.to_vec())
    }
}

fn join_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BackendConfig::new("https://imagery.example.net/v1");
        assert_eq!(config.endpoint, "https://imagery.example.net/v1");
        assert!(config.project.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("https://imagery.example.net/v1/", "search"),
            "https://imagery.example.net/v1/search"
        );
        assert_eq!(
            join_url("https://imagery.example.net/v1", "map"),
            "https://imagery.example.net/v1/map"
        );
    }

    #[test]
    fn test_render_request_wire_shape() {
        let request = RenderRequest {
            scene_id: "S2B_TEST".to_string(),
            label: "ndvi".to_string(),
            operation: RenderOperation::NormalizedDifference {
                band_a: "B8".to_string(),
                band_b: "B4".to_string(),
                min: -0.2,
                max: 0.9,
                palette: vec!["FFFFFF".to_string(), "011301".to_string()],
            },
            region: serde_json::json!({"type": "Polygon", "coordinates": []}),
            dimensions: 512,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["scene_id"], "S2B_TEST");
        assert_eq!(json["operation"], "normalized_difference");
        assert_eq!(json["band_a"], "B8");
        assert_eq!(json["band_b"], "B4");
        assert_eq!(json["dimensions"], 512);
    }

    #[test]
    fn test_composite_wire_shape() {
        let request = RenderRequest {
            scene_id: "S2B_TEST".to_string(),
            label: "rgb".to_string(),
            operation: RenderOperation::Composite {
                bands: ["B4".to_string(), "B3".to_string(), "B2".to_string()],
                min: 0.0,
                max: 3000.0,
            },
            region: serde_json::json!({"type": "Polygon", "coordinates": []}),
            dimensions: 512,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["operation"], "composite");
        assert_eq!(json["bands"], serde_json::json!(["B4", "B3", "B2"]));
        assert_eq!(json["max"], 3000.0);
    }
}
