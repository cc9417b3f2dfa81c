//! Block storage volume service.

use super::paginate::{paginate, Links, Page};
use super::{ApiClient, ApiResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block storage volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    /// Opaque volume id
    pub id: String,
    /// Volume name
    pub name: String,
    /// Region slug the volume lives in
    pub region: String,
    /// Size in gigabytes
    pub size_gb: i64,
    /// Free-form description
    pub description: String,
    /// Server the volume is attached to, if any
    #[serde(default)]
    pub server_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a volume.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeCreateRequest {
    /// Name of the new volume
    pub name: String,
    /// Region slug
    pub region: String,
    /// Free-form description
    pub description: String,
    /// Size in gigabytes
    pub size_gb: i64,
}

#[derive(Debug, Deserialize)]
struct VolumesEnvelope {
    volumes: Vec<Volume>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct VolumeEnvelope {
    volume: Volume,
}

/// Operations on the volume resource.
#[async_trait]
pub trait VolumeService: Send + Sync {
    /// All volumes, optionally filtered by region, across every page.
    async fn list(&self, region: &str) -> ApiResult<Vec<Volume>>;
    /// One volume by id.
    async fn get(&self, id: &str) -> ApiResult<Volume>;
    /// Create a volume.
    async fn create(&self, req: &VolumeCreateRequest) -> ApiResult<Volume>;
    /// Delete a volume by id.
    async fn delete(&self, id: &str) -> ApiResult<()>;
}

/// [`VolumeService`] talking to the real API.
pub struct HttpVolumeService {
    client: ApiClient,
}

impl HttpVolumeService {
    /// Build the service on top of an [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VolumeService for HttpVolumeService {
    async fn list(&self, region: &str) -> ApiResult<Vec<Volume>> {
        let client = &self.client;
        paginate(|token| async move {
            // The region filter rides on the first request only; continuation
            // URLs already carry the full query.
            let envelope: VolumesEnvelope = match token {
                Some(url) => client.get_json(&url).await?,
                None if region.is_empty() => client.get_json("v2/volumes").await?,
                None => {
                    client
                        .get_json_with_query("v2/volumes", &[("region", region)])
                        .await?
                }
            };
            Ok(Page { items: envelope.volumes, next: envelope.links.next_url() })
        })
        .await
    }

    async fn get(&self, id: &str) -> ApiResult<Volume> {
        let envelope: VolumeEnvelope = self.client.get_json(&format!("v2/volumes/{}", id)).await?;
        Ok(envelope.volume)
    }

    async fn create(&self, req: &VolumeCreateRequest) -> ApiResult<Volume> {
        let envelope: VolumeEnvelope = self.client.post_json("v2/volumes", req).await?;
        Ok(envelope.volume)
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&format!("v2/volumes/{}", id), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decodes_without_links() {
        let body = r#"{
            "volumes": [{
                "id": "vol-1", "name": "data", "region": "fra1", "size_gb": 100,
                "description": "db volume", "created_at": "2026-01-01T00:00:00Z"
            }]
        }"#;

        let envelope: VolumesEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.volumes.len(), 1);
        assert_eq!(envelope.volumes[0].size_gb, 100);
        assert!(envelope.volumes[0].server_id.is_none());
        assert!(envelope.links.next_url().is_none());
    }
}
