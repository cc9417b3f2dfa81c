//! Volume attach/detach actions.

use super::{ApiClient, ApiResult};
use async_trait::async_trait;
use serde_json::json;

/// Attachment operations between volumes and servers.
#[async_trait]
pub trait VolumeActionService: Send + Sync {
    /// Attach a volume to a server.
    async fn attach(&self, volume_id: &str, server_id: i64) -> ApiResult<()>;
    /// Detach a volume from whatever server it is attached to.
    async fn detach(&self, volume_id: &str) -> ApiResult<()>;
}

/// [`VolumeActionService`] talking to the real API.
pub struct HttpVolumeActionService {
    client: ApiClient,
}

impl HttpVolumeActionService {
    /// Build the service on top of an [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VolumeActionService for HttpVolumeActionService {
    async fn attach(&self, volume_id: &str, server_id: i64) -> ApiResult<()> {
        let body = json!({ "volume_id": volume_id, "server_id": server_id });
        self.client.post_action("v2/volumes/attachments", &body).await
    }

    async fn detach(&self, volume_id: &str) -> ApiResult<()> {
        let body = json!({ "volume_id": volume_id });
        self.client
            .delete("v2/volumes/attachments", Some(body))
            .await
    }
}
