//! Server resource service.

use super::paginate::{paginate, Links, Page};
use super::{ApiClient, ApiResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compute server as the API represents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Numeric server id
    pub id: i64,
    /// Server name, unique per account but not enforced by the API
    pub name: String,
    /// Region slug
    pub region: String,
    /// Size slug
    pub size: String,
    /// Image slug the server was created from
    pub image: String,
    /// Lifecycle status (new, active, off, archive)
    pub status: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Image reference: numeric id or slug, serialized as whichever was given.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Reference by numeric image id
    Id(i64),
    /// Reference by image slug
    Slug(String),
}

impl ImageRef {
    /// Interpret a flag value: digits become an id, anything else a slug.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => ImageRef::Id(id),
            Err(_) => ImageRef::Slug(raw.to_string()),
        }
    }
}

/// Request body for creating one server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCreateRequest {
    /// Name of the new server
    pub name: String,
    /// Region slug
    pub region: String,
    /// Size slug
    pub size: String,
    /// Image id or slug
    pub image: ImageRef,
    /// SSH key ids or fingerprints to install
    pub ssh_keys: Vec<String>,
    /// Enable automated backups
    pub backups: bool,
    /// Enable IPv6
    pub ipv6: bool,
    /// Enable private networking
    pub private_networking: bool,
    /// Cloud-init user data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Volume ids to attach at boot
    pub volumes: Vec<String>,
    /// Ask the API to respond only once the server is active
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
struct ServersEnvelope {
    servers: Vec<Server>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct ServerEnvelope {
    server: Server,
}

/// Operations on the server resource.
#[async_trait]
pub trait ServerService: Send + Sync {
    /// All servers of the account, across every page.
    async fn list(&self) -> ApiResult<Vec<Server>>;
    /// One server by id.
    async fn get(&self, id: i64) -> ApiResult<Server>;
    /// Create a server.
    async fn create(&self, req: &ServerCreateRequest) -> ApiResult<Server>;
    /// Delete a server by id.
    async fn delete(&self, id: i64) -> ApiResult<()>;
}

/// [`ServerService`] talking to the real API.
pub struct HttpServerService {
    client: ApiClient,
}

impl HttpServerService {
    /// Build the service on top of an [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServerService for HttpServerService {
    async fn list(&self) -> ApiResult<Vec<Server>> {
        let client = &self.client;
        paginate(|token| async move {
            let envelope: ServersEnvelope = match token {
                Some(url) => client.get_json(&url).await?,
                None => client.get_json("v2/servers").await?,
            };
            Ok(Page { items: envelope.servers, next: envelope.links.next_url() })
        })
        .await
    }

    async fn get(&self, id: i64) -> ApiResult<Server> {
        let envelope: ServerEnvelope = self.client.get_json(&format!("v2/servers/{}", id)).await?;
        Ok(envelope.server)
    }

    async fn create(&self, req: &ServerCreateRequest) -> ApiResult<Server> {
        let envelope: ServerEnvelope = self.client.post_json("v2/servers", req).await?;
        Ok(envelope.server)
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&format!("v2/servers/{}", id), None).await
    }
}
