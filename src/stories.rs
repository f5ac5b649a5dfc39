//! Typed calls for the story endpoints.

use crate::client::{ApiClient, ApiResponse};
use crate::error::Result;
use crate::models::StoryPayload;

pub const CREATE_PATH: &str = "/api/Story/Create";
pub const LIST_PATH: &str = "/api/Story/All";
pub const EDIT_PATH: &str = "/api/Story/Edit";
pub const DELETE_PATH: &str = "/api/Story/Delete";

pub struct StoryApi {
    client: ApiClient,
}

impl StoryApi {
    pub fn new(client: ApiClient) -> Self {
        StoryApi { client }
    }

    pub async fn create(&self, story: &StoryPayload) -> Result<ApiResponse> {
        self.client.post_json(CREATE_PATH, story).await
    }

    pub async fn list(&self) -> Result<ApiResponse> {
        self.client.get(LIST_PATH).await
    }

    pub async fn edit(&self, id: &str, story: &StoryPayload) -> Result<ApiResponse> {
        self.client.put_json(&format!("{}/{}", EDIT_PATH, id), story).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse> {
        self.client.delete(&format!("{}/{}", DELETE_PATH, id)).await
    }

    /// Releases the underlying connection pool.
    pub fn close(self) {
        drop(self.client);
    }
}
