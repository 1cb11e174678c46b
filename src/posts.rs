//! Typed client for the `/posts` resource of a JSONPlaceholder-style API.

use crate::api::{ApiClient, ApiResult};
use crate::http::HttpTransport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

/// Partial update; unset fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

pub struct PostsApi<T> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> PostsApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub async fn all(&self) -> ApiResult<Vec<Post>, T> {
        let resp = self.client.get("/posts").await?;
        let posts: Vec<Post> = self.client.expect_json(&resp, 200)?;
        self.client
            .logger()
            .info(format!("Retrieved {} posts", posts.len()));
        Ok(posts)
    }

    pub async fn by_id(&self, id: u64) -> ApiResult<Post, T> {
        let resp = self.client.get(&format!("/posts/{}", id)).await?;
        self.client.expect_json(&resp, 200)
    }

    pub async fn by_user(&self, user_id: u64) -> ApiResult<Vec<Post>, T> {
        let resp = self
            .client
            .get_with_params("/posts", &[("userId", user_id.to_string())])
            .await?;
        self.client.expect_json(&resp, 200)
    }

    pub async fn create(&self, post: &NewPost) -> ApiResult<Post, T> {
        let resp = self.client.post("/posts", post).await?;
        self.client.expect_json(&resp, 201)
    }

    pub async fn update(&self, id: u64, post: &NewPost) -> ApiResult<Post, T> {
        let resp = self.client.put(&format!("/posts/{}", id), post).await?;
        self.client.expect_json(&resp, 200)
    }

    pub async fn patch(&self, id: u64, patch: &PostPatch) -> ApiResult<Post, T> {
        let resp = self.client.patch(&format!("/posts/{}", id), patch).await?;
        self.client.expect_json(&resp, 200)
    }

    pub async fn delete(&self, id: u64) -> ApiResult<(), T> {
        let resp = self.client.delete(&format!("/posts/{}", id)).await?;
        self.client.verify_status_code(&resp, 200)
    }
}
