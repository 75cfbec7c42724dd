//! XRPC client over reqwest.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{BskyError, Result};
use crate::types::{
    ApiErrorBody, BlobRef, CreateRecordRequest, CreateSessionRequest, PostRecord, RecordRef,
    Session, UploadBlobResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const POST_COLLECTION: &str = "app.bsky.feed.post";

pub struct BskyClient {
    http: reqwest::Client,
    service: String,
    session: Option<Session>,
}

impl BskyClient {
    /// Build a client against `service` (e.g. `https://bsky.social`).
    pub fn new(service: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            service: service.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(BskyError::NotLoggedIn)
    }

    /// The authenticated session, if `login` has succeeded.
    pub fn handle(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.handle.as_str())
    }

    /// Authenticate with an identifier + app password
    /// (`com.atproto.server.createSession`).
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await?;
        let session: Session = decode(response).await?;
        debug!(handle = %session.handle, did = %session.did, "bluesky session created");
        self.session = Some(session);
        Ok(())
    }

    /// Upload raw bytes as a blob (`com.atproto.repo.uploadBlob`), for use
    /// as a card thumbnail.
    pub async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<BlobRef> {
        let session = self.session()?;
        let response = self
            .http
            .post(self.endpoint("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadBlobResponse = decode(response).await?;
        Ok(uploaded.blob)
    }

    /// Publish a post to the session's repo
    /// (`com.atproto.repo.createRecord`).
    pub async fn post(&self, record: &PostRecord) -> Result<RecordRef> {
        let session = self.session()?;
        let response = self
            .http
            .post(self.endpoint("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&CreateRecordRequest {
                repo: &session.did,
                collection: POST_COLLECTION,
                record,
            })
            .send()
            .await?;
        let created: RecordRef = decode(response).await?;
        debug!(uri = %created.uri, "posted to bluesky");
        Ok(created)
    }
}

/// Decode a success body, or map an XRPC error body onto [`BskyError::Api`].
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody {
        error: String::new(),
        message: String::new(),
    });
    Err(api_error(status, body))
}

fn api_error(status: StatusCode, body: ApiErrorBody) -> BskyError {
    BskyError::Api {
        status: status.as_u16(),
        error: if body.error.is_empty() {
            "UnknownError".to_string()
        } else {
            body.error
        },
        message: body.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_BODY: &str = r#"{
        "accessJwt": "jwt-token",
        "refreshJwt": "refresh-token",
        "did": "did:plc:abc123",
        "handle": "alice.bsky.social"
    }"#;

    async fn logged_in(server: &mockito::ServerGuard) -> BskyClient {
        let mut client = BskyClient::new(&server.url()).unwrap();
        client.login("alice.bsky.social", "app-pass").await.unwrap();
        client
    }

    #[tokio::test]
    async fn login_stores_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/xrpc/com.atproto.server.createSession")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "identifier": "alice.bsky.social",
                "password": "app-pass",
            })))
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;

        let client = logged_in(&server).await;
        mock.assert_async().await;
        assert_eq!(client.handle(), Some("alice.bsky.social"));
    }

    #[tokio::test]
    async fn login_failure_surfaces_xrpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/xrpc/com.atproto.server.createSession")
            .with_status(401)
            .with_body(r#"{"error":"AuthenticationRequired","message":"Invalid identifier or password"}"#)
            .create_async()
            .await;

        let mut client = BskyClient::new(&server.url()).unwrap();
        let err = client.login("alice", "wrong").await.unwrap_err();
        match err {
            BskyError::Api { status, error, .. } => {
                assert_eq!(status, 401);
                assert_eq!(error, "AuthenticationRequired");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_requires_login() {
        let client = BskyClient::new("https://bsky.social").unwrap();
        let err = client.post(&PostRecord::new("hi")).await.unwrap_err();
        assert!(matches!(err, BskyError::NotLoggedIn));
    }

    #[tokio::test]
    async fn post_targets_session_repo() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/xrpc/com.atproto.server.createSession")
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;
        let record_mock = server
            .mock("POST", "/xrpc/com.atproto.repo.createRecord")
            .match_header("authorization", "Bearer jwt-token")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "repo": "did:plc:abc123",
                "collection": "app.bsky.feed.post",
            })))
            .with_status(200)
            .with_body(r#"{"uri":"at://did:plc:abc123/app.bsky.feed.post/xyz","cid":"bafypost"}"#)
            .create_async()
            .await;

        let client = logged_in(&server).await;
        let created = client.post(&PostRecord::new("hello")).await.unwrap();
        record_mock.assert_async().await;
        assert!(created.uri.ends_with("/xyz"));
    }

    #[tokio::test]
    async fn upload_blob_returns_blob_ref() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/xrpc/com.atproto.server.createSession")
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;
        server
            .mock("POST", "/xrpc/com.atproto.repo.uploadBlob")
            .match_header("content-type", "image/jpeg")
            .with_status(200)
            .with_body(
                r#"{"blob":{"$type":"blob","ref":{"$link":"bafyimg"},"mimeType":"image/jpeg","size":3}}"#,
            )
            .create_async()
            .await;

        let client = logged_in(&server).await;
        let blob = client.upload_blob(vec![1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(blob.blob_ref.link, "bafyimg");
        assert_eq!(blob.mime_type, "image/jpeg");
    }
}
