//! `reqwest`-backed posts API client.
//!
//! # Responsibility
//! - Map the four post operations onto GET/POST/PUT/DELETE requests.
//! - Read the users collection for author names.
//! - Emit one diagnostic event per request with status and duration.
//!
//! # Invariants
//! - Single-item URLs are `{base_url}/{id}`.
//! - Non-success statuses surface as `ApiError::Status`, never as data.

use crate::api::wire::{decode_author_list, decode_post, decode_post_list};
use crate::api::{ApiError, ApiResult, PostsApi};
use crate::config::ClientConfig;
use crate::model::author::Author;
use crate::model::post::{NewPost, Post, PostId, PostRecord};
use async_trait::async_trait;
use log::{error, info};
use reqwest::{Client, Response, StatusCode};
use std::time::Instant;

/// HTTP client for a JSON posts collection.
#[derive(Debug, Clone)]
pub struct HttpPostsApi {
    client: Client,
    base_url: String,
    users_url: String,
}

impl HttpPostsApi {
    /// Builds a client using the configured base URL and timeout.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            users_url: config.users_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reads the users collection.
    pub async fn list_authors(&self) -> ApiResult<Vec<Author>> {
        let response = self
            .send("list_authors", self.client.get(&self.users_url))
            .await?;
        decode_author_list(&success_body(response).await?)
    }

    pub fn collection_url(&self) -> &str {
        &self.base_url
    }

    pub fn item_url(&self, id: PostId) -> String {
        format!("{}/{id}", self.base_url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<Response> {
        let started_at = Instant::now();
        match request.send().await {
            Ok(response) => {
                info!(
                    "event=api_request module=api operation={operation} status={} duration_ms={}",
                    response.status().as_u16(),
                    started_at.elapsed().as_millis()
                );
                Ok(response)
            }
            Err(err) => {
                error!(
                    "event=api_request module=api operation={operation} status=error duration_ms={} error_code=transport error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }
}

async fn success_body(response: Response) -> ApiResult<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    Ok(response.bytes().await?.to_vec())
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("unknown").to_string(),
    }
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self) -> ApiResult<Vec<PostRecord>> {
        let response = self
            .send("list", self.client.get(self.collection_url()))
            .await?;
        decode_post_list(&success_body(response).await?)
    }

    async fn create_post(&self, draft: &NewPost) -> ApiResult<PostRecord> {
        let response = self
            .send("create", self.client.post(self.collection_url()).json(draft))
            .await?;
        decode_post(&success_body(response).await?)
    }

    async fn update_post(&self, post: &Post) -> ApiResult<PostRecord> {
        let response = self
            .send("update", self.client.put(self.item_url(post.id)).json(post))
            .await?;
        decode_post(&success_body(response).await?)
    }

    async fn delete_post(&self, id: PostId) -> ApiResult<()> {
        let response = self
            .send("delete", self.client.delete(self.item_url(id)))
            .await?;
        if response.status() == StatusCode::OK {
            return Ok(());
        }
        Err(status_error(response.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::{status_error, HttpPostsApi};
    use crate::api::{ApiError, PostsApi};
    use crate::config::ClientConfig;
    use crate::model::post::{NewPost, PostId};
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serves one canned response on a local port; the handle yields the
    /// raw request that was received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let mut response = format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n");
            if !body.is_empty() {
                response.push_str(&format!(
                    "Content-Type: application/json\r\nContent-Length: {}\r\n",
                    body.len()
                ));
            }
            response.push_str("\r\n");
            response.push_str(body);
            // The client may hang up first once it has the status line.
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);
            if let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                if buf.len() >= end + 4 + content_length(&head) {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.trim().eq_ignore_ascii_case("content-length") {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0)
    }

    fn api_for(origin: &str) -> HttpPostsApi {
        let config = ClientConfig::default()
            .with_base_url(&format!("{origin}/posts"))
            .unwrap()
            .with_users_url(&format!("{origin}/users"))
            .unwrap();
        HttpPostsApi::new(&config).unwrap()
    }

    #[test]
    fn item_url_appends_id_segment() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:3000/posts/")
            .unwrap();
        let api = HttpPostsApi::new(&config).unwrap();
        assert_eq!(api.collection_url(), "http://localhost:3000/posts");
        assert_eq!(
            api.item_url(PostId::Remote(42)),
            "http://localhost:3000/posts/42"
        );
    }

    #[test]
    fn status_error_renders_code_and_reason() {
        let err = status_error(StatusCode::NO_CONTENT);
        assert!(matches!(err, ApiError::Status { status: 204, .. }));
        assert_eq!(err.to_string(), "204: No Content");
    }

    #[tokio::test]
    async fn delete_accepts_only_200() {
        let (origin, server) = serve_once("200 OK", "{}").await;
        api_for(&origin).delete_post(PostId::Remote(5)).await.unwrap();
        assert!(server.await.unwrap().starts_with("DELETE /posts/5 "));

        let (origin, server) = serve_once("204 No Content", "").await;
        let err = api_for(&origin)
            .delete_post(PostId::Remote(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 204, .. }));
        assert_eq!(err.to_string(), "204: No Content");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn list_maps_server_error_to_status() {
        let (origin, server) = serve_once("500 Internal Server Error", "oops").await;
        let err = api_for(&origin).list_posts().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "500: Internal Server Error");
        assert!(server.await.unwrap().starts_with("GET /posts "));
    }

    #[tokio::test]
    async fn list_rejects_malformed_json() {
        let (origin, server) = serve_once("200 OK", r#"[{"id":1,"title""#).await;
        let err = api_for(&origin).list_posts().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn create_posts_draft_and_coerces_echoed_author() {
        let (origin, server) = serve_once(
            "201 Created",
            r#"{"title":"T","body":"B","userId":"1","id":101}"#,
        )
        .await;
        let record = api_for(&origin)
            .create_post(&NewPost::new("T", "B", "1"))
            .await
            .unwrap();
        assert_eq!(record.id, Some(PostId::Remote(101)));
        assert_eq!(record.user_id, 1);
        assert_eq!(record.title, "T");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /posts "));
        assert!(request.contains(r#""userId":"1""#));
    }

    #[tokio::test]
    async fn list_authors_reads_users_collection() {
        let (origin, server) = serve_once(
            "200 OK",
            r#"[{"id":1,"name":"Leanne Graham","email":"x@y.z"},{"id":2,"name":"Ervin Howell"}]"#,
        )
        .await;
        let authors = api_for(&origin).list_authors().await.unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[1].name, "Ervin Howell");
        assert!(server.await.unwrap().starts_with("GET /users "));
    }
}
