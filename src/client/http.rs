use crate::client::config::ClientConfig;
use crate::client::error::{ClientError, ClientResult};
use crate::client::remote::{PostInsertStream, Remote};
use crate::client::sse::{SseDecoder, SseEvent};
use crate::client::types::{FeedQuery, NewPost, NewReply, Post, PostRow, Profile, Reply, SessionUser};
use crate::response::ApiResponse;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct LikeState {
    liked: bool,
}

#[derive(Debug, Deserialize)]
struct BookmarkState {
    bookmarked: bool,
}

#[derive(Debug, Deserialize)]
struct InsertEnvelope {
    record: PostRow,
}

/// [`Remote`] backed by the lulutong data service over HTTP.
pub struct HttpRemote {
    http: reqwest::Client,
    /// No overall timeout; the change feed stays open indefinitely.
    stream_http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    auth_tx: watch::Sender<Option<SessionUser>>,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;
        let (auth_tx, _) = watch::channel(None);

        Ok(Self {
            http,
            stream_http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            auth_tx,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(&ClientConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_session(&self, session: Option<(String, SessionUser)>) {
        let (token, user) = match session {
            Some((token, user)) => (Some(token), Some(user)),
            None => (None, None),
        };
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
        self.auth_tx.send_replace(user);
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> ClientResult<(StatusCode, Vec<u8>)> {
        let resp = self.authorized(req).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            tracing::warn!("{} from data service: {}", status, message);
            return Err(ClientError::remote(status.as_u16(), message));
        }
        Ok((status, body))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let (status, body) = self.execute(req).await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&body)?;
        let message = envelope.message.clone();
        envelope.into_data().ok_or_else(|| {
            ClientError::remote(
                status.as_u16(),
                message.unwrap_or_else(|| "empty response".to_string()),
            )
        })
    }

    /// Like [`send`](Self::send), with 404 mapped to `None`.
    async fn send_optional<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<Option<T>> {
        match self.send(req).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send_unit(&self, req: RequestBuilder) -> ClientResult<()> {
        self.execute(req).await.map(|_| ())
    }

    async fn session_request(&self, path: &str, email: &str, password: &str) -> ClientResult<SessionUser> {
        let body: SessionBody = self
            .send(
                self.http
                    .post(self.url(path))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let user = body.user.clone();
        self.set_session(Some((body.token, body.user)));
        Ok(user)
    }
}

fn decode_insert(event: SseEvent) -> Option<ClientResult<PostRow>> {
    match event.event.as_deref() {
        None | Some("INSERT") => {}
        Some(_) => return None,
    }
    Some(
        serde_json::from_str::<InsertEnvelope>(&event.data)
            .map(|envelope| envelope.record)
            .map_err(ClientError::from),
    )
}

#[async_trait]
impl Remote for HttpRemote {
    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        self.session_request("/auth/signup", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        self.session_request("/auth/token", email, password).await
    }

    async fn sign_out(&self) -> ClientResult<()> {
        // Tokens are stateless; forgetting ours is the whole sign-out.
        self.set_session(None);
        Ok(())
    }

    async fn current_user(&self) -> ClientResult<Option<SessionUser>> {
        if self.token().is_none() {
            return Ok(None);
        }
        match self.send(self.http.get(self.url("/auth/user"))).await {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::Remote { status: 401, .. }) => {
                self.set_session(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn auth_changes(&self) -> watch::Receiver<Option<SessionUser>> {
        self.auth_tx.subscribe()
    }

    async fn feed(&self, query: &FeedQuery) -> ClientResult<Vec<Post>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = query.category.category() {
            params.push(("category", category.as_str().to_string()));
        }
        self.send(self.http.get(self.url("/posts")).query(&params))
            .await
    }

    async fn posts_by_ids(&self, ids: &[i32]) -> ClientResult<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.send(self.http.get(self.url("/posts")).query(&[("ids", ids)]))
            .await
    }

    async fn create_post(&self, post: &NewPost) -> ClientResult<PostRow> {
        self.send(self.http.post(self.url("/posts")).json(post)).await
    }

    async fn delete_post(&self, id: i32) -> ClientResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/posts/{id}"))))
            .await
    }

    async fn replies_for_post(&self, post_id: i32) -> ClientResult<Vec<Reply>> {
        self.send(self.http.get(self.url(&format!("/posts/{post_id}/replies"))))
            .await
    }

    async fn replies_by_user(
        &self,
        user_id: Uuid,
        include_private: bool,
    ) -> ClientResult<Vec<Reply>> {
        self.send(
            self.http
                .get(self.url(&format!("/users/{user_id}/replies")))
                .query(&[("include_private", include_private)]),
        )
        .await
    }

    async fn create_reply(&self, reply: &NewReply) -> ClientResult<Reply> {
        self.send(
            self.http
                .post(self.url(&format!("/posts/{}/replies", reply.post_id)))
                .json(reply),
        )
        .await
    }

    async fn delete_reply(&self, id: i32) -> ClientResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/replies/{id}"))))
            .await
    }

    async fn set_reply_visibility(&self, id: i32, is_public: bool) -> ClientResult<Reply> {
        self.send(
            self.http
                .put(self.url(&format!("/replies/{id}/visibility")))
                .json(&json!({ "is_public": is_public })),
        )
        .await
    }

    async fn profile(&self, id: Uuid) -> ClientResult<Option<Profile>> {
        self.send_optional(self.http.get(self.url(&format!("/profiles/{id}"))))
            .await
    }

    async fn profile_by_nickname(&self, nickname: &str) -> ClientResult<Option<Profile>> {
        let mut url = reqwest::Url::parse(&self.url("/profiles/by-nickname/"))
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Validation("invalid base url".to_string()))?
            .pop_if_empty()
            .push(nickname);
        self.send_optional(self.http.get(url)).await
    }

    async fn update_nickname(&self, _id: Uuid, nickname: &str) -> ClientResult<Profile> {
        self.send(
            self.http
                .put(self.url("/profiles/me"))
                .json(&json!({ "nickname": nickname })),
        )
        .await
    }

    async fn has_like(&self, post_id: i32, _user_id: Uuid) -> ClientResult<bool> {
        let state: LikeState = self
            .send(self.http.get(self.url(&format!("/posts/{post_id}/like"))))
            .await?;
        Ok(state.liked)
    }

    async fn add_like(&self, post_id: i32, _user_id: Uuid) -> ClientResult<()> {
        self.send_unit(self.http.put(self.url(&format!("/posts/{post_id}/like"))))
            .await
    }

    async fn remove_like(&self, post_id: i32, _user_id: Uuid) -> ClientResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/posts/{post_id}/like"))))
            .await
    }

    async fn has_bookmark(&self, post_id: i32, _user_id: Uuid) -> ClientResult<bool> {
        let state: BookmarkState = self
            .send(self.http.get(self.url(&format!("/posts/{post_id}/bookmark"))))
            .await?;
        Ok(state.bookmarked)
    }

    async fn add_bookmark(&self, post_id: i32, _user_id: Uuid) -> ClientResult<()> {
        self.send_unit(self.http.put(self.url(&format!("/posts/{post_id}/bookmark"))))
            .await
    }

    async fn remove_bookmark(&self, post_id: i32, _user_id: Uuid) -> ClientResult<()> {
        self.send_unit(
            self.http
                .delete(self.url(&format!("/posts/{post_id}/bookmark"))),
        )
        .await
    }

    async fn bookmarked_post_ids(&self, _user_id: Uuid) -> ClientResult<Vec<i32>> {
        self.send(self.http.get(self.url("/bookmarks"))).await
    }

    async fn subscribe_post_inserts(&self) -> ClientResult<PostInsertStream> {
        let resp = self
            .stream_http
            .get(self.url("/realtime/posts"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::remote(
                status.as_u16(),
                "realtime subscription rejected",
            ));
        }
        tracing::info!("Subscribed to post inserts");

        let bytes = Box::pin(resp.bytes_stream());
        let inserts = stream::unfold(
            (bytes, SseDecoder::new(), VecDeque::new()),
            |(mut bytes, mut decoder, mut pending)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (bytes, decoder, pending)));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(decoder.push(&chunk).into_iter().filter_map(decode_insert));
                        }
                        Some(Err(e)) => {
                            return Some((Err(ClientError::Http(e)), (bytes, decoder, pending)));
                        }
                        None => {
                            tracing::info!("Post insert stream closed by server");
                            return None;
                        }
                    }
                }
            },
        );

        Ok(inserts.boxed())
    }
}
