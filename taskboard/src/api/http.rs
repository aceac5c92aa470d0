//! REST client for the `Taskboard` backend.
//!
//! Wraps a [`reqwest::Client`] and attaches the session's bearer token to
//! every request. A 401 response clears the stored token so the next
//! start asks for credentials again.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use taskboard_proto::ApiMessage;
use taskboard_proto::auth::{AuthResponse, Credentials, Registration};
use taskboard_proto::board::{Board, BoardForm};
use taskboard_proto::comment::{Comment, CommentForm};
use taskboard_proto::id::{BoardId, CommentId, OrganizationId, ProjectId, TaskId, UserId};
use taskboard_proto::organization::{Invite, Organization};
use taskboard_proto::project::{Project, ProjectForm, ProjectRole};
use taskboard_proto::task::{Task, TaskForm, TaskList, TaskStatus};
use taskboard_proto::user::User;

use super::{ApiError, BoardApi};
use crate::session::TokenProvider;

/// Normalizes a configured base URL so it ends in exactly one `/api`.
///
/// Trailing slashes are dropped, `/api` is appended when missing, and an
/// accidental `/api/api` collapses to `/api`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUrl`] if the result is not an absolute URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let mut base = raw.trim().trim_end_matches('/').to_string();
    if base.ends_with("/api/api") {
        base.truncate(base.len() - "/api".len());
    } else if !base.ends_with("/api") {
        base.push_str("/api");
    }
    Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    Ok(base)
}

/// Maps a transport-level reqwest failure onto [`ApiError`].
fn map_reqwest(error: &reqwest::Error) -> ApiError {
    if error.is_decode() {
        ApiError::Decode(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

/// Builds the multipart body the task endpoints expect.
fn task_multipart(form: TaskForm) -> Form {
    let mut multipart = Form::new();
    for (name, value) in form.text_fields() {
        multipart = multipart.text(name, value);
    }
    if let Some(attachment) = form.attachment {
        multipart = multipart.part(
            "attachment",
            Part::bytes(attachment.bytes).file_name(attachment.file_name),
        );
    }
    multipart
}

/// HTTP implementation of [`BoardApi`] plus the account, project
/// administration, comment and organization endpoints.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpApi {
    /// Creates a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for a malformed base URL, or
    /// [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| map_reqwest(&e))?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// The normalized base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match self.tokens.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and turns non-success statuses into errors.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| map_reqwest(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("backend rejected session token, clearing it");
            self.tokens.clear();
            return Err(ApiError::Unauthorized);
        }
        let message = response
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|body| body.msg);
        tracing::debug!(status = status.as_u16(), ?message, "request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.execute(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn discard(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute(builder).await.map(drop)
    }

    // --- auth ---

    /// Signs in and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails. A token that cannot be
    /// persisted is logged; the session still works for this run.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .fetch(self.request(Method::POST, "/auth/login").json(credentials))
            .await?;
        self.keep_token(&response.token);
        Ok(response.user)
    }

    /// Creates an account and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .fetch(
                self.request(Method::POST, "/auth/register")
                    .json(registration),
            )
            .await?;
        self.keep_token(&response.token);
        Ok(response.user)
    }

    /// Returns the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is missing or stale.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.fetch(self.request(Method::GET, "/auth/me")).await
    }

    /// Forgets the stored token.
    pub fn logout(&self) {
        self.tokens.clear();
    }

    fn keep_token(&self, token: &str) {
        if let Err(e) = self.tokens.store(token) {
            tracing::warn!(error = %e, "could not persist session token");
        }
    }

    // --- projects ---

    /// `POST /projects`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create_project(&self, form: &ProjectForm) -> Result<Project, ApiError> {
        self.fetch(self.request(Method::POST, "/projects").json(form))
            .await
    }

    /// `PUT /projects/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update_project(
        &self,
        project: &ProjectId,
        form: &ProjectForm,
    ) -> Result<Project, ApiError> {
        self.fetch(
            self.request(Method::PUT, &format!("/projects/{project}"))
                .json(form),
        )
        .await
    }

    /// `DELETE /projects/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete_project(&self, project: &ProjectId) -> Result<(), ApiError> {
        self.discard(self.request(Method::DELETE, &format!("/projects/{project}")))
            .await
    }

    /// `POST /projects/{id}/members`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn add_member(&self, project: &ProjectId, user: &UserId) -> Result<(), ApiError> {
        self.discard(
            self.request(Method::POST, &format!("/projects/{project}/members"))
                .json(&serde_json::json!({ "userId": user })),
        )
        .await
    }

    /// `DELETE /projects/{id}/members/{user}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn remove_member(&self, project: &ProjectId, user: &UserId) -> Result<(), ApiError> {
        self.discard(self.request(
            Method::DELETE,
            &format!("/projects/{project}/members/{user}"),
        ))
        .await
    }

    /// `PUT /projects/{id}/members/{user}/role`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update_member_role(
        &self,
        project: &ProjectId,
        user: &UserId,
        role: &ProjectRole,
    ) -> Result<(), ApiError> {
        self.discard(
            self.request(
                Method::PUT,
                &format!("/projects/{project}/members/{user}/role"),
            )
            .json(&serde_json::json!({ "role": role })),
        )
        .await
    }

    // --- tasks ---

    /// `PATCH /tasks/{id}/status`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update_status(&self, task: &TaskId, status: &TaskStatus) -> Result<Task, ApiError> {
        self.fetch(
            self.request(Method::PATCH, &format!("/tasks/{task}/status"))
                .json(&serde_json::json!({ "status": status })),
        )
        .await
    }

    // --- comments ---

    /// `GET /comments/task/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list_comments(&self, task: &TaskId) -> Result<Vec<Comment>, ApiError> {
        self.fetch(self.request(Method::GET, &format!("/comments/task/{task}")))
            .await
    }

    /// `POST /comments/task/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create_comment(&self, task: &TaskId, text: &str) -> Result<Comment, ApiError> {
        let form = CommentForm {
            text: text.to_string(),
        };
        self.fetch(
            self.request(Method::POST, &format!("/comments/task/{task}"))
                .json(&form),
        )
        .await
    }

    /// `PUT /comments/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update_comment(
        &self,
        comment: &CommentId,
        text: &str,
    ) -> Result<Comment, ApiError> {
        let form = CommentForm {
            text: text.to_string(),
        };
        self.fetch(
            self.request(Method::PUT, &format!("/comments/{comment}"))
                .json(&form),
        )
        .await
    }

    /// `DELETE /comments/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete_comment(&self, comment: &CommentId) -> Result<(), ApiError> {
        self.discard(self.request(Method::DELETE, &format!("/comments/{comment}")))
            .await
    }

    // --- organization ---

    /// `GET /organizations/me`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn my_organization(&self) -> Result<Organization, ApiError> {
        self.fetch(self.request(Method::GET, "/organizations/me"))
            .await
    }

    /// `GET /organizations/users`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn organization_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch(self.request(Method::GET, "/organizations/users"))
            .await
    }

    /// `POST /organizations/invite`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn invite(&self, email: &str) -> Result<(), ApiError> {
        let invite = Invite {
            email: email.to_string(),
        };
        self.discard(
            self.request(Method::POST, "/organizations/invite")
                .json(&invite),
        )
        .await
    }

    /// `DELETE /organizations/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete_organization(&self, organization: &OrganizationId) -> Result<(), ApiError> {
        self.discard(self.request(
            Method::DELETE,
            &format!("/organizations/{organization}"),
        ))
        .await
    }
}

impl BoardApi for HttpApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch(self.request(Method::GET, "/projects")).await
    }

    async fn get_project(&self, project: &ProjectId) -> Result<Project, ApiError> {
        self.fetch(self.request(Method::GET, &format!("/projects/{project}")))
            .await
    }

    async fn list_boards(&self, project: &ProjectId) -> Result<Vec<Board>, ApiError> {
        self.fetch(self.request(Method::GET, &format!("/boards/project/{project}")))
            .await
    }

    async fn list_tasks(&self, board: &BoardId) -> Result<Vec<Task>, ApiError> {
        let list: TaskList = self
            .fetch(self.request(Method::GET, &format!("/tasks/board/{board}")))
            .await?;
        Ok(list.into_vec())
    }

    async fn create_board(&self, form: &BoardForm) -> Result<Board, ApiError> {
        self.fetch(self.request(Method::POST, "/boards").json(form))
            .await
    }

    async fn update_board(&self, board: &BoardId, form: &BoardForm) -> Result<Board, ApiError> {
        self.fetch(
            self.request(Method::PUT, &format!("/boards/{board}"))
                .json(form),
        )
        .await
    }

    async fn delete_board(&self, board: &BoardId) -> Result<(), ApiError> {
        self.discard(self.request(Method::DELETE, &format!("/boards/{board}")))
            .await
    }

    async fn create_task(&self, form: TaskForm) -> Result<Task, ApiError> {
        self.fetch(
            self.request(Method::POST, "/tasks")
                .multipart(task_multipart(form)),
        )
        .await
    }

    async fn update_task(&self, task: &TaskId, form: TaskForm) -> Result<Task, ApiError> {
        self.fetch(
            self.request(Method::PUT, &format!("/tasks/{task}"))
                .multipart(task_multipart(form)),
        )
        .await
    }

    async fn delete_task(&self, task: &TaskId) -> Result<(), ApiError> {
        self.discard(self.request(Method::DELETE, &format!("/tasks/{task}")))
            .await
    }
}
