use async_trait::async_trait;
use gregor_access_application::{AclEntry, AnvilAccessClient};
use gregor_access_core::{AppError, AppResult};
use gregor_access_domain::{GroupRole, Workspace};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const ERROR_BODY_LIMIT: usize = 500;

/// Base URLs of the two AnVIL services the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnvilApiEndpoints {
    /// Workspace service (ACL updates).
    pub rawls_url: String,
    /// Identity service (group membership).
    pub sam_url: String,
}

impl AnvilApiEndpoints {
    /// Creates endpoints, dropping trailing slashes.
    #[must_use]
    pub fn new(rawls_url: impl Into<String>, sam_url: impl Into<String>) -> Self {
        Self {
            rawls_url: rawls_url.into().trim_end_matches('/').to_owned(),
            sam_url: sam_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AclUpdateResponse {
    #[serde(default)]
    users_not_found: Value,
}

/// HTTP implementation of the remote access-control API.
#[derive(Clone)]
pub struct HttpAnvilAccessClient {
    http_client: reqwest::Client,
    endpoints: AnvilApiEndpoints,
    access_token: String,
}

impl HttpAnvilAccessClient {
    /// Creates a client authenticating with a bearer `access_token`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        endpoints: AnvilApiEndpoints,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoints,
            access_token: access_token.into(),
        }
    }

    fn group_member_url(&self, group_name: &str, role: GroupRole, member_email: &str) -> String {
        format!(
            "{}/api/groups/v1/{group_name}/{}/{member_email}",
            self.endpoints.sam_url,
            role.api_segment()
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> AppResult<String> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("failed to {operation}: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());

        if !status.is_success() {
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
                message: format!("failed to {operation}: {}", truncate(&body)),
            });
        }

        debug!(status = status.as_u16(), operation = operation, "AnVIL API call succeeded");
        Ok(body)
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}

fn has_entries(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl AnvilAccessClient for HttpAnvilAccessClient {
    async fn update_workspace_acl(
        &self,
        workspace: &Workspace,
        entries: &[AclEntry],
    ) -> AppResult<()> {
        let url = format!(
            "{}/api/workspaces/{}/{}/acl?inviteUsersNotFound=false",
            self.endpoints.rawls_url,
            workspace.billing_project(),
            workspace.name()
        );
        let operation = format!("update acl of workspace '{}'", workspace.full_name());
        let body = self
            .send(self.http_client.patch(url).json(entries), &operation)
            .await?;

        let response: AclUpdateResponse = serde_json::from_str(&body).map_err(|error| {
            AppError::Internal(format!("failed to parse acl update response: {error}"))
        })?;
        if has_entries(&response.users_not_found) {
            return Err(AppError::RemoteApi {
                status: 200,
                message: format!(
                    "users not found when updating acl of workspace '{}': {}",
                    workspace.full_name(),
                    response.users_not_found
                ),
            });
        }

        Ok(())
    }

    async fn add_group_member(
        &self,
        group_name: &str,
        role: GroupRole,
        member_email: &str,
    ) -> AppResult<()> {
        let url = self.group_member_url(group_name, role, member_email);
        self.send(
            self.http_client.put(url),
            &format!("add '{member_email}' to group '{group_name}'"),
        )
        .await
        .map(|_| ())
    }

    async fn remove_group_member(
        &self,
        group_name: &str,
        role: GroupRole,
        member_email: &str,
    ) -> AppResult<()> {
        let url = self.group_member_url(group_name, role, member_email);
        self.send(
            self.http_client.delete(url),
            &format!("remove '{member_email}' from group '{group_name}'"),
        )
        .await
        .map(|_| ())
    }
}
