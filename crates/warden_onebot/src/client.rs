//! OneBot v11 HTTP action client.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::instrument;
use warden_core::{GroupId, GroupInfo, MemberInfo, MemberRole, PeerEndpoint, UserId};
use warden_error::{TransportError, TransportErrorKind};
use warden_interface::GroupTransport;

/// Envelope every OneBot action answers with.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    status: String,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberData {
    #[serde(default)]
    role: String,
    #[serde(default)]
    card: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroupData {
    #[serde(default)]
    group_name: String,
}

/// Acts as one bot peer through its OneBot v11 HTTP API.
#[derive(Debug, Clone)]
pub struct OneBotClient {
    endpoint: PeerEndpoint,
    client: reqwest::Client,
}

impl OneBotClient {
    /// Create a client for `endpoint`, applying its timeout.
    #[instrument(skip(endpoint), fields(peer = %endpoint.id(), api_base = %endpoint.api_base()))]
    pub fn new(endpoint: PeerEndpoint) -> Result<Self, TransportError> {
        tracing::debug!("Creating OneBot client");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*endpoint.timeout_secs()))
            .build()
            .map_err(|e| {
                TransportError::new(TransportErrorKind::Http(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;
        Ok(Self { endpoint, client })
    }

    /// Endpoint this client calls.
    pub fn endpoint(&self) -> &PeerEndpoint {
        &self.endpoint
    }

    /// Invoke `action` and return its `data` payload.
    #[instrument(skip(self, params), fields(peer = %self.endpoint.id()))]
    pub async fn call(&self, action: &str, params: Value) -> Result<Value, TransportError> {
        let url = format!("{}/{}", self.endpoint.api_base().trim_end_matches('/'), action);
        tracing::debug!("Calling {}", url);

        let mut req = self.client.post(&url).json(&params);
        if let Some(token) = self.endpoint.access_token() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            TransportError::new(TransportErrorKind::Http(format!("Request failed: {}", e)))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Peer returned HTTP error: {}", status);
            return Err(TransportError::new(TransportErrorKind::Http(format!(
                "{} returned {}",
                action, status
            ))));
        }

        let envelope: ActionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse response: {}", e);
            TransportError::new(TransportErrorKind::Deserialization(format!(
                "Failed to parse {} response: {}",
                action, e
            )))
        })?;

        if envelope.status != "ok" && envelope.status != "async" {
            let message = envelope
                .wording
                .or(envelope.message)
                .unwrap_or_default();
            tracing::error!(retcode = envelope.retcode, "Action failed: {}", message);
            return Err(TransportError::new(TransportErrorKind::Api {
                action: action.to_string(),
                retcode: envelope.retcode,
                message,
            }));
        }

        Ok(envelope.data)
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let data = self.call(action, params).await?;
        serde_json::from_value(data).map_err(|e| {
            TransportError::new(TransportErrorKind::Deserialization(format!(
                "Unexpected {} data: {}",
                action, e
            )))
        })
    }
}

#[async_trait]
impl GroupTransport for OneBotClient {
    #[instrument(
        skip(self, text),
        fields(peer = %self.endpoint.id(), group = %group, len = text.len())
    )]
    async fn send_group_message(&self, group: GroupId, text: &str) -> Result<(), TransportError> {
        self.call(
            "send_group_msg",
            json!({ "group_id": group.0, "message": text, "auto_escape": true }),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self), fields(peer = %self.endpoint.id(), group = %group, user = %user))]
    async fn kick_member(
        &self,
        group: GroupId,
        user: UserId,
        reject_add_request: bool,
    ) -> Result<(), TransportError> {
        self.call(
            "set_group_kick",
            json!({
                "group_id": group.0,
                "user_id": user.0,
                "reject_add_request": reject_add_request,
            }),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self, request_token), fields(peer = %self.endpoint.id()))]
    async fn reject_request(
        &self,
        request_token: &str,
        reason: &str,
    ) -> Result<(), TransportError> {
        self.call(
            "set_group_add_request",
            json!({
                "flag": request_token,
                "sub_type": "invite",
                "approve": false,
                "reason": reason,
            }),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self), fields(peer = %self.endpoint.id(), group = %group, user = %user))]
    async fn get_member_info(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<MemberInfo, TransportError> {
        let data: MemberData = self
            .call_as(
                "get_group_member_info",
                json!({ "group_id": group.0, "user_id": user.0, "no_cache": true }),
            )
            .await?;
        Ok(MemberInfo::new(
            MemberRole::parse(&data.role),
            data.card.unwrap_or_default(),
            data.nickname.unwrap_or_default(),
        ))
    }

    #[instrument(skip(self), fields(peer = %self.endpoint.id(), group = %group))]
    async fn get_group_info(&self, group: GroupId) -> Result<GroupInfo, TransportError> {
        let data: GroupData = self
            .call_as("get_group_info", json!({ "group_id": group.0 }))
            .await?;
        Ok(GroupInfo::new(data.group_name))
    }
}
