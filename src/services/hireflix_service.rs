use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::models::interview::{Invitation, InviteRequest, Position};

#[async_trait]
pub trait InterviewProvider: Send + Sync {
    /// Open (non-archived) positions.
    async fn list_positions(&self) -> Result<Vec<Position>>;

    async fn invite_candidate(&self, request: &InviteRequest) -> Result<Invitation>;
}

const POSITIONS_QUERY: &str = "query { positions { id name archived } }";

const INVITE_MUTATION: &str = r#"
mutation Invite($positionId: String!, $externalId: String, $candidate: CandidateInputType!) {
  inviteCandidateToInterview(
    input: { positionId: $positionId, externalId: $externalId, candidate: $candidate }
  ) {
    __typename
    ... on InterviewType {
      id
      url { public short private }
    }
    ... on InterviewAlreadyExistsInPositionError {
      message
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PositionsData {
    #[serde(default)]
    positions: Vec<HireflixPosition>,
}

#[derive(Debug, Deserialize)]
struct HireflixPosition {
    id: String,
    name: Option<String>,
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteData {
    invite_candidate_to_interview: Option<InviteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum InviteResult {
    InterviewType {
        id: Option<String>,
        url: Option<InterviewUrls>,
    },
    InterviewAlreadyExistsInPositionError {
        message: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct InterviewUrls {
    public: Option<String>,
    short: Option<String>,
    private: Option<String>,
}

fn positions_from(data: PositionsData) -> Vec<Position> {
    data.positions
        .into_iter()
        .filter(|p| !p.archived)
        .map(|p| Position {
            title: p.name.unwrap_or_else(|| p.id.clone()),
            id: p.id,
        })
        .collect()
}

fn invitation_from(result: InviteResult) -> Invitation {
    match result {
        InviteResult::InterviewType { id, url } => {
            let url = url.unwrap_or_default();
            Invitation {
                id,
                interview_url: url.short.or(url.private).or(url.public),
                existing_candidate: false,
                message: None,
            }
        }
        InviteResult::InterviewAlreadyExistsInPositionError { message } => Invitation {
            id: None,
            interview_url: None,
            existing_candidate: true,
            message: Some(message.unwrap_or_else(|| {
                "You already have an interview for this position. Please check your email for the original invitation.".to_string()
            })),
        },
    }
}

/// GraphQL client for the Hireflix API. Without an API key every call answers
/// `Error::Unavailable`.
#[derive(Clone)]
pub struct HireflixService {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl HireflixService {
    pub fn new(api_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_some() {
            info!("Hireflix integration enabled, API URL: {}", api_url);
        } else {
            info!("Hireflix integration disabled (HIREFLIX_API_KEY not set)");
        }

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute<T>(&self, query: &str, variables: Option<JsonValue>) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::Unavailable(
                "Interview provider is not configured".to_string(),
            ));
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", api_key)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Hireflix request failed");
            return Err(Error::Upstream(format!("Hireflix returned {}", status)));
        }

        let payload: GraphQlResponse<T> = response.json().await?;
        if !payload.errors.is_empty() {
            let messages: Vec<String> = payload.errors.into_iter().map(|e| e.message).collect();
            error!(errors = ?messages, "Hireflix GraphQL errors");
            return Err(Error::Upstream(messages.join("; ")));
        }
        payload
            .data
            .ok_or_else(|| Error::Upstream("Hireflix response carried no data".to_string()))
    }
}

#[async_trait]
impl InterviewProvider for HireflixService {
    async fn list_positions(&self) -> Result<Vec<Position>> {
        let data: PositionsData = self.execute(POSITIONS_QUERY, None).await?;
        let positions = positions_from(data);
        info!(count = positions.len(), "fetched Hireflix positions");
        Ok(positions)
    }

    async fn invite_candidate(&self, request: &InviteRequest) -> Result<Invitation> {
        let variables = json!({
            "positionId": request.position_id,
            "externalId": request.external_id,
            "candidate": {
                "email": request.email,
                "firstName": request.first_name,
                "lastName": request.last_name,
            },
        });
        let data: InviteData = self.execute(INVITE_MUTATION, Some(variables)).await?;
        let result = data.invite_candidate_to_interview.ok_or_else(|| {
            Error::Upstream("Hireflix returned no invitation".to_string())
        })?;

        let invitation = invitation_from(result);
        if invitation.existing_candidate {
            warn!(position_id = %request.position_id, "candidate already invited to this position");
        } else {
            info!(interview_id = ?invitation.id, position_id = %request.position_id, "Hireflix invitation created");
        }
        Ok(invitation)
    }
}
