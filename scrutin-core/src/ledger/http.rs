use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use scrutin_model::{
    CreatedElection, GatewayStatus, LedgerElectionId, LedgerReceipt, LedgerResults,
    PositionSummary,
};

use super::{LedgerClient, LedgerError, LedgerResult};

/// JSON client for the ledger gateway service that fronts the chain.
///
/// The gateway wraps every response in a `{success, error, ...}` envelope
/// and signals the two semantic conditions ("not completed yet", "already
/// completed") as error strings; those are pattern-matched here, once, so
/// the rest of the crate only ever sees typed [`LedgerError`] variants.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
    contract_ref: Option<String>,
}

impl fmt::Debug for HttpLedgerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpLedgerClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedElectionBody {
    election_id: i64,
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptBody {
    transaction_hash: String,
}

/// The contract reports results as parallel arrays, one entry per position.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultsBody {
    results: RawResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResults {
    positions: Vec<String>,
    winner_names: Vec<String>,
    winning_vote_counts: Vec<u64>,
    #[serde(default)]
    is_tied: Vec<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionsBody {
    positions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateBody {
    candidate: RawCandidate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    vote_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    contract_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateElectionRequest<'a> {
    title: &'a str,
    description: &'a str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeactivateRequest<'a> {
    addresses: &'a [String],
}

impl HttpLedgerClient {
    pub fn new(
        base_url: impl Into<String>,
        contract_ref: Option<String>,
        timeout: Duration,
    ) -> LedgerResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpLedgerClient {
            http,
            base_url,
            contract_ref,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unwraps the gateway's `{success, error, ...}` envelope, mapping
    /// `success: false` error strings to the typed taxonomy. The body fields
    /// sit beside the envelope fields, so the payload is decoded from the
    /// same object in a second step.
    async fn unwrap_envelope<T>(response: reqwest::Response) -> LedgerResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| LedgerError::Parse(format!("bad gateway response: {e}")))?;

        let success = value
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if success {
            return serde_json::from_value(value)
                .map_err(|e| LedgerError::Parse(format!("gateway response missing body: {e}")));
        }

        let message = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("gateway request failed with status {status}"));
        Err(classify_rejection(&message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> LedgerResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::unwrap_envelope(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> LedgerResult<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::unwrap_envelope(response).await
    }
}

/// Maps the gateway's error strings onto the semantic variants. The two
/// magic phrases come from the contract's revert reasons and are part of the
/// gateway's public behavior.
fn classify_rejection(message: &str) -> LedgerError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("not completed") {
        LedgerError::NotCompleted
    } else if lowered.contains("already completed") {
        LedgerError::AlreadyCompleted
    } else {
        LedgerError::Rejected(message.to_string())
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn create_election(
        &self,
        title: &str,
        description: &str,
        voting_start: DateTime<Utc>,
        voting_end: DateTime<Utc>,
    ) -> LedgerResult<CreatedElection> {
        let body: CreatedElectionBody = self
            .post_json(
                "/elections",
                &CreateElectionRequest {
                    title,
                    description,
                    start_time: voting_start,
                    end_time: voting_end,
                },
            )
            .await?;
        Ok(CreatedElection {
            ledger_election_id: LedgerElectionId(body.election_id),
            transaction_hash: body.transaction_hash,
        })
    }

    async fn complete_election(&self, election: LedgerElectionId) -> LedgerResult<LedgerReceipt> {
        let body: ReceiptBody = self
            .post_json(&format!("/elections/{election}/complete"), &())
            .await?;
        Ok(LedgerReceipt {
            transaction_hash: body.transaction_hash,
        })
    }

    async fn election_results(&self, election: LedgerElectionId) -> LedgerResult<LedgerResults> {
        let body: ResultsBody = self
            .get_json(&format!("/elections/{election}/results"))
            .await?;
        let raw = body.results;

        if raw.winner_names.len() != raw.positions.len()
            || raw.winning_vote_counts.len() != raw.positions.len()
        {
            return Err(LedgerError::Parse(
                "result arrays disagree on position count".into(),
            ));
        }

        let positions = raw
            .positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| PositionSummary {
                position,
                winner: raw.winner_names[i].clone(),
                winning_votes: raw.winning_vote_counts[i],
                tied: raw.is_tied.get(i).copied().unwrap_or(false),
            })
            .collect();
        Ok(LedgerResults { positions })
    }

    async fn positions(&self) -> LedgerResult<Vec<String>> {
        let body: PositionsBody = self.get_json("/positions").await?;
        Ok(body.positions)
    }

    async fn candidate_votes(
        &self,
        election: LedgerElectionId,
        candidate: i64,
    ) -> LedgerResult<u64> {
        let body: CandidateBody = self
            .get_json(&format!("/elections/{election}/candidates/{candidate}"))
            .await?;
        Ok(body.candidate.vote_count)
    }

    async fn deactivate_voters(&self, addresses: &[String]) -> LedgerResult<LedgerReceipt> {
        let body: ReceiptBody = self
            .post_json("/voters/deactivate", &DeactivateRequest { addresses })
            .await?;
        Ok(LedgerReceipt {
            transaction_hash: body.transaction_hash,
        })
    }

    async fn status(&self) -> GatewayStatus {
        match self.get_json::<StatusBody>("/status").await {
            Ok(body) => GatewayStatus {
                connected: body.connected,
                contract_ref: body.contract_address.or_else(|| self.contract_ref.clone()),
            },
            Err(e) => {
                warn!("Ledger gateway status probe failed: {e}");
                GatewayStatus {
                    connected: false,
                    contract_ref: self.contract_ref.clone(),
                }
            }
        }
    }
}
