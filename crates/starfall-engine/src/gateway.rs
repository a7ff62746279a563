//! HTTP read gateway for the game contract.
//!
//! The gateway is a thin service in front of a chain node that exposes
//! the contract's view methods as JSON endpoints:
//!
//! | Method | Path | Contract call |
//! |--------|------|---------------|
//! | `POST` | `/bodies` | `bulkGetPlanetsDataByIds` |
//! | `POST` | `/artifacts` | `bulkGetArtifactsByIds` |
//! | `GET` | `/artifacts/{id}` | `getArtifactById` |
//! | `POST` | `/voyages` | `bulkGetArrivalsByIds` |
//!
//! Bulk requests carry `{"ids": [...]}`. A `409` or `422` answer means the
//! call reverted on chain; any other failure is a transport error.
//!
//! # Sync/Async Bridge
//!
//! [`GameContract`] is synchronous, but `reqwest` is async. Calls use
//! [`tokio::runtime::Handle::block_on`], so the contract must be used
//! from a blocking thread (the indexer runs under `spawn_blocking`).

use std::time::Duration;

use alloy_primitives::U256;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use starfall_chain::raw::{RawArtifactRecord, RawBodyRecord, RawVoyage};
use starfall_chain::{ContractError, GameContract};
use starfall_core::config::GatewayConfig;
use starfall_types::Address;
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::EngineError;

const BODIES: &str = "bulkGetPlanetsDataByIds";
const ARTIFACTS: &str = "bulkGetArtifactsByIds";
const ARTIFACT: &str = "getArtifactById";
const VOYAGES: &str = "bulkGetArrivalsByIds";

#[derive(Serialize)]
struct IdsRequest<'a, T> {
    ids: &'a [T],
}

/// [`GameContract`] backed by the HTTP read gateway.
pub struct GatewayContract {
    client: reqwest::Client,
    base_url: String,
    address: Address,
    handle: Handle,
}

impl GatewayContract {
    /// Create a gateway client for the contract at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Gateway`] if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, address: Address, handle: Handle) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EngineError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            address,
            handle,
        })
    }

    async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        call: &'static str,
        path: &str,
        ids: &[T],
    ) -> Result<R, ContractError> {
        let url = format!("{}{path}", self.base_url);
        debug!(call, url = url, ids = ids.len(), "Gateway read");
        let response = self
            .client
            .post(&url)
            .json(&IdsRequest { ids })
            .send()
            .await
            .map_err(|e| transport(call, &e))?;
        read_response(call, response).await
    }

    async fn get<R: DeserializeOwned>(&self, call: &'static str, path: &str) -> Result<R, ContractError> {
        let url = format!("{}{path}", self.base_url);
        debug!(call, url = url, "Gateway read");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(call, &e))?;
        read_response(call, response).await
    }
}

fn transport(call: &'static str, err: &reqwest::Error) -> ContractError {
    ContractError::Transport {
        call,
        message: err.to_string(),
    }
}

async fn read_response<R: DeserializeOwned>(
    call: &'static str,
    response: reqwest::Response,
) -> Result<R, ContractError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(classify_failure(call, status, body));
    }
    response.json().await.map_err(|e| ContractError::Transport {
        call,
        message: format!("response parse failed: {e}"),
    })
}

/// Map a non-success status to a contract error.
fn classify_failure(call: &'static str, status: StatusCode, body: String) -> ContractError {
    if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
        ContractError::Reverted { call, reason: body }
    } else {
        ContractError::Transport {
            call,
            message: format!("gateway returned {status}: {body}"),
        }
    }
}

impl GameContract for GatewayContract {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn bulk_get_bodies(&self, ids: &[U256]) -> Result<Vec<RawBodyRecord>, ContractError> {
        self.handle.block_on(self.post(BODIES, "/bodies", ids))
    }

    fn bulk_get_artifacts(&self, ids: &[U256]) -> Result<Vec<RawArtifactRecord>, ContractError> {
        self.handle.block_on(self.post(ARTIFACTS, "/artifacts", ids))
    }

    fn get_artifact(&self, id: &U256) -> Result<RawArtifactRecord, ContractError> {
        self.handle
            .block_on(self.get(ARTIFACT, &format!("/artifacts/{id:#x}")))
    }

    fn bulk_get_voyages(&self, ids: &[u64]) -> Result<Vec<RawVoyage>, ContractError> {
        self.handle.block_on(self.post(VOYAGES, "/voyages", ids))
    }
}
