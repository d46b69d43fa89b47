//! # Inbound Ports
//!
//! The engine's public surface: deploy a config tree, test a deployed module
//! against a config, compute a routing change-set.

use crate::domain::{IsmConfig, IsmResult, RoutingDelta};
use async_trait::async_trait;
use primitive_types::H256;

/// One top-level deployment or reconciliation request.
#[derive(Clone, Debug)]
pub struct DeployRequest {
    /// Chain the module tree verifies messages on.
    pub destination_chain: String,
    /// Desired module tree.
    pub config: IsmConfig,
    /// Origin chain this tree position verifies, when deployed as a routing
    /// sub-module. Scopes the deployment cache.
    pub origin_chain: Option<String>,
    /// Mailbox address, required by fallback routing configs.
    pub mailbox: Option<H256>,
    /// Existing routing module to reconcile in place instead of redeploying.
    pub existing_module: Option<H256>,
}

impl DeployRequest {
    /// Request a fresh deployment of `config` on `destination_chain`.
    pub fn new(destination_chain: impl Into<String>, config: IsmConfig) -> Self {
        Self {
            destination_chain: destination_chain.into(),
            config,
            origin_chain: None,
            mailbox: None,
            existing_module: None,
        }
    }

    /// Attach a mailbox address.
    pub fn with_mailbox(mut self, mailbox: H256) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Reconcile against an existing module instead of redeploying blindly.
    pub fn with_existing(mut self, existing: H256) -> Self {
        self.existing_module = Some(existing);
        self
    }
}

/// ISM deployment API - inbound port.
#[async_trait]
pub trait IsmModuleApi: Send + Sync {
    /// Deploy or reconcile a module tree; returns the root module address.
    async fn deploy(&self, request: DeployRequest) -> IsmResult<H256>;

    /// Structural equivalence between a deployed module and a config.
    ///
    /// Total: never fails for a well-formed config; read failures are `false`.
    async fn module_matches_config(
        &self,
        chain: &str,
        address: H256,
        config: &IsmConfig,
        mailbox: Option<H256>,
    ) -> bool;

    /// Minimal change-set between a live routing module and its config.
    async fn routing_module_delta(
        &self,
        chain: &str,
        address: H256,
        config: &IsmConfig,
        mailbox: Option<H256>,
    ) -> IsmResult<RoutingDelta>;
}
