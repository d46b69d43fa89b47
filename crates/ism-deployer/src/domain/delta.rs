//! # Routing Delta
//!
//! The minimal change-set between a live routing module and its desired
//! config. An empty delta is the matcher's definition of "routing module
//! matches"; a non-empty one drives the reconciler's transaction plan.

use primitive_types::H256;
use serde::{Deserialize, Serialize};

/// Change-set for one live routing module.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDelta {
    /// Domains whose sub-module must be (re)bound: either not enrolled yet,
    /// or enrolled with a module that no longer matches its config.
    pub domains_to_enroll: Vec<u32>,
    /// Live enrollments absent from the desired config.
    pub domains_to_unenroll: Vec<u32>,
    /// Desired owner, set iff it differs from the live owner.
    pub owner: Option<H256>,
    /// Desired mailbox, set iff one was supplied and differs from the live
    /// one. Only possible for fallback routing; forces a full redeploy.
    pub mailbox: Option<H256>,
}

impl RoutingDelta {
    /// True when every field is empty: the live module already agrees with
    /// the desired config and reconciliation is a no-op.
    pub fn is_empty(&self) -> bool {
        self.domains_to_enroll.is_empty()
            && self.domains_to_unenroll.is_empty()
            && self.owner.is_none()
            && self.mailbox.is_none()
    }
}
