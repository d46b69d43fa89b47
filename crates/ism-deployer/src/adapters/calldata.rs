//! # Calldata Encoding
//!
//! Function selectors and argument encoding for every call this engine makes
//! against the deployed contract set. Exact compatibility with the on-chain
//! interfaces is mandatory; this file is the whole wire surface.
//!
//! Contract creations are rendered as the constructor argument blob only;
//! the executor implementation owns the module bytecode it prepends.

use crate::ports::outbound::{IsmQuery, ModuleInit, TxAction};
use primitive_types::H256;
use sha3::{Digest, Keccak256};

/// 4-byte function selector: leading bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// One ABI argument.
#[derive(Clone, Debug)]
pub enum AbiToken {
    /// `address`, right-aligned in a word.
    Address(H256),
    /// Any static unsigned integer width.
    Uint(u64),
    /// `bool`.
    Bool(bool),
    /// Dynamic `address[]`.
    AddressArray(Vec<H256>),
    /// Dynamic `uint32[]`.
    Uint32Array(Vec<u32>),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
}

impl AbiToken {
    fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Self::AddressArray(_) | Self::Uint32Array(_) | Self::Bytes(_)
        )
    }

    fn tail(&self) -> Vec<u8> {
        match self {
            Self::AddressArray(values) => {
                let mut out = uint_word(values.len() as u64).to_vec();
                for value in values {
                    out.extend_from_slice(value.as_bytes());
                }
                out
            }
            Self::Uint32Array(values) => {
                let mut out = uint_word(values.len() as u64).to_vec();
                for value in values {
                    out.extend_from_slice(&uint_word(u64::from(*value)));
                }
                out
            }
            Self::Bytes(data) => {
                let mut out = uint_word(data.len() as u64).to_vec();
                out.extend_from_slice(data);
                // Pad to a word boundary.
                let rem = data.len() % 32;
                if rem != 0 {
                    out.extend(std::iter::repeat(0u8).take(32 - rem));
                }
                out
            }
            _ => Vec::new(),
        }
    }

    fn head(&self, heads_len: usize, tail_offset: usize) -> [u8; 32] {
        match self {
            Self::Address(address) => *address.as_fixed_bytes(),
            Self::Uint(value) => uint_word(*value),
            Self::Bool(flag) => uint_word(u64::from(*flag)),
            _ => uint_word((heads_len + tail_offset) as u64),
        }
    }
}

fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// ABI-encode a token list (head/tail layout, no selector).
pub fn encode_tokens(tokens: &[AbiToken]) -> Vec<u8> {
    let heads_len = tokens.len() * 32;
    let mut heads = Vec::with_capacity(heads_len);
    let mut tails: Vec<u8> = Vec::new();
    for token in tokens {
        heads.extend_from_slice(&token.head(heads_len, tails.len()));
        if token.is_dynamic() {
            tails.extend_from_slice(&token.tail());
        }
    }
    heads.extend_from_slice(&tails);
    heads
}

/// Selector plus ABI-encoded arguments.
pub fn encode_call(signature: &str, tokens: &[AbiToken]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode_tokens(tokens));
    out
}

/// Calldata for a typed introspection read.
pub fn query_calldata(query: &IsmQuery) -> Vec<u8> {
    match query {
        IsmQuery::ModuleType => encode_call("moduleType()", &[]),
        IsmQuery::Owner => encode_call("owner()", &[]),
        IsmQuery::Paused => encode_call("paused()", &[]),
        IsmQuery::Mailbox => encode_call("mailbox()", &[]),
        IsmQuery::Domains => encode_call("domains()", &[]),
        IsmQuery::Module(domain) => {
            encode_call("module(uint32)", &[AbiToken::Uint(u64::from(*domain))])
        }
        // The aggregation read takes the message being verified; structural
        // introspection passes empty bytes.
        IsmQuery::ModulesAndThreshold => {
            encode_call("modulesAndThreshold(bytes)", &[AbiToken::Bytes(Vec::new())])
        }
    }
}

/// Calldata (or constructor blob, for creations) for a transaction intent.
pub fn action_calldata(action: &TxAction) -> Vec<u8> {
    match action {
        TxAction::Create(init) => init_blob(init),
        TxAction::FactoryDeploy {
            values, threshold, ..
        } => encode_call(
            "deploy(address[],uint8)",
            &[
                AbiToken::AddressArray(values.clone()),
                AbiToken::Uint(u64::from(*threshold)),
            ],
        ),
        TxAction::SetRoute { domain, module, .. } => encode_call(
            "set(uint32,address)",
            &[AbiToken::Uint(u64::from(*domain)), AbiToken::Address(*module)],
        ),
        TxAction::RemoveRoute { domain, .. } => {
            encode_call("remove(uint32)", &[AbiToken::Uint(u64::from(*domain))])
        }
        TxAction::TransferOwnership { new_owner, .. } => {
            encode_call("transferOwnership(address)", &[AbiToken::Address(*new_owner)])
        }
    }
}

fn init_blob(init: &ModuleInit) -> Vec<u8> {
    match init {
        ModuleInit::Routing {
            owner,
            domains,
            modules,
        } => encode_tokens(&[
            AbiToken::Address(*owner),
            AbiToken::Uint32Array(domains.clone()),
            AbiToken::AddressArray(modules.clone()),
        ]),
        ModuleInit::FallbackRouting {
            owner,
            mailbox,
            domains,
            modules,
        } => encode_tokens(&[
            AbiToken::Address(*owner),
            AbiToken::Address(*mailbox),
            AbiToken::Uint32Array(domains.clone()),
            AbiToken::AddressArray(modules.clone()),
        ]),
        ModuleInit::OpStack { native_bridge } => {
            encode_tokens(&[AbiToken::Address(*native_bridge)])
        }
        ModuleInit::Test => Vec::new(),
        ModuleInit::Pausable { owner } => encode_tokens(&[AbiToken::Address(*owner)]),
    }
}
