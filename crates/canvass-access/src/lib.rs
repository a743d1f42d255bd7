//! Canvass Access — the write-gating decision engine.
//!
//! Every mutation the mobile client attempts is checked here first:
//! account status, the static role policy, monitor GPS presence and a
//! per-identity rate window, in that order. The engine fails closed:
//! any collaborator fault resolves to a deny.

pub mod config;
pub mod decision;
pub mod policy;
pub mod service;

pub use config::AccessConfig;
pub use decision::{AccessRequest, Decision, DenyReason, Outcome};
pub use policy::{PolicyDenial, RolePolicy, policy_for};
pub use service::AccessDecisionService;
