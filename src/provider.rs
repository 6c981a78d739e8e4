//! Provider-facing configuration (data) and OAuth2 capability hooks (behavior).
//!
//! `descriptor` exposes the validated [`ProviderConfig`], its two mutually exclusive tenant
//! roots (issuer-rooted and domain-rooted), and the [`OktaEndpoints`] derived from them.
//! `strategy` defines [`OAuth2Hooks`], the capability interface the generic
//! authorization-code flow calls into for authorization parameters, profile lookups, and
//! token error classification.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
