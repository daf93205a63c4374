//! Parlor Testkit - deterministic test infrastructure
//!
//! Three layers:
//!
//! - [`MockEffects`]: every effect trait with predictable behavior.
//!   Seeded ids, a stepping millisecond clock you can advance, in-memory
//!   storage, and a scripted identity provider.
//! - [`InProcessApi`]: a real [`parlor_api::ApiClient`] wired straight to
//!   the engines over shared mock effects; one instance is one member's
//!   client session, with an `offline` switch for transport-failure
//!   scenarios.
//! - [`TestNetwork`]: fixture builders (sign members in, onboard them,
//!   connect pairs) so scenario tests read like the scenario.

#![forbid(unsafe_code)]

mod effects;
mod fixtures;
mod logging;
mod server;

pub use effects::MockEffects;
pub use fixtures::{open_profile_draft, TestNetwork};
pub use logging::init_test_logging;
pub use server::InProcessApi;
