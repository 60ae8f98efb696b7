//! Take Six (workspace facade crate).
//!
//! Re-exports the member crates under one name so binaries and integration
//! tests can use `take_six::{types,core,server,agent}`.

pub use take_six_agent as agent;
pub use take_six_core as core;
pub use take_six_server as server;
pub use take_six_types as types;
