// Core automod module - denylist word filter with escalating enforcement.
// Following the same hexagonal pattern as the rest of core: pure domain
// logic here, storage and platform side effects behind traits.

pub mod audit;
pub mod automod_models;
pub mod automod_service;
pub mod config_store;
pub mod escalation;
pub mod matcher;

pub use audit::*;
pub use automod_models::*;
pub use automod_service::*;
pub use config_store::*;
pub use escalation::*;
pub use matcher::*;
