//! Configuration management
//!
//! Client settings: target network, node name templates, timeouts and
//! the default key type. Values come from defaults or `METAHASH_*`
//! environment variables; every client owns its own copy.

pub mod settings;

pub use settings::ClientConfig;
