// Infrastructure layer - SQLite persistence, HTTP collaborators,
// logging and configuration. Implements the domain's repository and
// service traits.

pub mod config;
pub mod events;
pub mod http;
pub mod logging;
pub mod persistence;
