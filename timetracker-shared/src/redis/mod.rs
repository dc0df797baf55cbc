/// Redis connectivity
///
/// - `client`: connection-managed client with command timeouts, used by
///   the session store and the project cache in [`crate::repository`]

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
