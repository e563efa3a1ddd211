//! # Redis
//!
//! A pooled Redis client (`bb8-redis`) with the handful of operations
//! backend services reach for first: string/JSON caching, hashes, simple
//! locks and counter-based id allocation.
//!
//! Every key passes through the configured namespace, every command runs
//! under a time budget, and errors carry the command that failed:
//!
//! ```rust,no_run
//! use blocks_redis::{RedisOptions, init};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), blocks_redis::RedisError> {
//! let redis = init(RedisOptions { namespace: "shop".into(), ..RedisOptions::default() }).await?;
//!
//! redis.set_json("cart:42", &vec!["apple", "pear"], Duration::from_secs(300)).await?;
//! let order = redis.next_prefixed("orders", "ORD-", 6).await?; // "ORD-000001"
//!
//! if redis.try_lock("checkout:42", &order, Duration::from_secs(5)).await? {
//!     // ...
//!     redis.safer_unlock("checkout:42", &order).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `RedisClient` is `Clone`; use [`init`]/[`client`] for a process-wide
//! instance or pass clients around explicitly.

mod cache;
mod client;
mod error;
mod idalloc;
mod lock;
mod options;

pub use crate::client::{RedisClient, client, init, is_initialized};
pub use crate::error::{RedisError, RedisErrorExt};
pub use crate::options::{RedisConfig, RedisOptions};
pub use bb8_redis::redis;
