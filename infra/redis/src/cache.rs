use bb8_redis::redis;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::client::RedisClient;
use crate::error::{RedisError, RedisErrorExt};

/// Milliseconds for `PX`/`PEXPIRE`, never rounding a non-zero ttl down to 0.
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn expire_cmd(key: &str, ttl: Duration) -> redis::Cmd {
    let millis = if ttl.is_zero() { 0 } else { ttl_millis(ttl) };
    let mut cmd = redis::cmd("PEXPIRE");
    cmd.arg(key).arg(millis);
    cmd
}

impl RedisClient {
    /// `SET key val`, expiring after `ttl` unless it is zero.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn set_string(&self, key: &str, val: &str, ttl: Duration) -> Result<(), RedisError> {
        let key = self.key(key);
        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(val);
        if !ttl.is_zero() {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        self.query(&cmd, format!("SET {key}")).await
    }

    /// `GET key`; `None` when the key does not exist.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError> {
        let key = self.key(key);
        self.query(redis::cmd("GET").arg(&key), format!("GET {key}")).await
    }

    /// Deletes `keys`, returning how many existed.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn del(&self, keys: &[&str]) -> Result<u64, RedisError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let keys: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        self.query(redis::cmd("DEL").arg(&keys), format!("DEL {}", keys.join(" "))).await
    }

    /// Stores `value` as JSON. A zero `ttl` falls back to the configured
    /// default ttl.
    ///
    /// # Errors
    /// [`RedisError::Serialization`] when `value` cannot be encoded, otherwise
    /// as [`RedisClient::set_string`].
    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), RedisError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).context(format!("encoding {key}"))?;
        let ttl = if ttl.is_zero() { self.options().default_ttl } else { ttl };
        self.set_string(key, &json, ttl).await
    }

    /// Reads and decodes a JSON value; `None` when the key does not exist.
    ///
    /// # Errors
    /// [`RedisError::Serialization`] when the stored value is not valid JSON
    /// for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RedisError> {
        match self.get_string(key).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).context(format!("decoding {key}")),
            None => Ok(None),
        }
    }

    /// # Errors
    /// [`RedisError::Redis`] when the value is not an integer.
    pub async fn incr(&self, key: &str) -> Result<i64, RedisError> {
        let key = self.key(key);
        self.query(redis::cmd("INCR").arg(&key), format!("INCR {key}")).await
    }

    /// Sets a ttl on an existing key; `false` when the key does not exist.
    /// A zero ttl expires the key at once.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, RedisError> {
        let key = self.key(key);
        self.query(&expire_cmd(&key, ttl), format!("PEXPIRE {key}")).await
    }

    /// `HSET key field value [field value ...]`. No call is made for an
    /// empty slice.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), RedisError> {
        if fields.is_empty() {
            return Ok(());
        }
        let key = self.key(key);
        let mut cmd = redis::cmd("HSET");
        cmd.arg(&key);
        for (field, value) in fields {
            cmd.arg(*field).arg(*value);
        }
        self.query::<i64>(&cmd, format!("HSET {key}")).await.map(drop)
    }

    /// All fields of a hash; empty when the key does not exist.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, RedisError> {
        let key = self.key(key);
        self.query(redis::cmd("HGETALL").arg(&key), format!("HGETALL {key}")).await
    }
}
