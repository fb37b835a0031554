//! Abstract interface for the key-value storage backing node membership state.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

/// Marker trait for store errors.
pub trait StoreError: Debug + Error + Send + Sync + 'static {}

/// A trait representing a key-value store with asynchronous operations.
///
/// Every write replaces the whole value stored under a key. There are no
/// partial or field-level updates.
///
/// # Associated Types
/// - `Error`: The error type returned by store operations.
///
/// # Required Methods
/// - `async fn del(&self, key: String) -> Result<(), Self::Error>`: Deletes a key from the store.
/// - `async fn get(&self, key: String) -> Result<Option<Bytes>, Self::Error>`: Retrieves the value associated with a key.
/// - `async fn keys(&self) -> Result<Vec<String>, Self::Error>`: Retrieves all keys in the store.
/// - `async fn put(&self, key: String, bytes: Bytes) -> Result<(), Self::Error>`: Stores a key-value pair.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// The error type for the store.
    type Error: StoreError;

    /// Deletes a key from the store.
    async fn del<K: Into<String> + Send>(&self, key: K) -> Result<(), Self::Error>;

    /// Retrieves the value associated with a key.
    async fn get<K: Into<String> + Send>(&self, key: K) -> Result<Option<Bytes>, Self::Error>;

    /// Retrieves all keys in the store.
    async fn keys(&self) -> Result<Vec<String>, Self::Error>;

    /// Stores a key-value pair, replacing any previous value.
    async fn put<K: Into<String> + Send>(&self, key: K, bytes: Bytes) -> Result<(), Self::Error>;
}
