//! Shared NetBox client injected into every tool handler.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::api::{Endpoint, Filters, NetBoxApi};
use super::cache::{CacheStats, ResponseCache};
use super::error::{NetBoxError, NetBoxResult};
use super::http_api::HttpNetBoxApi;
use super::record::{FieldSource, ResourceRef};
use crate::core::config::{CacheConfig, NetBoxConfig};

/// Thread-safe NetBox client with a read-through cache.
///
/// Reads go through the cache. Existence checks that guard a write use
/// [`NetBoxClient::find_one_fresh`] / [`NetBoxClient::ensure_absent`], which
/// always hit the API. Every successful write invalidates the cached entries
/// of the endpoint it touched.
pub struct NetBoxClient {
    api: Arc<dyn NetBoxApi>,
    cache: Option<ResponseCache>,
}

impl NetBoxClient {
    /// Wrap a backend with an optional cache.
    pub fn new(api: Arc<dyn NetBoxApi>, cache: &CacheConfig) -> Self {
        let cache = cache.enabled.then(|| {
            ResponseCache::new(Duration::from_secs(cache.ttl_secs), cache.max_entries)
        });
        Self { api, cache }
    }

    /// Build the HTTP-backed client from configuration.
    pub fn from_config(netbox: &NetBoxConfig, cache: &CacheConfig) -> NetBoxResult<Self> {
        info!("NetBox client targeting {}", netbox.url);
        Ok(Self::new(Arc::new(HttpNetBoxApi::new(netbox)?), cache))
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResponseCache::stats)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// List objects, served from cache when possible.
    pub async fn list(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Vec<Value>> {
        let key = ResponseCache::key(endpoint, &encode_filters(filters));
        if let Some(Value::Array(items)) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(items);
        }

        let items = self.api.list(endpoint, filters).await?;
        if let Some(cache) = &self.cache {
            cache.insert(key, Value::Array(items.clone()));
        }
        Ok(items)
    }

    /// Fetch an object by ID, served from cache when possible.
    pub async fn get(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<Value> {
        let key = ResponseCache::key(endpoint, &format!("id={id}"));
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(hit);
        }

        let object = self.api.get(endpoint, id).await?;
        if let Some(cache) = &self.cache {
            cache.insert(key, object.clone());
        }
        Ok(object)
    }

    /// First object matching `filters`, possibly from cache.
    pub async fn find_one(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Option<Value>> {
        Ok(self.list(endpoint, filters).await?.into_iter().next())
    }

    /// List objects straight from NetBox, bypassing the cache.
    pub async fn list_fresh(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Vec<Value>> {
        self.api.list(endpoint, filters).await
    }

    /// First object matching `filters`, always read from NetBox.
    pub async fn find_one_fresh(
        &self,
        endpoint: Endpoint,
        filters: &Filters,
    ) -> NetBoxResult<Option<Value>> {
        Ok(self.list_fresh(endpoint, filters).await?.into_iter().next())
    }

    /// Fail with a conflict if an object matching `filters` already exists.
    ///
    /// Reads the source of truth; a cached miss never hides an existing object.
    #[instrument(skip(self, filters), fields(endpoint = %endpoint))]
    pub async fn ensure_absent(
        &self,
        endpoint: Endpoint,
        filters: &Filters,
        key: &str,
    ) -> NetBoxResult<()> {
        match self.find_one_fresh(endpoint, filters).await? {
            Some(existing) => {
                debug!("{} '{}' already exists as {:?}", endpoint.label(), key, existing.id());
                Err(NetBoxError::conflict(endpoint.label(), key))
            }
            None => Ok(()),
        }
    }

    /// Resolve a reference to an object ID.
    ///
    /// IDs are verified to exist; keys are matched against the endpoint's key
    /// fields in order.
    pub async fn resolve(&self, endpoint: Endpoint, reference: &ResourceRef) -> NetBoxResult<i64> {
        let object = self.lookup(endpoint, reference).await?;
        object.id().ok_or_else(|| {
            NetBoxError::invalid_response(format!("{} {} has no id", endpoint.label(), reference))
        })
    }

    /// Fetch the object a reference points to.
    pub async fn lookup(&self, endpoint: Endpoint, reference: &ResourceRef) -> NetBoxResult<Value> {
        match reference {
            ResourceRef::Id(id) => self.get(endpoint, *id).await,
            ResourceRef::Key(key) => {
                for field in endpoint.key_fields() {
                    let filters = vec![(field.to_string(), key.clone())];
                    if let Some(found) = self.find_one(endpoint, &filters).await? {
                        debug!("Resolved {} '{}' via {}", endpoint.label(), key, field);
                        return Ok(found);
                    }
                }
                Err(NetBoxError::not_found(endpoint.label(), key.clone()))
            }
        }
    }

    /// Resolve an optional reference.
    pub async fn resolve_opt(
        &self,
        endpoint: Endpoint,
        reference: Option<&ResourceRef>,
    ) -> NetBoxResult<Option<i64>> {
        match reference {
            Some(r) => self.resolve(endpoint, r).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn status(&self) -> NetBoxResult<Value> {
        self.api.status().await
    }

    // ========================================================================
    // Writes
    // ========================================================================

    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn create(&self, endpoint: Endpoint, body: &Value) -> NetBoxResult<Value> {
        let created = self.api.create(endpoint, body).await;
        self.invalidate(endpoint);
        let created = created?;
        info!("Created {} {}", endpoint.label(), created.label());
        Ok(created)
    }

    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn update(&self, endpoint: Endpoint, id: i64, body: &Value) -> NetBoxResult<Value> {
        let updated = self.api.update(endpoint, id, body).await;
        self.invalidate(endpoint);
        let updated = updated?;
        info!("Updated {} {}", endpoint.label(), updated.label());
        Ok(updated)
    }

    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn delete(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<()> {
        let deleted = self.api.delete(endpoint, id).await;
        self.invalidate(endpoint);
        deleted?;
        info!("Deleted {} #{}", endpoint.label(), id);
        Ok(())
    }

    fn invalidate(&self, endpoint: Endpoint) {
        if let Some(cache) = &self.cache {
            cache.invalidate(endpoint);
        }
    }
}

/// Canonical query string for cache keys (order-independent).
fn encode_filters(filters: &Filters) -> String {
    let mut sorted = filters.clone();
    sorted.sort();
    serde_urlencoded::to_string(&sorted).unwrap_or_default()
}
