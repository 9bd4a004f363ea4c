//! In-memory NetBox backend for tests.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use super::api::{Endpoint, Filters, NetBoxApi};
use super::error::{NetBoxError, NetBoxResult};
use super::record::{FieldSource, related_id};

const RELATIONS: &[(&str, Endpoint)] = &[
    ("site", Endpoint::Sites),
    ("device_type", Endpoint::DeviceTypes),
    ("role", Endpoint::DeviceRoles),
    ("tenant", Endpoint::Tenants),
    ("manufacturer", Endpoint::Manufacturers),
    ("device", Endpoint::Devices),
];

/// Fake NetBox that stores objects in memory and counts API calls.
///
/// Related fields are stored as bare IDs. With `nested_relations` they are
/// served the way NetBox serves them by default: as nested objects.
pub struct InMemoryNetBox {
    objects: Mutex<HashMap<Endpoint, Vec<Map<String, Value>>>>,
    next_id: AtomicI64,
    reads: AtomicUsize,
    mutations: AtomicUsize,
    nested_relations: bool,
    unavailable: AtomicBool,
}

impl InMemoryNetBox {
    pub fn empty() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
            reads: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
            nested_relations: true,
            unavailable: AtomicBool::new(false),
        }
    }

    /// A small lab: two sites, one router, a prefix, an address and a VLAN.
    pub fn seeded() -> Self {
        let netbox = Self::empty();
        netbox.insert_with_id(Endpoint::Sites, 1, json!({"name": "DC 1", "slug": "dc1", "status": "active"}));
        netbox.insert_with_id(Endpoint::Sites, 2, json!({"name": "DC 2", "slug": "dc2", "status": "planned"}));
        netbox.insert_with_id(Endpoint::Manufacturers, 1, json!({"name": "Juniper", "slug": "juniper"}));
        netbox.insert_with_id(
            Endpoint::DeviceTypes,
            1,
            json!({"model": "MX204", "slug": "mx204", "manufacturer": 1}),
        );
        netbox.insert_with_id(Endpoint::DeviceRoles, 1, json!({"name": "Router", "slug": "router"}));
        netbox.insert_with_id(Endpoint::Tenants, 1, json!({"name": "Acme", "slug": "acme"}));
        netbox.insert_with_id(
            Endpoint::Devices,
            1,
            json!({"name": "edge-01", "site": 1, "device_type": 1, "role": 1, "status": "active", "tenant": null}),
        );
        netbox.insert_with_id(
            Endpoint::Prefixes,
            1,
            json!({"prefix": "10.0.0.0/24", "site": 1, "status": "active"}),
        );
        netbox.insert_with_id(
            Endpoint::IpAddresses,
            1,
            json!({"address": "10.0.0.1/24", "status": "active"}),
        );
        netbox.insert_with_id(Endpoint::Vlans, 1, json!({"name": "mgmt", "vid": 10, "site": 1, "status": "active"}));
        netbox
    }

    pub fn with_nested_relations(mut self, nested: bool) -> Self {
        self.nested_relations = nested;
        self
    }

    /// Insert an object directly (not counted as a mutation).
    pub fn insert(&self, endpoint: Endpoint, object: Value) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.insert_with_id(endpoint, id, object);
        id
    }

    fn insert_with_id(&self, endpoint: Endpoint, id: i64, object: Value) {
        let mut map = object.as_object().cloned().unwrap_or_default();
        map.insert("id".into(), json!(id));
        self.lock().entry(endpoint).or_default().push(map);
    }

    /// Make every call fail with an upstream 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Raw stored objects (relations as bare IDs).
    pub fn objects(&self, endpoint: Endpoint) -> Vec<Value> {
        self.lock()
            .get(&endpoint)
            .map(|v| v.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Endpoint, Vec<Map<String, Value>>>> {
        self.objects.lock().unwrap()
    }

    fn check_available(&self, endpoint: &str) -> NetBoxResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NetBoxError::Upstream {
                method: "GET".into(),
                url: format!("http://netbox.test/api/{endpoint}/"),
                status: 503,
                body: "maintenance".into(),
            });
        }
        Ok(())
    }

    fn render(&self, objects: &HashMap<Endpoint, Vec<Map<String, Value>>>, object: &Map<String, Value>) -> Value {
        let mut out = object.clone();
        if self.nested_relations {
            for (field, endpoint) in RELATIONS {
                let Some(id) = object.get(*field).and_then(related_id) else {
                    continue;
                };
                if let Some(target) = find_by_id(objects, *endpoint, id) {
                    let mut brief = Map::new();
                    brief.insert("id".into(), json!(id));
                    for key in ["name", "slug", "model"] {
                        if let Some(v) = target.get(key) {
                            brief.insert(key.into(), v.clone());
                        }
                    }
                    brief.insert("display".into(), json!(target.label()));
                    out.insert(field.to_string(), Value::Object(brief));
                }
            }
        }
        Value::Object(out)
    }
}

fn find_by_id(
    objects: &HashMap<Endpoint, Vec<Map<String, Value>>>,
    endpoint: Endpoint,
    id: i64,
) -> Option<&Map<String, Value>> {
    objects
        .get(&endpoint)
        .and_then(|list| list.iter().find(|o| o.id() == Some(id)))
}

fn matches(
    objects: &HashMap<Endpoint, Vec<Map<String, Value>>>,
    object: &Map<String, Value>,
    key: &str,
    expected: &str,
) -> bool {
    if matches!(key, "limit" | "offset" | "brief") {
        return true;
    }
    if let Some(base) = key.strip_suffix("_id") {
        return object.related_id(base).map(|id| id.to_string()).as_deref() == Some(expected);
    }
    if let Some((_, endpoint)) = RELATIONS.iter().find(|(field, _)| *field == key) {
        let Some(id) = object.related_id(key) else {
            return false;
        };
        return find_by_id(objects, *endpoint, id).is_some_and(|target| {
            target.text("slug").as_deref() == Some(expected)
                || target.text("name").as_deref() == Some(expected)
        });
    }
    object.text(key).as_deref() == Some(expected)
}

#[async_trait]
impl NetBoxApi for InMemoryNetBox {
    async fn list(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Vec<Value>> {
        self.check_available(endpoint.path())?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let objects = self.lock();
        let found = objects
            .get(&endpoint)
            .map(|list| {
                list.iter()
                    .filter(|o| filters.iter().all(|(k, v)| matches(&objects, o, k, v)))
                    .map(|o| self.render(&objects, o))
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }

    async fn get(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<Value> {
        self.check_available(endpoint.path())?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let objects = self.lock();
        find_by_id(&objects, endpoint, id)
            .map(|o| self.render(&objects, o))
            .ok_or_else(|| NetBoxError::not_found(endpoint.label(), format!("#{id}")))
    }

    async fn create(&self, endpoint: Endpoint, body: &Value) -> NetBoxResult<Value> {
        self.check_available(endpoint.path())?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let id = self.insert(endpoint, body.clone());
        let objects = self.lock();
        let created = find_by_id(&objects, endpoint, id)
            .map(|o| self.render(&objects, o))
            .unwrap_or(Value::Null);
        Ok(created)
    }

    async fn update(&self, endpoint: Endpoint, id: i64, body: &Value) -> NetBoxResult<Value> {
        self.check_available(endpoint.path())?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.lock();
        let object = objects
            .get_mut(&endpoint)
            .and_then(|list| list.iter_mut().find(|o| o.id() == Some(id)))
            .ok_or_else(|| NetBoxError::not_found(endpoint.label(), format!("#{id}")))?;
        if let Some(patch) = body.as_object() {
            for (k, v) in patch {
                object.insert(k.clone(), v.clone());
            }
        }
        let object = object.clone();
        Ok(self.render(&objects, &object))
    }

    async fn delete(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<()> {
        self.check_available(endpoint.path())?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.lock();
        let list = objects.entry(endpoint).or_default();
        let before = list.len();
        list.retain(|o| o.id() != Some(id));
        if list.len() == before {
            return Err(NetBoxError::not_found(endpoint.label(), format!("#{id}")));
        }
        Ok(())
    }

    async fn status(&self) -> NetBoxResult<Value> {
        self.check_available("status")?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"netbox-version": "4.1.0", "python-version": "3.12.3"}))
    }
}
