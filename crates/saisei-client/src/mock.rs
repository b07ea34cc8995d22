//! Mock SaiseiClient for unit testing
//!
//! This module provides an in-memory implementation of [`SaiseiClientTrait`] that
//! can be used in unit tests without a reachable appliance.
//!
//! Resources are stored as JSON objects keyed by collection path and name.
//! Responses mimic the appliance envelope: `{"collection": [...]}` with status
//! 200, or `{"error": "..."}` with status 404 for unknown names.
//! Query parameters are ignored.

use crate::common::user_applications_segment;
use crate::error::SaiseiError;
use crate::models::ApiResponse;
use crate::saisei_trait::SaiseiClientTrait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const INTERFACES: &str = "interfaces";
const HOSTS: &str = "fibs/fib0/hosts";
const USER_GROUPS: &str = "user_groups";
const USERS: &str = "users";
const APP_GROUPS: &str = "app_groups";
const APPLICATIONS: &str = "applications";
const FLOWS: &str = "flows";
const RATE_PLANS: &str = "rate_plans";

type Store = HashMap<String, BTreeMap<String, Value>>;

/// Mock SaiseiClient for testing
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MockSaiseiClient {
    base_url: String,
    resources: Arc<Mutex<Store>>,
    commits: Arc<Mutex<u64>>,
    dirty: Arc<Mutex<bool>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn collection(values: Vec<Value>) -> ApiResponse {
    ApiResponse::new(200, json!({ "collection": values }).to_string())
}

fn not_found(segment: &str, id: &str) -> ApiResponse {
    ApiResponse::new(404, json!({ "error": format!("{segment}/{id} not found") }).to_string())
}

impl MockSaiseiClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            resources: Arc::new(Mutex::new(HashMap::new())),
            commits: Arc::new(Mutex::new(0)),
            dirty: Arc::new(Mutex::new(false)),
        }
    }

    fn insert(&self, segment: &str, id: &str, value: Value) {
        lock(&self.resources)
            .entry(segment.to_string())
            .or_default()
            .insert(id.to_string(), value);
    }

    /// Add an interface (for test setup)
    pub fn add_interface(&self, name: &str, value: Value) {
        self.insert(INTERFACES, name, value);
    }

    /// Add a host (for test setup)
    pub fn add_host(&self, name: &str, value: Value) {
        self.insert(HOSTS, name, value);
    }

    /// Add a user group (for test setup)
    pub fn add_user_group(&self, name: &str, value: Value) {
        self.insert(USER_GROUPS, name, value);
    }

    /// Add a user (for test setup)
    pub fn add_user(&self, name: &str, value: Value) {
        self.insert(USERS, name, value);
    }

    /// Add an application group (for test setup)
    pub fn add_application_group(&self, name: &str, value: Value) {
        self.insert(APP_GROUPS, name, value);
    }

    /// Add an application (for test setup)
    pub fn add_application(&self, name: &str, value: Value) {
        self.insert(APPLICATIONS, name, value);
    }

    /// Add an application seen for a user (for test setup)
    pub fn add_user_application(&self, user: &str, application: &str, value: Value) {
        self.insert(&user_applications_segment(user), application, value);
    }

    /// Add a flow (for test setup)
    pub fn add_flow(&self, name: &str, value: Value) {
        self.insert(FLOWS, name, value);
    }

    /// Add a rate plan (for test setup)
    pub fn add_rate_plan(&self, name: &str, value: Value) {
        self.insert(RATE_PLANS, name, value);
    }

    /// Number of commits received
    pub fn commit_count(&self) -> u64 {
        *lock(&self.commits)
    }

    /// Whether an upsert or delete happened since the last commit
    pub fn has_uncommitted_changes(&self) -> bool {
        *lock(&self.dirty)
    }

    fn list(&self, segment: &str) -> ApiResponse {
        let values: Vec<Value> = lock(&self.resources)
            .get(segment)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default();
        collection(values)
    }

    fn fetch(&self, segment: &str, id: &str) -> ApiResponse {
        lock(&self.resources)
            .get(segment)
            .and_then(|items| items.get(id))
            .map_or_else(|| not_found(segment, id), |value| collection(vec![value.clone()]))
    }

    /// Create-or-update: object fields are merged into an existing object
    fn upsert(&self, segment: &str, id: &str, body: &Value) -> ApiResponse {
        let stored = {
            let mut resources = lock(&self.resources);
            let entry = resources
                .entry(segment.to_string())
                .or_default()
                .entry(id.to_string())
                .or_insert_with(|| json!({ "name": id }));
            match (entry.as_object_mut(), body.as_object()) {
                (Some(existing), Some(update)) => {
                    for (key, value) in update {
                        existing.insert(key.clone(), value.clone());
                    }
                }
                _ => *entry = body.clone(),
            }
            entry.clone()
        };
        *lock(&self.dirty) = true;
        collection(vec![stored])
    }

    fn remove(&self, segment: &str, id: &str) {
        let removed = lock(&self.resources)
            .get_mut(segment)
            .and_then(|items| items.remove(id));
        if removed.is_some() {
            *lock(&self.dirty) = true;
        }
    }
}

#[async_trait::async_trait]
impl SaiseiClientTrait for MockSaiseiClient {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn query_interfaces(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(INTERFACES))
    }

    async fn get_interface(&self, interface: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(INTERFACES, interface))
    }

    async fn query_hosts(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(HOSTS))
    }

    async fn get_host(&self, host: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(HOSTS, host))
    }

    async fn update_host(&self, host: &str, body: &Value) -> Result<ApiResponse, SaiseiError> {
        Ok(self.upsert(HOSTS, host, body))
    }

    async fn query_user_groups(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(USER_GROUPS))
    }

    async fn get_user_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(USER_GROUPS, group))
    }

    async fn query_users(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(USERS))
    }

    async fn get_user(&self, user: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(USERS, user))
    }

    async fn upsert_user(&self, user: &str, body: &Value) -> Result<ApiResponse, SaiseiError> {
        Ok(self.upsert(USERS, user, body))
    }

    async fn delete_user(&self, user: &str) -> Result<(), SaiseiError> {
        self.remove(USERS, user);
        Ok(())
    }

    async fn query_application_groups(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(APP_GROUPS))
    }

    async fn get_application_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(APP_GROUPS, group))
    }

    async fn query_applications(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(APPLICATIONS))
    }

    async fn get_application(&self, application: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(APPLICATIONS, application))
    }

    async fn query_user_applications(&self, user: &str, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(&user_applications_segment(user)))
    }

    async fn get_user_application(&self, user: &str, application: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(&user_applications_segment(user), application))
    }

    async fn query_flows(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(FLOWS))
    }

    async fn get_flow(&self, flow: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(FLOWS, flow))
    }

    async fn query_rate_plans(&self, _params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        Ok(self.list(RATE_PLANS))
    }

    async fn get_rate_plan(&self, rate_plan: &str) -> Result<ApiResponse, SaiseiError> {
        Ok(self.fetch(RATE_PLANS, rate_plan))
    }

    async fn upsert_rate_plan(&self, rate_plan: &str, body: &Value) -> Result<ApiResponse, SaiseiError> {
        Ok(self.upsert(RATE_PLANS, rate_plan, body))
    }

    async fn delete_rate_plan(&self, rate_plan: &str) -> Result<(), SaiseiError> {
        self.remove(RATE_PLANS, rate_plan);
        Ok(())
    }

    async fn commit(&self) -> Result<ApiResponse, SaiseiError> {
        *lock(&self.commits) += 1;
        *lock(&self.dirty) = false;
        Ok(collection(Vec::new()))
    }
}
