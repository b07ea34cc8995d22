//! Saisei API client
//!
//! One method per resource operation of the running configuration
//! (`/rest/top/configurations/running`). Every method issues exactly one
//! request and hands back the appliance's response untouched.

use crate::common::{build_query_string, collection_path, item_path, user_applications_segment};
use crate::config::SaiseiConfig;
use crate::error::SaiseiError;
use crate::models::{ApiResponse, CommitRequest};
use crate::request::{RequestMethod, SaiseiRequest};
use crate::saisei_trait::SaiseiClientTrait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

/// Saisei API client
#[derive(Debug, Clone)]
pub struct SaiseiClient {
    client: Client,
    config: SaiseiConfig,
}

impl SaiseiClient {
    /// Create a new Saisei client
    ///
    /// # Arguments
    /// * `config` - Connection settings (host, port, credentials, flags)
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: SaiseiConfig) -> Result<Self, SaiseiError> {
        if config.insecure_skip_verify() {
            warn!("TLS certificate verification disabled for {}", config.host());
        }

        let mut builder = Client::builder().danger_accept_invalid_certs(config.insecure_skip_verify());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Create a client from `SAISEI_*` environment variables
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidConfig`] when the environment is incomplete.
    pub fn from_env() -> Result<Self, SaiseiError> {
        Self::new(SaiseiConfig::from_env()?)
    }

    /// Connection settings
    pub fn config(&self) -> &SaiseiConfig {
        &self.config
    }

    /// `{host}:{port}`
    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    /// Resource path prefix
    pub fn base_path(&self) -> &str {
        self.config.base_path()
    }

    /// Build a raw request for an endpoint this client does not wrap
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidMethod`] for verbs other than GET, PUT, POST and DELETE.
    pub fn request(&self, method: &str, path: &str) -> Result<SaiseiRequest, SaiseiError> {
        SaiseiRequest::with_method_name(&self.client, &self.config, method, path)
    }

    fn prepare(&self, method: RequestMethod, path: String) -> SaiseiRequest {
        SaiseiRequest::new(&self.client, &self.config, method, path)
    }

    async fn list(&self, segment: &str, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        debug!("Querying {}/{}", segment, build_query_string(params));
        self.prepare(RequestMethod::Get, collection_path(self.base_path(), segment))
            .query_params(params)
            .execute()
            .await
    }

    /// List endpoints whose appliance handlers never receive the parameters
    async fn list_without_params(&self, segment: &str, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        if !params.is_empty() {
            warn!("Query parameters are not sent for {}: {:?}", segment, params);
        }
        debug!("Querying {}", segment);
        self.prepare(RequestMethod::Get, collection_path(self.base_path(), segment))
            .execute()
            .await
    }

    async fn fetch(&self, segment: &str, id: &str) -> Result<ApiResponse, SaiseiError> {
        debug!("Fetching {} {}", segment, id);
        self.prepare(RequestMethod::Get, item_path(self.base_path(), segment, id))
            .execute()
            .await
    }

    async fn put<B: Serialize + ?Sized>(&self, segment: &str, id: &str, body: &B) -> Result<ApiResponse, SaiseiError> {
        debug!("Updating {} {}", segment, id);
        self.prepare(RequestMethod::Put, item_path(self.base_path(), segment, id))
            .body(body)?
            .execute()
            .await
    }

    async fn remove(&self, segment: &str, id: &str) -> Result<(), SaiseiError> {
        debug!("Deleting {} {}", segment, id);
        let response = self
            .prepare(RequestMethod::Delete, item_path(self.base_path(), segment, id))
            .execute()
            .await?;
        debug!("Delete {} {} returned {}", segment, id, response.status());
        Ok(())
    }

    // Interfaces

    /// List interfaces
    ///
    /// # Arguments
    /// * `params` - Query parameters (e.g., `[("select", "name,state")]`)
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_interfaces(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("interfaces", params).await
    }

    /// Get an interface by name
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_interface(&self, interface: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("interfaces", interface).await
    }

    // Hosts

    /// List hosts of the default FIB
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_hosts(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("fibs/fib0/hosts", params).await
    }

    /// Get a host of the default FIB
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_host(&self, host: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("fibs/fib0/hosts", host).await
    }

    /// Update a host
    ///
    /// Hosts are read from `fibs/fib0/hosts` but written through `hosts`.
    ///
    /// # Errors
    /// * [`SaiseiError::Serialization`] - `body` cannot be encoded as JSON
    /// * [`SaiseiError::Transport`] - the request cannot be completed
    pub async fn update_host<B: Serialize + ?Sized>(&self, host: &str, body: &B) -> Result<ApiResponse, SaiseiError> {
        self.put("hosts", host, body).await
    }

    // Users

    /// List user groups
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_user_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("user_groups", params).await
    }

    /// Get a user group
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_user_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("user_groups", group).await
    }

    /// List users
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_users(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("users", params).await
    }

    /// Get a user
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_user(&self, user: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("users", user).await
    }

    /// Create or update a user
    ///
    /// # Errors
    /// * [`SaiseiError::Serialization`] - `body` cannot be encoded as JSON
    /// * [`SaiseiError::Transport`] - the request cannot be completed
    pub async fn upsert_user<B: Serialize + ?Sized>(&self, user: &str, body: &B) -> Result<ApiResponse, SaiseiError> {
        self.put("users", user, body).await
    }

    /// Delete a user
    ///
    /// The response status is not inspected: any completed exchange is `Ok(())`.
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn delete_user(&self, user: &str) -> Result<(), SaiseiError> {
        self.remove("users", user).await
    }

    // Applications

    /// List application groups
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_application_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("app_groups", params).await
    }

    /// Get an application group
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_application_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("app_groups", group).await
    }

    /// List applications
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_applications(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list("applications", params).await
    }

    /// Get an application
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_application(&self, application: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("applications", application).await
    }

    /// List the applications seen for one user
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_user_applications(&self, user: &str, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list(&user_applications_segment(user), params).await
    }

    /// Get one application of one user
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_user_application(&self, user: &str, application: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch(&user_applications_segment(user), application).await
    }

    // Flows

    /// List flows
    ///
    /// `params` is accepted for signature parity with the other list calls but
    /// is not sent.
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_flows(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list_without_params("flows", params).await
    }

    /// Get a flow
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_flow(&self, flow: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("flows", flow).await
    }

    // Rate plans

    /// List rate plans
    ///
    /// `params` is accepted but not sent, as with [`Self::query_flows`].
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn query_rate_plans(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        self.list_without_params("rate_plans", params).await
    }

    /// Get a rate plan
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn get_rate_plan(&self, rate_plan: &str) -> Result<ApiResponse, SaiseiError> {
        self.fetch("rate_plans", rate_plan).await
    }

    /// Create or update a rate plan
    ///
    /// # Errors
    /// * [`SaiseiError::Serialization`] - `body` cannot be encoded as JSON
    /// * [`SaiseiError::Transport`] - the request cannot be completed
    pub async fn upsert_rate_plan<B: Serialize + ?Sized>(&self, rate_plan: &str, body: &B) -> Result<ApiResponse, SaiseiError> {
        self.put("rate_plans", rate_plan, body).await
    }

    /// Delete a rate plan
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn delete_rate_plan(&self, rate_plan: &str) -> Result<(), SaiseiError> {
        self.remove("rate_plans", rate_plan).await
    }

    // Utilities

    /// Save the running configuration
    ///
    /// Sends `{"save_partition":"current","save_config":"true"}` to the base path.
    ///
    /// # Errors
    /// Returns [`SaiseiError::Transport`] if the request cannot be completed.
    pub async fn commit(&self) -> Result<ApiResponse, SaiseiError> {
        debug!("Committing running configuration");
        self.prepare(RequestMethod::Put, self.base_path().to_string())
            .body(&CommitRequest::default())?
            .execute()
            .await
    }
}

#[async_trait::async_trait]
impl SaiseiClientTrait for SaiseiClient {
    fn base_url(&self) -> String {
        SaiseiClient::base_url(self)
    }

    async fn query_interfaces(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_interfaces(self, params).await
    }

    async fn get_interface(&self, interface: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_interface(self, interface).await
    }

    async fn query_hosts(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_hosts(self, params).await
    }

    async fn get_host(&self, host: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_host(self, host).await
    }

    async fn update_host(&self, host: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::update_host(self, host, body).await
    }

    async fn query_user_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_user_groups(self, params).await
    }

    async fn get_user_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_user_group(self, group).await
    }

    async fn query_users(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_users(self, params).await
    }

    async fn get_user(&self, user: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_user(self, user).await
    }

    async fn upsert_user(&self, user: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::upsert_user(self, user, body).await
    }

    async fn delete_user(&self, user: &str) -> Result<(), SaiseiError> {
        SaiseiClient::delete_user(self, user).await
    }

    async fn query_application_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_application_groups(self, params).await
    }

    async fn get_application_group(&self, group: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_application_group(self, group).await
    }

    async fn query_applications(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_applications(self, params).await
    }

    async fn get_application(&self, application: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_application(self, application).await
    }

    async fn query_user_applications(&self, user: &str, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_user_applications(self, user, params).await
    }

    async fn get_user_application(&self, user: &str, application: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_user_application(self, user, application).await
    }

    async fn query_flows(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_flows(self, params).await
    }

    async fn get_flow(&self, flow: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_flow(self, flow).await
    }

    async fn query_rate_plans(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::query_rate_plans(self, params).await
    }

    async fn get_rate_plan(&self, rate_plan: &str) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::get_rate_plan(self, rate_plan).await
    }

    async fn upsert_rate_plan(&self, rate_plan: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::upsert_rate_plan(self, rate_plan, body).await
    }

    async fn delete_rate_plan(&self, rate_plan: &str) -> Result<(), SaiseiError> {
        SaiseiClient::delete_rate_plan(self, rate_plan).await
    }

    async fn commit(&self) -> Result<ApiResponse, SaiseiError> {
        SaiseiClient::commit(self).await
    }
}
