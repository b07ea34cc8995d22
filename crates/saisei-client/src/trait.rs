//! SaiseiClient trait for mocking
//!
//! This trait abstracts the SaiseiClient to enable mocking in unit tests.
//! The concrete SaiseiClient implements this trait, and tests can use mock implementations.

use crate::error::SaiseiError;
use crate::models::ApiResponse;

/// Trait for Saisei API client operations
///
/// Bodies are taken as `serde_json::Value` so the trait stays object-safe.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait SaiseiClientTrait: Send + Sync {
    /// `{host}:{port}` of the appliance
    fn base_url(&self) -> String;

    // Interfaces
    async fn query_interfaces(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_interface(&self, interface: &str) -> Result<ApiResponse, SaiseiError>;

    // Hosts
    async fn query_hosts(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_host(&self, host: &str) -> Result<ApiResponse, SaiseiError>;
    async fn update_host(&self, host: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError>;

    // Users
    async fn query_user_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_user_group(&self, group: &str) -> Result<ApiResponse, SaiseiError>;
    async fn query_users(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_user(&self, user: &str) -> Result<ApiResponse, SaiseiError>;
    async fn upsert_user(&self, user: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError>;
    async fn delete_user(&self, user: &str) -> Result<(), SaiseiError>;

    // Applications
    async fn query_application_groups(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_application_group(&self, group: &str) -> Result<ApiResponse, SaiseiError>;
    async fn query_applications(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_application(&self, application: &str) -> Result<ApiResponse, SaiseiError>;
    async fn query_user_applications(&self, user: &str, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_user_application(&self, user: &str, application: &str) -> Result<ApiResponse, SaiseiError>;

    // Flows
    async fn query_flows(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_flow(&self, flow: &str) -> Result<ApiResponse, SaiseiError>;

    // Rate plans
    async fn query_rate_plans(&self, params: &[(&str, &str)]) -> Result<ApiResponse, SaiseiError>;
    async fn get_rate_plan(&self, rate_plan: &str) -> Result<ApiResponse, SaiseiError>;
    async fn upsert_rate_plan(&self, rate_plan: &str, body: &serde_json::Value) -> Result<ApiResponse, SaiseiError>;
    async fn delete_rate_plan(&self, rate_plan: &str) -> Result<(), SaiseiError>;

    // Utilities
    async fn commit(&self) -> Result<ApiResponse, SaiseiError>;
}
