//! Common utilities for the Saisei API client
//!
//! Resource paths are always `{base_path}/{segment}/` for collections and
//! `{base_path}/{segment}/{id}` for single items.

pub mod query;

pub use query::{build_query_string, encode_pair};

/// Path of a resource collection, with trailing slash
pub fn collection_path(base_path: &str, segment: &str) -> String {
    format!("{base_path}/{segment}/")
}

/// Path of a single resource
///
/// The identifier is percent-encoded except for `/`, which is kept so that
/// names like `eth0/1` address the same path the appliance exposes.
pub fn item_path(base_path: &str, segment: &str, id: &str) -> String {
    format!("{base_path}/{segment}/{}", encode_identifier(id))
}

/// Segment of the applications nested under one user
pub fn user_applications_segment(user: &str) -> String {
    format!("users/{}/applications", encode_identifier(user))
}

fn encode_identifier(id: &str) -> String {
    id.split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
