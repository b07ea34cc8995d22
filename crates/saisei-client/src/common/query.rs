//! Query string helpers

/// Percent-encode one `name=value` fragment
pub fn encode_pair(name: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
}

/// Build `?a=1&b=2` from ordered pairs
///
/// Order and duplicates are kept as given. An empty slice yields an empty string.
pub fn build_query_string(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = params.iter().map(|(k, v)| encode_pair(k, v)).collect();
    format!("?{}", pairs.join("&"))
}
