//! Storage connection-string formatting.
//!
//! Builds the connection string handed to the dump/load utility for blob-storage targets. Two independent switches
//! pick one of four templates:
//!
//! | emulator | full | template |
//! |---|---|---|
//! | yes | yes | `DefaultEndpointsProtocol=http;AccountName={account};AccountKey={key};BlobEndpoint={endpoint};` |
//! | yes | no | `DefaultEndpointsProtocol=http;BlobEndpoint={endpoint};` |
//! | no | yes | `DefaultEndpointsProtocol=https;AccountName={account};AccountKey={key};EndpointSuffix=core.windows.net` |
//! | no | no | `DefaultEndpointsProtocol=https;EndpointSuffix=core.windows.net` |

/// Loopback address that marks a local storage emulator endpoint.
pub const EMULATOR_HOST: &str = "127.0.0.1";

/// Check whether `endpoint` points at a local storage emulator.
///
/// ## Returns
/// - (`bool`): `true` if the endpoint text contains [`EMULATOR_HOST`] anywhere.
pub fn is_emulator_endpoint(endpoint: &str) -> bool {
    endpoint.contains(EMULATOR_HOST)
}

/// Format a storage connection string.
///
/// ## Parameters
/// - `endpoint`: blob endpoint URL; only embedded for emulator endpoints.
/// - `full`: include account credentials.
/// - `account`, `key`: credentials, ignored unless `full` is set.
///
/// ## Examples
/// ```rust
/// use varmatrix_core::connection_string;
/// assert_eq!(
///     connection_string("https://acct.blob.core.windows.net", false, "", ""),
///     "DefaultEndpointsProtocol=https;EndpointSuffix=core.windows.net"
/// );
/// ```
pub fn connection_string(endpoint: &str, full: bool, account: &str, key: &str) -> String {
    match (is_emulator_endpoint(endpoint), full) {
        (true, true) => format!(
            "DefaultEndpointsProtocol=http;AccountName={account};AccountKey={key};BlobEndpoint={endpoint};"
        ),
        (true, false) => format!("DefaultEndpointsProtocol=http;BlobEndpoint={endpoint};"),
        (false, true) => format!(
            "DefaultEndpointsProtocol=https;AccountName={account};AccountKey={key};EndpointSuffix=core.windows.net"
        ),
        (false, false) => "DefaultEndpointsProtocol=https;EndpointSuffix=core.windows.net".to_string(),
    }
}
