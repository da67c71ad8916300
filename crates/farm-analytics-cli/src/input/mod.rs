pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve a request from `--input`, falling back to piped stdin.
pub fn request<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => file::read_json(p).map(Some),
        None => stdin::read_stdin(),
    }
}
