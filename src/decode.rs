use serde::de::DeserializeOwned;

use crate::error::{HarnessError, Result};

/// Parses a single JSON object. `context` names the request for error reports.
pub fn decode_one<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| HarnessError::Decode {
        context: context.to_string(),
        source,
    })
}

/// Parses a JSON array, keeping server order.
pub fn decode_list<T: DeserializeOwned>(body: &str, context: &str) -> Result<Vec<T>> {
    decode_one::<Vec<T>>(body, context)
}
