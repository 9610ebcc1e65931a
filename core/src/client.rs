//! Stateless HTTP request builder and response parser for the users API.
//!
//! # Design
//! `UserClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the host executes the round trip in
//! between. Any 2xx is success. Non-2xx responses become `ClientError::Api`
//! carrying the body's `detail` when there is one. Nothing is retried.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::types::{NewUser, User, UserId, UserPage, UserUpdate};

/// Synchronous, stateless client for the users API.
#[derive(Debug, Clone)]
pub struct UserClient {
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_users(&self, page: u32, page_size: u32) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Get,
            format!("{}/users/?page={page}&page_size={page_size}", self.base_url),
        )
    }

    pub fn build_create_user(&self, input: &NewUser) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(input).map_err(|e| ClientError::Unknown(e.to_string()))?;
        Ok(HttpRequest::new(HttpMethod::Post, format!("{}/users/", self.base_url)).with_json_body(body))
    }

    pub fn build_update_user(&self, id: UserId, input: &UserUpdate) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(input).map_err(|e| ClientError::Unknown(e.to_string()))?;
        Ok(HttpRequest::new(HttpMethod::Put, format!("{}/users/{id}", self.base_url)).with_json_body(body))
    }

    pub fn build_delete_user(&self, id: UserId) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("{}/users/{id}", self.base_url))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<UserPage, ClientError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The returned record is authoritative; it may differ from the draft.
    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ClientError> {
        check_status(&response)?;
        decode::<Envelope<User>>(&response.body).map(Envelope::into_inner)
    }

    /// Update bodies vary between API versions (full record, partial or
    /// empty), so only the status is interpreted.
    pub fn parse_update_user(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response)
    }

    /// Deleting an id that no longer exists is an error, not a no-op.
    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response)
    }
}

/// Fold a transport outcome and a parser into one result.
pub fn settle<T>(
    result: Result<HttpResponse, TransportError>,
    parse: impl FnOnce(HttpResponse) -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    parse(result?)
}

/// Mutation responses come either wrapped as `{"message", "data"}` or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Unknown(format!("invalid response body: {e}")))
}

/// Map non-2xx status codes to `ClientError::Api`.
fn check_status(response: &HttpResponse) -> Result<(), ClientError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ClientError::Api {
        status: response.status,
        detail: error_detail(&response.body),
    })
}

/// Extract `detail` from an error body.
///
/// A string is taken verbatim; a list of `{"msg": ...}` objects, as sent for
/// request validation failures, is joined with `"; "`.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
