//! Typed HTTP calls mirroring the server routes.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared_types::{
    Contact, ContactsResponse, CreateContactRequest, ErrorResponse, FieldError, HealthResponse,
    MessageResponse, UpdateContactRequest,
};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Api { details, .. } => details,
            ClientError::Network(_) => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Clone)]
pub struct ContactsApi {
    client: Client,
    base_url: String,
}

impl ContactsApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contacts_url(&self) -> String {
        format!("{}/api/contacts", self.base_url)
    }

    fn contact_url(&self, id: i64) -> String {
        format!("{}/api/contacts/{}", self.base_url, id)
    }

    pub async fn list_contacts(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<ContactsResponse, ClientError> {
        let mut query: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }

        tracing::debug!("GET {} {:?}", self.contacts_url(), query);
        let response = self
            .client
            .get(self.contacts_url())
            .query(&query)
            .send()
            .await?;

        Self::handle(response).await
    }

    pub async fn get_contact(&self, id: i64) -> Result<Contact, ClientError> {
        let response = self.client.get(self.contact_url(id)).send().await?;
        Self::handle(response).await
    }

    pub async fn create_contact(
        &self,
        request: &CreateContactRequest,
    ) -> Result<Contact, ClientError> {
        tracing::debug!("POST {}", self.contacts_url());
        let response = self
            .client
            .post(self.contacts_url())
            .json(request)
            .send()
            .await?;

        Self::handle(response).await
    }

    pub async fn update_contact(
        &self,
        id: i64,
        request: &UpdateContactRequest,
    ) -> Result<Contact, ClientError> {
        tracing::debug!("PUT {}", self.contact_url(id));
        let response = self
            .client
            .put(self.contact_url(id))
            .json(request)
            .send()
            .await?;

        Self::handle(response).await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<MessageResponse, ClientError> {
        tracing::debug!("DELETE {}", self.contact_url(id));
        let response = self.client.delete(self.contact_url(id)).send().await?;
        Self::handle(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let (message, details) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.error, body.details.unwrap_or_default()),
            Err(_) if !text.trim().is_empty() => (text, Vec::new()),
            Err(_) => (
                format!("Request failed with status code {}", status.as_u16()),
                Vec::new(),
            ),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

impl Default for ContactsApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
