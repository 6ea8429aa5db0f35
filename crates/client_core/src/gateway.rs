use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, Contact, ContactId},
    error::ApiErrorBody,
    protocol::{CategoryFilter, ContactFields, ContactFilter},
};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::{GatewayError, GatewayResult},
};

#[async_trait]
pub trait ContactGateway: Send + Sync {
    async fn list_contacts(&self, filter: &ContactFilter) -> GatewayResult<Vec<Contact>>;
    async fn get_contact(&self, id: &ContactId) -> GatewayResult<Contact>;
    async fn create_contact(&self, fields: &ContactFields) -> GatewayResult<Contact>;
    async fn update_contact(
        &self,
        id: &ContactId,
        fields: &ContactFields,
    ) -> GatewayResult<Contact>;
    async fn delete_contact(&self, id: &ContactId) -> GatewayResult<()>;
    async fn list_categories(&self, filter: &CategoryFilter) -> GatewayResult<Vec<Category>>;
}

pub struct HttpContactGateway {
    http: Client,
    base_url: String,
}

impl HttpContactGateway {
    pub fn new(settings: &ClientSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| GatewayError::malformed(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(http, settings.api_base_url.clone()))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                GatewayError::malformed(format!(
                    "API base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<(StatusCode, Vec<u8>)> {
        let response = request.send().await.map_err(GatewayError::from_transport)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::no_response(format!("response body interrupted: {e}")))?;
        debug!(operation, %status, bytes = body.len(), "contacts api responded");

        if !status.is_success() {
            return Err(GatewayError::rejected(
                status,
                ApiErrorBody::message_from_bytes(&body),
            ));
        }
        Ok((status, body.to_vec()))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<T> {
        let (status, body) = self.execute(operation, request).await?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::Rejected {
            status,
            message: format!("unexpected response body: {e}"),
        })
    }
}

#[async_trait]
impl ContactGateway for HttpContactGateway {
    async fn list_contacts(&self, filter: &ContactFilter) -> GatewayResult<Vec<Contact>> {
        let url = self.endpoint(&["contacts"])?;
        debug!(%url, name = %filter.name, order_by = %filter.order_by, "listing contacts");
        self.execute_json("list_contacts", self.http.get(url).query(filter))
            .await
    }

    async fn get_contact(&self, id: &ContactId) -> GatewayResult<Contact> {
        let url = self.endpoint(&["contacts", id.as_str()])?;
        debug!(%url, "fetching contact");
        self.execute_json("get_contact", self.http.get(url)).await
    }

    async fn create_contact(&self, fields: &ContactFields) -> GatewayResult<Contact> {
        let url = self.endpoint(&["contacts"])?;
        debug!(%url, "creating contact");
        self.execute_json("create_contact", self.http.post(url).json(&fields.normalized()))
            .await
    }

    async fn update_contact(
        &self,
        id: &ContactId,
        fields: &ContactFields,
    ) -> GatewayResult<Contact> {
        let url = self.endpoint(&["contacts", id.as_str()])?;
        debug!(%url, "updating contact");
        self.execute_json("update_contact", self.http.put(url).json(&fields.normalized()))
            .await
    }

    async fn delete_contact(&self, id: &ContactId) -> GatewayResult<()> {
        let url = self.endpoint(&["contacts", id.as_str()])?;
        debug!(%url, "deleting contact");
        self.execute("delete_contact", self.http.delete(url)).await?;
        Ok(())
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> GatewayResult<Vec<Category>> {
        let url = self.endpoint(&["categories"])?;
        debug!(%url, order_by = %filter.order_by, "listing categories");
        self.execute_json("list_categories", self.http.get(url).query(filter))
            .await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
