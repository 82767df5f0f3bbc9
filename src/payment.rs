//! Thin client for the payment provider's REST API.
//!
//! Three direct calls, no retries and no idempotency keys; callers wrap
//! them in their own database transaction and treat any failure as
//! all-or-nothing.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Event, SafeUser};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payment provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("checkout session response carried no URL")]
    MissingSessionUrl,
}

/// External ids of a created product and its price.
#[derive(Debug, Clone)]
pub struct ProductRefs {
    pub product_ref: String,
    pub price_ref: String,
}

/// Redirect targets for a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success: String,
    pub cancel: String,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl PaymentClient {
    /// `api_url` is the provider's REST base URL; injectable so tests can
    /// point at a mock server.
    pub fn new(api_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Registers `user` as a customer at the provider, returning the
    /// external customer id.
    pub async fn create_customer(&self, user: &SafeUser) -> Result<String, PaymentError> {
        let response: CustomerResponse = self
            .post_form("/v1/customers", &[
                ("email", user.email.clone()),
                ("preferred_locales[0]", "DK".to_string()),
            ])
            .await?;

        Ok(response.id)
    }

    /// Creates a product for `event` and a price of `amount` minor units,
    /// returning both external ids. Two sequential calls; a price failure
    /// leaves an orphaned product at the provider, which the enclosing
    /// database transaction treats as "product not created".
    pub async fn create_product(
        &self,
        event: &Event,
        amount: i64,
    ) -> Result<ProductRefs, PaymentError> {
        let product: ProductResponse = self
            .post_form("/v1/products", &[("name", event.name.clone())])
            .await?;

        let price: PriceResponse = self
            .post_form("/v1/prices", &[
                ("product", product.id.clone()),
                ("unit_amount", amount.to_string()),
                ("currency", "dkk".to_string()),
            ])
            .await?;

        Ok(ProductRefs {
            product_ref: product.id,
            price_ref: price.id,
        })
    }

    /// Opens a card checkout session for `quantity` units of `price_ref`,
    /// returning the session URL the client is redirected to.
    pub async fn create_checkout_session(
        &self,
        customer_ref: &str,
        price_ref: &str,
        quantity: i32,
        urls: &CheckoutUrls,
    ) -> Result<String, PaymentError> {
        let response: SessionResponse = self
            .post_form("/v1/checkout/sessions", &[
                ("payment_method_types[0]", "card".to_string()),
                ("customer", customer_ref.to_string()),
                ("line_items[0][price]", price_ref.to_string()),
                ("line_items[0][quantity]", quantity.to_string()),
                ("mode", "payment".to_string()),
                ("success_url", urls.success.clone()),
                ("cancel_url", urls.cancel.clone()),
            ])
            .await?;

        response.url.ok_or(PaymentError::MissingSessionUrl)
    }

    async fn post_form<T>(&self, path: &str, form: &[(&str, String)]) -> Result<T, PaymentError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockito::Matcher;
    use uuid::Uuid;

    use crate::models::UserRole;

    fn sample_user() -> SafeUser {
        SafeUser {
            id: Uuid::new_v4(),
            role: UserRole::Guest,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn sample_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "LAN Party".to_string(),
            description: "Bring your own rig".to_string(),
            location: "Aarhus".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            creator_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn create_customer_returns_external_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/customers")
            .match_body(Matcher::UrlEncoded(
                "email".into(),
                "ada@example.com".into(),
            ))
            .with_status(200)
            .with_body(r#"{"id":"cus_123"}"#)
            .create_async()
            .await;

        let client = PaymentClient::new(server.url(), "sk_test");
        let customer_ref = client.create_customer(&sample_user()).await.unwrap();

        assert_eq!(customer_ref, "cus_123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_product_chains_product_and_price() {
        let mut server = mockito::Server::new_async().await;
        let product_mock = server
            .mock("POST", "/v1/products")
            .match_body(Matcher::UrlEncoded("name".into(), "LAN Party".into()))
            .with_status(200)
            .with_body(r#"{"id":"prod_1"}"#)
            .create_async()
            .await;
        let price_mock = server
            .mock("POST", "/v1/prices")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("product".into(), "prod_1".into()),
                Matcher::UrlEncoded("unit_amount".into(), "100".into()),
                Matcher::UrlEncoded("currency".into(), "dkk".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id":"price_1"}"#)
            .create_async()
            .await;

        let client = PaymentClient::new(server.url(), "sk_test");
        let refs = client.create_product(&sample_event(), 100).await.unwrap();

        assert_eq!(refs.product_ref, "prod_1");
        assert_eq!(refs.price_ref, "price_1");
        product_mock.assert_async().await;
        price_mock.assert_async().await;
    }

    #[tokio::test]
    async fn checkout_session_returns_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/checkout/sessions")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("customer".into(), "cus_123".into()),
                Matcher::UrlEncoded("line_items[0][price]".into(), "price_1".into()),
                Matcher::UrlEncoded("line_items[0][quantity]".into(), "2".into()),
                Matcher::UrlEncoded("mode".into(), "payment".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"url":"https://pay.example/session"}"#)
            .create_async()
            .await;

        let client = PaymentClient::new(server.url(), "sk_test");
        let urls = CheckoutUrls {
            success: "https://api.example/tickets/payment-callback?key=abc".to_string(),
            cancel: "https://app.example/events/1".to_string(),
        };
        let url = client
            .create_checkout_session("cus_123", "price_1", 2, &urls)
            .await
            .unwrap();

        assert_eq!(url, "https://pay.example/session");
    }

    #[tokio::test]
    async fn missing_session_url_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/checkout/sessions")
            .with_status(200)
            .with_body(r#"{"url":null}"#)
            .create_async()
            .await;

        let client = PaymentClient::new(server.url(), "sk_test");
        let urls = CheckoutUrls {
            success: "https://api.example/cb".to_string(),
            cancel: "https://app.example".to_string(),
        };
        let result = client
            .create_checkout_session("cus_123", "price_1", 1, &urls)
            .await;

        assert!(matches!(result, Err(PaymentError::MissingSessionUrl)));
    }

    #[tokio::test]
    async fn provider_error_status_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/customers")
            .with_status(402)
            .with_body(r#"{"error":{"message":"insufficient"}}"#)
            .create_async()
            .await;

        let client = PaymentClient::new(server.url(), "sk_test");
        let result = client.create_customer(&sample_user()).await;

        assert!(matches!(
            result,
            Err(PaymentError::Api { status: 402, .. })
        ));
    }
}
