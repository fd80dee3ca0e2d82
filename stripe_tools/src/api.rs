use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{CheckoutSession, NewCheckoutSession},
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Stripe's API takes `application/x-www-form-urlencoded` request bodies and returns JSON.
    pub async fn form_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.form(params);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    /// Requests a hosted checkout session. The returned session handle is passed back to the caller unmodified;
    /// no local state is created until the completion webhook is reconciled.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        let params = checkout_session_params(session);
        debug!("Requesting checkout session for {}", session.customer_email);
        let created = self.form_query::<CheckoutSession>(Method::POST, "/checkout/sessions", &params).await?;
        info!("Checkout session {} created", created.id);
        Ok(created)
    }
}

fn checkout_session_params(session: &NewCheckoutSession) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), session.success_url.clone()),
        ("cancel_url".to_string(), session.cancel_url.clone()),
        ("customer_email".to_string(), session.customer_email.clone()),
        ("client_reference_id".to_string(), session.client_reference_id.clone()),
        ("metadata[cart]".to_string(), session.cart_metadata.clone()),
    ];
    for (i, item) in session.line_items.iter().enumerate() {
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        params.push((format!("line_items[{i}][price_data][currency]"), item.currency.clone()));
        params.push((format!("line_items[{i}][price_data][unit_amount]"), item.unit_amount.to_string()));
        params.push((format!("line_items[{i}][price_data][product_data][name]"), item.name.clone()));
        if let Some(desc) = &item.description {
            params.push((format!("line_items[{i}][price_data][product_data][description]"), desc.clone()));
        }
    }
    params
}
