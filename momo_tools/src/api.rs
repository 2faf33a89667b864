use std::sync::Arc;

use chrono::Utc;
use log::*;
use rand::Rng;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use uuid::Uuid;

use crate::{
    config::MomoConfig,
    data_objects::{
        CreatedMomoPayment,
        MomoPaymentRequest,
        MomoPaymentResponse,
        NewMomoPayment,
        REQUEST_TYPE,
        RESULT_CODE_SUCCESS,
    },
    signature::{request_signing_string, sign},
    MomoApiError,
};

#[derive(Clone)]
pub struct MomoApi {
    config: MomoConfig,
    client: Arc<Client>,
}

impl MomoApi {
    pub fn new(config: MomoConfig) -> Result<Self, MomoApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MomoApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MomoConfig {
        &self.config
    }

    pub fn create_url(&self) -> String {
        format!("{}/v2/gateway/api/create", self.config.endpoint)
    }

    /// Asks the gateway to host a payment for `payment.amount` and returns the hosted URL with
    /// the correlation ids this call generated. The caller persists those ids; the asynchronous
    /// callback carries them back.
    pub async fn create_payment(&self, payment: NewMomoPayment) -> Result<CreatedMomoPayment, MomoApiError> {
        let request_id = Uuid::new_v4().to_string();
        let momo_order_id = self.new_momo_order_id();
        let mut request = MomoPaymentRequest {
            partner_code: self.config.partner_code.clone(),
            request_id: request_id.clone(),
            amount: payment.amount.value(),
            order_id: momo_order_id.clone(),
            order_info: payment.order_info,
            redirect_url: payment.redirect_url,
            ipn_url: payment.ipn_url,
            request_type: REQUEST_TYPE.to_string(),
            extra_data: String::new(),
            lang: self.config.lang.clone(),
            signature: String::new(),
        };
        let payload = request_signing_string(self.config.access_key.reveal(), &request);
        request.signature = sign(self.config.secret_key.reveal(), &payload);
        trace!("💸️ Submitting payment request [{request_id}] to {}", self.create_url());
        let response = self
            .client
            .post(self.create_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| MomoApiError::RequestError(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| MomoApiError::ResponseError(e.to_string()))?;
        if !status.is_success() {
            warn!("💸️ Gateway returned {status} for request [{request_id}]");
            return Err(MomoApiError::QueryError { status: status.as_u16(), message: body });
        }
        let parsed =
            serde_json::from_str::<MomoPaymentResponse>(&body).map_err(|e| MomoApiError::JsonError(e.to_string()))?;
        if parsed.result_code != RESULT_CODE_SUCCESS {
            warn!("💸️ Gateway declined request [{request_id}]: {} ({})", parsed.message, parsed.result_code);
            return Err(MomoApiError::ProviderError { code: parsed.result_code, message: parsed.message });
        }
        debug!("💸️ Payment [{momo_order_id}] hosted at gateway. Request id [{request_id}]");
        Ok(CreatedMomoPayment {
            pay_url: parsed.pay_url,
            deeplink: (!parsed.deeplink.is_empty()).then_some(parsed.deeplink),
            qr_code_url: (!parsed.qr_code_url.is_empty()).then_some(parsed.qr_code_url),
            request_id,
            momo_order_id,
            raw_response: body,
        })
    }

    /// Provider-order ids must be unique per attempt and are distinct from the internal order id.
    fn new_momo_order_id(&self) -> String {
        let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
        format!("{}-{}-{suffix:04}", self.config.partner_code, Utc::now().timestamp_millis())
    }
}
