use mpg_common::Vnd;
use serde::{Deserialize, Serialize};

/// MoMo rejects transactions below this amount (whole dong).
pub const MIN_TRANSACTION_AMOUNT: Vnd = Vnd::new(1000);

/// The only request type this gateway integration issues.
pub const REQUEST_TYPE: &str = "captureWallet";

pub const DEFAULT_LANG: &str = "vi";

/// MoMo reports success with result code zero, everywhere.
pub const RESULT_CODE_SUCCESS: i64 = 0;

/// The payload POSTed to the gateway's create endpoint. Field names must match the wire contract
/// bit-for-bit; the signature covers most of them (see [`crate::signature`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentRequest {
    pub partner_code: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub request_type: String,
    pub extra_data: String,
    pub lang: String,
    pub signature: String,
}

/// The gateway's answer to a create request. On failure (`result_code != 0`) the URL fields are
/// absent, so everything optional defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentResponse {
    #[serde(default)]
    pub partner_code: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub response_time: i64,
    #[serde(default)]
    pub message: String,
    pub result_code: i64,
    #[serde(default)]
    pub pay_url: String,
    #[serde(default)]
    pub deeplink: String,
    #[serde(default)]
    pub qr_code_url: String,
    #[serde(default)]
    pub signature: String,
}

/// What the caller supplies to initiate a payment. Correlation ids are generated by the client,
/// not the caller.
#[derive(Debug, Clone)]
pub struct NewMomoPayment {
    /// Settlement amount in whole dong. Must already be at or above [`MIN_TRANSACTION_AMOUNT`].
    pub amount: Vnd,
    /// Human-readable description shown to the payer in the MoMo app.
    pub order_info: String,
    /// Where MoMo redirects the payer's browser after the payment attempt.
    pub redirect_url: String,
    /// Where MoMo POSTs the server-to-server notification.
    pub ipn_url: String,
}

/// A successfully created, provider-hosted payment.
#[derive(Debug, Clone)]
pub struct CreatedMomoPayment {
    pub pay_url: String,
    pub deeplink: Option<String>,
    pub qr_code_url: Option<String>,
    /// The request correlation id we generated for this attempt.
    pub request_id: String,
    /// The provider-order id we generated for this attempt. Callbacks carry it as `orderId`.
    pub momo_order_id: String,
    /// The gateway's response body, verbatim, for audit storage.
    pub raw_response: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_wire_names() {
        let req = MomoPaymentRequest {
            partner_code: "MOMO".into(),
            request_id: "rid-1".into(),
            amount: 50000,
            order_id: "MOMO-1-0001".into(),
            order_info: "order".into(),
            redirect_url: "https://example.com/return".into(),
            ipn_url: "https://example.com/ipn".into(),
            request_type: REQUEST_TYPE.into(),
            extra_data: String::new(),
            lang: DEFAULT_LANG.into(),
            signature: "abc".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        let keys = json.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        for key in [
            "partnerCode",
            "requestId",
            "amount",
            "orderId",
            "orderInfo",
            "redirectUrl",
            "ipnUrl",
            "requestType",
            "extraData",
            "lang",
            "signature",
        ] {
            assert!(keys.contains(&key.to_string()), "missing wire field {key}");
        }
    }

    #[test]
    fn failure_response_deserializes_without_urls() {
        let body = r#"{"partnerCode":"MOMO","requestId":"rid-1","orderId":"MOMO-1-0001",
            "amount":50000,"responseTime":1700000000000,"message":"Bad signature","resultCode":41}"#;
        let resp: MomoPaymentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.result_code, 41);
        assert!(resp.pay_url.is_empty());
    }
}
