//! Canonical MoMo signing strings and HMAC computation.
//!
//! MoMo signs requests and callbacks over a `key=value&key=value...` string whose key order is
//! fixed by the wire contract. A single misordered or mis-cased field invalidates every request,
//! so the canonical order lives here as explicit ordered slices and the strings are built by
//! iteration — never from a serialized map, whose key order is not ours to rely on.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::data_objects::MomoPaymentRequest;

type HmacSha256 = Hmac<Sha256>;

/// The callback fields covered by the signature, in canonical order.
pub const CALLBACK_SIGNATURE_FIELDS: [&str; 12] = [
    "amount",
    "extraData",
    "message",
    "orderId",
    "orderInfo",
    "orderType",
    "partnerCode",
    "payType",
    "requestId",
    "responseTime",
    "resultCode",
    "transId",
];

/// Builds the signing string for an outbound create request:
/// `accessKey={K}&amount={A}&extraData={E}&ipnUrl={I}&orderId={O}&orderInfo={N}&partnerCode={P}&redirectUrl={R}&requestId={Q}&requestType={T}`
pub fn request_signing_string(access_key: &str, req: &MomoPaymentRequest) -> String {
    let amount = req.amount.to_string();
    let fields: [(&str, &str); 10] = [
        ("accessKey", access_key),
        ("amount", &amount),
        ("extraData", &req.extra_data),
        ("ipnUrl", &req.ipn_url),
        ("orderId", &req.order_id),
        ("orderInfo", &req.order_info),
        ("partnerCode", &req.partner_code),
        ("redirectUrl", &req.redirect_url),
        ("requestId", &req.request_id),
        ("requestType", &req.request_type),
    ];
    join_fields(&fields)
}

/// Builds the signing string for an inbound callback (redirect return or IPN). Fields the
/// provider did not send contribute an empty value, matching how MoMo signs them.
pub fn callback_signing_string(access_key: &str, fields: &HashMap<String, String>) -> String {
    let mut pairs = Vec::with_capacity(CALLBACK_SIGNATURE_FIELDS.len() + 1);
    pairs.push(("accessKey", access_key));
    for key in CALLBACK_SIGNATURE_FIELDS {
        let value = fields.get(key).map(String::as_str).unwrap_or_default();
        pairs.push((key, value));
    }
    join_fields(&pairs)
}

fn join_fields(fields: &[(&str, &str)]) -> String {
    fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<String>>().join("&")
}

/// HMAC-SHA256 over the payload, hex-encoded lowercase — the signature format MoMo expects on
/// every request.
pub fn sign(secret_key: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a callback's signature in constant time. Returns `false` for a missing signature,
/// a signature that is not valid hex, or a digest mismatch.
pub fn verify_callback(access_key: &str, secret_key: &str, fields: &HashMap<String, String>) -> bool {
    let supplied = match fields.get("signature") {
        Some(s) => s,
        None => return false,
    };
    let supplied = match hex::decode(supplied) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let payload = callback_signing_string(access_key, fields);
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_objects::{DEFAULT_LANG, REQUEST_TYPE};

    // The MoMo sandbox credentials published in the gateway's developer documentation.
    const ACCESS_KEY: &str = "F8BBA842ECF85";
    const SECRET_KEY: &str = "K951B6PE1waDMi640xX08PD3vg6EkVlz";

    fn sample_request() -> MomoPaymentRequest {
        MomoPaymentRequest {
            partner_code: "MOMO".into(),
            request_id: "9f3a61e0-5d5e-4c7b-9e3e-0a1b2c3d4e5f".into(),
            amount: 50000,
            order_id: "MOMO-1700000000000-1234".into(),
            order_info: "UI component marketplace order".into(),
            redirect_url: "https://example.com/payment/return".into(),
            ipn_url: "https://api.example.com/payments/momo/ipn".into(),
            request_type: REQUEST_TYPE.into(),
            extra_data: String::new(),
            lang: DEFAULT_LANG.into(),
            signature: String::new(),
        }
    }

    fn sample_callback() -> HashMap<String, String> {
        [
            ("partnerCode", "MOMO"),
            ("orderId", "MOMO-1700000000000-1234"),
            ("requestId", "9f3a61e0-5d5e-4c7b-9e3e-0a1b2c3d4e5f"),
            ("amount", "50000"),
            ("orderInfo", "UI component marketplace order"),
            ("orderType", "momo_wallet"),
            ("transId", "4088878653"),
            ("resultCode", "0"),
            ("message", "Successful."),
            ("payType", "qr"),
            ("responseTime", "1700000012345"),
            ("extraData", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn request_signing_string_uses_canonical_field_order() {
        let s = request_signing_string(ACCESS_KEY, &sample_request());
        assert_eq!(
            s,
            "accessKey=F8BBA842ECF85&amount=50000&extraData=&\
             ipnUrl=https://api.example.com/payments/momo/ipn&orderId=MOMO-1700000000000-1234&\
             orderInfo=UI component marketplace order&partnerCode=MOMO&\
             redirectUrl=https://example.com/payment/return&\
             requestId=9f3a61e0-5d5e-4c7b-9e3e-0a1b2c3d4e5f&requestType=captureWallet"
        );
    }

    #[test]
    fn request_signature_matches_golden_vector() {
        let payload = request_signing_string(ACCESS_KEY, &sample_request());
        assert_eq!(
            sign(SECRET_KEY, &payload),
            "c4450d86d193ec3d181b16ba1d24b014ac86584c6a52c211e1c5952f268d38de"
        );
    }

    #[test]
    fn signing_is_deterministic_and_field_sensitive() {
        let payload = request_signing_string(ACCESS_KEY, &sample_request());
        assert_eq!(sign(SECRET_KEY, &payload), sign(SECRET_KEY, &payload));

        let mut changed = sample_request();
        changed.amount += 1;
        let changed_payload = request_signing_string(ACCESS_KEY, &changed);
        assert_ne!(sign(SECRET_KEY, &payload), sign(SECRET_KEY, &changed_payload));
    }

    #[test]
    fn callback_signature_matches_golden_vector() {
        let payload = callback_signing_string(ACCESS_KEY, &sample_callback());
        assert_eq!(
            sign(SECRET_KEY, &payload),
            "1bf873d5bb4375a5ddbd70b682a52a56d8fb9ea747da4cc37d6b001c0495d314"
        );
    }

    #[test]
    fn valid_callback_verifies() {
        let mut fields = sample_callback();
        let payload = callback_signing_string(ACCESS_KEY, &fields);
        fields.insert("signature".to_string(), sign(SECRET_KEY, &payload));
        assert!(verify_callback(ACCESS_KEY, SECRET_KEY, &fields));
    }

    #[test]
    fn tampered_callback_is_rejected() {
        let mut fields = sample_callback();
        let payload = callback_signing_string(ACCESS_KEY, &fields);
        let mut sig = sign(SECRET_KEY, &payload);
        // Flip one character of the hex digest
        let flipped = if sig.ends_with('0') { "1" } else { "0" };
        sig.replace_range(sig.len() - 1.., flipped);
        fields.insert("signature".to_string(), sig);
        assert!(!verify_callback(ACCESS_KEY, SECRET_KEY, &fields));
    }

    #[test]
    fn tampered_field_is_rejected() {
        let mut fields = sample_callback();
        let payload = callback_signing_string(ACCESS_KEY, &fields);
        fields.insert("signature".to_string(), sign(SECRET_KEY, &payload));
        fields.insert("amount".to_string(), "99999".to_string());
        assert!(!verify_callback(ACCESS_KEY, SECRET_KEY, &fields));
    }

    #[test]
    fn missing_or_malformed_signature_is_rejected() {
        let fields = sample_callback();
        assert!(!verify_callback(ACCESS_KEY, SECRET_KEY, &fields));

        let mut fields = sample_callback();
        fields.insert("signature".to_string(), "not-hex-at-all".to_string());
        assert!(!verify_callback(ACCESS_KEY, SECRET_KEY, &fields));
    }
}
