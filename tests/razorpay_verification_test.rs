use hmac::{Hmac, Mac};
use sha2::Sha256;

use ladle::application::ports::{ChargeVerification, PaymentError, PaymentGateway};
use ladle::infrastructure::payments::RazorpayGateway;

const KEY_ID: &str = "rzp_test_key";
const KEY_SECRET: &str = "rzp_test_secret";

fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn gateway() -> RazorpayGateway {
    RazorpayGateway::new(KEY_ID.to_string(), KEY_SECRET.to_string())
}

#[tokio::test]
async fn given_valid_signature_when_verifying_then_succeeds() {
    let verification = ChargeVerification {
        payment_id: "pay_123".to_string(),
        order_id: Some("order_456".to_string()),
        signature: Some(sign("order_456", "pay_123", KEY_SECRET)),
    };

    assert!(gateway().verify_charge(&verification).await.is_ok());
}

#[tokio::test]
async fn given_signature_from_wrong_secret_when_verifying_then_rejected() {
    let verification = ChargeVerification {
        payment_id: "pay_123".to_string(),
        order_id: Some("order_456".to_string()),
        signature: Some(sign("order_456", "pay_123", "attacker-secret")),
    };

    let result = gateway().verify_charge(&verification).await;
    assert!(matches!(result, Err(PaymentError::VerificationFailed(_))));
}

#[tokio::test]
async fn given_signature_over_wrong_order_when_verifying_then_rejected() {
    let verification = ChargeVerification {
        payment_id: "pay_123".to_string(),
        order_id: Some("order_456".to_string()),
        signature: Some(sign("order_999", "pay_123", KEY_SECRET)),
    };

    let result = gateway().verify_charge(&verification).await;
    assert!(matches!(result, Err(PaymentError::VerificationFailed(_))));
}

#[tokio::test]
async fn given_missing_order_id_when_verifying_then_invalid_request() {
    let verification = ChargeVerification {
        payment_id: "pay_123".to_string(),
        order_id: None,
        signature: Some("deadbeef".to_string()),
    };

    let result = gateway().verify_charge(&verification).await;
    assert!(matches!(result, Err(PaymentError::InvalidRequest(_))));
}

#[tokio::test]
async fn given_non_hex_signature_when_verifying_then_rejected() {
    let verification = ChargeVerification {
        payment_id: "pay_123".to_string(),
        order_id: Some("order_456".to_string()),
        signature: Some("not-hex!".to_string()),
    };

    let result = gateway().verify_charge(&verification).await;
    assert!(matches!(result, Err(PaymentError::VerificationFailed(_))));
}
