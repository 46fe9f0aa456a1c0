use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub enum Endpoints {
    Health,
    Login,
    Register,
    Profile,
    Recharge,
    Pay,
    Transactions,
    GenerateQr,
    RegisterNfc,
    PayByNfc(String),
    SearchUsers(String),
}

impl Endpoints {
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self)
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Endpoints::Health | Endpoints::Login | Endpoints::Register | Endpoints::PayByNfc(_)
        )
    }
}

impl fmt::Display for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoints::Health => write!(f, "/api/health"),
            Endpoints::Login => write!(f, "/api/login"),
            Endpoints::Register => write!(f, "/api/register"),
            Endpoints::Profile => write!(f, "/api/profile"),
            Endpoints::Recharge => write!(f, "/api/recharge"),
            Endpoints::Pay => write!(f, "/api/pay"),
            Endpoints::Transactions => write!(f, "/api/transactions"),
            Endpoints::GenerateQr => write!(f, "/api/generate-qr"),
            Endpoints::RegisterNfc => write!(f, "/api/register-nfc"),
            Endpoints::PayByNfc(nfc_id) => {
                write!(f, "/api/pay-by-nfc/{}", urlencoding::encode(nfc_id))
            }
            Endpoints::SearchUsers(query) => {
                write!(f, "/api/users/search?q={}", urlencoding::encode(query))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub balance: f64,
    #[serde(default)]
    pub nfc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Recharge,
    Nfc,
    Qr,
    Transfer,
    /// The server stores whatever payment method the payer sent.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Transfer,
    Qr,
    Nfc,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Transfer => write!(f, "transfer"),
            PaymentMethod::Qr => write!(f, "qr"),
            PaymentMethod::Nfc => write!(f, "nfc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub from_user: String,
    pub to_user: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub to_name: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Recharges and payments received count as incoming.
    pub fn is_incoming(&self, user_id: &str) -> bool {
        self.to_user == user_id
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RechargeRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RechargeResponse {
    #[serde(default)]
    pub message: String,
    pub new_balance: f64,
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentRequest {
    pub to_user: String,
    pub amount: f64,
    pub description: String,
    pub method: PaymentMethod,
}

impl From<(String, f64, String, PaymentMethod)> for PaymentRequest {
    fn from((to_user, amount, description, method): (String, f64, String, PaymentMethod)) -> Self {
        PaymentRequest {
            to_user,
            amount,
            description,
            method,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    #[serde(default)]
    pub message: String,
    pub transaction_id: String,
    pub new_balance: f64,
    pub recipient: String,
}

/// Server-issued QR code. `qr_image` is a base64 PNG kept as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    pub qr_data: String,
    pub qr_image: String,
    pub user_name: String,
}

impl QrPayload {
    pub fn png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.qr_image.as_bytes())
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterNfcRequest {
    pub nfc_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterNfcResponse {
    #[serde(default)]
    pub message: String,
    pub nfc_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NfcOwner {
    pub user_id: String,
    pub name: String,
    pub nfc_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let base = "http://localhost:8001/";
        assert_eq!(Endpoints::Login.url(base), "http://localhost:8001/api/login");
        assert_eq!(
            Endpoints::SearchUsers("ana maria".to_string()).url(base),
            "http://localhost:8001/api/users/search?q=ana%20maria"
        );
        assert_eq!(
            Endpoints::PayByNfc("tag/1".to_string()).url(base),
            "http://localhost:8001/api/pay-by-nfc/tag%2F1"
        );
        assert!(Endpoints::Profile.requires_auth());
        assert!(!Endpoints::Login.requires_auth());
        assert!(!Endpoints::PayByNfc("x".to_string()).requires_auth());
    }

    #[test]
    fn test_transaction_from_server_document() {
        let json = r#"{
            "id": "tx-1",
            "from_user": "system",
            "to_user": "u-1",
            "amount": 25.5,
            "description": "Recarga de saldo",
            "timestamp": "2025-03-01T10:15:30.123456",
            "type": "recharge",
            "from_name": "Sistema",
            "to_name": "Ana"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Recharge);
        assert_eq!(tx.from_name, "Sistema");
        assert!(tx.is_incoming("u-1"));
        assert!(!tx.is_incoming("u-2"));
    }

    #[test]
    fn test_history_tolerates_unknown_transaction_type() {
        let json = r#"[
            {
                "id": "tx-9",
                "from_user": "u-1",
                "to_user": "u-2",
                "amount": 3.0,
                "timestamp": "2025-03-02T09:00:00",
                "type": "pix"
            },
            {
                "id": "tx-8",
                "from_user": "u-1",
                "to_user": "u-2",
                "amount": 4.0,
                "timestamp": "2025-03-02T08:00:00",
                "type": "qr"
            }
        ]"#;

        let history: Vec<Transaction> = serde_json::from_str(json).unwrap();
        assert_eq!(history[0].kind, TransactionKind::Unknown);
        assert_eq!(history[1].kind, TransactionKind::Qr);
    }

    #[test]
    fn test_payment_request_wire_format() {
        let request = PaymentRequest::from((
            "u-2".to_string(),
            10.0,
            "lunch".to_string(),
            PaymentMethod::Nfc,
        ));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "nfc");
        assert_eq!(value["to_user"], "u-2");
    }

    #[test]
    fn test_qr_png_bytes() {
        let payload = QrPayload {
            qr_data: "cashless:u-1:Ana".to_string(),
            qr_image: STANDARD.encode(b"\x89PNG"),
            user_name: "Ana".to_string(),
        };
        assert_eq!(payload.png_bytes().unwrap(), b"\x89PNG".to_vec());
    }
}
