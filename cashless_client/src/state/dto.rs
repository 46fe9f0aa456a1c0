use std::str::FromStr;

use cashless_core::helpers::dto::{PaymentMethod, QrPayload, Transaction, User, UserSummary};
use cashless_core::helpers::utils::parse_amount;
use serde::{Deserialize, Serialize};

use crate::devices::Capabilities;
use crate::notices::{Notice, NoticeKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Wallet,
    Pay,
    Qr,
    Transactions,
    Login,
    Register,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wallet" => Ok(Tab::Wallet),
            "pay" => Ok(Tab::Pay),
            "qr" => Ok(Tab::Qr),
            "transactions" | "history" => Ok(Tab::Transactions),
            "login" => Ok(Tab::Login),
            "register" => Ok(Tab::Register),
            other => Err(format!("Unknown tab: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub to_user: String,
    /// Display name of the recipient, when known.
    pub to_name: String,
    pub amount: String,
    pub description: String,
    pub method: PaymentMethod,
}

/// Everything the front end renders. Mutated only through
/// [`WalletState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletState {
    pub session: Session,
    pub tab: Tab,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub recharge_amount: String,
    pub payment_form: PaymentForm,
    pub search_query: String,
    pub search_results: Vec<UserSummary>,
    pub transactions: Vec<Transaction>,
    pub qr: Option<QrPayload>,
    pub error: Option<Notice>,
    pub success: Option<Notice>,
    pub loading: bool,
    pub nfc_reading: bool,
    pub scanning: bool,
    pub capabilities: Capabilities,
    pub(crate) notice_seq: u64,
    pub(crate) session_seq: u64,
}

impl WalletState {
    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some() && self.session.user.is_some()
    }

    /// Changes on every login, restore and logout. Results of requests
    /// started under an older generation are dropped.
    pub fn session_generation(&self) -> u64 {
        self.session_seq
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn balance(&self) -> Option<f64> {
        self.session.user.as_ref().map(|u| u.balance)
    }

    pub fn notice(&self, kind: NoticeKind) -> Option<&Notice> {
        match kind {
            NoticeKind::Error => self.error.as_ref(),
            NoticeKind::Success => self.success.as_ref(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|n| n.message.as_str())
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_ref().map(|n| n.message.as_str())
    }

    /// The pay button is enabled only with a recipient, a parseable amount
    /// and no request in flight.
    pub fn can_submit_payment(&self) -> bool {
        !self.loading
            && !self.payment_form.to_user.trim().is_empty()
            && parse_amount(&self.payment_form.amount).is_some()
    }
}
