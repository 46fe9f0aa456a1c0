use cashless_core::helpers::dto::{PaymentMethod, QrPayload, Transaction, User, UserSummary};

use super::dto::{LoginForm, PaymentForm, RegisterForm, Session, Tab, WalletState};
use crate::devices::Capabilities;
use crate::notices::{Notice, NoticeKind};

#[derive(Debug, Clone)]
pub enum Action {
    DetectCapabilities(Capabilities),
    SetTab(Tab),
    UpdateLoginForm(LoginForm),
    UpdateRegisterForm(RegisterForm),
    SetRechargeAmount(String),
    UpdatePaymentForm(PaymentForm),
    SetSearchQuery(String),
    RequestStarted,
    RequestFinished,
    TokenRestored(String),
    LoggedIn { token: String, user: User },
    ProfileLoaded { session: u64, user: User },
    SessionCleared,
    RechargeSucceeded { session: u64, new_balance: f64 },
    PaymentSucceeded { session: u64, new_balance: f64 },
    TransactionsLoaded { session: u64, transactions: Vec<Transaction> },
    /// Ignored unless `query` is still the current search query.
    SearchResults { session: u64, query: String, users: Vec<UserSummary> },
    RecipientSelected { user_id: String, name: String, method: PaymentMethod },
    QrLoaded { session: u64, qr: QrPayload },
    NfcTagRegistered { session: u64, nfc_id: String },
    NfcReading(bool),
    Scanning(bool),
    SetNotice { kind: NoticeKind, message: String },
    /// Ignored unless notice `id` is still the one shown.
    ExpireNotice { kind: NoticeKind, id: u64 },
    ClearNotice(NoticeKind),
}

impl Action {
    fn session(&self) -> Option<u64> {
        match self {
            Action::ProfileLoaded { session, .. }
            | Action::RechargeSucceeded { session, .. }
            | Action::PaymentSucceeded { session, .. }
            | Action::TransactionsLoaded { session, .. }
            | Action::SearchResults { session, .. }
            | Action::QrLoaded { session, .. }
            | Action::NfcTagRegistered { session, .. } => Some(*session),
            _ => None,
        }
    }
}

impl WalletState {
    /// Results tagged with a `session` generation other than the current one
    /// belong to an ended session and are ignored.
    pub fn apply(&mut self, action: Action) {
        if let Some(session) = action.session() {
            if session != self.session_seq {
                return;
            }
        }

        match action {
            Action::DetectCapabilities(capabilities) => self.capabilities = capabilities,
            Action::SetTab(tab) => self.tab = tab,
            Action::UpdateLoginForm(form) => self.login_form = form,
            Action::UpdateRegisterForm(form) => self.register_form = form,
            Action::SetRechargeAmount(amount) => self.recharge_amount = amount,
            Action::UpdatePaymentForm(form) => self.payment_form = form,
            Action::SetSearchQuery(query) => self.search_query = query,
            Action::RequestStarted => self.loading = true,
            Action::RequestFinished => self.loading = false,
            Action::TokenRestored(token) => {
                self.session_seq += 1;
                self.session = Session {
                    token: Some(token),
                    user: None,
                }
            }
            Action::LoggedIn { token, user } => {
                self.session_seq += 1;
                self.session = Session {
                    token: Some(token),
                    user: Some(user),
                };
                self.login_form = LoginForm::default();
                self.register_form = RegisterForm::default();
                self.tab = Tab::Wallet;
            }
            Action::ProfileLoaded { user, .. } => self.session.user = Some(user),
            Action::SessionCleared => {
                self.session_seq += 1;
                self.session = Session::default();
                self.tab = Tab::default();
                self.recharge_amount.clear();
                self.payment_form = PaymentForm::default();
                self.search_query.clear();
                self.search_results.clear();
                self.transactions.clear();
                self.qr = None;
                self.nfc_reading = false;
                self.scanning = false;
            }
            Action::RechargeSucceeded { new_balance, .. } => {
                self.set_balance(new_balance);
                self.recharge_amount.clear();
            }
            Action::PaymentSucceeded { new_balance, .. } => {
                self.set_balance(new_balance);
                self.payment_form = PaymentForm::default();
                self.search_query.clear();
                self.search_results.clear();
            }
            Action::TransactionsLoaded { transactions, .. } => self.transactions = transactions,
            Action::SearchResults { query, users, .. } => {
                if query == self.search_query {
                    self.search_results = users;
                }
            }
            Action::RecipientSelected {
                user_id,
                name,
                method,
            } => {
                self.payment_form.to_user = user_id;
                self.payment_form.to_name = name;
                self.payment_form.method = method;
                self.search_query.clear();
                self.search_results.clear();
            }
            Action::QrLoaded { qr, .. } => self.qr = Some(qr),
            Action::NfcTagRegistered { nfc_id, .. } => {
                if let Some(user) = self.session.user.as_mut() {
                    user.nfc_id = Some(nfc_id);
                }
            }
            Action::NfcReading(reading) => self.nfc_reading = reading,
            Action::Scanning(scanning) => self.scanning = scanning,
            Action::SetNotice { kind, message } => {
                self.notice_seq += 1;
                let notice = Some(Notice {
                    id: self.notice_seq,
                    message,
                });
                match kind {
                    NoticeKind::Error => self.error = notice,
                    NoticeKind::Success => self.success = notice,
                }
            }
            Action::ExpireNotice { kind, id } => {
                let slot = match kind {
                    NoticeKind::Error => &mut self.error,
                    NoticeKind::Success => &mut self.success,
                };
                if slot.as_ref().is_some_and(|n| n.id == id) {
                    *slot = None;
                }
            }
            Action::ClearNotice(kind) => match kind {
                NoticeKind::Error => self.error = None,
                NoticeKind::Success => self.success = None,
            },
        }
    }

    pub(crate) fn is_current_session(&self, session: u64) -> bool {
        self.session_seq == session
    }

    fn set_balance(&mut self, balance: f64) {
        if let Some(user) = self.session.user.as_mut() {
            user.balance = balance;
        }
    }
}
