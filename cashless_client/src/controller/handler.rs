use std::sync::Arc;

use cashless_core::error::{ClientError, ClientResult};
use cashless_core::helpers::dto::{
    AuthResponse, LoginRequest, PaymentMethod, PaymentRequest, QrPayload, RegisterRequest,
    Transaction, User, UserSummary,
};
use cashless_core::helpers::payload::PaymentTag;
use cashless_core::helpers::utils::{format_amount, parse_amount};
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::devices::{
    Camera, CameraScanner, Capabilities, Facing, NfcDevice, UnavailableCamera, UnavailableNfc,
};
use crate::notices::{NoticeKind, NoticeTimers, NOTICE_TTL};
use crate::services::Services;
use crate::session::SessionStore;
use crate::state::{Action, LoginForm, PaymentForm, RegisterForm, Tab, WalletState};

const MIN_SEARCH_CHARS: usize = 2;

struct Inner {
    state: WalletState,
    timers: NoticeTimers,
    scanner: CameraScanner,
}

/// Dropping the controller aborts pending notice timers and releases the
/// camera.
pub struct WalletController {
    services: Services,
    store: SessionStore,
    camera: Arc<dyn Camera>,
    nfc: Arc<dyn NfcDevice>,
    inner: Arc<Mutex<Inner>>,
}

impl WalletController {
    pub fn new(
        services: Services,
        store: SessionStore,
        camera: Arc<dyn Camera>,
        nfc: Arc<dyn NfcDevice>,
    ) -> Self {
        let inner = Inner {
            state: WalletState::default(),
            timers: NoticeTimers::default(),
            scanner: CameraScanner::default(),
        };

        Self {
            services,
            store,
            camera,
            nfc,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Opens the session database and wires a controller with no device
    /// capabilities.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let db = sled::open(&config.db_path)?;
        let store = SessionStore::new(&db)?;
        let services = Services::new(config.api_url.clone())?;

        Ok(Self::new(
            services,
            store,
            Arc::new(UnavailableCamera),
            Arc::new(UnavailableNfc),
        ))
    }

    /// Startup steps: capability detection, then session rehydration.
    pub async fn initialize(&self) -> ClientResult<()> {
        let capabilities = Capabilities {
            camera: self.camera.available(),
            nfc: self.nfc.available(),
        };
        info!(
            "🔧 Device capabilities - camera: {}, nfc: {}",
            capabilities.camera, capabilities.nfc
        );
        self.dispatch(Action::DetectCapabilities(capabilities)).await;

        self.restore_session().await
    }

    pub async fn snapshot(&self) -> WalletState {
        self.inner.lock().await.state.clone()
    }

    pub async fn dispatch(&self, action: Action) {
        self.inner.lock().await.state.apply(action);
    }

    /// Shows a notice and (re)starts its expiry timer.
    pub async fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.state.apply(Action::SetNotice {
            kind,
            message: message.into(),
        });

        let Some(id) = inner.state.notice(kind).map(|n| n.id) else {
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(NOTICE_TTL).await;
            if let Some(inner) = weak.upgrade() {
                inner.lock().await.state.apply(Action::ExpireNotice { kind, id });
            }
        });

        inner.timers.replace(kind, handle);
    }

    pub async fn clear_notice(&self, kind: NoticeKind) {
        let mut inner = self.inner.lock().await;
        inner.timers.cancel(kind);
        inner.state.apply(Action::ClearNotice(kind));
    }

    pub async fn update_login_form(&self, form: LoginForm) {
        self.dispatch(Action::UpdateLoginForm(form)).await;
    }

    pub async fn update_register_form(&self, form: RegisterForm) {
        self.dispatch(Action::UpdateRegisterForm(form)).await;
    }

    pub async fn set_recharge_amount(&self, amount: impl Into<String>) {
        self.dispatch(Action::SetRechargeAmount(amount.into())).await;
    }

    pub async fn update_payment_form(&self, form: PaymentForm) {
        self.dispatch(Action::UpdatePaymentForm(form)).await;
    }

    async fn begin_request(&self) -> ClientResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.state.loading {
            warn!("⏳ Ignoring submission while another request is in flight");
            return Err(ClientError::Busy);
        }
        inner.state.apply(Action::RequestStarted);
        Ok(())
    }

    async fn finish_request(&self) {
        self.dispatch(Action::RequestFinished).await;
    }

    /// The bearer token together with the session generation it belongs to.
    async fn credentials(&self) -> ClientResult<(String, u64)> {
        let inner = self.inner.lock().await;
        let token = inner
            .state
            .session
            .token
            .clone()
            .ok_or(ClientError::NotAuthenticated)?;
        Ok((token, inner.state.session_generation()))
    }

    /// Applies the result of a request made under `session`. Returns `false`
    /// when that session has ended in the meantime.
    async fn dispatch_result(&self, session: u64, action: Action) -> bool {
        let mut inner = self.inner.lock().await;
        let current = inner.state.is_current_session(session);
        if !current {
            debug!("Dropping a response that arrived after its session ended");
        }
        inner.state.apply(action);
        current
    }

    fn clear_session(&self, inner: &mut Inner) {
        if let Err(e) = self.store.clear_token() {
            error!("❌ Failed to remove stored token: {}", e);
        }
        inner.scanner.release();
        inner.state.apply(Action::SessionCleared);
    }

    async fn end_session(&self) {
        let mut inner = self.inner.lock().await;
        self.clear_session(&mut inner);
    }

    /// Ends `session` unless a logout or a new login already replaced it.
    async fn expire_session(&self, session: u64) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.state.is_current_session(session) {
            return false;
        }
        self.clear_session(&mut inner);
        true
    }

    /// Surfaces a failed request. `session` is set for authenticated calls:
    /// an authorization failure then ends that session, and failures of a
    /// session that already ended are only logged.
    async fn fail(&self, err: ClientError, session: Option<u64>) -> ClientError {
        if let Some(session) = session {
            if !self.inner.lock().await.state.is_current_session(session) {
                debug!("Ignoring failure from an ended session: {}", err);
                return err;
            }
            if err.is_unauthorized() && self.expire_session(session).await {
                warn!("🔒 Session rejected by server, logging out");
            }
        }
        self.notify(NoticeKind::Error, err.to_string()).await;
        err
    }

    async fn establish_session(&self, auth: AuthResponse, notice: &str) -> ClientResult<User> {
        let user = auth.user;

        // token and state change together so a concurrent expiry cannot
        // clear one without the other
        let saved = {
            let mut inner = self.inner.lock().await;
            let saved = self.store.save_token(&auth.token);
            if saved.is_ok() {
                inner.state.apply(Action::LoggedIn {
                    token: auth.token,
                    user: user.clone(),
                });
            }
            saved
        };
        if let Err(e) = saved {
            return Err(self.fail(e, None).await);
        }

        info!("✅ Session established for {}", user.email);
        self.notify(NoticeKind::Success, notice).await;

        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        self.begin_request().await?;
        let result = self
            .services
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;
        self.finish_request().await;

        match result {
            Ok(auth) => self.establish_session(auth, "Login successful").await,
            Err(e) => Err(self.fail(e, None).await),
        }
    }

    pub async fn submit_login(&self) -> ClientResult<User> {
        let form = self.snapshot().await.login_form;
        self.login(&form.email, &form.password).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<User> {
        self.begin_request().await?;
        let result = self
            .services
            .register(RegisterRequest {
                email: email.to_string(),
                name: name.to_string(),
                password: password.to_string(),
            })
            .await;
        self.finish_request().await;

        match result {
            Ok(auth) => self.establish_session(auth, "Account created successfully").await,
            Err(e) => Err(self.fail(e, None).await),
        }
    }

    pub async fn submit_register(&self) -> ClientResult<User> {
        let form = self.snapshot().await.register_form;
        self.register(&form.name, &form.email, &form.password).await
    }

    /// Rehydrates the session from durable storage. Returns `Ok` whether or
    /// not a usable token was found; only storage failures are errors.
    pub async fn restore_session(&self) -> ClientResult<()> {
        let Some(token) = self.store.load_token()? else {
            debug!("No stored session");
            return Ok(());
        };

        self.dispatch(Action::TokenRestored(token)).await;
        if self.fetch_profile().await.is_ok() {
            info!("✅ Session restored");
        }

        Ok(())
    }

    /// Any failure here means the stored session is unusable: it is cleared
    /// without a visible notice.
    pub async fn fetch_profile(&self) -> ClientResult<User> {
        let (token, session) = self.credentials().await?;

        match self.services.profile(&token).await {
            Ok(user) => {
                self.dispatch_result(
                    session,
                    Action::ProfileLoaded {
                        session,
                        user: user.clone(),
                    },
                )
                .await;
                Ok(user)
            }
            Err(e) => {
                if self.expire_session(session).await {
                    warn!("🔒 Profile fetch failed, clearing session: {}", e);
                }
                Err(e)
            }
        }
    }

    pub async fn recharge(&self, amount: f64) -> ClientResult<f64> {
        let (token, session) = self.credentials().await?;
        self.begin_request().await?;
        let result = self.services.recharge(&token, amount).await;
        self.finish_request().await;

        match result {
            Ok(resp) => {
                let action = Action::RechargeSucceeded {
                    session,
                    new_balance: resp.new_balance,
                };
                if self.dispatch_result(session, action).await {
                    self.notify(
                        NoticeKind::Success,
                        format!("Recharge of {} completed", format_amount(amount)),
                    )
                    .await;
                }
                Ok(resp.new_balance)
            }
            Err(e) => Err(self.fail(e, Some(session)).await),
        }
    }

    pub async fn submit_recharge(&self) -> ClientResult<f64> {
        let input = self.snapshot().await.recharge_amount;

        match parse_amount(&input) {
            Some(amount) => self.recharge(amount).await,
            None => {
                let err = ClientError::Validation("Enter a valid amount".to_string());
                Err(self.fail(err, None).await)
            }
        }
    }

    pub async fn pay(
        &self,
        to_user: &str,
        amount: f64,
        description: &str,
        method: PaymentMethod,
    ) -> ClientResult<f64> {
        if to_user.trim().is_empty() || !amount.is_finite() {
            let err = ClientError::Validation("Choose a recipient and an amount".to_string());
            return Err(self.fail(err, None).await);
        }

        let (token, session) = self.credentials().await?;
        self.begin_request().await?;
        let request = PaymentRequest::from((
            to_user.trim().to_string(),
            amount,
            description.to_string(),
            method,
        ));
        let result = self.services.pay(&token, request).await;
        self.finish_request().await;

        match result {
            Ok(resp) => {
                let action = Action::PaymentSucceeded {
                    session,
                    new_balance: resp.new_balance,
                };
                if !self.dispatch_result(session, action).await {
                    return Ok(resp.new_balance);
                }

                self.notify(
                    NoticeKind::Success,
                    format!("Payment of {} sent to {}", format_amount(amount), resp.recipient),
                )
                .await;

                if self.snapshot().await.tab == Tab::Transactions {
                    let _ = self.fetch_transactions().await;
                }

                Ok(resp.new_balance)
            }
            Err(e) => Err(self.fail(e, Some(session)).await),
        }
    }

    pub async fn submit_payment(&self) -> ClientResult<f64> {
        let state = self.snapshot().await;

        if !state.can_submit_payment() {
            if state.loading {
                return Err(ClientError::Busy);
            }
            let err = ClientError::Validation("Choose a recipient and an amount".to_string());
            return Err(self.fail(err, None).await);
        }

        let form = state.payment_form;
        let amount = parse_amount(&form.amount).unwrap_or_default();
        self.pay(&form.to_user, amount, &form.description, form.method)
            .await
    }

    pub async fn fetch_transactions(&self) -> ClientResult<Vec<Transaction>> {
        let (token, session) = self.credentials().await?;

        match self.services.transactions(&token).await {
            Ok(transactions) => {
                debug!("📜 Loaded {} transactions", transactions.len());
                let action = Action::TransactionsLoaded {
                    session,
                    transactions: transactions.clone(),
                };
                self.dispatch_result(session, action).await;
                Ok(transactions)
            }
            Err(e) => Err(self.fail(e, Some(session)).await),
        }
    }

    pub async fn set_tab(&self, tab: Tab) {
        self.dispatch(Action::SetTab(tab)).await;

        if tab == Tab::Transactions {
            let _ = self.fetch_transactions().await;
        }
    }

    pub async fn generate_qr(&self) -> ClientResult<QrPayload> {
        let (token, session) = self.credentials().await?;

        match self.services.generate_qr(&token).await {
            Ok(qr) => {
                let action = Action::QrLoaded {
                    session,
                    qr: qr.clone(),
                };
                self.dispatch_result(session, action).await;
                Ok(qr)
            }
            Err(e) => Err(self.fail(e, Some(session)).await),
        }
    }

    /// Short queries clear the results without a request. Failures are
    /// logged, never shown, and leave the previous results in place.
    pub async fn search_users(&self, query: &str) -> Vec<UserSummary> {
        {
            let mut inner = self.inner.lock().await;
            inner.state.apply(Action::SetSearchQuery(query.to_string()));

            if query.chars().count() < MIN_SEARCH_CHARS {
                let session = inner.state.session_generation();
                inner.state.apply(Action::SearchResults {
                    session,
                    query: query.to_string(),
                    users: Vec::new(),
                });
                return Vec::new();
            }
        }

        let (token, session) = match self.credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("🔎 User search skipped: {}", e);
                return self.snapshot().await.search_results;
            }
        };

        match self.services.search_users(&token, query).await {
            Ok(users) => {
                let action = Action::SearchResults {
                    session,
                    query: query.to_string(),
                    users: users.clone(),
                };
                if self.dispatch_result(session, action).await {
                    users
                } else {
                    Vec::new()
                }
            }
            Err(e) => {
                warn!("🔎 User search failed: {}", e);
                if e.is_unauthorized() && self.expire_session(session).await {
                    warn!("🔒 Session rejected by server, logging out");
                }
                self.snapshot().await.search_results
            }
        }
    }

    pub async fn select_recipient(&self, user: &UserSummary) {
        self.dispatch(Action::RecipientSelected {
            user_id: user.id.clone(),
            name: user.name.clone(),
            method: PaymentMethod::Transfer,
        })
        .await;
    }

    async fn require_capability(&self, available: bool, name: &'static str) -> ClientResult<()> {
        if available {
            Ok(())
        } else {
            Err(self.fail(ClientError::Unsupported(name), None).await)
        }
    }

    /// Writes this user's payment tag and associates the tag with the
    /// account.
    pub async fn register_nfc_tag(&self) -> ClientResult<String> {
        let state = self.snapshot().await;
        self.require_capability(state.capabilities.nfc, "NFC").await?;

        let session = state.session_generation();
        let user = state.session.user.ok_or(ClientError::NotAuthenticated)?;
        let token = state.session.token.ok_or(ClientError::NotAuthenticated)?;
        let payload = PaymentTag::new(user.id.clone(), user.name.clone()).encode();

        let serial = match self.nfc.write_text(&payload).await {
            Ok(serial) => serial,
            Err(e) => return Err(self.fail(e.into(), None).await),
        };
        let nfc_id = serial
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("nfc_{}", Uuid::new_v4().simple()));

        match self.services.register_nfc(&token, nfc_id).await {
            Ok(resp) => {
                let action = Action::NfcTagRegistered {
                    session,
                    nfc_id: resp.nfc_id.clone(),
                };
                if self.dispatch_result(session, action).await {
                    self.notify(NoticeKind::Success, "NFC tag registered").await;
                }
                Ok(resp.nfc_id)
            }
            Err(e) => Err(self.fail(e, Some(session)).await),
        }
    }

    async fn prefill_from_payload(&self, text: &str, method: PaymentMethod) -> Option<PaymentTag> {
        let Some(tag) = PaymentTag::parse(text) else {
            warn!("🏷️ Ignoring payload without the cashless prefix");
            self.notify(NoticeKind::Error, "Unrecognized payment tag").await;
            return None;
        };

        self.dispatch(Action::RecipientSelected {
            user_id: tag.user_id.clone(),
            name: tag.user_name.clone(),
            method,
        })
        .await;
        Some(tag)
    }

    /// Reads one tag. A `cashless:` payload pre-fills the payment form;
    /// anything else leaves it untouched and returns `Ok(None)`.
    pub async fn read_nfc_tag(&self) -> ClientResult<Option<PaymentTag>> {
        let capabilities = self.snapshot().await.capabilities;
        self.require_capability(capabilities.nfc, "NFC").await?;

        self.dispatch(Action::NfcReading(true)).await;
        let result = self.nfc.scan().await;
        self.dispatch(Action::NfcReading(false)).await;

        let read = match result {
            Ok(read) => read,
            Err(e) => return Err(self.fail(e.into(), None).await),
        };

        let tag = self.prefill_from_payload(&read.text, PaymentMethod::Nfc).await;
        if let Some(tag) = &tag {
            self.notify(
                NoticeKind::Success,
                format!("NFC tag detected: {}", tag.user_name),
            )
            .await;
        }

        Ok(tag)
    }

    /// Looks up the owner of a registered tag identifier.
    pub async fn resolve_nfc_id(&self, nfc_id: &str) -> ClientResult<PaymentTag> {
        match self.services.nfc_owner(nfc_id).await {
            Ok(owner) => {
                self.dispatch(Action::RecipientSelected {
                    user_id: owner.user_id.clone(),
                    name: owner.name.clone(),
                    method: PaymentMethod::Nfc,
                })
                .await;
                self.notify(
                    NoticeKind::Success,
                    format!("NFC tag detected: {}", owner.name),
                )
                .await;
                Ok(PaymentTag::new(owner.user_id, owner.name))
            }
            Err(e) => Err(self.fail(e, None).await),
        }
    }

    /// Entry point for an external QR decoder. Decoding camera frames is
    /// not done here.
    pub async fn accept_scanned_code(&self, text: &str) -> Option<PaymentTag> {
        let tag = self.prefill_from_payload(text, PaymentMethod::Qr).await?;

        self.stop_camera_scanner().await;
        self.notify(
            NoticeKind::Success,
            format!("QR code detected: {}", tag.user_name),
        )
        .await;

        Some(tag)
    }

    pub async fn start_camera_scanner(&self) -> ClientResult<()> {
        let state = self.snapshot().await;
        self.require_capability(state.capabilities.camera, "Camera")
            .await?;

        if self.inner.lock().await.scanner.is_active() {
            return Ok(());
        }

        match self.camera.acquire(Facing::Environment).await {
            Ok(stream) => {
                info!("📷 Camera scanner started with {} tracks", stream.track_count());
                let mut inner = self.inner.lock().await;
                inner.scanner.attach(stream);
                inner.state.apply(Action::Scanning(true));
                Ok(())
            }
            Err(e) => {
                self.stop_camera_scanner().await;
                Err(self.fail(e.into(), None).await)
            }
        }
    }

    /// Releases every camera track. Idempotent.
    pub async fn stop_camera_scanner(&self) {
        let mut inner = self.inner.lock().await;
        inner.scanner.release();
        inner.state.apply(Action::Scanning(false));
    }

    pub async fn logout(&self) {
        self.end_session().await;
        info!("👋 Logged out");
        self.notify(NoticeKind::Success, "Logged out").await;
    }

    pub async fn check_health(&self) -> ClientResult<String> {
        let health = self.services.health().await?;
        Ok(health.message)
    }
}
