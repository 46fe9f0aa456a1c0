use cashless_core::error::{ClientError, ClientResult};
use cashless_core::helpers::dto::{
    AuthResponse, Endpoints, HealthResponse, LoginRequest, NfcOwner, PaymentRequest,
    PaymentResponse, QrPayload, RechargeRequest, RechargeResponse, RegisterNfcRequest,
    RegisterNfcResponse, RegisterRequest, Transaction, User, UserSummary,
};
use log::{debug, error, info};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::de::DeserializeOwned;

/// Thin wrapper over the wallet HTTP API. Holds no session state; callers
/// pass the bearer token for authenticated endpoints.
#[derive(Clone)]
pub struct Services {
    client: Client,
    base_url: String,
}

impl Services {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Attaches the bearer token to endpoints that require one. Public
    /// endpoints never carry it.
    fn request(
        &self,
        method: Method,
        endpoint: &Endpoints,
        token: Option<&str>,
    ) -> ClientResult<RequestBuilder> {
        let url = endpoint.url(&self.base_url);
        let builder = self.client.request(method, &url);

        if !endpoint.requires_auth() {
            return Ok(builder);
        }

        match token {
            Some(token) => Ok(builder.header("Authorization", format!("Bearer {}", token))),
            None => Err(ClientError::NotAuthenticated),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoints,
        builder: RequestBuilder,
    ) -> ClientResult<T> {
        debug!("🌐 Making wallet request to: {}", endpoint);

        match builder.send().await {
            Ok(resp) => {
                let status = resp.status();
                debug!("📡 Server response status: {}", status);

                if status.is_success() {
                    info!("✅ {} succeeded - Status: {}", endpoint, status);
                    let bytes = resp.bytes().await?;
                    Ok(serde_json::from_slice(&bytes)?)
                } else {
                    let error_body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());

                    error!("❌ Server responded with error status: {}", status);
                    error!("❌ Server error response body: {}", error_body);
                    error!("❌ Request path: {}", endpoint);

                    Err(ClientError::from_response(status.as_u16(), &error_body))
                }
            }
            Err(network_error) => {
                error!("❌ Network error during {} call: {}", endpoint, network_error);

                if network_error.is_timeout() {
                    error!("⏰ Request timed out");
                } else if network_error.is_connect() {
                    error!("🔌 Connection failed - server may be down");
                }

                Err(ClientError::Network(network_error))
            }
        }
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let builder = self.request(Method::GET, &Endpoints::Health, None)?;
        self.send(Endpoints::Health, builder).await
    }

    pub async fn login(&self, request: LoginRequest) -> ClientResult<AuthResponse> {
        let builder = self
            .request(Method::POST, &Endpoints::Login, None)?
            .json(&request);
        self.send(Endpoints::Login, builder).await
    }

    pub async fn register(&self, request: RegisterRequest) -> ClientResult<AuthResponse> {
        let builder = self
            .request(Method::POST, &Endpoints::Register, None)?
            .json(&request);
        self.send(Endpoints::Register, builder).await
    }

    pub async fn profile(&self, token: &str) -> ClientResult<User> {
        let builder = self.request(Method::GET, &Endpoints::Profile, Some(token))?;
        self.send(Endpoints::Profile, builder).await
    }

    pub async fn recharge(&self, token: &str, amount: f64) -> ClientResult<RechargeResponse> {
        let builder = self
            .request(Method::POST, &Endpoints::Recharge, Some(token))?
            .json(&RechargeRequest { amount });
        self.send(Endpoints::Recharge, builder).await
    }

    pub async fn pay(&self, token: &str, request: PaymentRequest) -> ClientResult<PaymentResponse> {
        let builder = self
            .request(Method::POST, &Endpoints::Pay, Some(token))?
            .json(&request);
        self.send(Endpoints::Pay, builder).await
    }

    pub async fn transactions(&self, token: &str) -> ClientResult<Vec<Transaction>> {
        let builder = self.request(Method::GET, &Endpoints::Transactions, Some(token))?;
        self.send(Endpoints::Transactions, builder).await
    }

    pub async fn generate_qr(&self, token: &str) -> ClientResult<QrPayload> {
        let builder = self.request(Method::GET, &Endpoints::GenerateQr, Some(token))?;
        self.send(Endpoints::GenerateQr, builder).await
    }

    pub async fn register_nfc(&self, token: &str, nfc_id: String) -> ClientResult<RegisterNfcResponse> {
        let builder = self
            .request(Method::POST, &Endpoints::RegisterNfc, Some(token))?
            .json(&RegisterNfcRequest { nfc_id });
        self.send(Endpoints::RegisterNfc, builder).await
    }

    pub async fn nfc_owner(&self, nfc_id: &str) -> ClientResult<NfcOwner> {
        let endpoint = Endpoints::PayByNfc(nfc_id.to_string());
        let builder = self.request(Method::GET, &endpoint, None)?;
        self.send(endpoint, builder).await
    }

    pub async fn search_users(&self, token: &str, query: &str) -> ClientResult<Vec<UserSummary>> {
        let endpoint = Endpoints::SearchUsers(query.to_string());
        let builder = self.request(Method::GET, &endpoint, Some(token))?;
        self.send(endpoint, builder).await
    }
}
