#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use cashless_client::devices::{
    Camera, DeviceError, Facing, MediaStream, MediaTrack, NfcDevice, NfcRead, UnavailableCamera,
    UnavailableNfc,
};
use cashless_client::services::Services;
use cashless_client::session::SessionStore;
use cashless_client::WalletController;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "jwt-test-token";

pub struct Harness {
    pub controller: WalletController,
    pub server: MockServer,
    pub store: SessionStore,
    _temp: TempDir,
}

pub async fn harness() -> Harness {
    harness_with(Arc::new(UnavailableCamera), Arc::new(UnavailableNfc)).await
}

pub async fn harness_with(camera: Arc<dyn Camera>, nfc: Arc<dyn NfcDevice>) -> Harness {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let db = sled::open(temp.path()).unwrap();
    let store = SessionStore::new(&db).unwrap();
    let services = Services::new(server.uri()).unwrap();
    let controller = WalletController::new(services, store.clone(), camera, nfc);

    Harness {
        controller,
        server,
        store,
        _temp: temp,
    }
}

/// A controller whose services point nowhere; for tests that must not
/// touch the network.
pub fn offline_controller() -> (WalletController, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = sled::open(temp.path()).unwrap();
    let store = SessionStore::new(&db).unwrap();
    let services = Services::new("http://127.0.0.1:9").unwrap();
    let controller = WalletController::new(
        services,
        store,
        Arc::new(UnavailableCamera),
        Arc::new(UnavailableNfc),
    );
    (controller, temp)
}

pub fn user_json(balance: f64) -> Value {
    json!({
        "id": "u-1",
        "email": "ana@example.com",
        "name": "Ana",
        "balance": balance,
        "nfc_id": null
    })
}

pub fn auth_json(balance: f64) -> Value {
    json!({
        "message": "Login realizado com sucesso",
        "token": TOKEN,
        "user": user_json(balance)
    })
}

pub fn transactions_json() -> Value {
    json!([
        {
            "id": "tx-2",
            "from_user": "u-1",
            "to_user": "u-2",
            "from_name": "Ana",
            "to_name": "Bob",
            "amount": 10.0,
            "description": "lunch",
            "timestamp": "2025-03-01T12:00:00.000001",
            "type": "transfer"
        },
        {
            "id": "tx-1",
            "from_user": "system",
            "to_user": "u-1",
            "from_name": "Sistema",
            "to_name": "Ana",
            "amount": 100.0,
            "description": "Recarga de saldo",
            "timestamp": "2025-03-01T10:00:00",
            "type": "recharge"
        }
    ])
}

/// Logs the harness user in with the given starting balance.
pub async fn log_in(h: &Harness, balance: f64) {
    let _guard = Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(balance)))
        .mount_as_scoped(&h.server)
        .await;

    h.controller
        .login("ana@example.com", "secret")
        .await
        .expect("login should succeed");
}

pub struct FakeTrack {
    stops: Arc<AtomicUsize>,
}

impl MediaTrack for FakeTrack {
    fn label(&self) -> String {
        "fake-video".to_string()
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeCamera {
    pub tracks: usize,
    pub fail: bool,
    pub stops: Arc<AtomicUsize>,
    pub acquisitions: AtomicUsize,
}

impl FakeCamera {
    pub fn new(tracks: usize) -> Self {
        Self {
            tracks,
            fail: false,
            stops: Arc::new(AtomicUsize::new(0)),
            acquisitions: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    pub fn stopped_tracks(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for FakeCamera {
    fn available(&self) -> bool {
        true
    }

    async fn acquire(&self, facing: Facing) -> Result<MediaStream, DeviceError> {
        assert_eq!(facing, Facing::Environment);
        if self.fail {
            return Err(DeviceError::PermissionDenied("camera blocked".to_string()));
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        let tracks = (0..self.tracks)
            .map(|_| {
                Box::new(FakeTrack {
                    stops: self.stops.clone(),
                }) as Box<dyn MediaTrack>
            })
            .collect();
        Ok(MediaStream::new(tracks))
    }
}

pub struct FakeNfc {
    pub serial: Option<String>,
    pub written: Mutex<Vec<String>>,
    pub next_read: Mutex<Option<Result<NfcRead, DeviceError>>>,
}

impl FakeNfc {
    pub fn new(serial: Option<&str>) -> Self {
        Self {
            serial: serial.map(str::to_string),
            written: Mutex::new(Vec::new()),
            next_read: Mutex::new(None),
        }
    }

    pub fn with_tag(text: &str) -> Self {
        let nfc = Self::new(None);
        *nfc.next_read.lock().unwrap() = Some(Ok(NfcRead {
            serial_number: Some("04:a2:19".to_string()),
            text: text.to_string(),
        }));
        nfc
    }

    pub fn with_error(error: DeviceError) -> Self {
        let nfc = Self::new(None);
        *nfc.next_read.lock().unwrap() = Some(Err(error));
        nfc
    }
}

#[async_trait]
impl NfcDevice for FakeNfc {
    fn available(&self) -> bool {
        true
    }

    async fn write_text(&self, text: &str) -> Result<Option<String>, DeviceError> {
        self.written.lock().unwrap().push(text.to_string());
        Ok(self.serial.clone())
    }

    async fn scan(&self) -> Result<NfcRead, DeviceError> {
        self.next_read
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(DeviceError::Failed("no tag in range".to_string())))
    }
}
