use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use std::time::Duration;
use tower::ServiceExt;

use keygate::KeygateError;
use keygate::config::Config;
use keygate::db::{
    CredentialStore, CredentialsStorage, DbCredential, DbTicket, NewCredential, Provisioner,
    TicketStore,
};
use keygate::router::{KeygateState, keygate_router};

const CLE_BITLOCKER: &str = "111111-222222-333333-444444-555555-666666-777777-888888";

struct Fixture {
    app: Router,
    writer: Provisioner,
    storage: CredentialsStorage,
    path: PathBuf,
}

impl Fixture {
    async fn seeded(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "keygate-route-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));

        let cfg = Config {
            database_url: format!("sqlite:{}", path.display()),
            ..Config::default()
        };
        let writer = Provisioner::connect(&cfg.database_url)
            .await
            .expect("failed to open writable store");
        writer.seed_fleet().await.expect("failed to seed fleet");

        let storage = CredentialsStorage::connect_read_only(&cfg)
            .await
            .expect("failed to open read-only store");
        let app = keygate_router(KeygateState::new(
            Arc::new(storage.clone()),
            Arc::new(storage.tickets()),
            Duration::from_secs(5),
        ));

        Self {
            app,
            writer,
            storage,
            path,
        }
    }

    async fn teardown(self) {
        self.storage.close().await;
        self.writer.close().await;
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&body).expect("response body was not json");
    (status, value)
}

/// The credential routes never consult tickets.
struct NoTickets;

#[async_trait]
impl TicketStore for NoTickets {
    async fn find_ticket(&self, _ticket_number: &str) -> Result<Option<DbTicket>, KeygateError> {
        Ok(None)
    }
}

fn state_with(store: Arc<dyn CredentialStore>) -> KeygateState {
    KeygateState::new(store, Arc::new(NoTickets), Duration::from_secs(5))
}

/// Store double that counts calls and optionally fails.
struct CountingStore {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }
}

#[async_trait]
impl CredentialStore for CountingStore {
    async fn lookup(
        &self,
        _device_id: &str,
        _credential_type: &str,
    ) -> Result<Vec<DbCredential>, KeygateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KeygateError::StoreQuery(
                "no such table: Credentials in SELECT Value FROM Credentials".into(),
            ));
        }
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn known_credential_returns_200_with_echoed_fields() {
    let fx = Fixture::seeded("ok").await;

    let (status, body) = get(
        &fx.app,
        "/credentials?deviceId=ATM-CLE-001&credentialType=BitLocker",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"deviceId": "ATM-CLE-001", "type": "BitLocker", "value": CLE_BITLOCKER})
    );

    fx.teardown().await;
}

#[tokio::test]
async fn unknown_category_returns_404() {
    let fx = Fixture::seeded("vpn").await;

    let (status, body) = get(&fx.app, "/credentials?deviceId=ATM-CLE-001&credentialType=VPN").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Credential not found"}));

    let (status, _) = get(&fx.app, "/credentials?deviceId=ATM-XXX-999&credentialType=BIOS").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    fx.teardown().await;
}

#[tokio::test]
async fn missing_parameters_return_400_without_store_access() {
    let store = CountingStore::new(false);
    let app = keygate_router(state_with(store.clone()));
    let expected = json!({"error": "Missing required query parameters: deviceId, credentialType"});

    for uri in [
        "/credentials?deviceId=ATM-CLE-001",
        "/credentials?credentialType=BIOS",
        "/credentials",
        "/credentials?deviceId=&credentialType=BIOS",
        "/credentials?deviceId=ATM-CLE-001&credentialType=",
        "/credentials?deviceId=ATM-CLE-001&deviceId=ATM-CHI-007&credentialType=BIOS",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body, expected, "uri: {uri}");
    }
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_returns_opaque_500() {
    let store = CountingStore::new(true);
    let app = keygate_router(state_with(store.clone()));

    let (status, body) = get(&app, "/credentials?deviceId=ATM-CLE-001&credentialType=BIOS").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);

    // each request fails on its own; nothing is cached from the previous failure
    let (status, _) = get(&app, "/credentials?deviceId=ATM-CLE-001&credentialType=BIOS").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn injection_payloads_do_not_alter_the_query() {
    let fx = Fixture::seeded("inject").await;

    for uri in [
        "/credentials?deviceId=ATM-CLE-001%27%20OR%20%271%27%3D%271&credentialType=BitLocker",
        "/credentials?deviceId=ATM-CLE-001&credentialType=BitLocker%27%20OR%20%271%27%3D%271",
        "/credentials?deviceId=x%27%3B%20DROP%20TABLE%20Credentials%3B%20--&credentialType=BIOS",
    ] {
        let (status, body) = get(&fx.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {uri}");
        assert_eq!(body, json!({"error": "Credential not found"}));
    }

    let (status, body) = get(
        &fx.app,
        "/credentials?deviceId=ATM-CLE-001&credentialType=BitLocker",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], CLE_BITLOCKER);

    fx.teardown().await;
}

#[tokio::test]
async fn duplicate_rows_resolve_to_newest_and_stay_stable() {
    let fx = Fixture::seeded("dupes").await;
    fx.writer
        .insert_credentials(&[NewCredential::new("ATM-NYC-003", "BIOS", "N3wY0rk-R0tated")])
        .await
        .expect("failed to insert duplicate");

    let uri = "/credentials?deviceId=ATM-NYC-003&credentialType=BIOS";
    let (status, first) = get(&fx.app, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["value"], "N3wY0rk-R0tated");

    for _ in 0..5 {
        let (_, again) = get(&fx.app, uri).await;
        assert_eq!(again, first);
    }

    fx.teardown().await;
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let fx = Fixture::seeded("concurrent").await;

    let cases = [
        ("ATM-CLE-001", "BIOS", Some("b!0s-cle-@dm!n")),
        ("ATM-CHI-007", "BitLocker", Some("888888-777777-666666-555555-444444-333333-222222-111111")),
        ("ATM-NYC-003", "BIOS", Some("N3wY0rk-P@ss")),
        ("ATM-NYC-003", "VPN", None),
    ];

    let mut tasks = Vec::new();
    for round in 0..4 {
        for (device, kind, expected) in cases {
            let app = fx.app.clone();
            tasks.push(tokio::spawn(async move {
                let uri = format!("/credentials?deviceId={device}&credentialType={kind}");
                let (status, body) = get(&app, &uri).await;
                (round, device, status, body, expected)
            }));
        }
    }

    for task in tasks {
        let (round, device, status, body, expected) = task.await.expect("task panicked");
        match expected {
            Some(value) => {
                assert_eq!(status, StatusCode::OK, "round {round} device {device}");
                assert_eq!(body["deviceId"], device);
                assert_eq!(body["value"], value);
            }
            None => assert_eq!(status, StatusCode::NOT_FOUND),
        }
    }

    fx.teardown().await;
}

#[tokio::test]
async fn health_reports_ok() {
    let app = keygate_router(state_with(CountingStore::new(false)));
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
