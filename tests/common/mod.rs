#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use storefront_core::{
    auth::SessionIdentity,
    config::AppConfig,
    errors::CommerceError,
    events,
    images::ImageHost,
    payments::{HostedCheckout, PaymentConfirmation, PaymentOutcome, PaymentRequest},
    services::AddToCartInput,
    store::MemoryStore,
    AppState,
};

pub const TEST_USER: &str = "user-1";

/// Hosted-checkout double driven by a scripted queue of outcomes.
///
/// Every `open` call is counted so tests can assert that below-threshold
/// or unvalidated attempts never reach the widget.
pub struct ScriptedCheckout {
    outcomes: Mutex<VecDeque<PaymentOutcome>>,
    opened: AtomicUsize,
    last_request: Mutex<Option<PaymentRequest>>,
}

impl ScriptedCheckout {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::new()),
            opened: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn confirm_next(&self) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(PaymentOutcome::Confirmed(PaymentConfirmation {
                payment_id: Some("pay_test_1".to_string()),
            }));
    }

    pub fn abandon_next(&self) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(PaymentOutcome::Abandoned);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PaymentRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostedCheckout for ScriptedCheckout {
    async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PaymentOutcome::Abandoned)
    }
}

/// Image-host double returning deterministic URLs, with a failure switch.
pub struct StubImageHost {
    fail: AtomicBool,
    uploads: AtomicUsize,
}

impl StubImageHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
            uploads: AtomicUsize::new(0),
        })
    }

    pub fn fail_uploads(&self, enabled: bool) {
        self.fail.store(enabled, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHost for StubImageHost {
    async fn upload(&self, _image: Vec<u8>) -> Result<String, CommerceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CommerceError::ExternalServiceError(
                "upload rejected".to_string(),
            ));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.test/{}.jpg", n))
    }
}

/// Test harness wiring the services against an in-memory store, a
/// session identity and scripted payment/image collaborators.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<SessionIdentity>,
    pub widget: Arc<ScriptedCheckout>,
    pub images: Arc<StubImageHost>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Fresh state, signed in as [`TEST_USER`].
    pub async fn new() -> Self {
        Self::with_identity(SessionIdentity::signed_in(TEST_USER)).await
    }

    /// Fresh state with no signed-in user.
    pub async fn signed_out() -> Self {
        Self::with_identity(SessionIdentity::signed_out()).await
    }

    async fn with_identity(identity: SessionIdentity) -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(identity);
        let widget = ScriptedCheckout::new();
        let images = StubImageHost::new();

        let (event_sender, event_rx) = events::channel(config.event_buffer);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(
            store.clone(),
            identity.clone(),
            widget.clone(),
            images.clone(),
            config,
            event_sender,
        );

        Self {
            state,
            store,
            identity,
            widget,
            images,
            _event_task: event_task,
        }
    }
}

/// Product-page add with the given price and optional discount percent.
pub fn product(id: &str, price: Decimal, discount: Option<Decimal>) -> AddToCartInput {
    AddToCartInput::single(
        id,
        format!("Product {}", id),
        format!("https://img.test/{}.jpg", id),
        price,
        discount,
    )
}
