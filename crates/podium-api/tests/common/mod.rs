// Shared helpers for the podium-api integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use url::Url;

use podium_api::{PodiumClient, RequestHandle, Transport};

/// Transport that never touches the network: it records every started
/// request so tests can inspect it and drive its outcome by hand.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    started: Mutex<Vec<RequestHandle>>,
}

impl RecordingTransport {
    pub fn last(&self) -> RequestHandle {
        self.started
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was started")
    }

    pub fn count(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn start(&self, request: RequestHandle) {
        self.started.lock().unwrap().push(request);
    }
}

pub const BASE_URL: &str = "https://podium.test";

/// A client over a fresh [`RecordingTransport`].
pub fn recording_client() -> (PodiumClient, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = PodiumClient::with_transport(
        Url::parse(BASE_URL).unwrap(),
        Arc::clone(&transport) as Arc<dyn Transport>,
    );
    (client, transport)
}
