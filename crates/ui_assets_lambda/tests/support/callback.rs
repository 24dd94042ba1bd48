use std::sync::Mutex;

use ui_assets_core::contract::CallbackResponse;
use ui_assets_lambda::adapters::callback::CallbackSender;

/// Captures every callback instead of sending it.
#[derive(Default)]
pub struct RecordingCallback {
    sent: Mutex<Vec<(String, CallbackResponse)>>,
    reject: bool,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, CallbackResponse)> {
        self.sent.lock().expect("poisoned mutex").clone()
    }

    pub fn only_response(&self) -> CallbackResponse {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "exactly one callback should be sent");
        sent[0].1.clone()
    }
}

impl CallbackSender for RecordingCallback {
    fn send(&self, response_url: &str, response: &CallbackResponse) -> Result<(), String> {
        self.sent
            .lock()
            .expect("poisoned mutex")
            .push((response_url.to_string(), response.clone()));
        if self.reject {
            return Err("callback rejected with status 403".to_string());
        }
        Ok(())
    }
}
