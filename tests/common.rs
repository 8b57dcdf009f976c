#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use analytics_session::config::{load_config_from_str, ConfigV1};
use analytics_session::navigation::{Navigator, Notice};
use analytics_session::startup::build_state;
use analytics_session::state::ClientState;

pub const LOGIN_OK: &str = r#"{
    "access_token": "jwt-abc",
    "user": {"id": 1, "username": "alice", "email": "alice@example.org", "role": "user"}
}"#;

pub const ADMIN_LOGIN_OK: &str = r#"{
    "access_token": "jwt-root",
    "user": {"id": "7", "username": "root", "email": "root@example.org", "role": "admin"}
}"#;

/// Everything the client asked the UI to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Title(String),
    Notice(String),
    GoTo(String),
}

#[derive(Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingNavigator {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn visits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::GoTo(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn set_title(&self, title: &str) {
        self.events.lock().unwrap().push(UiEvent::Title(title.to_string()));
    }

    fn show_notice(&self, notice: &Notice) {
        let Notice::AccessDenied { message } = notice;
        self.events.lock().unwrap().push(UiEvent::Notice(message.clone()));
    }

    fn go_to(&self, path: &str) {
        self.events.lock().unwrap().push(UiEvent::GoTo(path.to_string()));
    }
}

/// A development-environment config pointed at `base_url` with an in-memory store.
pub fn remote_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "console"
environment:
  hostname: "localhost"
  development_base_url: "{}"
store:
  type: "memory"
session:
  type: "remote"
"#,
        base_url
    );
    load_config_from_str(&yaml).expect("failed to parse test config")
}

pub fn build_client(config: ConfigV1) -> (ClientState, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let state =
        build_state(Arc::new(config), navigator.clone()).expect("failed to build client state");
    (state, navigator)
}
