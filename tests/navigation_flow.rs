mod common;

use analytics_session::config::load_config_from_str;
use analytics_session::navigation::ACCESS_DENIED_MESSAGE;
use common::{build_client, remote_config, UiEvent, LOGIN_OK};

const MOCK_CONFIG: &str = r#"
version: "1.0.0"
environment:
  hostname: "localhost"
  development_base_url: "http://127.0.0.1:9"
session:
  type: "mock"
  users:
    - username: admin
      password: admin123
      role: admin
    - username: student1
      password: password2
      role: student
"#;

#[tokio::test]
async fn integration_non_admin_is_turned_back_to_dashboard() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_OK)
        .create_async()
        .await;

    let (client, navigator) = build_client(remote_config(&server.url()));
    client.session.login("alice", "pw").await.unwrap();
    let before = client.tokens.get();

    let landed = client.router.navigate("/user-management");

    assert_eq!(landed, "/dashboard");
    let events = navigator.events();
    let notice = events
        .iter()
        .position(|e| *e == UiEvent::Notice(ACCESS_DENIED_MESSAGE.to_string()))
        .expect("access notice shown");
    let arrival = events
        .iter()
        .position(|e| *e == UiEvent::GoTo("/dashboard".to_string()))
        .expect("dashboard reached");
    assert!(notice < arrival);
    assert_eq!(navigator.visits(), vec!["/dashboard".to_string()]);
    assert_eq!(client.tokens.get(), before);
}

#[tokio::test]
async fn integration_anonymous_user_lands_on_login() {
    let (client, navigator) = build_client(load_config_from_str(MOCK_CONFIG).unwrap());

    assert_eq!(client.router.navigate("/analysis"), "/login");
    assert_eq!(navigator.visits(), vec!["/login".to_string()]);
    assert!(!navigator
        .events()
        .iter()
        .any(|e| matches!(e, UiEvent::Notice(_))));
}

#[tokio::test]
async fn integration_admin_reaches_user_management() {
    let (client, navigator) = build_client(load_config_from_str(MOCK_CONFIG).unwrap());
    client.session.login("admin", "admin123").await.unwrap();

    assert_eq!(client.router.navigate("/user-management"), "/user-management");
    assert_eq!(
        navigator.events(),
        vec![
            UiEvent::Title("User Management - Student Analytics".to_string()),
            UiEvent::GoTo("/user-management".to_string()),
        ]
    );
}

#[tokio::test]
async fn integration_public_routes_need_no_session() {
    let (client, navigator) = build_client(load_config_from_str(MOCK_CONFIG).unwrap());

    assert_eq!(client.router.navigate("/"), "/");
    assert_eq!(client.router.navigate("/login"), "/login");
    assert_eq!(
        navigator.visits(),
        vec!["/".to_string(), "/login".to_string()]
    );
}

#[tokio::test]
async fn integration_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let yaml = format!(
        "{}store:\n  type: \"file\"\n  path: \"{}\"\n",
        MOCK_CONFIG,
        path.display()
    );

    {
        let (client, _) = build_client(load_config_from_str(&yaml).unwrap());
        client.session.login("student1", "password2").await.unwrap();
    }

    let (client, navigator) = build_client(load_config_from_str(&yaml).unwrap());
    assert!(client.session.is_viewer());
    assert_eq!(client.router.navigate("/user-management"), "/dashboard");
    assert_eq!(navigator.visits(), vec!["/dashboard".to_string()]);
}

#[tokio::test]
async fn integration_mock_forgets_tokens_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let yaml = format!(
        "{}store:\n  type: \"file\"\n  path: \"{}\"\n",
        MOCK_CONFIG,
        path.display()
    );

    {
        let (client, _) = build_client(load_config_from_str(&yaml).unwrap());
        client.session.login("admin", "admin123").await.unwrap();
    }

    let (client, navigator) = build_client(load_config_from_str(&yaml).unwrap());
    assert!(client.session.is_admin());

    assert!(client.session.get_profile().await.unwrap_err().is_unauthenticated());
    assert!(!client.session.is_authenticated());
    assert_eq!(navigator.visits(), vec!["/login".to_string()]);
    assert_eq!(client.router.navigate("/user-management"), "/login");
}
