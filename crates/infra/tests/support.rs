use std::sync::OnceLock;

use arsrest_domain::{ClientConfig, Values};
use arsrest_infra::ArsRestClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-jwt-token";
pub const AUTHORIZATION: &str = "AR-JWT test-jwt-token";

/// Install a test subscriber once so `RUST_LOG` works for debugging.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Client configuration pointing at the mock server.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::from_base_url(&server.uri())
        .expect("mock server uri should parse")
        .with_credentials("Demo", "p@ss word")
}

/// Mount the login endpoint returning [`TOKEN`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/jwt/login"))
        .and(body_string("username=Demo&password=p%40ss%20word"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
        .mount(server)
        .await;
}

/// A client that has already logged in against the mock server.
pub async fn authenticated_client(server: &MockServer) -> ArsRestClient {
    init_tracing();
    mount_login(server).await;

    let mut client = ArsRestClient::new(config_for(server)).expect("client should build");
    client.authenticate().await.expect("login should succeed");
    client
}

pub fn values(pairs: &[(&str, Value)]) -> Values {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

/// ARS error list body as returned with a failed request.
pub fn ars_error(number: i64, text: &str, appended: &str) -> Value {
    json!([{
        "messageType": "ERROR",
        "messageText": text,
        "messageAppendedText": appended,
        "messageNumber": number
    }])
}
