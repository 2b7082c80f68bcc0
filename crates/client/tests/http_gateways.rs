//! Integration tests for the HTTPS transports against a local mock server.

#![allow(clippy::unwrap_used)]

use {
    hostpanel_client::{
        Error, Gateway, HttpPanelGateway, ImpersonationGateway, WhmGateway,
        protocol::{Args, ERROR_UNKNOWN, RESPONSE_SIZE_LIMIT},
    },
    mockito::Matcher,
};

fn panel_gateway(server: &mockito::ServerGuard) -> HttpPanelGateway {
    HttpPanelGateway::new("unused.test", "user", "secret", false).base_url(server.url())
}

fn whm_gateway(server: &mockito::ServerGuard) -> WhmGateway {
    WhmGateway::with_access_hash("unused.test", "root", "HASH123", false).base_url(server.url())
}

// ── Panel gateway ────────────────────────────────────────────────────────────

#[tokio::test]
async fn uapi_hits_the_execute_path_with_basic_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/execute/SSL/installed_hosts")
        .match_query(Matcher::UrlEncoded("domain".into(), "example.com".into()))
        // base64("user:secret")
        .match_header("authorization", "Basic dXNlcjpzZWNyZXQ=")
        .with_body(r#"{"status":1,"errors":[],"data":{"hosts":[]}}"#)
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let out = gw
        .uapi("SSL", "installed_hosts", Args::new().with("domain", "example.com"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out["status"], 1);
}

#[tokio::test]
async fn api2_unwraps_the_inner_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/json-api/cpanel")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("cpanel_jsonapi_user".into(), "user".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_apiversion".into(), "2".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_module".into(), "DomainLookup".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_func".into(), "getdocroot".into()),
            Matcher::UrlEncoded("domain".into(), "example.com".into()),
        ]))
        .with_body(r#"{"cpanelresult":{"event":{"result":1},"data":[{"docroot":"/home/user/public_html"}]}}"#)
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let out = gw
        .api2("DomainLookup", "getdocroot", Args::new().with("domain", "example.com"))
        .await
        .unwrap();

    assert_eq!(out["data"][0]["docroot"], "/home/user/public_html");
}

#[tokio::test]
async fn api2_inner_error_wins_over_the_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/json-api/cpanel")
        .match_query(Matcher::Any)
        .with_body(r#"{"error":"inner failed","cpanelresult":{}}"#)
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let err = gw
        .api2("DomainLookup", "getdocroot", Args::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(reason) if reason == "inner failed"));
}

#[tokio::test]
async fn api1_tokens_encode_as_flags_and_pairs() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/json-api/cpanel")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("foo".into(), "bar".into()),
            Matcher::UrlEncoded("baz".into(), String::new()),
            Matcher::UrlEncoded("cpanel_jsonapi_apiversion".into(), "1".into()),
        ]))
        .with_body(r#"{"event":{"result":1},"data":{"result":"ok"}}"#)
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let out = gw
        .api1(
            "Serverinfo",
            "servicestatus",
            &["foo=bar".to_string(), "baz".to_string()],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out["data"]["result"], "ok");
}

#[tokio::test]
async fn http_status_300_and_above_is_a_transport_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/execute/SSL/installed_hosts")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let err = gw.uapi("SSL", "installed_hosts", Args::new()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(status) if status.contains("403")));
}

#[tokio::test]
async fn response_at_the_size_ceiling_fails_on_every_transport() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/execute/Big/dump")
        .match_query(Matcher::Any)
        .with_body(vec![b'a'; RESPONSE_SIZE_LIMIT])
        .create_async()
        .await;

    let mut gw = panel_gateway(&server);
    let err = gw.uapi("Big", "dump", Args::new()).await.unwrap_err();
    assert!(matches!(err, Error::SizeExceeded));
}

// ── WHM gateway ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn whm_version_with_access_hash_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/json-api/version")
        .match_query(Matcher::UrlEncoded("api.version".into(), "1".into()))
        .match_header("authorization", "WHM root:HASH123")
        .with_body(r#"{"metadata":{"result":1,"reason":"OK"},"data":{"version":"11.110.0.5"}}"#)
        .create_async()
        .await;

    let gw = whm_gateway(&server);
    assert_eq!(gw.version().await.unwrap(), "11.110.0.5");
    mock.assert_async().await;
}

#[tokio::test]
async fn whm_accepts_a_numeric_string_result() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/json-api/version")
        .match_query(Matcher::Any)
        .with_body(r#"{"metadata":{"result":"1","reason":"OK"},"data":{"version":"11.110.0.5"}}"#)
        .create_async()
        .await;

    let gw = whm_gateway(&server);
    assert_eq!(gw.version().await.unwrap(), "11.110.0.5");
}

#[tokio::test]
async fn whm_junk_result_fails_with_the_generic_unknown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/json-api/version")
        .match_query(Matcher::Any)
        .with_body(r#"{"metadata":{"result":"oops"}}"#)
        .create_async()
        .await;

    let gw = whm_gateway(&server);
    let err = gw.version().await.unwrap_err();
    assert!(matches!(err, Error::Api(reason) if reason == ERROR_UNKNOWN));
}

#[tokio::test]
async fn whm_password_credential_uses_basic_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/json-api/version")
        .match_query(Matcher::Any)
        // base64("root:hunter2")
        .match_header("authorization", "Basic cm9vdDpodW50ZXIy")
        .with_body(r#"{"metadata":{"result":1},"data":{"version":"11.110.0.5"}}"#)
        .create_async()
        .await;

    let gw = WhmGateway::with_password("unused.test", "root", "hunter2", false)
        .base_url(server.url());
    gw.version().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn whm_totp_secret_adds_a_six_digit_code_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/json-api/version")
        .match_query(Matcher::Any)
        .match_header("x-cpanel-otp", Matcher::Regex(r"^\d{6}$".into()))
        .with_body(r#"{"metadata":{"result":1},"data":{"version":"11.110.0.5"}}"#)
        .create_async()
        .await;

    let gw = whm_gateway(&server)
        .totp_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")
        .unwrap();
    gw.version().await.unwrap();
    mock.assert_async().await;
}

// ── Impersonation adapter ────────────────────────────────────────────────────

#[tokio::test]
async fn impersonated_uapi_posts_to_the_proxy_function() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/json-api/cpanel")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user".into(), "bob".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_apiversion".into(), "3".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_module".into(), "SSL".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_func".into(), "installed_hosts".into()),
            Matcher::UrlEncoded("api.version".into(), "1".into()),
        ]))
        .with_body(r#"{"error":"","result":{"status":1,"data":{"hosts":[]}}}"#)
        .create_async()
        .await;

    let mut gw = ImpersonationGateway::new(whm_gateway(&server), "bob");
    let out = gw.uapi("SSL", "installed_hosts", Args::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(out["status"], 1);
}

#[tokio::test]
async fn impersonated_api2_reuses_the_shared_inner_unwrap() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/json-api/cpanel")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user".into(), "bob".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_apiversion".into(), "2".into()),
        ]))
        .with_body(r#"{"cpanelresult":{"event":{"result":1},"data":[{"docroot":"/home/bob"}]}}"#)
        .create_async()
        .await;

    let mut gw = ImpersonationGateway::new(whm_gateway(&server), "bob");
    let out = gw.api2("DomainLookup", "getdocroot", Args::new()).await.unwrap();
    assert_eq!(out["data"][0]["docroot"], "/home/bob");
}

#[tokio::test]
async fn impersonated_api1_splits_tokens_but_keeps_metadata_values() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/json-api/cpanel")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("service".into(), "httpd".into()),
            Matcher::UrlEncoded("verbose".into(), String::new()),
            Matcher::UrlEncoded("user".into(), "bob".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_apiversion".into(), "1".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_module".into(), "Serverinfo".into()),
            Matcher::UrlEncoded("cpanel_jsonapi_func".into(), "servicestatus".into()),
        ]))
        .with_body(r#"{"event":{"result":1},"data":{"result":"up"}}"#)
        .create_async()
        .await;

    let mut gw = ImpersonationGateway::new(whm_gateway(&server), "bob");
    let out = gw
        .api1(
            "Serverinfo",
            "servicestatus",
            &["service=httpd".to_string(), "verbose".to_string()],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out["data"]["result"], "up");
}

#[tokio::test]
async fn impersonated_uapi_error_surfaces_from_the_wrapper() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/json-api/cpanel")
        .match_body(Matcher::Any)
        .with_body(r#"{"error":"No such user","result":null}"#)
        .create_async()
        .await;

    let mut gw = ImpersonationGateway::new(whm_gateway(&server), "ghost");
    let err = gw.uapi("SSL", "installed_hosts", Args::new()).await.unwrap_err();
    assert!(matches!(err, Error::Api(reason) if reason == "No such user"));
}
