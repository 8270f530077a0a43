use std::time::Duration;

use futures_util::StreamExt;
use linkpilot_core::JobHandle;
use linkpilot_engine::{ClientError, ClientSettings, JobBackend, ReqwestJobClient};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_url: String) -> ReqwestJobClient {
    ReqwestJobClient::new(ClientSettings {
        server_url,
        ..ClientSettings::default()
    })
    .expect("client builds")
}

fn links() -> Vec<String> {
    vec![
        "https://a.test/1".to_string(),
        "https://a.test/2".to_string(),
    ]
}

#[tokio::test]
async fn submit_posts_newline_joined_form_and_returns_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "links=https%3A%2F%2Fa.test%2F1%0Ahttps%3A%2F%2Fa.test%2F2",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"job-42"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let job = client_for(server.uri()).submit(&links()).await.unwrap();
    assert_eq!(job, JobHandle::new("job-42"));
}

#[tokio::test]
async fn submit_error_field_is_rejected_with_server_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"No links provided"}"#))
        .mount(&server)
        .await;

    let err = client_for(server.uri()).submit(&links()).await.unwrap_err();
    assert_eq!(err, ClientError::Rejected("No links provided".to_string()));
    assert_eq!(err.to_string(), "No links provided");
}

#[tokio::test]
async fn submit_server_error_without_body_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(server.uri()).submit(&links()).await.unwrap_err();
    assert_eq!(err, ClientError::HttpStatus(500));
}

#[tokio::test]
async fn submit_without_job_id_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":""}"#))
        .mount(&server)
        .await;

    let err = client_for(server.uri()).submit(&links()).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn submit_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"job_id":"late"}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = ReqwestJobClient::new(ClientSettings {
        server_url: server.uri(),
        request_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    })
    .unwrap();
    let err = client.submit(&links()).await.unwrap_err();
    assert_eq!(err, ClientError::Timeout);
}

#[tokio::test]
async fn server_url_path_is_kept_as_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"p"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let job = client_for(format!("{}/api/", server.uri()))
        .submit(&links())
        .await
        .unwrap();
    assert_eq!(job.as_str(), "p");
}

#[test]
fn invalid_server_urls_are_rejected() {
    for url in ["not a url", "mailto:someone@example.com"] {
        let err = ReqwestJobClient::new(ClientSettings {
            server_url: url.to_string(),
            ..ClientSettings::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)), "{url}");
    }
}

#[tokio::test]
async fn open_progress_streams_event_bytes() {
    let server = MockServer::start().await;
    let body = "data: {\"processed\":1,\"total\":2}\n\n";
    Mock::given(method("GET"))
        .and(path("/status/job-7"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut stream = client_for(server.uri())
        .open_progress(&JobHandle::new("job-7"))
        .await
        .unwrap();
    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(received, body.as_bytes());
}

#[tokio::test]
async fn open_progress_unknown_job_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(server.uri())
        .open_progress(&JobHandle::new("missing"))
        .await;
    assert!(matches!(result, Err(ClientError::HttpStatus(404))));
}
