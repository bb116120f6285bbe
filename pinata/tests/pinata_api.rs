use cardpin_core::{CardKey, PinLabel, PinPayload, Pinner, SourceItem};
use cardpin_pinata::{PinataConfig, PinataPinner};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accepts a single request, answers it with `status` and `body`, and
/// returns the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 8192];
        while !request_complete(&request) {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}"), handle)
}

fn request_complete(request: &[u8]) -> bool {
    let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
    let body = &request[end + 4..];

    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    match content_length {
        Some(len) => body.len() >= len,
        None if head.contains("transfer-encoding: chunked") => body.ends_with(b"0\r\n\r\n"),
        None => true,
    }
}

fn pinner(api_url: String) -> PinataPinner {
    let config = PinataConfig {
        api_url,
        api_key: "test-key".into(),
        api_secret: "test-secret".into(),
        timeout_secs: 10,
    };
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    PinataPinner::with_client(config, client).unwrap()
}

#[tokio::test]
async fn pins_json_document() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"IpfsHash":"QmMetadata600","PinSize":120,"Timestamp":"2021-01-01T00:00:00Z"}"#,
    )
    .await;

    let key = CardKey::from(600);
    let item = SourceItem {
        label: PinLabel::metadata("alpha", &key),
        payload: PinPayload::Json(json!({ "name": "Black Lotus", "image": "ipfs://QmLotus" })),
        key,
    };
    let outcome = pinner(url).pin(&item).await;
    assert_eq!(outcome.uri().unwrap().as_str(), "ipfs://QmMetadata600");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /pinning/pinJSONToIPFS HTTP/1.1"));
    assert!(request.contains("pinata_api_key: test-key"));
    assert!(request.contains("pinata_secret_api_key: test-secret"));
    assert!(request.contains(r#""pinataMetadata":{"name":"alpha_metadata_600"}"#));
    assert!(request.contains(r#""cidVersion":0"#));
}

#[tokio::test]
async fn pins_file_as_multipart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("100.jpg");
    std::fs::write(&path, b"jpeg bytes of card 100").unwrap();

    let (url, server) = serve_once("200 OK", r#"{"IpfsHash":"QmImage100"}"#).await;

    let key = CardKey::from(100);
    let item = SourceItem {
        label: PinLabel::image("alpha", &key),
        payload: PinPayload::File(path),
        key,
    };
    let outcome = pinner(url).pin(&item).await;
    assert_eq!(outcome.uri().unwrap().as_str(), "ipfs://QmImage100");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /pinning/pinFileToIPFS HTTP/1.1"));
    assert!(request.contains("multipart/form-data"));
    assert!(request.contains(r#"filename="100.jpg""#));
    assert!(request.contains("jpeg bytes of card 100"));
    assert!(request.contains(r#"{"name":"alpha_100"}"#));
}

#[tokio::test]
async fn service_errors_become_failed_outcomes() {
    let (url, server) = serve_once("429 Too Many Requests", r#"{"error":"rate limited"}"#).await;

    let item = SourceItem {
        key: CardKey::from(1),
        label: PinLabel::new("alpha_metadata_1"),
        payload: PinPayload::Json(json!({ "name": "Forest" })),
    };
    let outcome = pinner(url).pin(&item).await;
    server.await.unwrap();

    let message = outcome.error().unwrap();
    assert!(message.contains("429"), "{message}");
    assert!(message.contains("rate limited"), "{message}");
}

#[tokio::test]
async fn unreadable_file_fails_without_a_request() {
    let dir = tempfile::tempdir().unwrap();
    let item = SourceItem {
        key: CardKey::from(5),
        label: PinLabel::new("alpha_5"),
        payload: PinPayload::File(dir.path().join("5.jpg")),
    };
    // nothing listens here; the error must come from opening the file
    let outcome = pinner("http://127.0.0.1:9".into()).pin(&item).await;
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn checks_authentication() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"message":"Congratulations! You are communicating with the Pinata API!"}"#,
    )
    .await;

    let message = pinner(url).test_authentication().await.unwrap();
    assert!(message.starts_with("Congratulations"));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /data/testAuthentication HTTP/1.1"));
}
