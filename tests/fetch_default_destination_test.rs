//! Fetching without a destination writes `./<name>`. Kept in its own test
//! binary because it changes the process working directory.

use misty_client::MistyClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_without_destination_saves_into_working_directory() {
    let server = MockServer::start().await;
    let payload = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    Mock::given(method("GET"))
        .and(path("/api/audio"))
        .and(query_param("FileName", "capture_Dialogue.wav"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let client = MistyClient::new(server.uri()).unwrap();
    let saved = client
        .audio()
        .fetch("capture_Dialogue.wav", None)
        .await
        .unwrap();

    assert_eq!(saved.path, std::path::Path::new("capture_Dialogue.wav"));
    assert_eq!(saved.bytes_written, payload.len() as u64);
    assert_eq!(
        std::fs::read(dir.path().join("capture_Dialogue.wav")).unwrap(),
        payload
    );
    assert!(!dir.path().join(".capture_Dialogue.wav.part").exists());
}
