mod common;

use std::time::Duration;

use common::{TempDir, split_response};
use docserve::http::response::{Body, Response, ResponseBuilder, StatusCode};
use docserve::http::writer::{ResponseWriter, serialize_head};

#[test]
fn test_serialize_head() {
    let response = ResponseBuilder::new(StatusCode::NotFound).close().build();
    let head = String::from_utf8(serialize_head(&response)).unwrap();

    assert!(head.starts_with("HTTP/1.1 404 Requested file not found.\r\nServer: "));
    assert!(head.contains("\r\nConnection: close\r\n"));
    assert!(head.contains("\r\nContent-Length: 0\r\n"));
    assert!(head.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_send_head_only() {
    let response = Response::malformed();
    let mut out: Vec<u8> = Vec::new();

    let mut writer = ResponseWriter::new(&response, Duration::from_secs(1));
    let sent = writer.send(&mut out, response.body).await.unwrap();

    assert_eq!(sent, 0);
    let (head, body) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 400 Malformed Request"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_streams_file_larger_than_one_chunk() {
    let tmp = TempDir::new("writer");
    let contents: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    let path = tmp.write("big.bin", &contents);

    let file = tokio::fs::File::open(&path).await.unwrap();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .file(file, contents.len() as u64)
        .build();
    let mut out: Vec<u8> = Vec::new();

    let mut writer = ResponseWriter::new(&response, Duration::from_secs(1));
    let sent = writer.send(&mut out, response.body).await.unwrap();

    assert_eq!(sent, contents.len() as u64);
    let (head, body) = split_response(&out);
    assert!(head.contains("Content-Length: 50000"));
    assert_eq!(body, contents);
}

#[tokio::test]
async fn test_short_file_aborts() {
    let tmp = TempDir::new("writer-short");
    let path = tmp.write("short.bin", b"abc");

    let file = tokio::fs::File::open(&path).await.unwrap();
    let mut out: Vec<u8> = Vec::new();
    let response = Response::malformed();

    let mut writer = ResponseWriter::new(&response, Duration::from_secs(1));
    let result = writer.send(&mut out, Body::File { file, len: 10 }).await;

    assert!(result.is_err());
}
