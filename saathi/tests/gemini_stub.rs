//! Gemini client behavior against a local HTTP stub.
//!
//! The stub accepts one connection, reads the full request, and answers with a
//! canned HTTP/1.1 response, which is enough to exercise the SSE read loop and the
//! error mapping without the real service.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use saathi::{ChatGemini, GenerationConfig, LlmClient, LlmError, LlmRequest, Turn};

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Serves one request with the given status line and body, then closes.
async fn spawn_stub(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut tmp).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&tmp[..n]);
            if let Some(pos) = find_blank_line(&buf) {
                break pos;
            }
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + 4 + content_length {
            let n = socket.read(&mut tmp).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&tmp[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/v1beta")
}

fn client(base_url: String) -> ChatGemini {
    ChatGemini::new("test-key").unwrap().with_base_url(base_url)
}

#[tokio::test]
async fn sse_parts_are_concatenated_across_lines() {
    let base = spawn_stub(
        "200 OK",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"{\\\"CarbonEmission\\\":\"}]}}]}\n\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"12.5}\"}]}}]}\n\n",
    )
    .await;
    let turns = vec![Turn::user("I grow wheat")];
    let generation = GenerationConfig::default();
    let request = LlmRequest {
        turns: &turns,
        system_instruction: "sys",
        generation: &generation,
        response_schema: None,
    };

    let blob = client(base).generate(&request).await.unwrap();
    assert_eq!(blob, "{\"CarbonEmission\":12.5}");
}

#[tokio::test]
async fn chunks_stream_out_while_the_call_runs() {
    let base = spawn_stub(
        "200 OK",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"first \"}]}}]}\n\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"second\"}]}}]}\n\n",
    )
    .await;
    let turns = vec![Turn::user("hi")];
    let generation = GenerationConfig::default();
    let request = LlmRequest {
        turns: &turns,
        system_instruction: "sys",
        generation: &generation,
        response_schema: None,
    };

    let (tx, mut rx) = mpsc::channel(8);
    let blob = client(base)
        .generate_stream(&request, Some(tx))
        .await
        .unwrap();
    assert_eq!(blob, "first second");

    let mut chunks = Vec::new();
    while let Ok(chunk) = rx.try_recv() {
        chunks.push(chunk.content);
    }
    assert_eq!(chunks, vec!["first ", "second"]);
}

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let base = spawn_stub("429 Too Many Requests", "quota exceeded for project").await;
    let turns = vec![Turn::user("hi")];
    let generation = GenerationConfig::default();
    let request = LlmRequest {
        turns: &turns,
        system_instruction: "sys",
        generation: &generation,
        response_schema: None,
    };

    let err = client(base).generate(&request).await.unwrap_err();
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_stream_is_no_content() {
    let base = spawn_stub("200 OK", "").await;
    let turns = vec![Turn::user("hi")];
    let generation = GenerationConfig::default();
    let request = LlmRequest {
        turns: &turns,
        system_instruction: "sys",
        generation: &generation,
        response_schema: None,
    };

    let err = client(base).generate(&request).await.unwrap_err();
    assert!(matches!(err, LlmError::NoContent));
}

#[tokio::test]
async fn keepalive_only_stream_is_no_content() {
    let base = spawn_stub("200 OK", ": keepalive\n\n: keepalive\n\n").await;
    let turns = vec![Turn::user("hi")];
    let generation = GenerationConfig::default();
    let request = LlmRequest {
        turns: &turns,
        system_instruction: "sys",
        generation: &generation,
        response_schema: None,
    };

    let err = client(base).generate(&request).await.unwrap_err();
    assert!(matches!(err, LlmError::NoContent));
}
