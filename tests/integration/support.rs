//! Shared loopback-server helpers for integration tests.
//!
//! `tiny_http::Server::recv()` blocks, so scripted servers run on their own
//! OS thread and hand back what they saw when joined.

use std::thread;

use tiny_http::{Header, Response, Server};

/// One request as the scripted server saw it.
#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// Serve `responses` in order on a loopback port, recording each request.
/// Returns the base URL and a handle yielding the recorded requests.
pub fn spawn_server(
    responses: Vec<(u16, String)>,
) -> (String, thread::JoinHandle<Vec<RecordedRequest>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let base = format!("http://127.0.0.1:{port}");

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().unwrap();
            let mut request_body = String::new();
            request
                .as_reader()
                .read_to_string(&mut request_body)
                .unwrap();
            recorded.push(RecordedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: request_body,
            });
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            request.respond(response).unwrap();
        }
        recorded
    });

    (base, handle)
}
