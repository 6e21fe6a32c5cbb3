use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;

const REQUEST_ID_LEN: usize = 8;
const REQUEST_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Log one line per handled request
///
/// Records method, path, a short request id, response status and
/// latency. The id is echoed back in the `x-request-id` header so
/// client reports can be matched to server logs.
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = new_request_id();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        %method,
        path,
        request_id,
        status = response.status().as_u16(),
        latency_ms,
        "request handled"
    );

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

fn new_request_id() -> String {
    let mut rng = rand::rng();
    (0..REQUEST_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..REQUEST_ID_ALPHABET.len());
            REQUEST_ID_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_short_and_unique() {
        let a = new_request_id();
        let b = new_request_id();

        assert_eq!(a.len(), REQUEST_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(a, b);
    }
}
