use std::{sync::OnceLock, time::Duration};

use reqwest::Client;

/// Shared HTTP client so repeated synthesis calls reuse connections
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            Client::builder()
                .timeout(Duration::from_secs(60))
                .pool_idle_timeout(Some(Duration::from_secs(10)))
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .build()
                .expect("default HTTP client must build")
        })
        .clone()
}
