use reqwest::blocking::{Client, ClientBuilder};
use tracing::debug;

use crate::catalog::page_url;
use crate::error::{FetchError, ScrapeError};
use crate::settings::Settings;

/// Anything that can hand back the raw HTML of one category page.
pub trait PageSource {
    fn fetch(&self, category_url: &str, page: u32) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher. One request per call: no retry, no backoff,
/// reqwest's default timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let client = client_builder(user_agent)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ScrapeError> {
        Self::new(&settings.user_agent)
    }
}

fn client_builder(user_agent: &str) -> ClientBuilder {
    Client::builder().user_agent(user_agent)
}

impl PageSource for HttpFetcher {
    fn fetch(&self, category_url: &str, page: u32) -> Result<String, FetchError> {
        let url = page_url(category_url, page);
        debug!(%url, "GET");

        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };
        let response = self.client.get(&url).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response.text().map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single canned response on a random local port and hand back
    /// the base URL plus the request line and User-Agent that were received.
    fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut user_agent = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("user-agent:") {
                    user_agent = v.trim().to_string();
                }
            }
            let response = format!(
                "{}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            (request_line.trim().to_string(), user_agent)
        });
        (format!("http://{}/categorie/vetements-homme", addr), handle)
    }

    // Local servers only; ignore any proxy configured in the environment.
    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::with_client(
            client_builder("coinafrique-test/1.0")
                .no_proxy()
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn fetches_page_with_query_and_user_agent() {
        let (base, server) = one_shot_server("HTTP/1.1 200 OK", "<html>ok</html>");
        let fetcher = local_fetcher();

        let body = fetcher.fetch(&base, 2).unwrap();
        assert_eq!(body, "<html>ok</html>");

        let (request_line, user_agent) = server.join().unwrap();
        assert_eq!(request_line, "GET /categorie/vetements-homme?page=2 HTTP/1.1");
        assert_eq!(user_agent, "coinafrique-test/1.0");
    }

    #[test]
    fn non_success_status_is_a_page_failure() {
        let (base, server) = one_shot_server("HTTP/1.1 503 Service Unavailable", "busy");
        let fetcher = local_fetcher();

        let err = fetcher.fetch(&base, 1).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(err.url().ends_with("?page=1"));
        server.join().unwrap();
    }

    #[test]
    fn builds_from_settings() {
        assert!(HttpFetcher::from_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn connection_refused_is_a_transport_failure() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let fetcher = local_fetcher();

        let err = fetcher
            .fetch(&format!("http://127.0.0.1:{}/categorie/x", port), 1)
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
