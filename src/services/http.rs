use crate::error::{classify_status, ApiError};
use crate::model::{placeholder_re, HttpMethod};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// A decoded response body together with its exact text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub value: JsonValue,
    pub raw: String,
}

/// Blocking JSON client for the management backend.
///
/// Cheap to clone; worker threads each take their own handle.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self {
            base_url: expand_env(server).trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn send(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: Option<&JsonValue>,
    ) -> Result<Fetched, ApiError> {
        let url = self.url(path);
        let mut req = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Put => self.http.put(&url),
            HttpMethod::Delete => self.http.delete(&url),
        };
        if let Some(t) = token {
            req = req.query(&[("token", t)]);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        tracing::debug!(?method, %url, "request");
        let resp = req.send().map_err(|e| {
            tracing::warn!(?method, %url, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = resp.status().as_u16();
        let raw = resp
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if let Err(e) = classify_status(status, &raw) {
            tracing::warn!(?method, %url, status, error = %e, "request rejected");
            return Err(e);
        }
        tracing::debug!(?method, %url, status, bytes = raw.len(), "response");
        parse_body(raw)
    }
}

fn parse_body(raw: String) -> Result<Fetched, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Fetched {
            value: JsonValue::Null,
            raw,
        });
    }
    let value = serde_json::from_str(&raw).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(Fetched { value, raw })
}

/// Fill `{id}` and configured params into an endpoint template.
pub fn expand_endpoint(template: &str, id: Option<&str>, params: &HashMap<String, String>) -> String {
    placeholder_re().replace_all(template, |caps: &regex::Captures| {
        let key = &caps[1];
        match (key, id) {
            ("id", Some(id)) => id.to_string(),
            _ => params.get(key).cloned().unwrap_or_default(),
        }
    })
    .to_string()
}

/// Expand `${VAR}` from the environment; unset variables expand to "".
pub fn expand_env(s: &str) -> String {
    static ENV_RE: OnceLock<Regex> = OnceLock::new();
    let re = ENV_RE.get_or_init(|| Regex::new(r"\$\{([A-Z0-9_]+)\}").expect("static regex"));
    re.replace_all(s, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    // Answer a single request with `status` and `body`; yields the request line and body.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let status = status.to_string();
        let body = body.to_string();
        let h = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut req_body = vec![0u8; content_length];
            reader.read_exact(&mut req_body).unwrap();
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
            (
                request_line.trim().to_string(),
                String::from_utf8(req_body).unwrap(),
            )
        });
        (format!("http://{addr}"), h)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn get_keeps_raw_text_and_sends_token() {
        let (base, h) = serve_once("200 OK", r#"{"b": 1, "a": 2}"#);
        let got = client(&base)
            .send(HttpMethod::Get, "/emulationstatisticsdata/get/4", Some("abc"), None).unwrap();
        assert_eq!(got.raw, r#"{"b": 1, "a": 2}"#);
        let keys: Vec<&String> = got.value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
        let (line, _) = h.join().unwrap();
        assert_eq!(line, "GET /emulationstatisticsdata/get/4?token=abc HTTP/1.1");
    }

    #[test]
    fn token_is_appended_to_existing_query() {
        let (base, h) = serve_once("200 OK", "[]");
        client(&base)
            .send(HttpMethod::Get, "/experiments?ids=true", Some("t"), None).unwrap();
        let (line, _) = h.join().unwrap();
        assert_eq!(line, "GET /experiments?ids=true&token=t HTTP/1.1");
    }

    #[test]
    fn unauthorized_and_bad_request_are_classified() {
        let (base, h) = serve_once("401 Unauthorized", "");
        let err = client(&base)
            .send(HttpMethod::Delete, "/experiments/1", Some("t"), None).unwrap_err();
        assert!(err.is_unauthorized());
        h.join().unwrap();

        let (base, h) = serve_once("400 Bad Request", "missing user");
        let body = serde_json::json!({"user": {"username": "x"}});
        let err = client(&base)
            .send(HttpMethod::Put, "/users/1", None, Some(&body)).unwrap_err();
        assert!(err.is_bad_request());
        let (line, sent) = h.join().unwrap();
        assert!(line.starts_with("PUT /users/1 "));
        assert_eq!(serde_json::from_str::<JsonValue>(&sent).unwrap(), body);
    }

    #[test]
    fn empty_success_body_is_null() {
        let (base, h) = serve_once("200 OK", "");
        let got = client(&base)
            .send(HttpMethod::Post, "/emulationstatisticsdata/remove/3", None, None).unwrap();
        assert!(got.value.is_null());
        h.join().unwrap();
    }

    #[test]
    fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{addr}"))
            .send(HttpMethod::Get, "/x", None, None).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn endpoint_templates_expand_id_and_params() {
        let params = HashMap::from([
            ("emulation".to_string(), "csle-level9".to_string()),
            ("execution".to_string(), "15".to_string()),
        ]);
        assert_eq!(
            expand_endpoint("/emulations/{emulation}/executions/{execution}/switches", None, &params),
            "/emulations/csle-level9/executions/15/switches"
        );
        assert_eq!(
            expand_endpoint("/experiments/{id}", Some("9"), &params),
            "/experiments/9"
        );
    }

    #[test]
    fn server_url_expands_env_and_trims_slash() {
        std::env::set_var("CSLE_CONSOLE_TEST_HOST", "10.0.0.9");
        let c = client("http://${CSLE_CONSOLE_TEST_HOST}:7777/");
        assert_eq!(c.base_url(), "http://10.0.0.9:7777");
        assert_eq!(c.url("/login"), "http://10.0.0.9:7777/login");
    }
}
