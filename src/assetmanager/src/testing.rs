//! Stub asset manager for tests.
//!
//! A tiny HTTP/1.1 server on a random local port that asks for digest
//! authentication like Opencast does and answers episode lookups from a
//! handler. Only available with the `testing` feature or during tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// Digest challenge sent unless replaced
pub const DIGEST_CHALLENGE: &str =
    "Digest realm=\"Opencast\", qop=\"auth\", nonce=\"dcd98b7102dd2f0e8b11d0f600bfb0c093\", opaque=\"5ccc069c403ebaf9f0171e9517f40e41\"";

/// What the stub answers for an authenticated request
#[derive(Debug, Clone, Copy)]
pub enum StubResponse {
    /// 200 with an empty JSON body
    Found,
    /// 404
    NotFound,
    /// Any status with a plain text body
    Status(u16, &'static str),
    /// Status whose body ends before its announced length
    TruncatedBody(u16),
}

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub requested_auth: Option<String>,
}

#[derive(Debug)]
struct Settings {
    challenges: Vec<String>,
    reject_logins: bool,
}

type Handler = dyn Fn(&str) -> StubResponse + Send + Sync;

pub struct StubAssetManager {
    url: String,
    settings: Arc<Mutex<Settings>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubAssetManager {
    /// Start serving in a background thread, `handler` gets the request path
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub asset manager");
        let addr = listener.local_addr().expect("stub asset manager address");

        let settings = Arc::new(Mutex::new(Settings {
            challenges: vec![DIGEST_CHALLENGE.to_string()],
            reject_logins: false,
        }));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        {
            let settings = settings.clone();
            let requests = requests.clone();
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { continue };
                    serve(stream, handler.as_ref(), &settings, &requests);
                }
            });
        }

        Self {
            url: format!("http://{addr}"),
            settings,
            requests,
        }
    }

    /// Answer every digest login with another 401
    pub fn rejecting_logins(self) -> Self {
        self.settings.lock().unwrap().reject_logins = true;
        self
    }

    /// Replace the `WWW-Authenticate` challenge
    pub fn with_challenge(self, challenge: &str) -> Self {
        self.with_challenges(&[challenge])
    }

    /// Send one `WWW-Authenticate` header per challenge, in order
    pub fn with_challenges(self, challenges: &[&str]) -> Self {
        self.settings.lock().unwrap().challenges =
            challenges.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Base URL of the stub
    pub fn url(&self) -> String {
        self.url.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// A local URL nobody listens on
    pub fn unused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
        let addr = listener.local_addr().expect("probe address");
        drop(listener);
        format!("http://{addr}")
    }
}

fn serve(
    stream: TcpStream,
    handler: &Handler,
    settings: &Mutex<Settings>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let mut reader = BufReader::new(stream);
    let Some(request) = read_request(&mut reader) else {
        return;
    };
    requests.lock().unwrap().push(request.clone());

    let (status, extra_headers, body, truncated) = {
        let settings = settings.lock().unwrap();
        if request.authorization.is_none() || settings.reject_logins {
            let challenges = settings
                .challenges
                .iter()
                .map(|challenge| format!("WWW-Authenticate: {challenge}"))
                .collect::<Vec<_>>();
            (401, challenges, "Unauthorized".to_string(), false)
        } else {
            match handler(&request.path) {
                StubResponse::Found => (200, Vec::new(), "{}".to_string(), false),
                StubResponse::NotFound => (404, Vec::new(), "Not Found".to_string(), false),
                StubResponse::Status(status, body) => {
                    (status, Vec::new(), body.to_string(), false)
                }
                StubResponse::TruncatedBody(status) => (status, Vec::new(), "cut".to_string(), true),
            }
        }
    };

    // a truncated body announces more bytes than are sent before the connection closes
    let content_length = if truncated { body.len() + 64 } else { body.len() };
    let mut response = format!(
        "HTTP/1.1 {status} Stub\r\nConnection: close\r\nContent-Length: {content_length}\r\n"
    );
    for header in extra_headers {
        response.push_str(&header);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    response.push_str(&body);

    let stream = reader.get_mut();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let path = line.split_whitespace().nth(1)?.to_string();

    let mut request = RecordedRequest {
        path,
        authorization: None,
        requested_auth: None,
    };

    loop {
        line.clear();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("authorization") {
                request.authorization = Some(value);
            } else if name.eq_ignore_ascii_case("x-requested-auth") {
                request.requested_auth = Some(value);
            }
        }
    }

    Some(request)
}
