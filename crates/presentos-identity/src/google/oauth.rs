//! OAuth 2.0 authorization-code flow with PKCE and a loopback redirect.
//!
//! Sign-in opens the user's browser to Google's consent page; Google
//! redirects back to a short-lived local HTTP server which captures the
//! authorization code. The code is then exchanged for tokens. A blocked or
//! dismissed browser is not fatal: the URL is printed for manual copy and
//! the flow keeps waiting until the callback timeout.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{IdentityError, IdentityResult};

use super::config::OAuthCredentials;
use super::tokens::TokenSet;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Length of the PKCE code verifier, in bytes before base64url encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long to wait for the user to complete the consent page.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// OAuth client for Google's token endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client with the given credentials and request timeout.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { credentials, http }
    }

    /// Runs the interactive consent flow and returns the obtained tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if no loopback port is available, the user denies
    /// authorization, the callback times out, or the token exchange fails.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
    ) -> IdentityResult<TokenSet> {
        let pkce = Pkce::new();

        let (listener, port) = bind_loopback(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);

        let auth_url = pkce.consent_url(&self.credentials.client_id, &redirect_uri, scopes);

        info!("starting sign-in flow, opening browser");
        debug!("consent URL: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser to sign in:\n\n{}\n", auth_url);
        }

        let (code, returned_state) = await_callback(listener)?;

        if returned_state != pkce.state {
            return Err(IdentityError::authentication(
                "OAuth state mismatch - possible CSRF attack",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange(&code, &pkce.verifier, &redirect_uri, scopes).await
    }

    /// Obtains a fresh access token from a refresh token.
    ///
    /// Returns the new access token and its expiry in seconds.
    pub async fn refresh(&self, refresh_token: &str) -> IdentityResult<(String, Option<i64>)> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response: TokenResponse = self.token_request(&params, "token refresh").await?;
        info!("refreshed access token");
        Ok((response.access_token, response.expires_in))
    }

    /// Exchanges an authorization code for tokens.
    async fn exchange(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> IdentityResult<TokenSet> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response: TokenResponse = self.token_request(&params, "token exchange").await?;
        info!("obtained tokens");
        Ok(TokenSet::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            scopes.to_vec(),
        ))
    }

    /// Posts a form to the token endpoint and parses the response.
    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> IdentityResult<TokenResponse> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| IdentityError::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(IdentityError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| IdentityError::invalid_response(format!("invalid token response: {}", e)))
    }
}

/// Binds a TCP listener on the first free port in the range.
fn bind_loopback(port_range: (u16, u16)) -> IdentityResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
            debug!("bound loopback server on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(IdentityError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Waits for the consent callback and extracts `(code, state)`.
fn await_callback(listener: TcpListener) -> IdentityResult<(String, String)> {
    listener
        .set_nonblocking(false)
        .map_err(|e| IdentityError::internal(format!("failed to set blocking: {}", e)))?;

    let (tx, rx) = mpsc::channel();

    // Accept connections on a separate thread so the wait can time out.
    let _handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(IdentityError::authentication("sign-in callback timed out"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(IdentityError::internal("callback channel disconnected"))
        }
    }
}

/// Handles one HTTP request on the callback server.
///
/// Returns `None` for requests that are not the callback (favicon etc.).
fn handle_callback(mut stream: TcpStream) -> Option<IdentityResult<(String, String)>> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();

    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    // GET /callback?code=...&state=... HTTP/1.1
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 || parts[0] != "GET" {
        return None;
    }

    let path = parts[1];
    if !path.starts_with("/callback") {
        return None;
    }

    let query = path.find('?').map(|i| &path[i + 1..]).unwrap_or("");

    let mut code = None;
    let mut state = None;
    let mut denial = None;

    for param in query.split('&') {
        let mut kv = param.splitn(2, '=');
        if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
            let value = urlencoding::decode(value).unwrap_or_default().into_owned();
            match key {
                "code" => code = Some(value),
                "state" => state = Some(value),
                "error" => denial = Some(value),
                _ => {}
            }
        }
    }

    let response = if denial.is_some() || code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
         <html><body><h1>Sign-in failed</h1>\
         <p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
         <html><body><h1>Signed in</h1>\
         <p>You can close this window and return to the terminal.</p></body></html>"
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    if let Some(denial) = denial {
        return Some(Err(IdentityError::authentication(format!(
            "authorization denied: {}",
            denial
        ))));
    }

    match (code, state) {
        (Some(c), Some(s)) => Some(Ok((c, s))),
        (Some(c), None) => Some(Ok((c, String::new()))),
        _ => Some(Err(IdentityError::authentication(
            "missing authorization code in callback",
        ))),
    }
}

/// PKCE state for one authorization attempt (RFC 7636).
#[derive(Debug)]
pub struct Pkce {
    /// High-entropy random code verifier.
    pub verifier: String,
    /// SHA-256 challenge of the verifier, base64url encoded.
    pub challenge: String,
    /// Random state for CSRF protection.
    pub state: String,
}

impl Pkce {
    /// Generates a fresh verifier, challenge, and state.
    pub fn new() -> Self {
        let verifier = random_b64(CODE_VERIFIER_LENGTH);
        let challenge = Self::challenge_for(&verifier);
        let state = random_b64(16);

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds the consent URL for this attempt.
    pub fn consent_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for Pkce {
    fn default() -> Self {
        Self::new()
    }
}

fn random_b64(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from the token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
