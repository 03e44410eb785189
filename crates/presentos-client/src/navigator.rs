//! The page-location seam.
//!
//! The calendar consent flow is a full redirect round-trip: the client sends
//! the user to the backend's consent URL, the backend eventually redirects
//! back with `success` or `error` in the query string. [`Navigator`]
//! abstracts that round-trip so the controller can be driven by a scripted
//! fake in tests.
//!
//! [`MarkerFile`] is the real implementation: the redirect opens the consent
//! URL in the browser and waits on a loopback listener for the return
//! redirect; the completion marker is persisted as a one-line file in the
//! data directory, where the *next* session pass finds it. Reading the
//! marker deletes the file, so a pass can consume it at most once.

use std::future::Future;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use presentos_core::ReturnMarker;
use tracing::{debug, error, warn};

use crate::error::{ClientError, ClientResult};

/// Port range for the return-redirect listener.
const RETURN_PORT_RANGE: (u16, u16) = (8765, 8775);

/// How long to wait for the consent round-trip to come back.
const RETURN_TIMEOUT: Duration = Duration::from_secs(300);

/// Abstraction over the consent redirect round-trip and its completion
/// marker.
pub trait Navigator {
    /// Returns the pending completion marker, consuming it.
    ///
    /// The marker is stripped as a side effect; a second call within the
    /// same pass returns `None`.
    fn completion_marker(&self) -> Option<ReturnMarker>;

    /// Sends the user to the consent URL.
    ///
    /// This is terminal for the current session pass: when it returns, the
    /// caller must not run anything else on this path.
    fn redirect(&self, url: &str) -> impl Future<Output = ClientResult<()>>;
}

/// File-backed [`Navigator`].
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    /// Creates a navigator persisting its marker at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the marker file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_and_strip(&self) -> Option<ReturnMarker> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        // Strip first so a failed parse cannot replay on the next pass.
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("failed to remove completion marker: {}", e);
        }
        ReturnMarker::parse_label(content.trim())
    }

    fn write_marker(&self, marker: ReturnMarker) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, marker.as_str())?;
        Ok(())
    }
}

impl Navigator for MarkerFile {
    fn completion_marker(&self) -> Option<ReturnMarker> {
        self.read_and_strip()
    }

    async fn redirect(&self, url: &str) -> ClientResult<()> {
        let (listener, port) = bind_return_listener()?;
        debug!("waiting for consent return on port {}", port);

        open::that(url)
            .map_err(|e| ClientError::Navigation(format!("failed to open browser: {}", e)))?;

        eprintln!("Continue in your browser to connect your calendar.");

        match await_return(listener) {
            Some(marker) => {
                self.write_marker(marker)?;
                debug!("consent round-trip returned: {}", marker.as_str());
            }
            None => {
                // Timeout: no marker, the next pass re-checks the grant.
                warn!("consent round-trip did not return before the timeout");
            }
        }
        Ok(())
    }
}

/// Binds the return-redirect listener on the first free port in the range.
fn bind_return_listener() -> ClientResult<(TcpListener, u16)> {
    for port in RETURN_PORT_RANGE.0..=RETURN_PORT_RANGE.1 {
        if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
            return Ok((listener, port));
        }
    }
    Err(ClientError::Navigation(format!(
        "no available port in range {}-{}",
        RETURN_PORT_RANGE.0, RETURN_PORT_RANGE.1
    )))
}

/// Waits for the return redirect and extracts the completion marker.
///
/// Returns `None` on timeout.
fn await_return(listener: TcpListener) -> Option<ReturnMarker> {
    let (tx, rx) = mpsc::channel();

    // Accept connections on a separate thread so the wait can time out.
    let _handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(marker) = handle_return(stream) {
                        let _ = tx.send(marker);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    rx.recv_timeout(RETURN_TIMEOUT).ok()
}

/// Handles one HTTP request on the return listener.
///
/// Returns `None` for requests without a marker (favicon etc.).
fn handle_return(mut stream: TcpStream) -> Option<ReturnMarker> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();

    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 || parts[0] != "GET" {
        return None;
    }

    let path = parts[1];
    let query = path.find('?').map(|i| &path[i + 1..]).unwrap_or("");
    let marker = ReturnMarker::from_query(query);

    let response = match marker {
        Some(ReturnMarker::Success) => {
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
             <html><body><h1>Calendar connected</h1>\
             <p>You can close this window and return to the terminal.</p></body></html>"
        }
        Some(ReturnMarker::Error) => {
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
             <html><body><h1>Calendar connection failed</h1>\
             <p>You can close this window.</p></body></html>"
        }
        None => {
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\n\r\n\
             <html><body></body></html>"
        }
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    marker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let nav = MarkerFile::new(dir.path().join("marker"));

        nav.write_marker(ReturnMarker::Success).unwrap();
        assert_eq!(nav.completion_marker(), Some(ReturnMarker::Success));
        assert_eq!(nav.completion_marker(), None);
        assert!(!nav.path().exists());
    }

    #[test]
    fn error_marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let nav = MarkerFile::new(dir.path().join("marker"));

        nav.write_marker(ReturnMarker::Error).unwrap();
        assert_eq!(nav.completion_marker(), Some(ReturnMarker::Error));
    }

    #[test]
    fn missing_file_yields_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        let nav = MarkerFile::new(dir.path().join("marker"));
        assert_eq!(nav.completion_marker(), None);
    }

    #[test]
    fn garbage_content_is_stripped_and_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marker");
        std::fs::write(&path, "bogus").unwrap();

        let nav = MarkerFile::new(&path);
        assert_eq!(nav.completion_marker(), None);
        assert!(!path.exists());
    }
}
