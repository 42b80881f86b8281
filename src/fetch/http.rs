//! HTTP downloader backed by a blocking reqwest client.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};

use crate::core::{PipelineError, PipelineResult};
use crate::fetch::archive::extract_archive;
use crate::fetch::{file_name_from_url, DownloadOptions, Downloader};
use crate::util::fs::write_atomic;

/// Downloads over HTTP(S). Performs no retries.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    progress: bool,
}

impl HttpDownloader {
    /// Create a downloader whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("addonkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpDownloader {
            client,
            progress: std::io::stderr().is_terminal(),
        })
    }

    /// Show a byte progress bar while downloading (only on a terminal).
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress && std::io::stderr().is_terminal();
        self
    }

    fn fetch_bytes(&self, url: &str) -> PipelineResult<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().map_err(|e| {
            PipelineError::fetch(url, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(
                url,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        self.read_body(url, response)
    }

    fn read_body(&self, url: &str, response: Response) -> PipelineResult<Vec<u8>> {
        // Content-Length is only a progress hint; the buffer grows as data arrives.
        let total = response.content_length();
        let mut body = Vec::new();

        let read = match (self.progress, total) {
            (true, Some(total)) => {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}",
                ) {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb.set_message(file_name_from_url(url));
                let result = pb.wrap_read(response).read_to_end(&mut body);
                pb.finish_and_clear();
                result
            }
            _ => {
                let mut response = response;
                response.read_to_end(&mut body)
            }
        };

        read.map_err(|e| PipelineError::fetch(url, None, format!("failed to read response body: {}", e)))?;
        Ok(body)
    }
}

impl Downloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        options: DownloadOptions,
    ) -> PipelineResult<PathBuf> {
        let bytes = self.fetch_bytes(url)?;

        if options.extract {
            extract_archive(&bytes, dest_dir)
                .map_err(|e| PipelineError::fetch(url, None, format!("{:#}", e)))?;
            tracing::debug!("Extracted {} into {}", url, dest_dir.display());
            return Ok(dest_dir.to_path_buf());
        }

        let path = dest_dir.join(file_name_from_url(url));
        write_atomic(&path, &bytes).map_err(|e| {
            PipelineError::io_from(format!("failed to save download to {}", path.display()), e)
        })?;
        tracing::debug!("Saved {} ({} bytes) to {}", url, bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    use crate::test_support::zip_archive;
    use tempfile::TempDir;

    /// Answer a single request on a loopback port with `response`, then close.
    fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(&response);
            let _ = stream.flush();
        });
        format!("http://{}", addr)
    }

    fn response(status: &str, headers: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nConnection: close\r\n{}\r\n",
            status, headers
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    fn downloader() -> HttpDownloader {
        HttpDownloader {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            progress: false,
        }
    }

    #[test]
    fn test_not_found_is_fetch_error_with_status() {
        let tmp = TempDir::new().unwrap();
        let base = serve_once(response("404 Not Found", "Content-Length: 0\r\n", b""));
        let url = format!("{}/package/demo-addon-v1.2.3-electron-v13.1-win32-x64.tar.gz", base);

        let err = downloader()
            .download(&url, tmp.path(), DownloadOptions::extract())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains(&url));
    }

    #[test]
    fn test_oversized_content_length_is_fetch_error() {
        let tmp = TempDir::new().unwrap();
        let base = serve_once(response(
            "200 OK",
            "Content-Length: 9223372036854775000\r\n",
            b"abc",
        ));
        let url = format!("{}/package/addon.tar.gz", base);

        let err = downloader()
            .download(&url, tmp.path(), DownloadOptions::extract())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch { .. }), "{:?}", err);
    }

    #[test]
    fn test_non_archive_body_is_fetch_error_when_extracting() {
        let tmp = TempDir::new().unwrap();
        let body = b"<html>maintenance</html>";
        let base = serve_once(response(
            "200 OK",
            &format!("Content-Length: {}\r\n", body.len()),
            body,
        ));
        let url = format!("{}/package/addon.tar.gz", base);

        let err = downloader()
            .download(&url, tmp.path(), DownloadOptions::extract())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch { status: None, .. }), "{:?}", err);
    }

    #[test]
    fn test_saved_download_uses_last_url_segment() {
        let tmp = TempDir::new().unwrap();
        let body = zip_archive(&[("include/nertc_engine.h", "// v4.1.110")]);
        let base = serve_once(response(
            "200 OK",
            &format!("Content-Length: {}\r\n", body.len()),
            &body,
        ));
        let url = format!("{}/package/1628698699/NERtc_Windows_SDK.zip?download=sdk.zip", base);

        let path = downloader()
            .download(&url, tmp.path(), DownloadOptions::save())
            .unwrap();

        assert_eq!(path, tmp.path().join("NERtc_Windows_SDK.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }
}
