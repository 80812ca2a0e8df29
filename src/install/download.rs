use super::InstallError;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CHUNK_SIZE: usize = 64 * 1024;

/// Blocking HTTP client for release downloads.
///
/// Honors `HTTPS_PROXY`/`HTTP_PROXY` when set to a valid proxy URL.
pub fn create_client() -> Result<reqwest::blocking::Client, InstallError> {
    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(30 * 60));

    if let Ok(proxy_url) = std::env::var("HTTPS_PROXY")
        .or_else(|_| std::env::var("https_proxy"))
        .or_else(|_| std::env::var("HTTP_PROXY"))
        .or_else(|_| std::env::var("http_proxy"))
    {
        if !proxy_url.trim().is_empty() {
            match reqwest::Proxy::all(&proxy_url) {
                Ok(proxy) => {
                    debug!("Using proxy {}", proxy_url);
                    builder = builder.proxy(proxy);
                }
                Err(e) => warn!("Ignoring invalid proxy {}: {}", proxy_url, e),
            }
        }
    }

    builder.build().map_err(|source| InstallError::Http {
        url: String::new(),
        source,
    })
}

/// Whole percent of `total` covered by `downloaded`, when the total is known
pub fn percent_complete(downloaded: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(total) if total > 0 => Some((downloaded.min(total) * 100 / total) as u8),
        _ => None,
    }
}

/// Download `url` into `dest`, logging progress every 10%.
///
/// Returns the number of bytes written.
pub fn download_file(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, InstallError> {
    info!("Downloading {}", url);
    let http_err = |source| InstallError::Http {
        url: url.to_string(),
        source,
    };

    let mut response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(http_err)?;
    let total = response.content_length();

    let mut file = File::create(dest).map_err(InstallError::io(dest))?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded = 0u64;
    let mut last_reported = 0u8;

    loop {
        let read = response.read(&mut buffer).map_err(InstallError::io(dest))?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read]).map_err(InstallError::io(dest))?;
        downloaded += read as u64;

        if let Some(percent) = percent_complete(downloaded, total) {
            if percent >= last_reported.saturating_add(10) {
                info!("Downloaded {}% of {}", percent, url);
                last_reported = percent - percent % 10;
            }
        }
    }

    file.flush().map_err(InstallError::io(dest))?;
    info!("Downloaded {} bytes to {:?}", downloaded, dest);
    Ok(downloaded)
}
