use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};
use pagesmith_lib::RenderError;
use tiny_http::{Header, Request, Response, Server};

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("xml") => "application/xml; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Map a request path onto a file in the build folder.
///
/// `/` is the index of the primary culture, `/fr/about` is `fr/about.html` and a
/// directory serves its `index.html`.
pub fn resolve_request(build_root: &Path, primary_culture: &str, url: &str) -> Option<PathBuf> {
    let url = url.split(['?', '#']).next().unwrap_or("");
    let url = url.trim_matches('/');
    if url.split('/').any(|segment| segment == "..") {
        return None;
    }
    let path = if url.is_empty() {
        build_root.join(primary_culture)
    } else {
        build_root.join(url)
    };

    if path.is_file() {
        return Some(path);
    }
    if path.is_dir() {
        let index = path.join("index.html");
        return index.is_file().then_some(index);
    }
    let mut html = path.into_os_string();
    html.push(".html");
    let html = PathBuf::from(html);
    html.is_file().then_some(html)
}

fn respond(request: Request, path: &Path) {
    let url = request.url().to_string();
    match fs::read(path) {
        Ok(contents) => {
            let mut response = Response::from_data(contents);
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type(path).as_bytes()) {
                response = response.with_header(header);
            }
            if request.respond(response).is_ok() {
                info!("200 {url}");
            }
        }
        Err(e) => {
            let response = Response::from_string("Internal Server Error").with_status_code(500);
            let _ = request.respond(response);
            error!("500 {url} - Failed to read file: {e}");
        }
    }
}

pub fn start_preview_server(
    build_root: PathBuf,
    primary_culture: String,
    port: u16,
) -> Result<(), RenderError> {
    let addr = format!("0.0.0.0:{port}");
    let server = Server::http(&addr).map_err(|e| RenderError::io(e.to_string()))?;

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        match resolve_request(&build_root, &primary_culture, &url) {
            Some(path) => {
                debug!("Request: {url} -> {path:?}");
                respond(request, &path)
            }
            None => {
                let response = Response::from_string("404 Not Found").with_status_code(404);
                let _ = request.respond(response);
                warn!("404 {url}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn resolves_culture_pages() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("en/blog")).unwrap();
        fs::write(dir.path().join("en/index.html"), "").unwrap();
        fs::write(dir.path().join("en/about.html"), "").unwrap();
        fs::write(dir.path().join("en/blog/index.html"), "").unwrap();

        let root = dir.path();
        assert_eq!(resolve_request(root, "en", "/"), Some(root.join("en/index.html")));
        assert_eq!(
            resolve_request(root, "en", "/en/about?x=1"),
            Some(root.join("en/about.html"))
        );
        assert_eq!(resolve_request(root, "en", "/en/blog/"), Some(root.join("en/blog/index.html")));
        assert_eq!(resolve_request(root, "en", "/fr/about"), None);
        assert_eq!(resolve_request(root, "en", "/../etc/passwd"), None);
    }
}
