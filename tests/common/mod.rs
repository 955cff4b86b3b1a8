//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use docserve::http::mime::MimeTable;
use docserve::http::resolve::DocRoot;
use docserve::server::ServeContext;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A scratch directory removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "docserve-{}-{}-{}",
            tag,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path.join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub const INDEX_HTML: &[u8] = b"<html><body>hello</body></html>\n";

/// Layout used by most tests:
///
/// ```text
/// <tmp>/www/index.html
/// <tmp>/www/style.css
/// <tmp>/www/data.bin.unknownext
/// <tmp>/www/README
/// <tmp>/www/sub/page.html
/// <tmp>/secret.txt
/// <tmp>/www2/leak.txt
/// ```
pub fn site() -> (TempDir, PathBuf) {
    let tmp = TempDir::new("site");
    tmp.write("www/index.html", INDEX_HTML);
    tmp.write("www/style.css", b"body { color: red; }\n");
    tmp.write("www/data.bin.unknownext", &[0u8, 1, 2, 3, 4]);
    tmp.write("www/README", b"plain\n");
    tmp.write("www/sub/page.html", b"<p>sub</p>");
    tmp.write("secret.txt", b"top secret\n");
    tmp.write("www2/leak.txt", b"leaked\n");
    let root = tmp.path().join("www");
    (tmp, root)
}

pub fn mime_table() -> MimeTable {
    MimeTable::parse(".html text/html\n.css text/css\n.txt text/plain\n")
}

pub fn context(root: &Path) -> Arc<ServeContext> {
    context_with(root, Duration::from_secs(5), 8192)
}

pub fn context_with(root: &Path, idle_timeout: Duration, max_request_bytes: usize) -> Arc<ServeContext> {
    context_full(root, idle_timeout, Duration::from_secs(5), max_request_bytes)
}

pub fn context_full(
    root: &Path,
    idle_timeout: Duration,
    write_timeout: Duration,
    max_request_bytes: usize,
) -> Arc<ServeContext> {
    Arc::new(ServeContext {
        doc_root: DocRoot::new(root, "index.html").unwrap(),
        mime: mime_table(),
        idle_timeout,
        write_timeout,
        max_request_bytes,
    })
}

/// Creates a named pipe at `rel`.
#[cfg(unix)]
pub fn mkfifo(tmp: &TempDir, rel: &str) -> PathBuf {
    let path = tmp.path().join(rel);
    let status = std::process::Command::new("mkfifo")
        .arg(&path)
        .status()
        .expect("run mkfifo");
    assert!(status.success(), "mkfifo {}", path.display());
    path
}

/// Splits a raw response into its head and body.
pub fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head terminator");
    let head = String::from_utf8(raw[..end].to_vec()).unwrap();
    (head, raw[end + 4..].to_vec())
}

/// Finds a header value in a response head.
pub fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.split("\r\n")
        .skip(1)
        .filter_map(|l| l.split_once(": "))
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}
