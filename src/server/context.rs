use std::time::Duration;

use crate::config::Config;
use crate::http::mime::MimeTable;
use crate::http::resolve::DocRoot;

/// Everything a connection needs from the server. Built once at startup
/// and shared read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ServeContext {
    pub doc_root: DocRoot,
    pub mime: MimeTable,
    pub idle_timeout: Duration,
    pub write_timeout: Duration,
    pub max_request_bytes: usize,
}

impl ServeContext {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let doc_root = DocRoot::new(cfg.doc_root(), cfg.server.default_document.clone())?;
        let mime = match cfg.mime_types() {
            Some(path) => MimeTable::load(path),
            None => {
                tracing::warn!("No mime_types configured, every file is served as binary");
                MimeTable::new()
            }
        };

        Ok(Self {
            doc_root,
            mime,
            idle_timeout: cfg.idle_timeout(),
            write_timeout: cfg.write_timeout(),
            max_request_bytes: cfg.server.max_request_bytes,
        })
    }
}
