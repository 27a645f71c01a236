// tests/common.rs
#![allow(dead_code)] // Each integration test uses a different subset.

use flate2::write::GzEncoder;
use flate2::Compression;
use glone::host::{GitHub, HostAdapter};
use serde_json::{json, Value};
use std::io::Write;
use std::process::Command;
use tar::{Builder, EntryType, Header};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Helper function to get the binary command
pub fn glone_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("glone"))
}

/// A mock host API on its own runtime, so blocking library code can be called
/// from the test thread.
pub struct MockHost {
    pub server: MockServer,
    pub rt: Runtime,
}

impl MockHost {
    pub fn start() -> Self {
        let rt = Runtime::new().expect("tokio runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// A GitHub adapter whose API and raw hosts both point at this server.
    pub fn github(&self) -> HostAdapter {
        HostAdapter::GitHub(GitHub::with_base_urls(
            &self.uri(),
            &format!("{}/raw", self.uri()),
        ))
    }

    /// Paths of every request received so far, query strings included.
    pub fn requested(&self) -> Vec<String> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|r| match r.url.query() {
                Some(q) => format!("{}?{}", r.url.path(), q),
                None => r.url.path().to_string(),
            })
            .collect()
    }

    /// A GitHub contents-API item for a file of `owner/repo` on `main`.
    pub fn file_item(&self, path: &str) -> Value {
        json!({
            "path": path,
            "type": "file",
            "url": format!("{}/repos/owner/repo/contents/{}?ref=main", self.uri(), path),
            "download_url": format!("{}/raw/owner/repo/main/{}", self.uri(), path),
        })
    }

    /// A GitHub contents-API item for a directory of `owner/repo` on `main`.
    pub fn dir_item(&self, path: &str) -> Value {
        json!({
            "path": path,
            "type": "dir",
            "url": format!("{}/repos/owner/repo/contents/{}?ref=main", self.uri(), path),
            "download_url": null,
        })
    }

    pub fn mount_listing(&self, dir: &str, items: Vec<Value>) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(format!("/repos/owner/repo/contents/{}", dir)))
                .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(items))),
        );
    }

    pub fn mount_file(&self, repo_path: &str, body: &str) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(format!("/raw/owner/repo/main/{}", repo_path)))
                .respond_with(ResponseTemplate::new(200).set_body_string(body)),
        );
    }
}

/// Builds a gzip tarball shaped like the ones GitHub serves: a pax global
/// header, the synthetic root directory, then `entries` under that root.
/// `None` contents mark a directory.
pub fn tar_gz(root: &str, entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let comment = b"52 comment=0123456789abcdef0123456789abcdef01234567\n";
    let mut header = Header::new_ustar();
    header.set_entry_type(EntryType::XGlobalHeader);
    header.set_size(comment.len() as u64);
    header.set_mode(0o644);
    builder
        .append_data(&mut header, "pax_global_header", &comment[..])
        .unwrap();

    append_dir(&mut builder, &format!("{}/", root));
    for (path, contents) in entries {
        match contents {
            None => append_dir(&mut builder, &format!("{}/{}/", root, path)),
            Some(body) => {
                let mut header = Header::new_ustar();
                header.set_entry_type(EntryType::Regular);
                header.set_size(body.len() as u64);
                header.set_mode(0o644);
                builder
                    .append_data(&mut header, format!("{}/{}", root, path), body.as_bytes())
                    .unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn append_dir<W: Write>(builder: &mut Builder<W>, path: &str) {
    let mut header = Header::new_ustar();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    builder
        .append_data(&mut header, path, std::io::empty())
        .unwrap();
}
