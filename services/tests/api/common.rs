//! Shared test utilities for integration tests.
//!
//! Every app built here stores blobs with `LocalDisk` in its own temporary
//! directory and keeps metadata in a `MockSqlStorage`.

use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use snapfeed_services::{
    config::Config, database::MockSqlStorage, routes, storage::LocalDisk,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Smallest valid-looking PNG payload; content is never decoded.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image body";

pub struct TestApp {
    pub server: TestServer,
    pub sql: MockSqlStorage,
    // Held so the directory outlives the server.
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Names of the files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .expect("upload dir is readable")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn stored_path(&self, file_name: &str) -> PathBuf {
        self.upload_dir.path().join(file_name)
    }
}

pub async fn spawn_app(sql: MockSqlStorage) -> TestApp {
    spawn_app_with_config(sql, Config::new_for_test()).await
}

pub async fn spawn_app_with_max_size(sql: MockSqlStorage, max_size: u64) -> TestApp {
    spawn_app_with_config(sql, Config::new_for_test().with_max_upload_size(max_size)).await
}

async fn spawn_app_with_config(sql: MockSqlStorage, config: Config) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create temp upload dir");
    let config = config.with_upload_dir(upload_dir.path());
    let disk = LocalDisk::new(upload_dir.path()).expect("local disk");

    let app = routes(sql.clone(), disk, config).await;
    let server = TestServer::new(app).expect("test server");

    TestApp {
        server,
        sql,
        upload_dir,
    }
}

/// A form with one `file` part.
pub fn file_form(bytes: &[u8], file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes.to_vec())
            .file_name(file_name)
            .mime_type(mime_type),
    )
}

pub fn png_form(caption: Option<&str>) -> MultipartForm {
    let form = file_form(PNG_BYTES, "photo.png", "image/png");
    match caption {
        Some(caption) => form.add_text("caption", caption),
        None => form,
    }
}
