//! Integration tests for the backup export/import flow.

mod common;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use config_admin::archive::write_config_archive;
use reqwest::multipart::{Form, Part};

/// ZIP bytes of a tree rooted at `root`, as the export endpoint produces.
fn archive_bytes(root: &Path) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    write_config_archive(root, &mut cursor, "test archive").unwrap();
    cursor.into_inner()
}

fn zip_form(bytes: Vec<u8>) -> Form {
    Form::new().part(
        "backup",
        Part::bytes(bytes)
            .file_name("backup.zip")
            .mime_str("application/zip")
            .unwrap(),
    )
}

/// The work directory must hold no upload or extraction leftovers once an
/// import call has returned, whatever its outcome.
fn assert_work_dir_clean(site: &Path) {
    let work = site.join("work");
    if !work.exists() {
        return;
    }
    let leftovers: Vec<_> = fs::read_dir(&work)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    assert!(leftovers.is_empty(), "leftovers in work dir: {:?}", leftovers);
}

fn backup_dirs(site: &Path) -> Vec<String> {
    fs::read_dir(site)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with("config-backup-"))
        .collect()
}

#[tokio::test]
async fn test_export_produces_zip_attachment() {
    let server = common::start_server().await;
    common::seed_tree(&server.config_root);

    let res = common::client()
        .get(server.url("/api/admin/config/export"))
        .header("Authorization", common::bearer())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/zip"
    );
    let disposition = res
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"config-admin-config-backup-"));
    assert!(disposition.ends_with(".zip\""));

    let bytes = res.bytes().await.unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"config/app.json".to_string()));
    assert!(names.contains(&"__backup_metadata.json".to_string()));
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let server = common::start_server().await;
    common::seed_tree(&server.config_root);

    // Export the live tree.
    let exported = common::client()
        .get(server.url("/api/admin/config/export"))
        .header("Authorization", common::bearer())
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap()
        .to_vec();

    // Drift the live tree away from the export.
    fs::remove_file(server.config_root.join("app.json")).unwrap();
    fs::write(server.config_root.join("stale.json"), "{}").unwrap();

    // Import the export back.
    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(zip_form(exported))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["importedFiles"], 3);
    assert_eq!(body["metadata"]["fileCount"], 3);
    assert!(body["backupPath"].as_str().is_some());

    // The tree matches the exported state again.
    assert_eq!(
        fs::read_to_string(server.config_root.join("app.json")).unwrap(),
        r#"{"name": "demo", "version": 3}"#
    );
    assert!(server.config_root.join("presets/default.json").is_file());
    assert!(!server.config_root.join("stale.json").exists());

    // The pre-import tree survives as the backup.
    let backups = backup_dirs(server.site.path());
    assert_eq!(backups.len(), 1);
    let backup_dir = server.site.path().join(&backups[0]);
    assert!(backup_dir.join("stale.json").is_file());
    assert!(!backup_dir.join("app.json").exists());

    // No temp artifacts are left behind.
    assert_work_dir_clean(server.site.path());
}

#[tokio::test]
async fn test_import_without_file_rejected() {
    let server = common::start_server().await;
    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(Form::new().text("unrelated", "value"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_import_rejects_non_zip_upload() {
    let server = common::start_server().await;
    let form = Form::new().part(
        "backup",
        Part::bytes(vec![0u8; 16])
            .file_name("backup.tar.gz")
            .mime_str("application/gzip")
            .unwrap(),
    );
    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_import_archive_without_designated_folder_rejected() {
    let server = common::start_server().await;
    common::seed_tree(&server.config_root);

    // Archive rooted at "other/", not "config/".
    let source = tempfile::tempdir().unwrap();
    let other = source.path().join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("data.json"), "{}").unwrap();
    let bytes = archive_bytes(&other);

    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(zip_form(bytes))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Live tree untouched, no backup taken, no temp artifacts left.
    assert!(server.config_root.join("app.json").is_file());
    assert!(backup_dirs(server.site.path()).is_empty());
    assert_work_dir_clean(server.site.path());
}

#[tokio::test]
async fn test_import_corrupt_zip_rejected_and_cleaned_up() {
    let server = common::start_server().await;
    common::seed_tree(&server.config_root);

    // Claims to be a ZIP but is not one.
    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(zip_form(b"this is not a zip archive".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Live tree untouched, no backup taken, no temp artifacts left.
    assert!(server.config_root.join("app.json").is_file());
    assert!(backup_dirs(server.site.path()).is_empty());
    assert_work_dir_clean(server.site.path());
}

#[tokio::test]
async fn test_import_oversized_upload_rejected() {
    let server = common::start_server().await;
    common::seed_tree(&server.config_root);

    // Over the 1MB test cap. Never a valid archive, but the size gate
    // fires before extraction is attempted. The server may abort the
    // connection while the client is still streaming, so a transport
    // error also counts as a rejection here.
    let result = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(zip_form(vec![0u8; 2 * 1024 * 1024]))
        .send()
        .await;
    if let Ok(res) = result {
        assert!(res.status().is_client_error());
    }

    // Live tree untouched either way.
    assert!(server.config_root.join("app.json").is_file());
    assert!(backup_dirs(server.site.path()).is_empty());
}

#[tokio::test]
async fn test_import_without_metadata_reports_null() {
    let server = common::start_server().await;

    // Hand-built archive with a config/ entry and no metadata record.
    use std::io::Write;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("config/app.json", options).unwrap();
        writer.write_all(br#"{"name": "bare"}"#).unwrap();
        writer.finish().unwrap();
    }

    let res = common::client()
        .post(server.url("/api/admin/config/import"))
        .header("Authorization", common::bearer())
        .multipart(zip_form(cursor.into_inner()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["metadata"].is_null());
    assert_eq!(body["importedFiles"], 1);
}
