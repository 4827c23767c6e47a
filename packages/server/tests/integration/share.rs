use server::config::RegistryStrategy;

use crate::common::{TestApp, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_a_share_id() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(vec![("scan.stl", b"solid scan".to_vec())], None)
            .await;

        assert_eq!(res.status, 200, "upload failed: {}", res.text);
        let id = res.share_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn n_files_yield_one_record_with_n_entries_in_order() {
        let app = TestApp::spawn().await;

        let names = ["a.stl", "b.stl", "c.stl", "d.stl", "e.stl"];
        let files = names
            .iter()
            .map(|n| (*n, format!("solid {n}").into_bytes()))
            .collect();

        let res = app.upload_files(files, None).await;
        assert_eq!(res.status, 200);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        assert_eq!(resolved.status, 200);

        let entries = resolved.body["files"].as_array().unwrap();
        assert_eq!(entries.len(), names.len());
        for (entry, name) in entries.iter().zip(names) {
            assert_eq!(entry["originalName"].as_str().unwrap(), name);
        }
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_and_leaves_no_blobs() {
        let app = TestApp::spawn().await;

        let res = app.upload_files(vec![], Some("[]")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"].as_str().unwrap(), "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn empty_file_part_is_rejected_and_leaves_no_blobs() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(
                vec![("ok.stl", b"data".to_vec()), ("empty.stl", Vec::new())],
                None,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn unparsable_meta_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(vec![("a.stl", b"data".to_vec())], Some("{not json"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"].as_str().unwrap(), "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn hostile_filenames_are_sanitized_in_storage() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(vec![("../../evil.stl", b"data".to_vec())], None)
            .await;
        assert_eq!(res.status, 200, "upload failed: {}", res.text);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        let url = resolved.body["files"][0]["url"].as_str().unwrap();

        // The generated storage name must not carry path components; the
        // separators were stripped, leaving the dots inline in the name.
        let name = url.rsplit('/').next().unwrap();
        assert!(name.ends_with("....evil.stl"), "unexpected name: {name}");
        assert!(!url.contains("/../"));
        // Exactly one blob, inside the uploads root.
        assert_eq!(app.blob_count(), 1);
    }
}

mod resolve {
    use super::*;

    #[tokio::test]
    async fn round_trip_urls_are_fetchable() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(
                vec![
                    ("upper.stl", b"upper bytes".to_vec()),
                    ("lower.stl", b"lower bytes".to_vec()),
                ],
                None,
            )
            .await;
        assert_eq!(res.status, 200);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        let entries = resolved.body["files"].as_array().unwrap();
        assert_eq!(entries.len(), 2);

        let expected = [&b"upper bytes"[..], &b"lower bytes"[..]];
        for (entry, body) in entries.iter().zip(expected) {
            let url = entry["url"].as_str().unwrap();
            let fetched = app.fetch_url(url).await;
            assert_eq!(fetched.status().as_u16(), 200);
            assert_eq!(fetched.bytes().await.unwrap(), body);
        }
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let app = TestApp::spawn().await;

        // Syntactically valid token that was never minted.
        let res = app.get(&routes::share(&"0".repeat(32))).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"].as_str().unwrap(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::share("not-a-token")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"].as_str().unwrap(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(vec![("scan.stl", b"bytes".to_vec())], None)
            .await;
        let path = routes::share(&res.share_id());

        let first = app.get(&path).await;
        let second = app.get(&path).await;

        assert_eq!(first.status, 200);
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn categories_from_meta_are_echoed_back() {
        let app = TestApp::spawn().await;

        let meta = r#"[
            {"originalName": "upper.stl", "category": "UPPER"},
            {"originalName": "lower.stl", "category": "LOWER"}
        ]"#;
        let res = app
            .upload_files(
                vec![
                    ("upper.stl", vec![0u8; 50 * 1024]),
                    ("lower.stl", vec![1u8; 40 * 1024]),
                ],
                Some(meta),
            )
            .await;
        assert_eq!(res.status, 200, "upload failed: {}", res.text);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        let entries = resolved.body["files"].as_array().unwrap();

        assert_eq!(entries[0]["originalName"].as_str().unwrap(), "upper.stl");
        assert_eq!(entries[0]["category"].as_str().unwrap(), "UPPER");
        assert!(
            entries[0]["url"]
                .as_str()
                .unwrap()
                .ends_with("-upper.stl")
        );
        assert_eq!(entries[1]["originalName"].as_str().unwrap(), "lower.stl");
        assert_eq!(entries[1]["category"].as_str().unwrap(), "LOWER");
    }

    #[tokio::test]
    async fn category_is_guessed_from_filename_without_meta() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_files(vec![("upper_scan.stl", b"bytes".to_vec())], None)
            .await;

        let resolved = app.get(&routes::share(&res.share_id())).await;
        assert_eq!(
            resolved.body["files"][0]["category"].as_str().unwrap(),
            "UPPER"
        );
    }
}

mod registry_strategies {
    use super::*;

    #[tokio::test]
    async fn shared_index_strategy_round_trips() {
        let app = TestApp::spawn_with_strategy(RegistryStrategy::SharedIndex).await;

        let res = app
            .upload_files(vec![("scan.stl", b"bytes".to_vec())], None)
            .await;
        assert_eq!(res.status, 200, "upload failed: {}", res.text);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        assert_eq!(resolved.status, 200);
        assert_eq!(resolved.body["files"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_strategy_round_trips() {
        let app = TestApp::spawn_with_strategy(RegistryStrategy::Memory).await;

        let res = app
            .upload_files(vec![("scan.stl", b"bytes".to_vec())], None)
            .await;
        assert_eq!(res.status, 200);

        let resolved = app.get(&routes::share(&res.share_id())).await;
        assert_eq!(resolved.status, 200);
    }

    #[tokio::test]
    async fn concurrent_uploads_both_resolve() {
        let app = TestApp::spawn().await;

        let (res_a, res_b) = tokio::join!(
            app.upload_files(vec![("a.stl", b"aaa".to_vec())], None),
            app.upload_files(vec![("b.stl", b"bbb".to_vec())], None),
        );
        assert_eq!(res_a.status, 200);
        assert_eq!(res_b.status, 200);

        let id_a = res_a.share_id();
        let id_b = res_b.share_id();
        assert_ne!(id_a, id_b);

        assert_eq!(app.get(&routes::share(&id_a)).await.status, 200);
        assert_eq!(app.get(&routes::share(&id_b)).await.status, 200);
    }
}
