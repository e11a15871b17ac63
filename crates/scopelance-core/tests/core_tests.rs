use std::fs;
use tempfile::TempDir;

use scopelance_core::metadata::{read_sidecar, write_sidecar, LanceMetadata};
use scopelance_core::paths::ScopePaths;
use scopelance_core::types::{EmbeddingInfo, ScopeMeta, ScopeRequest};

fn request(dir: &str) -> ScopeRequest {
    ScopeRequest {
        directory: dir.to_string(),
        dataset: "dataset".to_string(),
        scope_id: "scope1".to_string(),
        metric: "cosine".to_string(),
    }
}

fn scope() -> ScopeMeta {
    ScopeMeta {
        embedding_id: "emb1".to_string(),
        embedding: EmbeddingInfo { model_id: "AAmodelA___v1".to_string() },
    }
}

#[test]
fn sidecar_has_fixed_keys_in_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_string_lossy().to_string();
    let req = request(&dir);
    let paths = ScopePaths::new(&req.directory, &req.dataset, &req.scope_id);
    let meta = LanceMetadata::new(&req, &paths, &scope());

    let out = tmp.path().join("scopes");
    let path = write_sidecar(&out, &meta).expect("write");
    assert_eq!(path, out.join("scope1_cosine.json"));

    let raw = fs::read_to_string(&path).unwrap();
    let keys = ["directory", "scope_id", "dataset", "metric", "db_uri", "table_name", "embedding_id", "model_name"];
    let positions: Vec<usize> = keys.iter().map(|k| raw.find(&format!("\"{k}\"")).expect(k)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "keys out of order: {raw}");
    assert!(raw.contains("\n    \"model_name\": \"modelA/v1\""), "4-space indent: {raw}");

    let back = read_sidecar(&path).expect("read");
    assert_eq!(back.table_name, "scope1_cosine");
    assert_eq!(back.db_uri, tmp.path().join("dataset/lancedb").to_string_lossy());
    assert_eq!(back, meta);
}

#[test]
fn sidecar_is_overwritten() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_string_lossy().to_string();
    let out = tmp.path().join("scopes");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("scope1_cosine.json"), "stale contents that are longer than json").unwrap();

    let req = request(&dir);
    let paths = ScopePaths::new(&req.directory, &req.dataset, &req.scope_id);
    let path = write_sidecar(&out, &LanceMetadata::new(&req, &paths, &scope())).expect("write");

    let back = read_sidecar(&path).expect("valid json after overwrite");
    assert_eq!(back.embedding_id, "emb1");
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}
