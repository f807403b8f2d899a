use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let entries = match fs::read_dir(&p) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn relative(src_root: &Path, f: &Path) -> String {
    f.strip_prefix(src_root)
        .unwrap_or(f)
        .to_string_lossy()
        .replace('\\', "/")
}

#[test]
fn network_calls_stay_inside_backend_modules() {
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    let files = collect_rs_files(&src_root);
    assert!(!files.is_empty());

    for f in files {
        let rel = relative(&src_root, &f);
        let allowed = rel == "ollama.rs" || rel.starts_with("embeddings/") || rel.starts_with("llm/");
        let text = fs::read_to_string(&f).unwrap_or_default();
        assert!(
            allowed || !text.contains("ureq::"),
            "HTTP client used outside backend modules in {rel}"
        );
    }
}

#[test]
fn storage_stays_inside_index_module() {
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    for f in collect_rs_files(&src_root) {
        let rel = relative(&src_root, &f);
        let text = fs::read_to_string(&f).unwrap_or_default();
        assert!(
            rel.starts_with("index/") || !text.contains("rusqlite"),
            "SQLite used outside the index module in {rel}"
        );
    }
}
