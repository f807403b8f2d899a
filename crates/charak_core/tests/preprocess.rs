use charak_core::chunking::ChunkingOptions;
use charak_core::corpus::{read_chunks, read_documents, write_chunks, write_documents, Document};
use charak_core::preprocess::preprocess_documents;
use pretty_assertions::assert_eq;

fn words(prefix: &str, n: usize) -> String {
    (0..n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>().join(" ")
}

fn doc(title: &str, content: String) -> Document {
    Document {
        title: title.to_string(),
        url: format!("https://www.carakasamhitaonline.com/index.php/{}", title.replace(' ', "_")),
        content,
    }
}

#[test]
fn short_empty_and_duplicate_documents_are_counted_not_chunked() {
    let docs = vec![
        doc("Vata", words("v", 900)),
        doc("Stub", "too short".to_string()),
        doc("Empty", String::new()),
        doc("Vata", words("dup", 900)),
        doc("Pitta", format!("== Heading ==\n{} [edit]", words("p", 120))),
    ];

    let out = preprocess_documents(&docs, &ChunkingOptions::default()).expect("preprocess");

    assert_eq!(out.report.documents_total, 5);
    assert_eq!(out.report.documents_processed, 2);
    assert_eq!(out.report.documents_skipped, 2);
    assert_eq!(out.report.duplicates_skipped, 1);
    assert_eq!(out.report.chunk_count, 4);

    let ids: Vec<&str> = out.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["Vata_chunk_0", "Vata_chunk_1", "Vata_chunk_2", "Pitta_chunk_0"]
    );
    // Markup is cleaned before chunking.
    assert!(!out.chunks[3].text.contains("Heading"));
    assert!(!out.chunks[3].text.contains("[edit]"));
    assert_eq!(out.chunks[3].text, words("p", 120));
}

#[test]
fn chunk_ids_are_unique_across_corpus() {
    let docs = vec![doc("A", words("a", 1500)), doc("B", words("b", 1500))];
    let out = preprocess_documents(&docs, &ChunkingOptions::default()).expect("preprocess");
    let mut ids: Vec<&str> = out.chunks.iter().map(|c| c.id.as_str()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[test]
fn corpus_and_chunk_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = dir.path().join("charak_samhita_raw.json");
    let chunks_path = dir.path().join("out").join("charak_chunks.json");

    let docs = vec![doc("Ashwagandha", words("x", 300))];
    write_documents(&raw, &docs).expect("write raw");
    let loaded = read_documents(&raw).expect("read raw");
    assert_eq!(loaded, docs);

    let out = preprocess_documents(&loaded, &ChunkingOptions::default()).expect("preprocess");
    write_chunks(&chunks_path, &out.chunks).expect("write chunks");
    assert!(!chunks_path.with_extension("tmp").exists());
    assert_eq!(read_chunks(&chunks_path).expect("read chunks"), out.chunks);
}

#[test]
fn malformed_corpus_file_is_a_corpus_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = dir.path().join("raw.json");
    std::fs::write(&raw, b"{not json").expect("write");
    let err = read_documents(&raw).expect_err("should fail");
    assert_eq!(err.code, "CORPUS_DECODE_FAILED");
}

#[test]
fn short_stub_does_not_shadow_a_later_full_document() {
    let docs = vec![
        doc("Dinacharya", "stub".to_string()),
        doc("Dinacharya", words("d", 120)),
        doc("Dinacharya", words("again", 120)),
    ];

    let out = preprocess_documents(&docs, &ChunkingOptions::default()).expect("preprocess");

    assert_eq!(out.report.documents_processed, 1);
    assert_eq!(out.report.documents_skipped, 1);
    assert_eq!(out.report.duplicates_skipped, 1);
    assert_eq!(out.chunks.len(), 1);
    assert_eq!(out.chunks[0].text, words("d", 120));
}
