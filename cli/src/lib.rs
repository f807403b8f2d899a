use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use charak_ai::discovery::{find_prebuilt, first_archive};
use charak_ai::embeddings::{Embedder, OllamaEmbedder};
use charak_ai::index::{build_collection, resolve_collection, BuildReport, CollectionInfo, CollectionResolution, IndexStore};
use charak_ai::llm::backend_from_config;
use charak_ai::ollama::OllamaClient;
use charak_ai::{AnswerResult, RagContext};
use charak_core::config::{GenerationBackend, RagConfig};
use charak_core::corpus::{read_chunks, read_documents, write_chunks};
use charak_core::error::AppError;
use charak_core::preprocess::{preprocess_documents, PreprocessReport};
use tracing::info;

pub const DISCLAIMER: &str = "⚕️ Disclaimer: This AI is for educational purposes only. Information is sourced from \
Charak Samhita. Always consult a qualified Ayurvedic physician (Vaidya) before following any treatments or remedies.";

#[derive(Debug, serde::Serialize)]
pub struct HealthStatus {
    pub component: String,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusReport {
    pub health: Vec<HealthStatus>,
    /// Pre-built index a serving process would use, if any.
    pub index_path: Option<PathBuf>,
    /// Archive a serving process would extract when no pre-built index exists.
    pub archive: Option<PathBuf>,
    /// Where an empty index would be synthesized as a last resort.
    pub default_path: PathBuf,
    pub resolution: Option<CollectionResolution>,
    pub collection: Option<CollectionInfo>,
}

/// Raw corpus file -> chunk file.
pub fn chunk_corpus(config: &RagConfig, input: &Path, output: &Path) -> Result<PreprocessReport, AppError> {
    let documents = read_documents(input)?;
    info!(documents = documents.len(), path = %input.display(), "loaded raw corpus");
    let out = preprocess_documents(&documents, &config.chunking)?;
    write_chunks(output, &out.chunks)?;
    info!(chunks = out.chunks.len(), path = %output.display(), "wrote chunk file");
    Ok(out.report)
}

pub fn build_index(config: &RagConfig, chunks_path: &Path, index_path: Option<&Path>) -> Result<BuildReport, AppError> {
    let client = OllamaClient::new(&config.embedding.base_url)?;
    let embedder = OllamaEmbedder::new(
        client,
        config.embedding.model.clone(),
        Duration::from_secs(config.embedding.timeout_secs),
    );
    embedder.warm_up()?;
    build_index_with_embedder(config, chunks_path, index_path, &embedder)
}

pub fn build_index_with_embedder(
    config: &RagConfig,
    chunks_path: &Path,
    index_path: Option<&Path>,
    embedder: &dyn Embedder,
) -> Result<BuildReport, AppError> {
    let chunks = read_chunks(chunks_path)?;
    info!(chunks = chunks.len(), path = %chunks_path.display(), "loaded chunks");
    let root = index_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.index.default_path.clone());
    let store = IndexStore::open(root);
    build_collection(
        &store,
        &config.index.collection,
        &chunks,
        embedder,
        config.index.batch_size,
    )
}

/// Reachability of the embedding daemon and readiness of the generation backend.
pub fn health_check(config: &RagConfig) -> Vec<HealthStatus> {
    let mut out = Vec::new();

    let embedding = OllamaClient::new(&config.embedding.base_url).and_then(|c| c.health_check());
    out.push(to_health("embedding", embedding, "Ollama reachable on 127.0.0.1"));

    let generation = match config.generation.backend {
        GenerationBackend::Ollama => OllamaClient::new(&config.generation.base_url).and_then(|c| c.health_check()),
        GenerationBackend::Anthropic => backend_from_config(&config.generation).and_then(|llm| llm.check_ready()),
    };
    let ok_message = match config.generation.backend {
        GenerationBackend::Ollama => "Ollama reachable on 127.0.0.1",
        GenerationBackend::Anthropic => "API key present",
    };
    out.push(to_health("generation", generation, ok_message));
    out
}

fn to_health(component: &str, r: Result<(), AppError>, ok_message: &str) -> HealthStatus {
    match r {
        Ok(()) => HealthStatus {
            component: component.to_string(),
            ok: true,
            message: ok_message.to_string(),
        },
        Err(e) => HealthStatus {
            component: component.to_string(),
            ok: false,
            message: format!("[{}] {}", e.code, e.describe()),
        },
    }
}

/// Report what a serving process would find, without extracting archives,
/// synthesizing an index or migrating anything on disk.
pub fn status(config: &RagConfig) -> Result<StatusReport, AppError> {
    let health = health_check(config);
    let index_path = find_prebuilt(&config.index.candidate_paths);
    let archive = first_archive(&config.index.archive_paths).cloned();

    let (resolution, collection) = match index_path.as_ref() {
        Some(path) => {
            let store = IndexStore::open(path.clone());
            let resolution = resolve_collection(
                &store,
                &config.index.collection,
                config.index.strict_collection_name,
            )?;
            let collection = match resolution.collection_name() {
                Some(name) => store.collection_info(name)?,
                None => None,
            };
            (Some(resolution), collection)
        }
        None => (None, None),
    };

    Ok(StatusReport {
        health,
        index_path,
        archive,
        default_path: config.index.default_path.clone(),
        resolution,
        collection,
    })
}

pub fn render_status(report: &StatusReport) -> String {
    let mut lines = Vec::new();
    for h in &report.health {
        let mark = if h.ok { "ok" } else { "FAIL" };
        lines.push(format!("{:<11} {mark:<4} {}", h.component, h.message));
    }
    match (&report.index_path, &report.archive) {
        (Some(path), _) => lines.push(format!("index       {} (pre-built)", path.display())),
        (None, Some(archive)) => lines.push(format!(
            "index       none pre-built; startup will extract {}",
            archive.display()
        )),
        (None, None) => lines.push(format!(
            "index       none found; startup will serve an EMPTY index at {}",
            report.default_path.display()
        )),
    }
    if let Some(resolution) = &report.resolution {
        lines.push(match resolution {
            CollectionResolution::Exact { name } => format!("collection  {name}"),
            CollectionResolution::Fallback { requested, used } => {
                format!("collection  {used} (fallback: `{requested}` not found)")
            }
            CollectionResolution::Empty => "collection  none (index holds no collections)".to_string(),
        });
    }
    if let Some(info) = &report.collection {
        lines.push(format!("chunks      {}", info.count));
        lines.push(format!(
            "dims        {}",
            info.dims.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        ));
        lines.push(format!("model       {}", info.model.as_deref().unwrap_or("-")));
        lines.push(format!("built       {}", info.created_at));
        lines.push(format!("fingerprint {}", info.fingerprint.as_deref().unwrap_or("-")));
    }
    lines.join("\n")
}

pub fn render_answer(result: &AnswerResult) -> String {
    let sources = if result.sources.is_empty() {
        "-".to_string()
    } else {
        result.sources.join(", ")
    };
    format!(
        "📖 Answer:\n{}\n\n📚 Sources: {sources} ({} passages)",
        result.answer, result.chunks_used
    )
}

/// Question loop over `input`. Blank lines are ignored and `exit` quits.
pub fn run_chat<R: BufRead, W: Write>(rag: &RagContext, input: R, mut output: W) -> std::io::Result<usize> {
    writeln!(output, "🌿 Charak Samhita AI")?;
    writeln!(output, "{DISCLAIMER}")?;
    writeln!(output, "Type 'exit' to quit\n")?;

    let mut asked = 0usize;
    let mut lines = input.lines();
    loop {
        write!(output, "Your question: ")?;
        output.flush()?;
        let Some(line) = lines.next() else { break };
        let question = line?;
        let question = question.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let result = rag.ask(question);
        asked += 1;
        writeln!(output, "\n{}", render_answer(&result))?;
        writeln!(output, "\n{}\n", "=".repeat(60))?;
    }
    Ok(asked)
}
