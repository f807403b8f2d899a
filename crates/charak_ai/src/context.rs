use std::collections::BTreeSet;

use crate::retrieve::RetrievalResult;

pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    pub context: String,
    /// Distinct source titles.
    pub sources: BTreeSet<String>,
}

/// Render each chunk as `[From: <title>]\n<text>` and join them in rank order.
pub fn assemble(result: &RetrievalResult) -> AssembledContext {
    let blocks: Vec<String> = result
        .chunks
        .iter()
        .map(|c| format!("[From: {}]\n{}", c.metadata.title, c.text))
        .collect();
    let sources = result
        .chunks
        .iter()
        .map(|c| c.metadata.title.clone())
        .collect();
    AssembledContext {
        context: blocks.join(BLOCK_SEPARATOR),
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntryMetadata, RetrievedChunk};
    use pretty_assertions::assert_eq;

    fn hit(title: &str, idx: u32, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            id: format!("{title}_chunk_{idx}"),
            text: text.to_string(),
            metadata: EntryMetadata {
                title: title.to_string(),
                chunk_index: idx,
            },
            distance: 0.1 * idx as f32,
        }
    }

    #[test]
    fn labels_blocks_and_dedups_sources() {
        let result = RetrievalResult {
            chunks: vec![
                hit("Vata", 0, "dry and light"),
                hit("Vata", 1, "cold and mobile"),
                hit("Pitta", 0, "hot and sharp"),
            ],
        };
        let ctx = assemble(&result);
        assert_eq!(
            ctx.context,
            "[From: Vata]\ndry and light\n\n---\n\n[From: Vata]\ncold and mobile\n\n---\n\n[From: Pitta]\nhot and sharp"
        );
        assert_eq!(
            ctx.sources.into_iter().collect::<Vec<_>>(),
            vec!["Pitta".to_string(), "Vata".to_string()]
        );
    }

    #[test]
    fn empty_result_assembles_to_nothing() {
        let ctx = assemble(&RetrievalResult::default());
        assert_eq!(ctx.context, "");
        assert!(ctx.sources.is_empty());
    }
}
