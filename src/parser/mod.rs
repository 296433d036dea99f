// Front-end extractors: raw source in, normalized entities out

mod heuristic;
pub mod model;
mod patterns;
mod python;
mod scan;

pub use heuristic::HeuristicParser;
pub use model::*;
pub use python::PythonParser;

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One input file: relative path, raw bytes and an optional declared language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: Vec<u8>,
    /// Declared language; inferred from the extension when absent
    pub language: Option<Language>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Declared language, or the one implied by the file extension
    pub fn resolved_language(&self) -> Option<Language> {
        self.language.or_else(|| Language::from_path(&self.path))
    }
}

/// The extractors one worker needs.
///
/// The tree-sitter parser keeps internal state between parses, so each
/// worker thread owns its own set.
pub struct ParserSet {
    python: PythonParser,
    heuristic: HeuristicParser,
}

impl ParserSet {
    pub fn new() -> Result<Self> {
        Ok(Self {
            python: PythonParser::new()?,
            heuristic: HeuristicParser::new(),
        })
    }

    /// Decode and extract one file. Never fails; problems become a `Failed` outcome.
    pub fn extract(&mut self, file: &SourceFile) -> ExtractionOutcome {
        let Some(language) = file.resolved_language() else {
            let ext = extension_of(&file.path);
            return ExtractionOutcome::failed(
                &file.path,
                None,
                format!("unsupported language for extension '{}'", ext),
            );
        };

        let bytes = file.content.strip_prefix(UTF8_BOM).unwrap_or(&file.content);
        let source = match std::str::from_utf8(bytes) {
            Ok(source) => source,
            Err(e) => {
                return ExtractionOutcome::failed(
                    &file.path,
                    Some(language),
                    format!("invalid UTF-8 at byte {}", e.valid_up_to()),
                )
            }
        };

        debug!(path = %file.path.display(), language = %language, bytes = bytes.len(), "extracting");
        self.extract_source(source, &file.path, language)
    }

    /// Extract already-decoded source
    pub fn extract_source(&mut self, source: &str, path: &Path, language: Language) -> ExtractionOutcome {
        if language.is_precise() {
            self.python.parse_source(source, path)
        } else {
            self.heuristic.parse_source(source, path, language)
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}
