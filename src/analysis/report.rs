// Per-session report: what was extracted, what failed, what stayed unresolved

use crate::analysis::graph::{EdgeKind, StructureGraph};
use crate::parser::{ExtractionOutcome, FileStatus, Language};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: Option<Language>,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedKind {
    Import,
    Base,
}

/// A reference that resolved to an external stub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub kind: UnresolvedKind,
    /// Reference as written in the source
    pub name: String,
    /// Module or class the reference came from
    pub source: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub modules: usize,
    pub classes: usize,
    pub functions: usize,
    pub parameters: usize,
    pub attributes: usize,
    pub imports: usize,
    pub external_modules: usize,
    pub external_classes: usize,
    pub edges: usize,
    pub failed_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub project: String,
    pub files: Vec<FileReport>,
    pub unresolved: Vec<UnresolvedReference>,
    pub counts: EntityCounts,
}

impl SessionReport {
    pub fn new(graph: &StructureGraph, outcomes: &[ExtractionOutcome]) -> Self {
        let files: Vec<FileReport> = outcomes
            .iter()
            .map(|o| FileReport {
                path: o.path.clone(),
                language: o.language,
                status: o.status.clone(),
                warnings: o.warnings.clone(),
            })
            .collect();

        let unresolved = graph
            .edges()
            .iter()
            .filter(|e| !e.is_resolved())
            .filter_map(|e| match e.kind {
                EdgeKind::Imports => graph.module(&e.to).map(|stub| UnresolvedReference {
                    kind: UnresolvedKind::Import,
                    name: stub.name.clone(),
                    source: e.from.to_string(),
                }),
                EdgeKind::InheritsFrom => graph.class(&e.to).map(|stub| UnresolvedReference {
                    kind: UnresolvedKind::Base,
                    name: stub.name.clone(),
                    source: e.from.to_string(),
                }),
            })
            .collect();

        let external_modules = graph.modules().filter(|m| m.is_external()).count();
        let external_classes = graph.classes().filter(|c| c.is_external()).count();
        let counts = EntityCounts {
            modules: graph.modules().count() - external_modules,
            classes: graph.classes().count() - external_classes,
            functions: graph.functions().count(),
            parameters: graph.parameters().count(),
            attributes: graph.attributes().count(),
            imports: graph.imports().count(),
            external_modules,
            external_classes,
            edges: graph.edges().len(),
            failed_files: files.iter().filter(|f| f.status.is_failed()).count(),
        };

        Self {
            project: graph.project().to_string(),
            files,
            unresolved,
            counts,
        }
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.status.is_failed())
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::builder::build;
    use crate::parser::{ParserSet, SourceFile};

    fn report(files: &[(&str, &str)]) -> SessionReport {
        let mut parsers = ParserSet::new().unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|(p, s)| parsers.extract(&SourceFile::new(*p, *s)))
            .collect();
        let graph = build("demo", &outcomes);
        SessionReport::new(&graph, &outcomes)
    }

    #[test]
    fn test_counts_and_failures() {
        let r = report(&[
            ("a.py", "import requests\n\nclass A(Base):\n    def run(self, x):\n        pass\n"),
            ("b.py", "s = 'unterminated\n"),
        ]);
        assert_eq!(r.project, "demo");
        assert_eq!(r.counts.modules, 1);
        assert_eq!(r.counts.classes, 1);
        assert_eq!(r.counts.functions, 1);
        assert_eq!(r.counts.external_modules, 1);
        assert_eq!(r.counts.external_classes, 1);
        assert_eq!(r.counts.failed_files, 1);
        assert_eq!(r.failed_files().next().unwrap().path, PathBuf::from("b.py"));
    }

    #[test]
    fn test_unresolved_references_are_listed() {
        let r = report(&[("a.py", "import requests\n\nclass A(models.Model):\n    pass\n")]);
        assert_eq!(
            r.unresolved,
            vec![
                UnresolvedReference {
                    kind: UnresolvedKind::Import,
                    name: "requests".to_string(),
                    source: "a.py".to_string(),
                },
                UnresolvedReference {
                    kind: UnresolvedKind::Base,
                    name: "models.Model".to_string(),
                    source: "a.py::A".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let r = report(&[("a.py", "x = 1\n")]);
        let json = r.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0]["status"]["state"], "complete");
        assert_eq!(value["counts"]["modules"], 1);
    }
}
