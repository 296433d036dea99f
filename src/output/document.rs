// Canonical structured serialization of a project graph
//
// The document is the persisted contract: every textual diagram can be
// regenerated from it alone, byte for byte.

use crate::analysis::{
    AttributeNode, ClassNode, Edge, FunctionNode, ImportNode, ModuleNode, ParameterNode, StructureGraph, TokenEntry,
    TokenMap,
};
use crate::error::{Error, Result};
use crate::parser::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub project: String,
    pub modules: Vec<ModuleNode>,
    pub classes: Vec<ClassNode>,
    pub functions: Vec<FunctionNode>,
    pub parameters: Vec<ParameterNode>,
    pub attributes: Vec<AttributeNode>,
    pub imports: Vec<ImportNode>,
    pub edges: Vec<Edge>,
    /// Rendering token and display label per entity
    pub tokens: BTreeMap<EntityId, TokenEntry>,
}

impl ProjectDocument {
    pub fn from_graph(graph: &StructureGraph) -> Self {
        Self {
            project: graph.project().to_string(),
            modules: graph.modules().cloned().collect(),
            classes: graph.classes().cloned().collect(),
            functions: graph.functions().cloned().collect(),
            parameters: graph.parameters().cloned().collect(),
            attributes: graph.attributes().cloned().collect(),
            imports: graph.imports().cloned().collect(),
            edges: graph.edges().to_vec(),
            tokens: graph
                .tokens()
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Insert keyed nodes, rejecting an id already used by any entity
fn index<T>(
    nodes: Vec<T>,
    id: impl Fn(&T) -> &EntityId,
    seen: &mut HashSet<EntityId>,
) -> Result<BTreeMap<EntityId, T>> {
    let mut map = BTreeMap::new();
    for node in nodes {
        let key = id(&node).clone();
        if !seen.insert(key.clone()) {
            return Err(Error::document(format!("duplicate entity id {}", key)));
        }
        map.insert(key, node);
    }
    Ok(map)
}

impl StructureGraph {
    /// Re-derive a graph from its canonical document
    pub fn from_document(document: ProjectDocument) -> Result<Self> {
        let mut seen = HashSet::new();
        let modules = index(document.modules, |n| &n.id, &mut seen)?;
        let classes = index(document.classes, |n| &n.id, &mut seen)?;
        let functions = index(document.functions, |n| &n.id, &mut seen)?;
        let parameters = index(document.parameters, |n| &n.id, &mut seen)?;
        let attributes = index(document.attributes, |n| &n.id, &mut seen)?;
        let imports = index(document.imports, |n| &n.id, &mut seen)?;

        let tokens = TokenMap::from_pairs(document.tokens)?;
        if let Some((id, _)) = tokens.iter().find(|(id, _)| !seen.contains(*id)) {
            return Err(Error::document(format!("token for unknown entity {}", id)));
        }
        if let Some(id) = seen.iter().find(|id| !tokens.contains(id)) {
            return Err(Error::document(format!("entity {} has no token", id)));
        }

        let mut edges = document.edges;
        if let Some(edge) = edges.iter().find(|e| !seen.contains(&e.from) || !seen.contains(&e.to)) {
            return Err(Error::document(format!(
                "edge {} -> {} references an unknown entity",
                edge.from, edge.to
            )));
        }
        edges.sort();
        edges.dedup();

        Ok(StructureGraph {
            project: document.project,
            modules,
            classes,
            functions,
            parameters,
            attributes,
            imports,
            edges,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build;
    use crate::output::{render, DiagramKind, OutputFormat, RenderOptions};
    use crate::parser::{ParserSet, SourceFile};

    fn graph() -> StructureGraph {
        let files = [
            ("pkg/__init__.py", ""),
            (
                "pkg/models.py",
                "import uuid\n\nclass Entity:\n    id: str\n\nclass User(Entity):\n    def rename(self, name: str) -> None:\n        pass\n",
            ),
            ("pkg/api.py", "from .models import User\n\ndef handler(request, *args):\n    pass\n"),
            ("web/app.ts", "import pad from 'leftpad';\nexport interface Props { id: string }\nexport class App extends Component {}\n"),
        ];
        let mut parsers = ParserSet::new().unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|(p, s)| parsers.extract(&SourceFile::new(*p, *s)))
            .collect();
        build("roundtrip", &outcomes)
    }

    #[test]
    fn test_round_trip_renders_identically() {
        let original = graph();
        let json = ProjectDocument::from_graph(&original).to_json().unwrap();
        let restored = StructureGraph::from_document(ProjectDocument::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored, original);
        for kind in DiagramKind::ALL {
            for format in OutputFormat::ALL {
                let options = RenderOptions::new(format);
                assert_eq!(
                    render(&restored, kind, &options),
                    render(&original, kind, &options),
                    "{} as {}",
                    kind,
                    format
                );
            }
        }
    }

    #[test]
    fn test_document_shape() {
        let doc = ProjectDocument::from_graph(&graph());
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["project"], "roundtrip");
        assert!(value["modules"].as_array().unwrap().len() >= 4);
        assert!(value["edges"].as_array().unwrap().iter().any(|e| e["kind"] == "inherits_from"));
        assert_eq!(value["tokens"]["pkg/models.py::User"]["label"], "User");
    }

    #[test]
    fn test_rejects_shared_token() {
        let mut doc = ProjectDocument::from_graph(&graph());
        let first = doc.tokens.values().next().unwrap().token.clone();
        doc.tokens.values_mut().nth(1).unwrap().token = first;
        let err = StructureGraph::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("shared"));
    }

    #[test]
    fn test_rejects_missing_token() {
        let mut doc = ProjectDocument::from_graph(&graph());
        let id = doc.classes[0].id.clone();
        doc.tokens.remove(&id);
        assert!(StructureGraph::from_document(doc).is_err());
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let mut doc = ProjectDocument::from_graph(&graph());
        doc.edges[0].to = EntityId::new("nowhere.py");
        let err = StructureGraph::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("unknown entity"));
    }

    #[test]
    fn test_rejects_duplicate_entity() {
        let mut doc = ProjectDocument::from_graph(&graph());
        let copy = doc.modules[0].clone();
        doc.modules.push(copy);
        assert!(StructureGraph::from_document(doc).is_err());
    }
}
