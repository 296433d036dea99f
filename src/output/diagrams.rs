// Diagram renderers
//
// Each renderer turns the graph into a format-neutral `Diagram`: nodes,
// edges and clusters carrying rendering tokens and display labels. Format
// adapters only decide syntax. Everything is visited in entity id order.

use super::{DiagramKind, Direction, RenderOptions};
use crate::analysis::{ClassNode, EdgeKind, FunctionNode, StructureGraph};
use crate::parser::{EntityId, FunctionKind, ParameterKind, Visibility};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagram {
    pub kind: DiagramKind,
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Link>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub token: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stereotype: Option<String>,
    pub external: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    /// Token of the enclosing cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

/// A class member line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Attribute {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_hint: Option<String>,
        private: bool,
        is_static: bool,
    },
    Method {
        name: String,
        parameters: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        return_type: Option<String>,
        private: bool,
        is_static: bool,
    },
    /// Members cut off by the per-class limit
    More { count: usize },
}

impl Member {
    pub fn visibility_marker(&self) -> &'static str {
        match self {
            Member::Attribute { private: true, .. } | Member::Method { private: true, .. } => "-",
            Member::Attribute { .. } | Member::Method { .. } => "+",
            Member::More { .. } => "",
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(
            self,
            Member::Attribute { is_static: true, .. } | Member::Method { is_static: true, .. }
        )
    }

    /// Member text without visibility or static markers
    pub fn signature(&self) -> String {
        match self {
            Member::Attribute { name, type_hint, .. } => match type_hint {
                Some(t) => format!("{}: {}", name, t),
                None => name.clone(),
            },
            Member::Method {
                name,
                parameters,
                return_type,
                ..
            } => match return_type {
                Some(r) => format!("{}({}) {}", name, parameters.join(", "), r),
                None => format!("{}({})", name, parameters.join(", ")),
            },
            Member::More { count } => format!("... {} more", count),
        }
    }
}

/// A directed edge between two node or cluster tokens.
///
/// Inheritance edges point from the derived class to its base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    /// Unresolved references are drawn dashed
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub token: String,
    pub label: String,
}

impl Diagram {
    pub fn build(graph: &StructureGraph, kind: DiagramKind, options: &RenderOptions) -> Self {
        let mut diagram = Diagram {
            kind,
            direction: options.direction,
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
        };
        let mut renderer = Renderer {
            graph,
            options,
            diagram: &mut diagram,
        };
        match kind {
            DiagramKind::Class => renderer.class_diagram(),
            DiagramKind::Dependency => renderer.dependency_diagram(),
            DiagramKind::Component => renderer.component_diagram(),
        }
        diagram
    }

    /// Nodes counted against the render limit: clusters count as nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len() + self.clusters.len()
    }

    pub fn nodes_in<'d>(&'d self, cluster: &'d str) -> impl Iterator<Item = &'d Node> {
        self.nodes.iter().filter(move |n| n.cluster.as_deref() == Some(cluster))
    }
}

struct Renderer<'a> {
    graph: &'a StructureGraph,
    options: &'a RenderOptions,
    diagram: &'a mut Diagram,
}

impl Renderer<'_> {
    fn token(&self, id: &EntityId) -> String {
        self.graph.token(id).unwrap_or(id.as_str()).to_string()
    }

    fn class_diagram(&mut self) {
        let graph = self.graph;
        for class in graph.classes() {
            if class.is_external() && !self.options.show_external {
                continue;
            }
            let stereotype = if class.is_external() {
                Some("external")
            } else {
                class.kind.stereotype()
            };
            let node = Node {
                token: self.token(&class.id),
                label: class.qualified_name.clone(),
                stereotype: stereotype.map(str::to_string),
                external: class.is_external(),
                members: self.members(class),
                cluster: None,
            };
            self.diagram.nodes.push(node);
        }

        for edge in graph.edges_of_kind(EdgeKind::InheritsFrom) {
            if !edge.is_resolved() && !self.options.show_external {
                continue;
            }
            let link = Link {
                from: self.token(&edge.from),
                to: self.token(&edge.to),
                kind: edge.kind,
                dashed: !edge.is_resolved(),
            };
            self.diagram.edges.push(link);
        }
    }

    fn members(&self, class: &ClassNode) -> Vec<Member> {
        let graph = self.graph;
        let attributes = class.attributes.iter().filter_map(|id| graph.attribute(id)).map(|a| Member::Attribute {
            name: a.name.clone(),
            type_hint: a.type_hint.clone(),
            private: is_private(&a.name, a.visibility),
            is_static: a.is_static,
        });
        let methods = class
            .methods
            .iter()
            .filter_map(|id| graph.function(id))
            .map(|f| self.method(f));

        let mut members: Vec<Member> = attributes
            .chain(methods)
            .filter(|m| self.options.include_private || m.visibility_marker() != "-")
            .collect();

        let limit = self.options.max_members;
        if members.len() > limit {
            let count = members.len() - limit;
            members.truncate(limit);
            members.push(Member::More { count });
        }
        members
    }

    fn method(&self, function: &FunctionNode) -> Member {
        let graph = self.graph;
        let skip_receiver = function.kind == FunctionKind::Method;
        let parameters = function
            .parameters
            .iter()
            .filter_map(|id| graph.parameter(id))
            .enumerate()
            .filter(|(i, p)| !(skip_receiver && *i == 0 && matches!(p.name.as_str(), "self" | "cls")))
            .map(|(_, p)| {
                let prefix = match p.kind {
                    ParameterKind::VarArgs => "*",
                    ParameterKind::VarKeyword => "**",
                    _ => "",
                };
                match &p.type_hint {
                    Some(t) => format!("{}{}: {}", prefix, p.name, t),
                    None => format!("{}{}", prefix, p.name),
                }
            })
            .collect();

        Member::Method {
            name: function.name.clone(),
            parameters,
            return_type: function.return_type.clone(),
            private: is_private(&function.name, function.visibility),
            is_static: function.is_static,
        }
    }

    fn dependency_diagram(&mut self) {
        let graph = self.graph;
        for module in graph.modules() {
            if module.is_external() && !self.options.show_external {
                continue;
            }
            let node = Node {
                token: self.token(&module.id),
                label: module.name.clone(),
                stereotype: module.is_external().then(|| "external".to_string()),
                external: module.is_external(),
                members: Vec::new(),
                cluster: None,
            };
            self.diagram.nodes.push(node);
        }

        for edge in graph.edges_of_kind(EdgeKind::Imports) {
            if !edge.is_resolved() && !self.options.show_external {
                continue;
            }
            let link = Link {
                from: self.token(&edge.from),
                to: self.token(&edge.to),
                kind: edge.kind,
                dashed: !edge.is_resolved(),
            };
            self.diagram.edges.push(link);
        }
    }

    fn component_diagram(&mut self) {
        let graph = self.graph;
        for module in graph.modules().filter(|m| !m.is_external()) {
            let cluster = self.token(&module.id);
            for class in graph.classes_in(&module.id) {
                let node = Node {
                    token: self.token(&class.id),
                    label: class.qualified_name.clone(),
                    stereotype: class.kind.stereotype().map(str::to_string),
                    external: false,
                    members: Vec::new(),
                    cluster: Some(cluster.clone()),
                };
                self.diagram.nodes.push(node);
            }
            self.diagram.clusters.push(Cluster {
                token: cluster,
                label: module.name.clone(),
            });
        }

        // Module-level imports between project modules
        for edge in graph.edges_of_kind(EdgeKind::Imports).filter(|e| e.is_resolved()) {
            let link = Link {
                from: self.token(&edge.from),
                to: self.token(&edge.to),
                kind: edge.kind,
                dashed: false,
            };
            self.diagram.edges.push(link);
        }
    }
}

/// `_name`, `#name` or declared private
fn is_private(name: &str, visibility: Visibility) -> bool {
    visibility == Visibility::Private || name.starts_with('_') || name.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build;
    use crate::output::OutputFormat;
    use crate::parser::{ParserSet, SourceFile};

    fn diagram(files: &[(&str, &str)], kind: DiagramKind, options: &RenderOptions) -> Diagram {
        let mut parsers = ParserSet::new().unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|(p, s)| parsers.extract(&SourceFile::new(*p, *s)))
            .collect();
        Diagram::build(&build("test", &outcomes), kind, options)
    }

    const SERVICE: &str = r#"
class Service(BaseService):
    retries: int = 3
    _cache = None

    def __init__(self, name):
        self.name = name

    def run(self, job: str, *args, **kwargs) -> bool:
        pass

    @staticmethod
    def build():
        pass
"#;

    #[test]
    fn test_class_members_in_source_order() {
        let d = diagram(&[("svc.py", SERVICE)], DiagramKind::Class, &RenderOptions::default());
        let service = d.nodes.iter().find(|n| n.label == "Service").unwrap();
        let lines: Vec<String> = service
            .members
            .iter()
            .map(|m| format!("{}{}", m.visibility_marker(), m.signature()))
            .collect();
        assert_eq!(
            lines,
            vec![
                "+retries: int",
                "-_cache",
                "-__init__(name)",
                "+run(job: str, *args, **kwargs) bool",
                "+build()",
            ]
        );
        assert!(service.members[4].is_static());
    }

    #[test]
    fn test_private_members_can_be_hidden() {
        let options = RenderOptions {
            include_private: false,
            ..Default::default()
        };
        let d = diagram(&[("svc.py", SERVICE)], DiagramKind::Class, &options);
        let service = d.nodes.iter().find(|n| n.label == "Service").unwrap();
        assert_eq!(service.members.len(), 3);
        assert!(service.members.iter().all(|m| m.visibility_marker() == "+"));
    }

    #[test]
    fn test_member_limit_summarizes_the_rest() {
        let options = RenderOptions {
            max_members: 2,
            ..Default::default()
        };
        let d = diagram(&[("svc.py", SERVICE)], DiagramKind::Class, &options);
        let service = d.nodes.iter().find(|n| n.label == "Service").unwrap();
        assert_eq!(service.members.len(), 3);
        assert_eq!(service.members[2], Member::More { count: 3 });
        assert_eq!(service.members[2].signature(), "... 3 more");
    }

    #[test]
    fn test_external_base_is_dashed_and_can_be_hidden() {
        let d = diagram(&[("svc.py", SERVICE)], DiagramKind::Class, &RenderOptions::default());
        assert_eq!(d.nodes.len(), 2);
        let stub = d.nodes.iter().find(|n| n.external).unwrap();
        assert_eq!(stub.stereotype.as_deref(), Some("external"));
        assert!(d.edges[0].dashed);

        let options = RenderOptions {
            show_external: false,
            ..Default::default()
        };
        let d = diagram(&[("svc.py", SERVICE)], DiagramKind::Class, &options);
        assert_eq!(d.nodes.len(), 1);
        assert!(d.edges.is_empty());
    }

    #[test]
    fn test_dependency_diagram_shares_external_stub() {
        let files = [
            ("a.js", "const pad = require('leftpad');\n"),
            ("b.ts", "import pad from 'leftpad';\n"),
        ];
        let d = diagram(&files, DiagramKind::Dependency, &RenderOptions::default());
        let stubs: Vec<_> = d.nodes.iter().filter(|n| n.external).collect();
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].label, "leftpad");
        assert_eq!(d.edges.iter().filter(|e| e.to == stubs[0].token).count(), 2);
        assert!(d.edges.iter().all(|e| e.dashed));
    }

    #[test]
    fn test_component_diagram_groups_classes_by_module() {
        let files = [
            ("app/models.py", "class User:\n    pass\n\nclass Group:\n    pass\n"),
            ("app/views.py", "from app.models import User\nimport requests\n\nclass UserView:\n    pass\n"),
        ];
        let d = diagram(&files, DiagramKind::Component, &RenderOptions::default());
        assert_eq!(d.clusters.len(), 2);
        assert_eq!(d.nodes.len(), 3);
        assert_eq!(d.node_count(), 5);
        assert_eq!(d.nodes_in(&d.clusters[0].token).count(), 2);
        assert_eq!(d.edges.len(), 1);
        assert_eq!(d.edges[0].from, d.clusters[1].token);
        assert_eq!(d.edges[0].to, d.clusters[0].token);
    }

    #[test]
    fn test_nodes_follow_entity_id_order() {
        let files = [("z.py", "class Zed:\n    pass\n"), ("a.py", "class Aye:\n    pass\n")];
        let d = diagram(&files, DiagramKind::Class, &RenderOptions::new(OutputFormat::Json));
        let labels: Vec<_> = d.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Aye", "Zed"]);
    }
}
