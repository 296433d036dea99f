// Output generation: diagram renderers, format adapters and the structure document

pub mod diagrams;
pub mod document;
pub mod formats;

pub use diagrams::{Cluster, Diagram, Link, Member, Node};
pub use document::ProjectDocument;
pub use formats::{adapter, FormatAdapter};

use crate::analysis::StructureGraph;
use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info_span};

/// Diagram kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// Classes with members and inheritance
    Class,
    /// Modules and their imports
    Dependency,
    /// Classes grouped by module, with module-level imports
    Component,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 3] = [DiagramKind::Class, DiagramKind::Dependency, DiagramKind::Component];

    pub fn name(&self) -> &'static str {
        match self {
            DiagramKind::Class => "class",
            DiagramKind::Dependency => "dependency",
            DiagramKind::Component => "component",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" | "classes" => Ok(DiagramKind::Class),
            "dependency" | "dependencies" | "deps" => Ok(DiagramKind::Dependency),
            "component" | "components" => Ok(DiagramKind::Component),
            other => Err(format!("unknown diagram kind: {}", other)),
        }
    }
}

/// Output grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mermaid,
    /// Graphviz DOT
    Dot,
    PlantUml,
    /// The format-neutral diagram as JSON
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Mermaid,
        OutputFormat::Dot,
        OutputFormat::PlantUml,
        OutputFormat::Json,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Dot => "dot",
            OutputFormat::PlantUml => "plantuml",
            OutputFormat::Json => "json",
        }
    }

    /// File extension for rendered output
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mmd",
            OutputFormat::Dot => "dot",
            OutputFormat::PlantUml => "puml",
            OutputFormat::Json => "json",
        }
    }

    /// Whether this grammar can express a diagram kind
    pub fn supports(&self, kind: DiagramKind) -> bool {
        match self {
            OutputFormat::PlantUml => kind == DiagramKind::Class,
            OutputFormat::Mermaid | OutputFormat::Dot | OutputFormat::Json => true,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "dot" | "graphviz" | "gv" => Ok(OutputFormat::Dot),
            "plantuml" | "puml" => Ok(OutputFormat::PlantUml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "tb")]
    TopBottom,
    #[serde(rename = "LR", alias = "lr")]
    LeftRight,
}

impl Direction {
    pub fn code(&self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::LeftRight => "LR",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Ok(Direction::TopBottom),
            "LR" => Ok(Direction::LeftRight),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Options for a single render request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub direction: Direction,
    /// Maximum node count after filtering; larger diagrams are rejected
    pub max_nodes: usize,
    /// Members shown per class before the rest is summarized
    pub max_members: usize,
    pub include_private: bool,
    pub show_external: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            direction: Direction::default(),
            max_nodes: 500,
            max_members: 20,
            include_private: true,
            show_external: true,
        }
    }
}

impl RenderOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

/// Render one diagram of a graph.
///
/// The format/kind combination is checked before anything is built, and the
/// node limit is checked before any text is produced.
pub fn render(graph: &StructureGraph, kind: DiagramKind, options: &RenderOptions) -> Result<String, RenderError> {
    let span = info_span!("render", %kind, format = %options.format);
    let _guard = span.enter();

    if !options.format.supports(kind) {
        return Err(RenderError::Unsupported {
            kind,
            format: options.format,
        });
    }

    let diagram = Diagram::build(graph, kind, options);
    let actual = diagram.node_count();
    if actual > options.max_nodes {
        return Err(RenderError::GraphSizeExceeded {
            limit: options.max_nodes,
            actual,
        });
    }

    let text = adapter(options.format).write(&diagram);
    debug!(nodes = actual, edges = diagram.edges.len(), bytes = text.len(), "rendered");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build;
    use crate::parser::{ParserSet, SourceFile};

    fn graph(files: &[(&str, &str)]) -> StructureGraph {
        let mut parsers = ParserSet::new().unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|(p, s)| parsers.extract(&SourceFile::new(*p, *s)))
            .collect();
        build("test", &outcomes)
    }

    #[test]
    fn test_base_derived_scenario() {
        let g = graph(&[("shapes.py", "class Base:\n    pass\n\nclass Derived(Base):\n    pass\n")]);
        let text = render(&g, DiagramKind::Class, &RenderOptions::default()).unwrap();
        assert!(text.contains("class Base[\"Base\"]"));
        assert!(text.contains("class Derived[\"Derived\"]"));
        assert_eq!(text.matches("<|--").count(), 1);
        assert!(text.contains("Base <|-- Derived"));
        assert!(!text.contains("<|.."));
    }

    #[test]
    fn test_plantuml_rejects_dependency_diagram() {
        let g = graph(&[("a.py", "import b\n")]);
        let err = render(&g, DiagramKind::Dependency, &RenderOptions::new(OutputFormat::PlantUml)).unwrap_err();
        assert_eq!(
            err,
            RenderError::Unsupported {
                kind: DiagramKind::Dependency,
                format: OutputFormat::PlantUml
            }
        );
    }

    #[test]
    fn test_node_limit_is_an_error_not_truncation() {
        let g = graph(&[("a.py", "class A:\n    pass\n\nclass B:\n    pass\n\nclass C:\n    pass\n")]);
        let options = RenderOptions::default().with_max_nodes(2);
        let err = render(&g, DiagramKind::Class, &options).unwrap_err();
        assert_eq!(err, RenderError::GraphSizeExceeded { limit: 2, actual: 3 });

        let options = RenderOptions::default().with_max_nodes(3);
        assert!(render(&g, DiagramKind::Class, &options).is_ok());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let files = [
            ("pkg/a.py", "from pkg.b import B\n\nclass A(B):\n    def run(self, n: int) -> str:\n        pass\n"),
            ("pkg/b.py", "import os\n\nclass B:\n    limit = 3\n"),
            ("web/app.js", "import x from 'leftpad';\nclass View extends Base {}\n"),
        ];
        let g = graph(&files);
        for kind in DiagramKind::ALL {
            for format in OutputFormat::ALL {
                let options = RenderOptions::new(format);
                let first = render(&g, kind, &options);
                let second = render(&graph(&files), kind, &options);
                assert_eq!(first, second, "{} as {}", kind, format);
            }
        }
    }

    #[test]
    fn test_empty_graph_renders_headers_only() {
        let g = graph(&[]);
        assert_eq!(
            render(&g, DiagramKind::Class, &RenderOptions::default()).unwrap(),
            "classDiagram\n    direction TB\n"
        );
        let dot = render(&g, DiagramKind::Dependency, &RenderOptions::new(OutputFormat::Dot)).unwrap();
        assert!(dot.starts_with("digraph dependency {"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("PlantUML".parse::<OutputFormat>().unwrap(), OutputFormat::PlantUml);
        assert_eq!("graphviz".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!("deps".parse::<DiagramKind>().unwrap(), DiagramKind::Dependency);
        assert_eq!("lr".parse::<Direction>().unwrap(), Direction::LeftRight);
        assert!("svg".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::PlantUml.extension(), "puml");
    }
}
