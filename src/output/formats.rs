// Format adapters: per-grammar syntax for the neutral diagram

use super::diagrams::{Cluster, Diagram, Link, Member, Node};
use super::{DiagramKind, Direction, OutputFormat};
use crate::analysis::EdgeKind;

/// Literal syntax of one output grammar.
///
/// `write` lays out header, clusters with their nodes, free nodes, edges and
/// footer, in diagram order. Adapters only produce lines.
pub trait FormatAdapter: Sync {
    /// Make a label safe inside this grammar's quoting
    fn escape(&self, label: &str) -> String;

    fn header(&self, diagram: &Diagram) -> Vec<String>;

    fn node(&self, diagram: &Diagram, node: &Node) -> Vec<String>;

    fn edge(&self, diagram: &Diagram, link: &Link) -> String;

    /// Derived-to-base edge drawn with the grammar's inheritance arrow
    fn inheritance(&self, link: &Link) -> String;

    fn cluster_open(&self, cluster: &Cluster) -> Vec<String>;

    fn cluster_close(&self, cluster: &Cluster) -> String;

    fn footer(&self, _diagram: &Diagram) -> Vec<String> {
        Vec::new()
    }

    fn write(&self, diagram: &Diagram) -> String {
        let mut lines = self.header(diagram);

        for cluster in &diagram.clusters {
            lines.extend(self.cluster_open(cluster));
            for node in diagram.nodes_in(&cluster.token) {
                lines.extend(self.node(diagram, node).into_iter().map(|l| format!("    {}", l)));
            }
            lines.push(self.cluster_close(cluster));
        }
        for node in diagram.nodes.iter().filter(|n| n.cluster.is_none()) {
            lines.extend(self.node(diagram, node));
        }
        for link in &diagram.edges {
            lines.push(match link.kind {
                EdgeKind::InheritsFrom => self.inheritance(link),
                EdgeKind::Imports => self.edge(diagram, link),
            });
        }

        lines.extend(self.footer(diagram));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// Adapter for an output format
pub fn adapter(format: OutputFormat) -> &'static dyn FormatAdapter {
    match format {
        OutputFormat::Mermaid => &Mermaid,
        OutputFormat::Dot => &Dot,
        OutputFormat::PlantUml => &PlantUml,
        OutputFormat::Json => &Json,
    }
}

/// Single-line label text
fn flatten(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Mermaid `classDiagram` and `flowchart`
pub struct Mermaid;

impl Mermaid {
    /// Member text; generics use Mermaid's `~T~` notation
    fn member(&self, member: &Member) -> String {
        let text = flatten(&member.signature()).replace(['<', '>'], "~").replace('"', "'");
        let marker = if member.is_static() { "$" } else { "" };
        format!("{}{}{}", member.visibility_marker(), text, marker)
    }
}

impl FormatAdapter for Mermaid {
    fn escape(&self, label: &str) -> String {
        flatten(label)
            .replace('"', "#quot;")
            .replace('<', "#lt;")
            .replace('>', "#gt;")
    }

    fn header(&self, diagram: &Diagram) -> Vec<String> {
        match diagram.kind {
            DiagramKind::Class => vec![
                "classDiagram".to_string(),
                format!("    direction {}", diagram.direction),
            ],
            DiagramKind::Dependency | DiagramKind::Component => {
                vec![format!("flowchart {}", diagram.direction)]
            }
        }
    }

    fn node(&self, diagram: &Diagram, node: &Node) -> Vec<String> {
        let label = self.escape(&node.label);
        if diagram.kind != DiagramKind::Class {
            let class = if node.external { ":::external" } else { "" };
            return vec![format!("    {}[\"{}\"]{}", node.token, label, class)];
        }

        let mut lines = vec![format!("    class {}[\"{}\"]", node.token, label)];
        if let Some(stereotype) = &node.stereotype {
            lines.push(format!("    <<{}>> {}", stereotype, node.token));
        }
        for member in &node.members {
            lines.push(format!("    {} : {}", node.token, self.member(member)));
        }
        if node.external {
            lines.push(format!("    style {} stroke-dasharray: 5 5", node.token));
        }
        lines
    }

    fn edge(&self, _diagram: &Diagram, link: &Link) -> String {
        let arrow = if link.dashed { "-.->" } else { "-->" };
        format!("    {} {} {}", link.from, arrow, link.to)
    }

    fn inheritance(&self, link: &Link) -> String {
        let arrow = if link.dashed { "<|.." } else { "<|--" };
        format!("    {} {} {}", link.to, arrow, link.from)
    }

    fn cluster_open(&self, cluster: &Cluster) -> Vec<String> {
        vec![format!("    subgraph {}[\"{}\"]", cluster.token, self.escape(&cluster.label))]
    }

    fn cluster_close(&self, _cluster: &Cluster) -> String {
        "    end".to_string()
    }

    fn footer(&self, diagram: &Diagram) -> Vec<String> {
        if diagram.kind != DiagramKind::Class && diagram.nodes.iter().any(|n| n.external) {
            vec!["    classDef external stroke-dasharray: 5 5".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Graphviz DOT
pub struct Dot;

impl Dot {
    /// Escape for record labels, where braces, pipes and angle brackets are structural
    fn record(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in flatten(text).chars() {
            if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    fn class_label(&self, node: &Node) -> String {
        let mut title = self.record(&node.label);
        if let Some(stereotype) = &node.stereotype {
            title = format!("\\<\\<{}\\>\\>\\n{}", stereotype, title);
        }
        let members: String = node
            .members
            .iter()
            .map(|m| {
                let marker = if m.is_static() { "static " } else { "" };
                format!("{}{}{}\\l", marker, m.visibility_marker(), self.record(&m.signature()))
            })
            .collect();
        if members.is_empty() {
            format!("{{{}}}", title)
        } else {
            format!("{{{}|{}}}", title, members)
        }
    }
}

impl FormatAdapter for Dot {
    fn escape(&self, label: &str) -> String {
        flatten(label).replace('\\', "\\\\").replace('"', "\\\"")
    }

    fn header(&self, diagram: &Diagram) -> Vec<String> {
        let mut lines = vec![
            format!("digraph {} {{", diagram.kind),
            format!("    rankdir={};", diagram.direction),
        ];
        if diagram.kind == DiagramKind::Component {
            lines.push("    compound=true;".to_string());
        }
        let shape = match diagram.kind {
            DiagramKind::Class => "record",
            DiagramKind::Dependency | DiagramKind::Component => "box",
        };
        lines.push(format!("    node [shape={}, fontname=\"Helvetica\", fontsize=10];", shape));
        lines.push("    edge [fontname=\"Helvetica\", fontsize=9];".to_string());
        lines
    }

    fn node(&self, diagram: &Diagram, node: &Node) -> Vec<String> {
        let style = if node.external { ", style=dashed" } else { "" };
        let label = match diagram.kind {
            DiagramKind::Class => self.class_label(node),
            DiagramKind::Dependency | DiagramKind::Component => self.escape(&node.label),
        };
        vec![format!("    {} [label=\"{}\"{}];", node.token, label, style)]
    }

    fn edge(&self, diagram: &Diagram, link: &Link) -> String {
        let mut attrs = Vec::new();
        if link.dashed {
            attrs.push("style=dashed".to_string());
        }
        if diagram.kind == DiagramKind::Component {
            attrs.push(format!("ltail=cluster_{}", link.from));
            attrs.push(format!("lhead=cluster_{}", link.to));
        }
        if attrs.is_empty() {
            format!("    {} -> {};", link.from, link.to)
        } else {
            format!("    {} -> {} [{}];", link.from, link.to, attrs.join(", "))
        }
    }

    fn inheritance(&self, link: &Link) -> String {
        let style = if link.dashed { "dashed" } else { "solid" };
        format!("    {} -> {} [arrowhead=empty, style={}];", link.from, link.to, style)
    }

    /// Clusters carry an invisible anchor node named by the cluster token for edges to attach to
    fn cluster_open(&self, cluster: &Cluster) -> Vec<String> {
        vec![
            format!("    subgraph cluster_{} {{", cluster.token),
            format!("        label=\"{}\";", self.escape(&cluster.label)),
            format!("        {} [shape=point, style=invis];", cluster.token),
        ]
    }

    fn cluster_close(&self, _cluster: &Cluster) -> String {
        "    }".to_string()
    }

    fn footer(&self, _diagram: &Diagram) -> Vec<String> {
        vec!["}".to_string()]
    }
}

/// PlantUML class diagrams
pub struct PlantUml;

impl FormatAdapter for PlantUml {
    fn escape(&self, label: &str) -> String {
        flatten(label).replace('"', "'")
    }

    fn header(&self, diagram: &Diagram) -> Vec<String> {
        let mut lines = vec!["@startuml".to_string(), "skinparam classAttributeIconSize 0".to_string()];
        if diagram.direction == Direction::LeftRight {
            lines.push("left to right direction".to_string());
        }
        lines
    }

    fn node(&self, _diagram: &Diagram, node: &Node) -> Vec<String> {
        let stereotype = node
            .stereotype
            .as_ref()
            .map(|s| format!(" <<{}>>", s))
            .unwrap_or_default();
        let line_style = if node.external { " #line.dashed" } else { "" };
        let mut lines = vec![format!(
            "class \"{}\" as {}{}{} {{",
            self.escape(&node.label),
            node.token,
            stereotype,
            line_style
        )];
        for member in &node.members {
            let line = match member {
                Member::More { .. } => format!("  .. {} ..", member.signature()),
                _ => {
                    let marker = if member.is_static() { "{static} " } else { "" };
                    let text = flatten(&member.signature()).replace(['{', '}'], "");
                    format!("  {}{}{}", marker, member.visibility_marker(), text)
                }
            };
            lines.push(line);
        }
        lines.push("}".to_string());
        lines
    }

    fn edge(&self, _diagram: &Diagram, link: &Link) -> String {
        let arrow = if link.dashed { "..>" } else { "-->" };
        format!("{} {} {}", link.from, arrow, link.to)
    }

    fn inheritance(&self, link: &Link) -> String {
        let arrow = if link.dashed { "<|.." } else { "<|--" };
        format!("{} {} {}", link.to, arrow, link.from)
    }

    fn cluster_open(&self, cluster: &Cluster) -> Vec<String> {
        vec![format!("package \"{}\" as {} {{", self.escape(&cluster.label), cluster.token)]
    }

    fn cluster_close(&self, _cluster: &Cluster) -> String {
        "}".to_string()
    }

    fn footer(&self, _diagram: &Diagram) -> Vec<String> {
        vec!["@enduml".to_string()]
    }
}

/// The neutral diagram itself, as JSON
pub struct Json;

impl FormatAdapter for Json {
    fn escape(&self, label: &str) -> String {
        label.to_string()
    }

    fn header(&self, _diagram: &Diagram) -> Vec<String> {
        Vec::new()
    }

    fn node(&self, _diagram: &Diagram, _node: &Node) -> Vec<String> {
        Vec::new()
    }

    fn edge(&self, _diagram: &Diagram, _link: &Link) -> String {
        String::new()
    }

    fn inheritance(&self, _link: &Link) -> String {
        String::new()
    }

    fn cluster_open(&self, _cluster: &Cluster) -> Vec<String> {
        Vec::new()
    }

    fn cluster_close(&self, _cluster: &Cluster) -> String {
        String::new()
    }

    fn write(&self, diagram: &Diagram) -> String {
        // Strings, numbers and sequences only; serialization cannot fail
        let mut text = serde_json::to_string_pretty(diagram).unwrap_or_default();
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build;
    use crate::output::RenderOptions;
    use crate::parser::{ParserSet, SourceFile};

    fn diagram(files: &[(&str, &str)], kind: DiagramKind) -> Diagram {
        let mut parsers = ParserSet::new().unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|(p, s)| parsers.extract(&SourceFile::new(*p, *s)))
            .collect();
        Diagram::build(&build("test", &outcomes), kind, &RenderOptions::default())
    }

    const CLASSES: &str = "class Base:\n    def area(self) -> float:\n        pass\n\nclass Square(Base):\n    @staticmethod\n    def unit():\n        pass\n\nclass Widget(ui.Control):\n    pass\n";

    #[test]
    fn test_mermaid_class_diagram() {
        let text = Mermaid.write(&diagram(&[("shapes.py", CLASSES)], DiagramKind::Class));
        assert!(text.starts_with("classDiagram\n    direction TB\n"));
        assert!(text.contains("    class Base[\"Base\"]\n    Base : +area() float\n"));
        assert!(text.contains("    Square : +unit()$\n"));
        assert!(text.contains("    Base <|-- Square\n"));
        assert!(text.contains("    <<external>> ui_Control\n"));
        assert!(text.contains("    ui_Control <|.. Widget\n"));
    }

    #[test]
    fn test_mermaid_escapes_labels() {
        assert_eq!(Mermaid.escape("Map<\"K\">"), "Map#lt;#quot;K#quot;#gt;");
        assert_eq!(Mermaid.escape("two\nlines"), "two lines");
    }

    #[test]
    fn test_mermaid_dependency_diagram() {
        let files = [("a.py", "import b\nimport leftpad\n"), ("b.py", "")];
        let text = Mermaid.write(&diagram(&files, DiagramKind::Dependency));
        assert!(text.starts_with("flowchart TB\n"));
        assert!(text.contains("    a[\"a\"]\n"));
        assert!(text.contains("    leftpad[\"leftpad\"]:::external\n"));
        assert!(text.contains("    a --> b\n"));
        assert!(text.contains("    a -.-> leftpad\n"));
        assert!(text.ends_with("    classDef external stroke-dasharray: 5 5\n"));
    }

    #[test]
    fn test_mermaid_component_subgraphs() {
        let files = [("m.py", "import n\n\nclass A:\n    pass\n"), ("n.py", "class B:\n    pass\n")];
        let text = Mermaid.write(&diagram(&files, DiagramKind::Component));
        assert!(text.contains("    subgraph m[\"m\"]\n        A[\"A\"]\n    end\n"));
        assert!(text.contains("    m --> n\n"));
    }

    #[test]
    fn test_dot_class_records() {
        let text = Dot.write(&diagram(&[("shapes.py", CLASSES)], DiagramKind::Class));
        assert!(text.starts_with("digraph class {\n    rankdir=TB;\n"));
        assert!(text.contains("    Base [label=\"{Base|+area() float\\l}\"];\n"));
        assert!(text.contains("    Square -> Base [arrowhead=empty, style=solid];\n"));
        assert!(text.contains("    Widget -> ui_Control [arrowhead=empty, style=dashed];\n"));
        assert!(text.contains("style=dashed];\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_dot_escaping() {
        assert_eq!(Dot.escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(Dot.record("Map<K, V>|x"), "Map\\<K, V\\>\\|x");
    }

    #[test]
    fn test_dot_component_clusters() {
        let files = [("m.py", "import n\n\nclass A:\n    pass\n"), ("n.py", "class B:\n    pass\n")];
        let text = Dot.write(&diagram(&files, DiagramKind::Component));
        assert!(text.contains("    compound=true;\n"));
        assert!(text.contains("    subgraph cluster_m {\n        label=\"m\";\n        m [shape=point, style=invis];\n"));
        assert!(text.contains("    m -> n [ltail=cluster_m, lhead=cluster_n];\n"));
    }

    #[test]
    fn test_plantuml_class_diagram() {
        let text = PlantUml.write(&diagram(&[("shapes.py", CLASSES)], DiagramKind::Class));
        assert!(text.starts_with("@startuml\n"));
        assert!(text.contains("class \"Base\" as Base {\n  +area() float\n}\n"));
        assert!(text.contains("  {static} +unit()\n"));
        assert!(text.contains("class \"ui.Control\" as ui_Control <<external>> #line.dashed {\n"));
        assert!(text.contains("Base <|-- Square\n"));
        assert!(text.ends_with("@enduml\n"));
    }

    #[test]
    fn test_json_is_the_neutral_diagram() {
        let text = Json.write(&diagram(&[("shapes.py", CLASSES)], DiagramKind::Class));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "class");
        assert_eq!(value["direction"], "TB");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(value["edges"][0]["kind"], "inherits_from");
    }
}
