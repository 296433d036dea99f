//! Codevision - Extract code structure and render it as diagrams
//!
//! Scans a multi-language project, extracts modules, classes, functions,
//! attributes, parameters and imports into a deterministic structure graph,
//! and renders class, dependency and component diagrams as Mermaid,
//! Graphviz DOT, PlantUML or JSON.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{Analysis, Analyzer, SessionReport, StructureGraph};
pub use config::Config;
pub use error::{Error, RenderError, Result};
pub use output::{render, DiagramKind, Direction, OutputFormat, ProjectDocument, RenderOptions};
pub use parser::{ParserSet, SourceFile};
