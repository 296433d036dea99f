// Analysis pipeline: discovery, parallel extraction, graph construction

pub mod builder;
pub mod graph;
pub mod report;
pub mod sanitize;

pub use builder::{build, GraphBuilder};
pub use graph::*;
pub use report::*;
pub use sanitize::{Sanitizer, TokenEntry, TokenMap};

use crate::config::Config;
use crate::error::{Error, RenderError, Result};
use crate::output::{self, DiagramKind, ProjectDocument, RenderOptions};
use crate::parser::{normalize_path, ExtractionOutcome, Language, ParserSet, SourceFile};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};
use walkdir::WalkDir;

/// Result of one analysis session
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The project graph, read-only from here on
    pub graph: StructureGraph,
    /// Per-file statuses, unresolved references and counts
    pub report: SessionReport,
}

impl Analysis {
    /// Render one diagram
    pub fn render(&self, kind: DiagramKind, options: &RenderOptions) -> std::result::Result<String, RenderError> {
        output::render(&self.graph, kind, options)
    }

    /// Render several diagrams concurrently; results come back in request order
    pub fn render_all(
        &self,
        requests: &[(DiagramKind, RenderOptions)],
    ) -> Vec<std::result::Result<String, RenderError>> {
        requests
            .par_iter()
            .map(|(kind, options)| self.render(*kind, options))
            .collect()
    }

    /// Canonical structured form of the graph
    pub fn document(&self) -> ProjectDocument {
        ProjectDocument::from_graph(&self.graph)
    }
}

/// A file that reaches extraction, or one that already failed on the way in
enum Input {
    Source(SourceFile),
    Rejected(ExtractionOutcome),
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    verbose: bool,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    /// Show a progress bar during extraction
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Analyze the project rooted at a directory
    pub fn analyze(&self, root: &Path) -> Result<Analysis> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let project = self.project_name(root);
        let files = self.discover_files(root)?;
        info!(root = %root.display(), files = files.len(), "discovered source files");

        let inputs = files.into_iter().map(|rel| self.read_file(root, rel)).collect();
        Ok(self.run(&project, inputs))
    }

    /// Analyze files handed over in memory, in the given processing order
    pub fn analyze_sources(&self, project: &str, sources: Vec<SourceFile>) -> Analysis {
        let inputs = sources.into_iter().map(Input::Source).collect();
        self.run(project, inputs)
    }

    fn run(&self, project: &str, inputs: Vec<Input>) -> Analysis {
        let span = info_span!("analyze", project, files = inputs.len());
        let _guard = span.enter();

        let inputs = reject_duplicates(inputs);
        let progress = self.progress_bar(inputs.len());

        // Extraction has no cross-file state; the join happens at collect
        let extract = |parsers: &mut Result<ParserSet>, input: Input| {
            let outcome = extract_one(parsers, input);
            if let Some(pb) = &progress {
                pb.set_message(outcome.path.display().to_string());
                pb.inc(1);
            }
            outcome
        };
        let outcomes: Vec<ExtractionOutcome> = if self.config.analysis.parallel {
            inputs.into_par_iter().map_init(ParserSet::new, extract).collect()
        } else {
            let mut parsers = ParserSet::new();
            inputs.into_iter().map(|input| extract(&mut parsers, input)).collect()
        };

        if let Some(pb) = progress {
            pb.finish_with_message("extraction complete");
        }

        let graph = builder::build(project, &outcomes);
        let report = SessionReport::new(&graph, &outcomes);
        info!(
            modules = report.counts.modules,
            classes = report.counts.classes,
            failed = report.counts.failed_files,
            "analysis complete"
        );
        Analysis { graph, report }
    }

    fn project_name(&self, root: &Path) -> String {
        if let Some(name) = self.config.project.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        root.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string())
    }

    /// Relative paths of all matching files, sorted for a stable processing order
    fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let include = compile_patterns(&self.config.analysis.include)?;
        let exclude = compile_patterns(&self.config.analysis.exclude)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let key = normalize_path(relative);
            if !include.iter().any(|p| p.matches(&key)) || exclude.iter().any(|p| p.matches(&key)) {
                continue;
            }
            files.push(relative.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn read_file(&self, root: &Path, relative: PathBuf) -> Input {
        let language = Language::from_path(&relative);
        let full = root.join(&relative);

        let size = match std::fs::metadata(&full) {
            Ok(meta) => meta.len(),
            Err(e) => return Input::Rejected(ExtractionOutcome::failed(&relative, language, format!("unreadable: {}", e))),
        };
        let limit = self.config.analysis.max_file_size;
        if size > limit {
            return Input::Rejected(ExtractionOutcome::failed(
                &relative,
                language,
                format!("file size {} exceeds the limit of {} bytes", size, limit),
            ));
        }

        match std::fs::read(&full) {
            Ok(content) => Input::Source(SourceFile::new(relative, content)),
            Err(e) => Input::Rejected(ExtractionOutcome::failed(&relative, language, format!("unreadable: {}", e))),
        }
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.verbose {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Error::from))
        .collect()
}

/// A second file with an already-seen path fails instead of shadowing the first
fn reject_duplicates(inputs: Vec<Input>) -> Vec<Input> {
    let mut seen = HashSet::new();
    inputs
        .into_iter()
        .map(|input| match input {
            Input::Source(file) if !seen.insert(normalize_path(&file.path)) => {
                warn!(path = %file.path.display(), "duplicate path");
                let language = file.resolved_language();
                Input::Rejected(ExtractionOutcome::failed(&file.path, language, "duplicate path"))
            }
            other => other,
        })
        .collect()
}

fn extract_one(parsers: &mut Result<ParserSet>, input: Input) -> ExtractionOutcome {
    let outcome = match (input, parsers) {
        (Input::Rejected(outcome), _) => outcome,
        (Input::Source(file), Ok(parsers)) => parsers.extract(&file),
        (Input::Source(file), Err(e)) => {
            ExtractionOutcome::failed(&file.path, file.resolved_language(), format!("parser unavailable: {}", e))
        }
    };

    match (&outcome.module, &outcome.status) {
        (Some(module), _) => debug!(
            path = %outcome.path.display(),
            classes = module.classes.len(),
            functions = module.functions.len(),
            imports = module.imports.len(),
            warnings = outcome.warnings.len(),
            "extracted"
        ),
        (None, status) => warn!(path = %outcome.path.display(), ?status, "extraction failed"),
    }
    outcome
}
