use crate::error::{Error, Result};
use crate::logging::LogFormat;
use crate::output::{DiagramKind, Direction, OutputFormat, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub diagrams: DiagramConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Project metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Defaults to the analyzed directory's name
    pub name: Option<String>,
}

/// Analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Extract files on all cores
    pub parallel: bool,
    /// Larger files are recorded as failed without being read
    pub max_file_size: u64,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub kinds: Vec<DiagramKind>,
    pub formats: Vec<OutputFormat>,
    pub max_nodes: usize,
    pub max_members: usize,
    pub direction: Direction,
    pub include_private: bool,
    pub show_external: bool,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

/// Logging settings; environment variables apply when unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let include = [
            "py", "pyi", "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "java", "kt", "kts", "cs", "go", "rs",
            "rb", "php", "swift", "c", "h", "cpp", "cc", "cxx", "hpp", "hh", "hxx",
        ]
        .iter()
        .map(|ext| format!("**/*.{}", ext))
        .collect();

        Self {
            include,
            exclude: vec![
                "**/.git/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/__pycache__/**".to_string(),
                "**/venv/**".to_string(),
                "**/.venv/**".to_string(),
                "**/target/**".to_string(),
                "**/dist/**".to_string(),
                "**/*.min.js".to_string(),
                "**/*.d.ts".to_string(),
            ],
            parallel: true,
            max_file_size: 1024 * 1024,
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            kinds: DiagramKind::ALL.to_vec(),
            formats: vec![OutputFormat::Mermaid],
            max_nodes: defaults.max_nodes,
            max_members: defaults.max_members,
            direction: defaults.direction,
            include_private: defaults.include_private,
            show_external: defaults.show_external,
        }
    }
}

impl DiagramConfig {
    /// Render options for one output format
    pub fn render_options(&self, format: OutputFormat) -> RenderOptions {
        RenderOptions {
            format,
            direction: self.direction,
            max_nodes: self.max_nodes,
            max_members: self.max_members,
            include_private: self.include_private,
            show_external: self.show_external,
        }
    }

    /// Every configured (kind, options) pair the format supports
    pub fn requests(&self) -> Vec<(DiagramKind, RenderOptions)> {
        let mut requests = Vec::new();
        for &format in &self.formats {
            for &kind in &self.kinds {
                requests.push((kind, self.render_options(format)));
            }
        }
        requests
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./codevision-out"),
        }
    }
}

/// Overrides from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub kinds: Vec<DiagramKind>,
    pub formats: Vec<OutputFormat>,
    pub max_nodes: Option<usize>,
    pub sequential: bool,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        if let Some(out) = cli.output {
            self.output.directory = out;
        }

        // Includes replace, excludes add
        if !cli.include.is_empty() {
            self.analysis.include = cli.include;
        }
        self.analysis.exclude.extend(cli.exclude);

        if !cli.kinds.is_empty() {
            self.diagrams.kinds = cli.kinds;
        }
        if !cli.formats.is_empty() {
            self.diagrams.formats = cli.formats;
        }
        if let Some(n) = cli.max_nodes {
            self.diagrams.max_nodes = n;
        }
        if cli.sequential {
            self.analysis.parallel = false;
        }

        if cli.log_level.is_some() {
            self.logging.level = cli.log_level;
        }
        if cli.log_format.is_some() {
            self.logging.format = cli.log_format;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.diagrams.max_nodes == 0 {
            return Err(Error::config_validation("diagram max_nodes must be at least 1"));
        }

        if self.analysis.include.is_empty() {
            return Err(Error::config_validation("at least one include pattern required"));
        }

        if self.analysis.max_file_size == 0 {
            return Err(Error::config_validation("max_file_size must be at least 1"));
        }

        if self.diagrams.kinds.is_empty() {
            return Err(Error::config_validation("at least one diagram kind required"));
        }

        if self.diagrams.formats.is_empty() {
            return Err(Error::config_validation("at least one output format required"));
        }

        for pattern in self.analysis.include.iter().chain(&self.analysis.exclude) {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}
