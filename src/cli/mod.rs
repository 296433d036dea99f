//! CLI module for Codevision

mod args;

pub use args::{Args, Command};

use crate::analysis::{Analysis, Analyzer};
use crate::config::{CliOverrides, Config};
use crate::error::{Error, Result};
use crate::logging::init_logging;
use std::path::Path;
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Status lines go to stderr when stdout carries the diagrams
struct Console {
    quiet_stdout: bool,
}

impl Console {
    fn line(&self, msg: impl AsRef<str>) {
        if self.quiet_stdout {
            eprintln!("{}", msg.as_ref());
        } else {
            println!("{}", msg.as_ref());
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            output,
            config,
            exclude,
            include,
            kind,
            format,
            max_nodes,
            stdout,
            sequential,
            log_level,
            log_format,
            verbose,
        } => {
            // Load config file if it exists
            let mut cfg = match &config {
                Some(config_path) => Config::load(config_path)?,
                None => {
                    let default_path = Path::new("codevision.toml");
                    if default_path.exists() {
                        Config::load(default_path)?
                    } else {
                        Config::default()
                    }
                }
            };

            // Merge CLI arguments (CLI takes precedence)
            cfg.merge_cli(CliOverrides {
                output,
                include,
                exclude,
                kinds: kind,
                formats: format,
                max_nodes,
                sequential,
                log_level,
                log_format,
            });
            cfg.validate()?;

            init_logging(cfg.logging.level.as_deref(), cfg.logging.format)?;

            let console = Console { quiet_stdout: stdout };
            if verbose {
                console.line(format!("Analyzing: {}", path.display()));
                console.line(format!("Output: {}", cfg.output.directory.display()));
                console.line(format!("Kinds: {:?}", cfg.diagrams.kinds));
                console.line(format!("Formats: {:?}", cfg.diagrams.formats));
                console.line(format!("Include: {:?}", cfg.analysis.include));
                console.line(format!("Exclude: {:?}", cfg.analysis.exclude));
            }

            if !path.exists() {
                return Err(Error::PathNotFound(path));
            }

            let analyzer = Analyzer::new(cfg.clone()).with_verbose(verbose);
            let analysis = analyzer.analyze(&path)?;
            print_summary(&console, &analysis);

            let requests = cfg.diagrams.requests();
            let rendered = analysis.render_all(&requests);

            if stdout {
                for ((kind, options), result) in requests.iter().zip(rendered) {
                    match result {
                        Ok(text) => print!("{}", text),
                        Err(e) => eprintln!("Skipping {} diagram as {}: {}", kind, options.format, e),
                    }
                }
                return Ok(());
            }

            let out_dir = &cfg.output.directory;
            std::fs::create_dir_all(out_dir)?;

            let mut written = 0;
            for ((kind, options), result) in requests.iter().zip(rendered) {
                match result {
                    Ok(text) => {
                        let file = out_dir.join(format!("{}.{}", kind, options.format.extension()));
                        std::fs::write(&file, text)?;
                        written += 1;
                        if verbose {
                            console.line(format!("  wrote {}", file.display()));
                        }
                    }
                    Err(e) => eprintln!("Skipping {} diagram as {}: {}", kind, options.format, e),
                }
            }

            std::fs::write(out_dir.join("structure.json"), analysis.document().to_json()?)?;
            std::fs::write(out_dir.join("report.json"), analysis.report.to_json()?)?;

            console.line(format!(
                "Wrote {} of {} diagrams to: {}",
                written,
                requests.len(),
                out_dir.display()
            ));

            Ok(())
        }

        Command::Version => {
            println!("codevision {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn print_summary(console: &Console, analysis: &Analysis) {
    let counts = &analysis.report.counts;
    console.line(format!(
        "Analysis complete: {} modules, {} classes, {} functions, {} unresolved references",
        counts.modules,
        counts.classes,
        counts.functions,
        analysis.report.unresolved.len()
    ));

    let failed: Vec<_> = analysis.report.failed_files().collect();
    if failed.is_empty() {
        return;
    }

    console.line(format!("\nFailed files ({}):", failed.len()));
    for file in failed.iter().take(5) {
        if let crate::parser::FileStatus::Failed { reason } = &file.status {
            console.line(format!("  {}: {}", file.path.display(), reason));
        }
    }
    if failed.len() > 5 {
        console.line(format!("  ... and {} more", failed.len() - 5));
    }
}
