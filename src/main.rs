//! plugin-pack CLI
//!
//! Entry point for the `plugin-pack` command-line tool.

use clap::{Parser, Subcommand};
use plugin_pack::clean::clean_stale_archives;
use plugin_pack::metadata;
use plugin_pack::{
    BuildOutput, MetadataSchema, OutputKind, OutputSet, Pipeline, PipelineConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "plugin-pack")]
#[command(about = "Post-compilation packaging pipeline for plugin bundles", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full packaging pipeline over a compiler output directory
    Build {
        /// Project directory holding schema.json and package.json
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Directory of compiler build outputs
        #[arg(long)]
        outputs: PathBuf,

        /// Output directory for the packaged artifacts
        #[arg(long, default_value = "dist")]
        out: PathBuf,

        /// Fixed name of the script output
        #[arg(long, default_value = "plugin.min.js")]
        script_name: String,

        /// Verbose stage logging
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Validate the metadata document against the plugin schema
    Validate {
        /// Project directory holding schema.json
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },

    /// Remove stale packaged archives from the output directory
    Clean {
        /// Output directory
        #[arg(long, default_value = "dist")]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            project,
            outputs,
            out,
            script_name,
            verbose,
        } => {
            run_build(&project, &outputs, out, script_name, verbose);
        }
        Commands::Validate { project } => {
            run_validate(&project);
        }
        Commands::Clean { out } => {
            run_clean(&out);
        }
    }
}

fn run_build(project: &Path, outputs_dir: &Path, out: PathBuf, script_name: String, verbose: bool) {
    let outputs = match load_outputs(outputs_dir, &script_name) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error reading build outputs: {}", e);
            process::exit(1);
        }
    };

    let config = PipelineConfig {
        metadata_path: project.join("schema.json"),
        descriptor_path: project.join("package.json"),
        out_dir: out,
        script_name,
        verbose,
    };

    let mut pipeline = Pipeline::new(config);
    match pipeline.run(outputs) {
        Ok(report) => {
            println!("{}", report.human_summary());
        }
        Err(e) => {
            eprintln!("Build failed: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_validate(project: &Path) {
    let path = project.join("schema.json");
    let document = match metadata::read_document(&path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    match MetadataSchema::default().validate(&document) {
        Ok(()) => {
            println!("Metadata valid: {}", path.display());
        }
        Err(e) => {
            eprintln!("Metadata invalid: {}", path.display());
            for violation in &e.violations {
                eprintln!("  - {}", violation);
            }
            process::exit(10);
        }
    }
}

fn run_clean(out: &Path) {
    match clean_stale_archives(out) {
        Ok(removed) => {
            for path in &removed {
                println!("removed {}", path.display());
            }
            if removed.is_empty() {
                println!("nothing to clean");
            }
        }
        Err(e) => {
            eprintln!("Clean failed: {}", e);
            process::exit(1);
        }
    }
}

/// Read every file in the compiler output directory into an `OutputSet`,
/// classifying by name.
fn load_outputs(dir: &Path, script_name: &str) -> std::io::Result<OutputSet> {
    let mut set = OutputSet::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|e| e.path().is_file())
        .collect();
    // Directory iteration order is platform-dependent; sort so stylesheet
    // concatenation order is stable across runs.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let kind = OutputKind::from_name(&name, script_name);
        let bytes = fs::read(entry.path())?;
        set.insert(BuildOutput::new(name, kind, bytes))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    }
    Ok(set)
}
