// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands every command to
// a use case in Layer 2. Printing results happens here and only
// here.
//
// Three commands are supported:
//   1. `visualize` — synthesise images for kernels of a layer
//   2. `layers`    — list the layers of a VGG variant
//   3. `import`    — convert torchvision weights to burnpack
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ImportArgs, LayersArgs, VisualizeArgs};

use crate::application::{
    import_use_case::ImportUseCase,
    layers_use_case::LayersUseCase,
    visualize_use_case::{VisualizeConfig, VisualizeUseCase},
};
use crate::infra::output::OutputStore;

#[derive(Parser, Debug)]
#[command(
    name = "actmax",
    version,
    about = "Synthesise the image a VGG unit likes best (activation maximisation)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Visualize(args) => run_visualize(args),
            Commands::Layers(args)    => run_layers(args),
            Commands::Import(args)    => run_import(args),
        }
    }
}

fn run_visualize(mut args: VisualizeArgs) -> Result<()> {
    let config: VisualizeConfig = match args.config.take() {
        Some(path) => {
            tracing::info!("Reading settings from '{}'", path.display());
            OutputStore::load_config(&path)?
        }
        None => args.into(),
    };

    let paths = VisualizeUseCase::new(config).execute()?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_layers(args: LayersArgs) -> Result<()> {
    let table = LayersUseCase::new(args.arch).table();

    println!("{:<13} {:<9} {:<12} {:>8}", "index", "name", "kind", "channels");
    for layer in table.iter() {
        println!(
            "{:<13} {:<9} {:<12} {:>8}",
            format!("features.{}", layer.index),
            layer.name,
            layer.kind.to_string(),
            layer.channels,
        );
    }
    Ok(())
}

fn run_import(args: ImportArgs) -> Result<()> {
    let written = ImportUseCase::new(args.arch, args.pytorch, args.output).execute()?;
    println!("Weights written to {}", written.display());
    Ok(())
}
