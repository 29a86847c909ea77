/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command line interface
//!
//! `map` (alias `predict`) maps the configurations of a project onto parent
//! prototypes and writes the result table; `analyze` reads a stored result
//! table and writes the best parent of every configuration.

use crate::io::{read_result_table, write_best_match_table, write_result_table, OutputFormat};
use crate::mapping::{
    analyze_mapping_data, get_properties_json_paths, map_configurations_onto_parent_structures,
    read_config_names, ChildPathOptions, LatticeMapper, MappingOptions, ParentLibrary, ParentSelection,
    StructureMapper, DEFAULT_CONFLICT_TOL,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "protomap",
    version,
    about = "Map relaxed structures onto parent crystal prototypes and find the best parent of each"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Map configurations onto parent crystal structures
    #[command(visible_alias = "predict")]
    Map(MapArgs),
    /// Find the best parent of every configuration in stored mapping results
    Analyze(AnalyzeArgs),
}

/// Which structure file of a configuration to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigType {
    /// properties.calc.json of the chosen calctype
    Relaxed,
    /// structure.json
    Unrelaxed,
}

fn parse_parent_library(name: &str) -> Result<ParentLibrary, String> {
    name.parse::<ParentLibrary>().map_err(|e| e.to_string())
}

#[derive(Debug, Args)]
pub struct MapArgs {
    /// List of configurations as a JSON list of {"name": ...} objects
    #[arg(short, long)]
    pub configurations: PathBuf,

    /// Output file (.html or .hdf)
    #[arg(short, long)]
    pub outfile: PathBuf,

    /// Read relaxed properties or the initial structure
    #[arg(long, value_enum, default_value_t = ConfigType::Relaxed)]
    pub configtype: ConfigType,

    /// Calctype to read relaxed properties from
    #[arg(long, default_value = "default")]
    pub calctype: String,

    /// Bundled parent structures to map onto (frequent, common or all)
    #[arg(short, long, default_value = "common", value_parser = parse_parent_library)]
    pub parents: ParentLibrary,

    /// POSCAR files to use as parents instead of a bundled library
    #[arg(long, num_args = 1.., conflicts_with = "parents")]
    pub parent_files: Vec<PathBuf>,

    /// JSON file overriding mapping options
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Do not report progress after every mapped pair
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Mapping results written by `map` as .hdf
    #[arg(short, long)]
    pub infile: PathBuf,

    /// Output file (.hdf or .html)
    #[arg(short, long)]
    pub outfile: PathBuf,

    /// Tolerance for flagging parents that tie with the best one
    #[arg(long, default_value_t = DEFAULT_CONFLICT_TOL)]
    pub tol: f64,
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Map(args) => run_map(args),
        Command::Analyze(args) => run_analyze(args),
    }
}

fn run_map(args: MapArgs) -> anyhow::Result<()> {
    run_map_with(&LatticeMapper::new(), args)
}

fn run_map_with<M: StructureMapper + ?Sized>(mapper: &M, args: MapArgs) -> anyhow::Result<()> {
    OutputFormat::from_path(&args.outfile)?;

    let config_names = read_config_names(&args.configurations)
        .with_context(|| format!("reading configurations from {}", args.configurations.display()))?;
    let path_options = ChildPathOptions {
        calctype: args.calctype,
        relaxed: args.configtype == ConfigType::Relaxed,
    };
    let child_paths = get_properties_json_paths(&config_names, &path_options)?;

    let options = match &args.settings {
        Some(path) => MappingOptions::from_file(path)
            .with_context(|| format!("reading mapping settings from {}", path.display()))?,
        None => MappingOptions::default(),
    };
    let parents = if args.parent_files.is_empty() {
        ParentSelection::Library(args.parents)
    } else {
        ParentSelection::Files(args.parent_files)
    };

    let table = map_configurations_onto_parent_structures(
        mapper,
        &child_paths,
        &parents,
        &options,
        args.quiet,
    )?;
    write_result_table(&args.outfile, &table)
        .with_context(|| format!("writing {}", args.outfile.display()))?;
    info!(
        "Wrote mapping results of {} configurations to {}",
        table.row_count(),
        args.outfile.display()
    );
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    OutputFormat::from_path(&args.outfile)?;

    let table = read_result_table(&args.infile)
        .with_context(|| format!("reading mapping results from {}", args.infile.display()))?;
    let best_maps = analyze_mapping_data(&table, args.tol)?;
    write_best_match_table(&args.outfile, &best_maps)
        .with_context(|| format!("writing {}", args.outfile.display()))?;

    let conflicted = best_maps
        .rows()
        .iter()
        .filter(|(_, entry)| entry.has_conflicts())
        .count();
    info!(
        "Wrote best maps of {} configurations to {} ({} with conflicting maps)",
        best_maps.len(),
        args.outfile.display(),
        conflicted
    );
    Ok(())
}
