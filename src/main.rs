use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use pepas_core::{AssemblyOutput, assemble, render_listing};
use pepas_ir::{Unit, load_document};
use pepas_link::{AssemblerConfig, default_config, layout_report, layout_segments, load_config};
use pepas_symbol::SymbolTable;
use tracing::{Level, debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "pepas",
    version,
    about = "Section layout and object code backend for the Pep/10 assembler",
    long_about = None,
    override_usage = "pepas [COMMAND] [INPUT]",
    after_help = "Examples:\n  pepas path/to/program.ron\n  pepas assemble path/to/program.ron -T pepas.ron -o out/program\n  pepas layout path/to/program.ron\n  pepas --help"
)]
struct Cli {
    /// Optional explicit subcommand.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input IR document.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Most verbose log level written to stderr.
    #[arg(long, global = true, default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assemble an IR document into an object image and listing.
    Assemble(AssembleArgs),
    /// Print the section, segment and address layout as JSON.
    Layout(LayoutArgs),
}

#[derive(Debug, Parser)]
struct AssembleArgs {
    /// Input IR document (.ron).
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Assembler config file in RON format.
    #[arg(short = 'T', long = "config", value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// Output base path (without extension) for the image and listing.
    #[arg(short = 'o', long = "output", value_name = "OUT_BASE")]
    output: Option<PathBuf>,
    /// IR documents whose exported symbols satisfy this program's imports.
    #[arg(short = 'l', long = "link", value_name = "INPUT")]
    link: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
struct LayoutArgs {
    /// Input IR document (.ron).
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Assembler config file in RON format.
    #[arg(short = 'T', long = "config", value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// IR documents whose exported symbols satisfy this program's imports.
    #[arg(short = 'l', long = "link", value_name = "INPUT")]
    link: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
struct OutputBase {
    parent: PathBuf,
    stem: String,
}

impl OutputBase {
    fn with_extension(&self, extension: &str) -> PathBuf {
        self.parent.join(format!("{}.{extension}", self.stem))
    }
}

/// One assembled target and the inputs it was built from.
struct Assembled {
    unit: Unit,
    output: AssemblyOutput,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Commands::Assemble(args)) => assemble_command(args),
        Some(Commands::Layout(args)) => layout_command(args),
        None => {
            let Some(input) = cli.input else {
                print_banner();
                println!();
                let mut command = Cli::command();
                command.print_help()?;
                println!();
                return Ok(());
            };
            assemble_command(AssembleArgs {
                input,
                config: None,
                output: None,
                link: Vec::new(),
            })
        }
    }
}

fn print_banner() {
    println!("pepas, version {}.", env!("CARGO_PKG_VERSION"));
    println!("Section layout and object code backend for Pep/10.");
    println!("License: GPL-3.0-or-later.");
}

fn read_config(path: Option<&Path>) -> Result<AssemblerConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(default_config()),
    }
}

fn read_unit(path: &Path) -> Result<Unit> {
    let is_ron = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
    if !is_ron {
        bail!(
            "invalid input extension for '{}': expected .ron IR document",
            path.display()
        );
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    load_document(&text).with_context(|| format!("failed to load '{}'", path.display()))
}

fn assemble_file(
    path: &Path,
    config: &AssemblerConfig,
    linked: &[&SymbolTable],
) -> Result<Assembled> {
    let mut unit = read_unit(path)?;
    let options = config.assemble_options(linked)?;
    let output = assemble(&unit.program, &mut unit.symbols, &options)
        .with_context(|| format!("failed to assemble '{}'", path.display()))?;
    info!(input = %path.display(), sections = output.sections.len(), "assembled");
    Ok(Assembled { unit, output })
}

/// Assemble the documents passed with `--link`. Each is an independent target.
fn assemble_linked(paths: &[PathBuf], config: &AssemblerConfig) -> Result<Vec<SymbolTable>> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let assembled = assemble_file(path, config, &[])?;
        debug!(input = %path.display(), symbols = assembled.unit.symbols.len(), "linked target");
        tables.push(assembled.unit.symbols);
    }
    Ok(tables)
}

fn output_base_from_input(input_path: &Path) -> OutputBase {
    let stem = input_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("out")
        .to_string();
    let parent = input_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    OutputBase { parent, stem }
}

fn output_base_from_path(path: &Path) -> OutputBase {
    let stem = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("out")
        .to_string();
    let parent = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    OutputBase { parent, stem }
}

fn assemble_command(args: AssembleArgs) -> Result<()> {
    let config = read_config(args.config.as_deref())?;
    let linked_tables = assemble_linked(&args.link, &config)?;
    let linked: Vec<&SymbolTable> = linked_tables.iter().collect();
    let assembled = assemble_file(&args.input, &config, &linked)?;

    let segments = layout_segments(&assembled.output.sections);
    let image = pepas_link::render_output(&assembled.output, &segments, config.output.kind)?;

    let base = args
        .output
        .map(|path| output_base_from_path(&path))
        .unwrap_or_else(|| output_base_from_input(&args.input));
    let image_path = base.with_extension(config.output.kind.extension());
    std::fs::write(&image_path, image)
        .with_context(|| format!("failed to write '{}'", image_path.display()))?;

    if config.output.listing {
        let listing = render_listing(
            &assembled.unit.program,
            &assembled.unit.symbols,
            &assembled.output,
        );
        let listing_path = base.with_extension("lst");
        std::fs::write(&listing_path, listing)
            .with_context(|| format!("failed to write '{}'", listing_path.display()))?;
    }

    for relocation in &assembled.output.object.relocations {
        info!(symbol = %relocation.symbol, offset = relocation.offset, "unresolved symbol left for relocation");
    }
    Ok(())
}

fn layout_command(args: LayoutArgs) -> Result<()> {
    let config = read_config(args.config.as_deref())?;
    let linked_tables = assemble_linked(&args.link, &config)?;
    let linked: Vec<&SymbolTable> = linked_tables.iter().collect();
    let assembled = assemble_file(&args.input, &config, &linked)?;

    let segments = layout_segments(&assembled.output.sections);
    let report = layout_report(
        &assembled.unit.program,
        &assembled.unit.symbols,
        &assembled.output,
        &segments,
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
