use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ortho_graph::{generate, input, Graph};
use ortho_layout::{svg, DrawingBuilder, DrawingStats, GlucoseSolver};

#[derive(Debug, Parser)]
#[command(author, version, about = "Rectilinear grid drawings of undirected graphs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw a graph and print its statistics.
    Draw {
        /// Graph file to read.
        #[arg(short, long)]
        input: PathBuf,

        /// Input format; inferred from the file extension by default.
        #[arg(short, long, value_enum, default_value_t = Format::Auto)]
        format: Format,

        /// Path to the SAT solver binary.
        #[arg(long, default_value = "./glucose")]
        solver: PathBuf,

        /// Write the drawing as an SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Seed the bend-repair randomness from entropy.
        #[arg(long)]
        randomize: bool,

        /// Give up after this many bend insertions.
        #[arg(long, default_value_t = 1000)]
        max_bends: usize,
    },
    /// Generate a connected random graph of maximum degree four.
    Gen {
        /// Number of nodes.
        #[arg(short, long)]
        nodes: usize,

        /// Number of undirected edges.
        #[arg(short, long)]
        edges: usize,

        /// Where to write the graph (plain-text format).
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for the generator.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Format {
    Auto,
    Gml,
    Txt,
}

fn main() -> ExitCode {
    env_logger::init();
    if let Err(error) = run(Args::parse()) {
        eprintln!("error: {error}");
        let mut source = std::error::Error::source(error.as_ref());
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Draw {
            input,
            format,
            solver,
            svg: svg_path,
            randomize,
            max_bends,
        } => {
            let graph = load_graph(&input, format)?;
            info!(
                "loaded {} nodes and {} directed edges",
                graph.node_count(),
                graph.edge_count()
            );
            let result = DrawingBuilder::new(&graph, GlucoseSolver::new(solver))
                .randomize(randomize)
                .max_bends(max_bends)
                .draw()?;
            let stats = DrawingStats::compute(&result)?;
            println!("initial cycles:     {}", result.initial_cycle_count);
            println!("added cycles:       {}", result.added_cycle_count);
            println!("removed bends:      {}", result.removed_bend_count);
            println!("bends:              {}", stats.bends);
            println!("max bends per edge: {}", stats.max_bends_per_edge);
            println!("bends stddev:       {:.3}", stats.bends_stddev);
            println!("total edge length:  {}", stats.total_edge_length);
            println!("max edge length:    {}", stats.max_edge_length);
            println!("length stddev:      {:.3}", stats.edge_length_stddev);
            println!("crossings:          {}", stats.crossings);
            println!("area:               {}", stats.area);
            if let Some(path) = svg_path {
                svg::write(&result, &path)?;
                println!("svg written to      {}", path.display());
            }
        }
        Command::Gen {
            nodes,
            edges,
            output,
            seed,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = generate::random_connected_max_degree_4(nodes, edges, &mut rng)?;
            input::save_txt(&graph, &output)?;
            println!(
                "wrote {} nodes / {} undirected edges to {}",
                graph.node_count(),
                graph.edge_count() / 2,
                output.display()
            );
        }
    }
    Ok(())
}

fn load_graph(path: &Path, format: Format) -> Result<Graph, ortho_graph::Error> {
    let format = match format {
        Format::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("gml") => Format::Gml,
            _ => Format::Txt,
        },
        other => other,
    };
    match format {
        Format::Gml => input::load_gml(path),
        Format::Txt | Format::Auto => input::load_txt(path),
    }
}
