use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use ontomap::mapper::{export_graph, import_collection};
use ontomap::registry::TypeRegistry;
use ontomap::util::TripleCollection;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ontomap")]
#[command(about = "Schema compiler and triple-to-object mapper")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compile schema documents into a type registry
    Compile {
        /// Schema documents to compile; multiple documents are unioned
        #[clap(required = true)]
        schemas: Vec<PathBuf>,
        /// Write the compiled registry to this file as JSON
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Write the class hierarchy to this file in GraphViz dot format
        #[clap(long)]
        dot: Option<PathBuf>,
        /// Print every compiled class with its parents and properties
        #[clap(long, action)]
        dump: bool,
    },
    /// Pretty-print a previously compiled registry
    Inspect {
        /// The registry JSON file to inspect
        registry: PathBuf,
    },
    /// Import a data document through the object model and export it again
    Convert {
        /// Schema documents to compile; multiple documents are unioned
        #[clap(long, short, num_args = 1.., required = true)]
        schema: Vec<PathBuf>,
        /// The data document to import
        input: PathBuf,
        /// Where to write the exported data
        output: PathBuf,
        /// Log and skip unmodellable triples instead of failing
        #[clap(long, action)]
        lenient: bool,
    },
    /// Prints the version of the ontomap binary
    Version,
}

fn compile_schemas(schemas: &[PathBuf]) -> Result<TypeRegistry> {
    let mut union = TripleCollection::new();
    for path in schemas {
        info!("Loading schema document {}", path.display());
        let collection = TripleCollection::read_file(path)?;
        union.extend(&collection);
    }
    TypeRegistry::compile(&union)
}

fn main() -> Result<()> {
    let cmd = Cli::parse();

    let log_level = if cmd.verbose { "info" } else { "warn" };
    let log_level = if cmd.debug { "debug" } else { log_level };
    std::env::set_var("RUST_LOG", log_level);
    ontomap::init_logging();
    env_logger::init();

    match cmd.command {
        Commands::Compile {
            schemas,
            output,
            dot,
            dump,
        } => {
            let registry = compile_schemas(&schemas)?;
            println!(
                "Compiled {} classes and {} properties",
                registry.num_classes(),
                registry.num_properties()
            );
            if dump {
                registry.dump();
            }
            if let Some(path) = dot {
                let mut file = std::fs::File::create(&path)?;
                file.write_all(registry.hierarchy_to_dot().as_bytes())?;
                println!("Wrote class hierarchy to {}", path.display());
            }
            if let Some(path) = output {
                registry.save_to_file(&path)?;
                println!("Wrote registry to {}", path.display());
            }
        }
        Commands::Inspect { registry } => {
            let registry = TypeRegistry::from_file(&registry)?;
            println!(
                "Compiled at {} : {} classes, {} properties",
                registry.compiled_at,
                registry.num_classes(),
                registry.num_properties()
            );
            registry.dump();
        }
        Commands::Convert {
            schema,
            input,
            output,
            lenient,
        } => {
            let registry = compile_schemas(&schema)?;
            let collection = TripleCollection::read_file(&input)?;
            let graph = import_collection(&collection, &registry, (!lenient).into())?;
            println!("Imported {} entities", graph.len());
            let exported = export_graph(&graph, &registry)?;
            exported.write_file(&output)?;
            println!(
                "Wrote {} triples to {}",
                exported.len(),
                output.display()
            );
        }
        Commands::Version => {
            println!("ontomap {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}
