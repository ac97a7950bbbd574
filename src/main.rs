use clap::{Parser, Subcommand, ValueEnum};
use json_schema_struct::{
    CatalogSource, CollisionPolicy, ConverterOptions, RenderOptions, SchemaConverter, SchemaSource,
    StructDescription, StructSchemaConverter, StructSchemaOptions, generate_workflow_types,
    render_definitions, render_workflow,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "json-schema-struct", version)]
#[command(about = "Convert between JSON Schema and typed Rust structs", long_about = None)]
struct Cli {
    /// Log conversion steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate Rust types from a JSON Schema
    Generate {
        /// Input JSON Schema file (use '-' for stdin)
        #[arg(value_name = "INPUT")]
        input: String,

        /// Name of the root type
        #[arg(short, long, value_name = "NAME", default_value = "Input")]
        type_name: String,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "rust")]
        format: Format,

        /// Start the output with the serde import
        #[arg(long)]
        imports: bool,

        /// Fail when two different schemas synthesize the same type name
        #[arg(long)]
        strict_names: bool,

        #[arg(long, value_name = "N", default_value_t = json_schema_struct::converter::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Generate a closed JSON Schema from a struct description
    Schema {
        /// Struct description file in JSON (use '-' for stdin)
        #[arg(value_name = "DESCRIPTION")]
        input: String,

        /// Allow map fields, emitted as additionalProperties schemas
        #[arg(long)]
        allow_maps: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate input and output types for workflows in a schema catalog
    Workflow {
        /// Workflow to generate
        #[arg(value_name = "NAME", required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,

        /// Generate every workflow in the catalog
        #[arg(long)]
        all: bool,

        /// JSON catalog of workflow schemas
        #[arg(long, value_name = "FILE", env = "SCHEMA_CATALOG")]
        catalog: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Rust source
    Rust,
    /// The type definitions as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            input,
            type_name,
            output,
            format,
            imports,
            strict_names,
            max_depth,
        } => {
            let options = ConverterOptions {
                max_depth,
                collisions: if strict_names {
                    CollisionPolicy::Strict
                } else {
                    CollisionPolicy::Reuse
                },
            };
            let definitions =
                SchemaConverter::with_options(options).convert_str(&read_input(&input)?, &type_name)?;

            let rendered = match format {
                Format::Rust => render_definitions(&definitions, &RenderOptions { imports }),
                Format::Json => serde_json::to_string_pretty(&definitions)?,
            };
            write_output(output, &rendered)?;
        }
        Command::Schema {
            input,
            allow_maps,
            output,
        } => {
            let description: StructDescription = serde_json::from_str(&read_input(&input)?)?;
            let converter = StructSchemaConverter::with_options(StructSchemaOptions {
                allow_maps,
                ..Default::default()
            });
            let schema = converter.convert(&description)?;
            write_output(output, &serde_json::to_string_pretty(&schema)?)?;
        }
        Command::Workflow {
            name,
            all,
            catalog,
            output,
        } => {
            let source = CatalogSource::from_path(&catalog)?;
            let names = match name {
                Some(name) if !all => vec![name],
                _ => source.workflow_names()?,
            };
            info!(count = names.len(), "generating workflows");

            let options = ConverterOptions::default();
            let mut modules = Vec::with_capacity(names.len());
            let mut failures = 0;
            for name in &names {
                match generate_workflow_types(&source, name, &options) {
                    Ok(types) => modules.push(render_workflow(&types)),
                    Err(e) => {
                        error!(workflow = %name, "{e}");
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                return Err(format!("{failures} of {} workflows failed", names.len()).into());
            }
            write_output(output, &modules.join("\n\n"))?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(input)
    }
}

fn write_output(output: Option<PathBuf>, content: &str) -> io::Result<()> {
    if let Some(output_path) = output {
        debug!(path = %output_path.display(), "writing output");
        fs::write(output_path, content)
    } else {
        println!("{}", content);
        Ok(())
    }
}
