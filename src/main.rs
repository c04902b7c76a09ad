#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(
    name = "jsonschema2form",
    about = "Convert a JSON Schema into form field descriptors"
)]
struct Cli {
    /// Path to the JSON Schema input
    #[arg(value_name = "JSONSCHEMA")]
    input: std::path::PathBuf,

    /// Path to the JSON output file (stdout when omitted)
    #[arg(value_name = "OUTPUT")]
    output: Option<std::path::PathBuf>,

    /// Only convert these root properties
    #[arg(long, value_name = "NAME")]
    include: Vec<String>,

    /// Skip these root properties
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Deepest nesting of properties and references
    #[arg(long, default_value_t = 32)]
    max_depth: usize,

    /// Log each converted property
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[cfg(feature = "cli")]
fn main() {
    use jsonschema_forms::{ConversionOptions, SchemaConverter};
    use tracing_subscriber::filter::LevelFilter;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        })
        .init();

    let mut options = ConversionOptions::new()
        .exclude(cli.exclude)
        .max_depth(cli.max_depth);
    if !cli.include.is_empty() {
        options = options.include(cli.include);
    }

    let converter = SchemaConverter::new(options);
    let result = converter
        .convert_schema_file(&cli.input)
        .and_then(|fields| Ok(serde_json::to_string_pretty(&fields)?));

    let rendered = match result {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                eprintln!("Error: failed to write {}: {e}", path.display());
                std::process::exit(1);
            }
            tracing::info!(output = %path.display(), "wrote field descriptors");
        }
        None => println!("{rendered}"),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary is only available with the `cli` feature enabled.");
    std::process::exit(1);
}
