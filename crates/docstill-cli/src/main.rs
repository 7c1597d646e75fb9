//! Docstill CLI - extract structured data from documents via Gemini.

use clap::Parser;
use docstill_cli::{mime_type_for, Cli, CliError, Formatter};
use docstill_extractor::{ExtractionRequest, Extractor, ExtractorConfig};
use docstill_llm::GeminiProvider;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> docstill_cli::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let document = std::fs::read(&cli.file)?;
    if document.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} is empty",
            cli.file.display()
        )));
    }
    let mime_type = mime_type_for(&cli.file);

    let config = ExtractorConfig::default();
    let mut options = config.defaults.clone();
    options.include_confidence = !cli.no_confidence;
    options.include_positions = cli.positions;
    options.detect_document_type = !cli.no_detect;
    if let Some(temperature) = cli.temperature {
        options.temperature = temperature;
    }

    let provider = match &cli.endpoint {
        Some(endpoint) => GeminiProvider::with_endpoint(endpoint, &cli.api_key, &cli.model),
        None => GeminiProvider::new(&cli.api_key, &cli.model),
    };

    let extractor = Extractor::new(provider, config).with_model_id(&cli.model);
    let request = ExtractionRequest::new(document, mime_type, &cli.instruction)
        .with_options(options);

    let outcome = extractor.extract(request).await?;

    let formatter = Formatter::new(cli.format);
    println!("{}", formatter.format_outcome(&outcome)?);

    Ok(())
}
