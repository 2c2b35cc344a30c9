use clap::Parser;
use tracing_subscriber::EnvFilter;

use tenders_api::cli::{utils, Cli, OutputFormat};
use tenders_api::services::ServiceError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tenders_api=warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = tenders_api::cli::run(cli).await {
        let code = e.downcast_ref::<ServiceError>().map(ServiceError::code);
        match (&output_format, std::env::var("TENDERS_VERBOSE").as_deref()) {
            (OutputFormat::Json, _) => utils::output_error(&output_format, &e.to_string(), code)?,
            (_, Ok("true")) | (_, Ok("1")) => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
