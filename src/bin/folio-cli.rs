use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use url::Url;

use folio_site::config::LazyLoadConfig;
use folio_site::contact::{ContactClient, RawSubmission};
use folio_site::lazy::{EventBus, ImageEvent, LazyLoader, PlatformCapabilities};
use folio_site::page::{Document, Element};

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(about = "Tools for the portfolio site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one contact form submission
    Submit {
        #[arg(long, default_value = "http://localhost:8080/contact")]
        endpoint: Url,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        message: String,
    },
    /// Preload image sources with the lazy loader's retry policy
    Preload {
        #[arg(long, default_value = "http://localhost:8080/")]
        base_url: String,
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
        #[arg(long, default_value_t = 1000)]
        retry_base_ms: u64,
        /// Image sources, absolute or relative to the base URL
        #[arg(required = true)]
        sources: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Submit {
            endpoint,
            name,
            email,
            project,
            message,
        } => submit(endpoint, RawSubmission { name, email, project, message }).await,
        Commands::Preload {
            base_url,
            max_retries,
            retry_base_ms,
            sources,
        } => {
            let config = LazyLoadConfig {
                base_url,
                max_retries,
                retry_base_ms,
                ..Default::default()
            };
            preload(config, sources).await
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

async fn submit(endpoint: Url, fields: RawSubmission) -> Result<bool, Box<dyn std::error::Error>> {
    let client = ContactClient::new(endpoint)
        .on_success(|response| println!("{}", response.message))
        .on_error(|response| eprintln!("{}", response.error_summary()));

    let response = client.submit("cli", &fields).await;
    Ok(response.is_some_and(|r| r.success))
}

async fn preload(config: LazyLoadConfig, sources: Vec<String>) -> Result<bool, Box<dyn std::error::Error>> {
    let sources: Vec<String> = sources.into_iter().filter(|s| !s.trim().is_empty()).collect();
    let document = Document::new();
    for source in &sources {
        let img = Element::new("img").with_class("lazy-image").with_attr("data-src", source);
        document.append_child(document.body(), img);
    }

    let bus = EventBus::new();
    let mut events = bus.subscribe();
    let _loader = LazyLoader::builder(document)
        .config(config)
        .capabilities(PlatformCapabilities::eager())
        .events(Arc::new(bus))
        .build()?;

    let mut all_ok = true;
    for _ in 0..sources.len() {
        match events.recv().await? {
            ImageEvent::Loaded { source, .. } => println!("ok     {source}"),
            ImageEvent::Error { source, cause, .. } => {
                all_ok = false;
                println!("failed {source}: {cause}");
            }
        }
    }
    Ok(all_ok)
}
