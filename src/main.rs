use anyhow::Result;
use clap::{Arg, Command};
use tracing::{error, info, warn};

use keyconcepts::config::Config;
use keyconcepts::pipeline::VideoAnalyzer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("keyconcepts=info,warn")
        .init();

    let matches = Command::new("Key Concepts Analyzer")
        .version("0.1.0")
        .about("Extract key concepts from YouTube video transcripts with an LLM")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("YouTube video URL to analyze"),
        )
        .arg(
            Arg::new("sample-size")
                .short('s')
                .long("sample-size")
                .value_name("NUM")
                .help("Number of document groups (0 = adaptive)")
                .default_value("0"),
        )
        .arg(
            Arg::new("summarize")
                .long("summarize")
                .help("Also generate a transcript summary")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log per-group cost and billable-character details")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file"),
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Run the HTTP API server instead of a one-shot analysis")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("API server port"),
        )
        .get_matches();

    // Load configuration; an explicit --config path must exist and parse.
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    let sample_size: usize = matches.get_one::<String>("sample-size").unwrap().parse()?;
    config.extraction.sample_size = sample_size;
    if matches.get_flag("verbose") {
        config.extraction.verbose = true;
    }
    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }

    config.validate()?;
    info!("{}", config.summary());

    if matches.get_flag("serve") {
        return serve(config).await;
    }

    let url = match matches.get_one::<String>("url") {
        Some(url) => url.clone(),
        None => {
            error!("Either --url or --serve is required");
            return Err(anyhow::anyhow!("no video URL provided"));
        }
    };

    run_analysis(&config, &url, sample_size, matches.get_flag("summarize")).await
}

/// One-shot CLI flow: retrieve, extract, print, optionally summarize.
async fn run_analysis(config: &Config, url: &str, sample_size: usize, summarize: bool) -> Result<()> {
    let analyzer = VideoAnalyzer::from_config(config)?;

    info!("🚀 Analyzing video: {}", url);
    let start_time = std::time::Instant::now();

    let documents = analyzer.retrieve_documents(url).await?;
    if documents.is_empty() {
        error!("No transcript content could be retrieved for {}", url);
        return Err(anyhow::anyhow!("no transcript content available"));
    }
    info!("📄 Retrieved {} transcript chunks", documents.len());

    let outcome = analyzer.find_key_concepts(&documents, sample_size).await;
    if outcome.concepts.is_empty() {
        error!("No key concepts could be extracted from {}", url);
        return Err(anyhow::anyhow!("no key concepts extracted"));
    }

    println!("{}", serde_json::to_string_pretty(&outcome.concepts)?);

    let duration = start_time.elapsed();
    info!("🎉 Analysis completed in {:.2}s", duration.as_secs_f64());
    info!(
        "✅ Groups extracted: {} ({} dropped)",
        outcome.concepts.len(),
        outcome.dropped_groups
    );
    info!("💰 Estimated cost: ${:.6}", outcome.estimated_cost);

    if summarize {
        match analyzer.summarize(&documents).await {
            Some(summary) => println!("\n--- Summary ---\n{}", summary),
            None => warn!("Summary generation failed"),
        }
    }

    Ok(())
}

#[cfg(feature = "api")]
async fn serve(config: Config) -> Result<()> {
    use keyconcepts::api::ApiServer;
    use std::sync::Arc;

    let analyzer = Arc::new(VideoAnalyzer::from_config(&config)?);
    ApiServer::new(analyzer, &config).start().await
}

#[cfg(not(feature = "api"))]
async fn serve(_config: Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "this build does not include the API server; rebuild with --features api"
    ))
}
