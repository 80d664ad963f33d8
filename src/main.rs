use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use interview_coach::cli::Cli;
use interview_coach::config::AppConfig;
use interview_coach::interview::InterviewEngine;
use interview_coach::llm::create_provider;
use interview_coach::store::{FileSessionStore, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        eprintln!("  (or INTERVIEW_COACH_BACKEND=anthropic with ANTHROPIC_API_KEY)");
        std::process::exit(1);
    });

    // Initialize tracing: stderr always, JSON debug file when a log dir is set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let (file_layer, _guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::never(dir, "interview-coach.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    eprintln!("🎤 Interview Coach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {} ({})", config.llm.backend, config.llm.model);
    eprintln!("   Sessions: {}\n", config.sessions_dir.display());

    let llm = create_provider(&config.llm).context("creating LLM provider")?;

    let file_store = FileSessionStore::new(config.sessions_dir.clone());
    file_store
        .ensure_dir()
        .await
        .with_context(|| format!("creating {}", config.sessions_dir.display()))?;
    let store: Arc<dyn SessionStore> = Arc::new(file_store);

    let engine = InterviewEngine::new(llm, Arc::clone(&store));
    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let mut cli = Cli::new(engine, store, reader);
    cli.run().await?;

    Ok(())
}
