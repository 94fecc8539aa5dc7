use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellspoken::config::AppConfig;
use wellspoken::conversation::{run_text_mode, ConversationLoop};
use wellspoken::db::Database;
use wellspoken::llm::{ChatEngine, ChatHistory};
use wellspoken::speech::SpeechService;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellspoken=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wellspoken voice assistant");

    let config = AppConfig::from_env()?;
    config.validate()?;

    let db = Database::open(&config.database_path)?;
    db.setup()?;

    let mut engine = ChatEngine::new(config.llm.clone(), db)?;

    // Voice is the primary interface; fall back to typed input when the
    // audio stack cannot come up (no devices, missing speech models)
    match SpeechService::new(config.stt.clone(), config.tts.clone()) {
        Ok(speech) => {
            let mut conversation = ConversationLoop::new(speech, engine);
            conversation.run()?;
        }
        Err(e) => {
            warn!(
                "Speech service unavailable ({}), falling back to text input",
                e
            );
            let mut history = ChatHistory::new();
            let stdin = std::io::stdin();
            run_text_mode(&mut engine, &mut history, stdin.lock(), std::io::stdout())?;
        }
    }

    info!("Wellspoken exiting");
    Ok(())
}
