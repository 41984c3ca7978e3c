use translate_relay::config::{self, RelayConfig};
use translate_relay::console::ConsoleHub;
use translate_relay::delivery::create_sender;
use translate_relay::relay::RelayPipeline;
use translate_relay::server::relay_routes;
use translate_relay::translate::create_translator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Outside production, pick up a local .env file
    if !config::is_production() {
        let _ = dotenv::dotenv();
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  required: SMS_SENDER, SMS_API_KEY, SMS_API_SECRET,");
        eprintln!("            TRANSLATOR_USERNAME, TRANSLATOR_PASSWORD");
        std::process::exit(1);
    });

    eprintln!("📨 Translate Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Operator language: {}", config.operator_lang);
    eprintln!("   SMS sender: {}", config.sms_sender);
    eprintln!("   Console WS: ws://0.0.0.0:{}/ws", config.port);
    eprintln!("   Inbound webhook: http://0.0.0.0:{}/inbound\n", config.port);

    let translator = create_translator(&config);
    let sms = create_sender(&config);
    let hub = ConsoleHub::new();
    let pipeline = RelayPipeline::new(translator, sms, hub, config.operator_lang.clone());

    let app = relay_routes(pipeline);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}
