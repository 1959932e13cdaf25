use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nova_gateway::db::{self, CatalogRepo, MessageRole, OrderRepo, PolicyRepo, SessionRepo};
use nova_gateway::voice::{AudioCapture, AudioPlayback, TextToSpeech};
use nova_gateway::{Config, Daemon, Ingestor, SupportAgent, ToolExecutor, AGENT_NAME};

/// Nova - voice-driven customer support gateway
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Port for the HTTP API server
    #[arg(long, env = "NOVA_API_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for headless servers without audio hardware)
    #[arg(long, env = "NOVA_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the support database from the configured source files
    Ingest,
    /// Chat with the agent on the terminal (no audio)
    Chat,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,nova_gateway=info",
        1 => "info,nova_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Ingest => cmd_ingest(),
            Command::Chat => cmd_chat().await,
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&text).await,
        };
    }

    tracing::info!(
        port = ?cli.port,
        disable_voice = cli.disable_voice,
        "starting nova gateway"
    );

    // Load configuration
    let mut config = Config::load_with_options(cli.disable_voice)?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    let voice_enabled = config.voice.enabled;

    // Create and run daemon
    let daemon = Daemon::new(config).await?;

    if voice_enabled {
        tracing::info!("nova gateway ready - just start talking");
    } else {
        tracing::info!("nova gateway ready (API-only mode, voice disabled)");
    }

    // Run until interrupted
    daemon.run().await?;

    Ok(())
}

/// Load the support database from the configured source files
fn cmd_ingest() -> anyhow::Result<()> {
    let config = Config::load()?;
    let pool = db::init(config.db_path())?;

    let ingestor = Ingestor::new(
        CatalogRepo::new(pool.clone()),
        OrderRepo::new(pool.clone()),
        PolicyRepo::new(pool),
    );

    let summary = ingestor.run(&config.catalog)?;

    println!("Ingest complete:");
    println!("  products:     {}", summary.products);
    println!("  orders:       {}", summary.orders);
    println!("  FAQs:         {}", summary.faqs);
    println!("  policy pages: {}", summary.policy_pages);

    Ok(())
}

/// Interactive text chat against the agent
async fn cmd_chat() -> anyhow::Result<()> {
    let config = Config::load()?;
    let pool = db::init(config.db_path())?;

    let api_key = config
        .api_keys
        .openai
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY required for chat"))?;

    let client = nova_gateway::ChatClient::new(config.llm.base_url.clone(), api_key)?;
    let executor = ToolExecutor::new(
        CatalogRepo::new(pool.clone()),
        OrderRepo::new(pool.clone()),
        PolicyRepo::new(pool.clone()),
    );
    let agent = Arc::new(SupportAgent::new(
        client,
        executor,
        config.llm.model.clone(),
        config.llm.max_tokens,
    ));

    let session_repo = SessionRepo::new(pool);
    let session = session_repo.find_or_create("cli", "repl")?;

    println!("Chat with {AGENT_NAME} (type 'quit' to exit)\n");

    let stdin = std::io::stdin();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let history = session_repo.get_messages(&session.id, 20)?;
        let reply = agent.respond(&history, line).await;

        session_repo.add_message(&session.id, MessageRole::User, line)?;
        session_repo.add_message(&session.id, MessageRole::Assistant, &reply)?;

        println!("{AGENT_NAME}: {reply}");
    }

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Clear buffer each second
        capture.clear_buffer();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");
    println!("  4. Try: pavucontrol (to check levels)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    // Generate 2 seconds of 440Hz sine wave at 24kHz sample rate
    let sample_rate = 24000_i32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    playback.play(samples).await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}

/// Test TTS output
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let tts = TextToSpeech::from_config(&config.voice, &config.api_keys)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    // Check MP3 header
    if mp3_data.len() > 3 {
        println!(
            "First 4 bytes: {:02x} {:02x} {:02x} {:02x}",
            mp3_data[0], mp3_data[1], mp3_data[2], mp3_data[3]
        );
    }

    println!("Playing audio...");
    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3_data).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
