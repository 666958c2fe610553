// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, info, warn};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use voicely::app_config::{Config, LogLevel};
use voicely::artifact_store::{ArtifactStore, FsArtifactStore};
use voicely::errors::ErrorPayload;
use voicely::file_utils::FileManager;
use voicely::pipeline::{PipelineOrchestrator, PipelineOutcome, PipelineRequest};
use voicely::providers::google_tts::GoogleSpeech;
use voicely::speech::{SpeechError, SpeechRequest, SpeechSynthesizer};
use voicely::translation::{TranslationGateway, TranslationRequest};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, translate and store an artifact for a file or every file in a directory
    Process(ProcessArgs),

    /// Translate a piece of text directly
    Translate(TranslateArgs),

    /// Download a stored artifact
    Fetch(FetchArgs),

    /// Synthesize speech from text
    Speak(SpeakArgs),

    /// List the available text-to-speech voices by language
    Voices {
        /// Only show languages whose code starts with this prefix (e.g., 'en', 'tr-TR')
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Generate shell completions for voicely
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Input document, audio file or directory
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Target language code (e.g., 'en', 'es', 'tr'); defaults to the configured one
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output kind: txt, srt, vtt, pdf or docx
    #[arg(short, long, default_value = "txt")]
    output: String,

    /// Also download each artifact into this directory
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Files processed at once when the input is a directory
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    /// Target language code
    #[arg(short, long)]
    target_language: Option<String>,

    /// Source language code; detected by the provider when omitted
    #[arg(short, long)]
    source_language: Option<String>,

    /// Use only this provider (deepl, google, libre)
    #[arg(short, long)]
    provider: Option<String>,
}

#[derive(Parser, Debug)]
struct FetchArgs {
    /// Artifact id returned by `process`
    #[arg(value_name = "ID")]
    id: String,

    /// Artifact extension (txt, srt, vtt, pdf, docx)
    #[arg(value_name = "EXT")]
    extension: String,

    /// Write to this path instead of stdout
    #[arg(short = 'O', long)]
    output_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SpeakArgs {
    /// Text to speak
    #[arg(value_name = "TEXT")]
    text: String,

    /// Language code (e.g., 'en-US', 'tr-TR')
    #[arg(short, long, default_value = "en-US")]
    language: String,

    /// Voice name; picked from the language when omitted
    #[arg(short, long)]
    voice: Option<String>,

    /// Speaking rate, 0.25 to 4.0
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Pitch in semitones, -20 to 20
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f64,

    /// Write decoded audio to this path instead of printing JSON
    #[arg(short = 'O', long)]
    output_path: Option<PathBuf>,
}

/// Voicely - document and voice translation
///
/// Extracts text from documents and recordings, translates it through DeepL,
/// Google or LibreTranslate with automatic fallback, and stores the result as
/// a plain report or a timed subtitle track.
#[derive(Parser, Debug)]
#[command(name = "voicely")]
#[command(author = "Voicely Team")]
#[command(version = "1.0.0")]
#[command(about = "Document and voice translation pipeline")]
#[command(long_about = "Voicely extracts text from documents and audio, translates it and stores the result.

EXAMPLES:
    voicely process report.pdf -t tr                 # Translate a PDF into Turkish
    voicely process interview.wav -t de -o srt       # Subtitle track for a recording
    voicely process ./inbox -t fr -d ./out           # Process a directory, save artifacts
    voicely translate \"Good morning\" -t es -p deepl  # Translate text with one provider
    voicely fetch <ID> srt -O interview.srt          # Download a stored artifact
    voicely speak \"Merhaba\" -l tr-TR -O hello.mp3    # Text to speech
    voicely voices -l tr                             # Voices available for Turkish
    voicely completions bash > voicely.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Empty API keys are read from DEEPL_API_KEY,
    GOOGLE_API_KEY, LIBRETRANSLATE_API_KEY and GOOGLE_TTS_API_KEY.

SUPPORTED PROVIDERS:
    deepl  - DeepL API (requires API key)
    google - Google Cloud Translation v2 (requires API key)
    libre  - LibreTranslate (API key optional)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself passes everything; `set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "voicely", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;

    match cli.command {
        Commands::Process(args) => run_process(&config, args).await,
        Commands::Translate(args) => run_translate(&config, args).await,
        Commands::Fetch(args) => run_fetch(&config, args).await,
        Commands::Speak(args) => run_speak(&config, args).await,
        Commands::Voices { language } => run_voices(&config, language).await,
        Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}

// @loads: Config file, env overrides, CLI log level; validates once
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;
    config.apply_env_overrides();

    if let Some(level) = log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;
    debug!("Loaded configuration from {}", config_path);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn fail(payload: ErrorPayload) -> Result<ExitCode> {
    error!("{}: {}", payload.kind, payload.message);
    print_json(&payload)?;
    Ok(ExitCode::FAILURE)
}

async fn run_process(config: &Config, args: ProcessArgs) -> Result<ExitCode> {
    let orchestrator = PipelineOrchestrator::from_config(config).context("Failed to build the pipeline")?;
    let target_language = args
        .target_language
        .clone()
        .unwrap_or_else(|| config.default_target_language.clone());

    if args.input_path.is_file() {
        return match process_file(&orchestrator, &args.input_path, &target_language, &args).await {
            Ok(outcome) => {
                print_json(&outcome)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(payload) => fail(payload),
        };
    }

    if !args.input_path.is_dir() {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    let files = FileManager::find_uploadable_files(&args.input_path)?;
    if files.is_empty() {
        warn!("No supported files found in {:?}", args.input_path);
        return Ok(ExitCode::SUCCESS);
    }
    info!("Processing {} files from {:?}", files.len(), args.input_path);

    let progress_bar = ProgressBar::new(files.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("=>-"));

    let results: Vec<(PathBuf, Result<PipelineOutcome, ErrorPayload>)> = stream::iter(files)
        .map(|path| {
            let orchestrator = &orchestrator;
            let target_language = target_language.as_str();
            let args = &args;
            let progress_bar = &progress_bar;
            async move {
                let result = process_file(orchestrator, &path, target_language, args).await;
                progress_bar.inc(1);
                (path, result)
            }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect()
        .await;
    progress_bar.finish_with_message("done");

    let mut failures = 0;
    let mut outcomes = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(payload) => {
                failures += 1;
                error!("{:?}: {}: {}", path, payload.kind, payload.message);
            }
        }
    }

    print_json(&outcomes)?;
    info!("Finished: {} succeeded, {} failed", outcomes.len(), failures);

    Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn process_file(
    orchestrator: &PipelineOrchestrator,
    path: &Path,
    target_language: &str,
    args: &ProcessArgs,
) -> Result<PipelineOutcome, ErrorPayload> {
    let io_failure = |e: std::io::Error| ErrorPayload {
        kind: "PersistenceFailed".to_string(),
        message: format!("{}: {}", path.display(), e),
    };

    let bytes = tokio::fs::read(path).await.map_err(io_failure)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let request = PipelineRequest::new(file_name, bytes, target_language, args.output.as_str());
    let outcome = orchestrator.submit(request).await.map_err(|e| ErrorPayload::from(&e))?;

    if let Some(output_dir) = &args.output_dir {
        let artifact = orchestrator
            .retrieve(&outcome.artifact_id.to_string(), outcome.artifact_extension())
            .await
            .map_err(|e| ErrorPayload::from(&e))?;
        let output_path =
            FileManager::generate_output_path(path, output_dir, target_language, outcome.artifact_extension());
        FileManager::write_to_file(&output_path, &artifact.bytes).map_err(|e| ErrorPayload {
            kind: "PersistenceFailed".to_string(),
            message: format!("{:#}", e),
        })?;
        info!("Saved {:?}", output_path);
    }

    Ok(outcome)
}

async fn run_translate(config: &Config, args: TranslateArgs) -> Result<ExitCode> {
    let gateway = TranslationGateway::from_config(&config.translation)?;

    let mut request = TranslationRequest::new(
        args.text,
        args.target_language
            .unwrap_or_else(|| config.default_target_language.clone()),
    );
    if let Some(source) = args.source_language {
        request = request.with_source(source);
    }
    if let Some(provider) = args.provider {
        request = request.with_provider(provider);
    }

    match gateway.translate(&request).await {
        Ok(result) => {
            print_json(&result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => fail(ErrorPayload::from(&e)),
    }
}

async fn run_fetch(config: &Config, args: FetchArgs) -> Result<ExitCode> {
    let store = FsArtifactStore::new(config.pipeline.artifact_dir.clone());

    let artifact = match store.get(&args.id, &args.extension).await {
        Ok(artifact) => artifact,
        Err(e) => return fail(ErrorPayload::from(&e)),
    };
    debug!("Fetched {} bytes ({})", artifact.bytes.len(), artifact.content_type);

    match args.output_path {
        Some(path) => {
            FileManager::write_to_file(&path, &artifact.bytes)?;
            info!("Saved {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(&artifact.bytes)?;
            stdout.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn speech_client(config: &Config) -> Result<GoogleSpeech> {
    if config.speech.api_key.trim().is_empty() {
        return Err(anyhow!("No text-to-speech API key configured (set GOOGLE_TTS_API_KEY)"));
    }
    Ok(GoogleSpeech::new(
        config.speech.api_key.clone(),
        config.speech.endpoint.clone(),
        Duration::from_secs(config.speech.timeout_secs),
    ))
}

async fn run_speak(config: &Config, args: SpeakArgs) -> Result<ExitCode> {
    let synthesizer = speech_client(config)?;

    let mut request = SpeechRequest::new(args.text)
        .language(args.language)
        .speaking_rate(args.rate)
        .pitch(args.pitch);
    if let Some(voice) = args.voice {
        request = request.voice(voice);
    }

    let result = match request.resolve(config.translation.max_text_units) {
        Ok(resolved) => synthesizer.synthesize(&resolved).await,
        Err(e) => Err(e),
    };

    let result = match result {
        Ok(result) => result,
        Err(e) => return fail(speech_payload(&e)),
    };

    match args.output_path {
        Some(path) => {
            let audio = BASE64_STANDARD
                .decode(result.audio_base64.as_bytes())
                .context("Speech provider returned invalid base64 audio")?;
            FileManager::write_to_file(&path, &audio)?;
            info!("Saved {} bytes of {} audio to {:?}", audio.len(), result.audio_encoding, path);
        }
        None => print_json(&result)?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_voices(config: &Config, language: Option<String>) -> Result<ExitCode> {
    let synthesizer = speech_client(config)?;

    let mut voices = match synthesizer.list_voices().await {
        Ok(voices) => voices,
        Err(e) => return fail(speech_payload(&e)),
    };
    if let Some(prefix) = language {
        let prefix = prefix.to_lowercase();
        voices.retain(|code, _| code.to_lowercase().starts_with(&prefix));
    }

    info!("{} languages with voices", voices.len());
    print_json(&voices)?;
    Ok(ExitCode::SUCCESS)
}

fn speech_payload(error: &SpeechError) -> ErrorPayload {
    let kind = match error {
        SpeechError::EmptyText => "InvalidInput",
        SpeechError::InputTooLong { .. } => "InputTooLong",
        SpeechError::Provider(_) | SpeechError::NoAudioContent => "ProviderError",
    };
    ErrorPayload {
        kind: kind.to_string(),
        message: error.to_string(),
    }
}
