use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use mood_pipelines::config::{Settings, DEFAULT_SECRETS_FILE};
use mood_pipelines::mood::{MoodSession, PromptComposer, SessionInput, DEFAULT_PROMPT};
use mood_pipelines::sentiment::{InferenceApiClassifier, SentimentChoice, SentimentResolver};
use mood_pipelines::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};

const MAX_LENGTH_STEP: usize = 25;

#[derive(Parser, Debug)]
#[command(name = "moodgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect the mood of a prompt and generate text that matches it")]
struct Args {
    /// Topic or seed sentence. Use `-` to read it from stdin
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Sentiment to steer towards: auto, positive, negative or neutral
    #[arg(short, long, default_value = "auto", value_parser = parse_choice)]
    sentiment: SentimentChoice,

    /// Maximum output length in tokens (prompt included), 50 to 300 in steps of 25
    #[arg(long, default_value_t = 150, value_parser = parse_max_length)]
    max_length: usize,

    /// Number of sequences to sample; the first one is shown
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    num_sequences: u16,

    /// Sampler seed (defaults to the `seed` setting)
    #[arg(long)]
    seed: Option<u64>,

    /// Generation model, e.g. qwen3-0.6b (defaults to the `model` setting)
    #[arg(long)]
    model: Option<String>,

    /// Run the model on this CUDA device instead of the CPU
    #[arg(long, value_name = "INDEX")]
    cuda: Option<usize>,

    /// Settings file holding the API key and defaults
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SECRETS_FILE)]
    config: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_choice(value: &str) -> std::result::Result<SentimentChoice, String> {
    value.parse().map_err(|e: mood_pipelines::error::PipelineError| e.to_string())
}

fn parse_max_length(value: &str) -> std::result::Result<usize, String> {
    let length: usize = value.parse().map_err(|e| format!("{e}"))?;
    if !(50..=300).contains(&length) || length % MAX_LENGTH_STEP != 0 {
        return Err(format!(
            "must be between 50 and 300 in steps of {MAX_LENGTH_STEP}"
        ));
    }
    Ok(length)
}

/// Collect and validate the session input before any model is loaded.
fn session_input(args: &Args, mut stdin: impl Read) -> Result<SessionInput> {
    let prompt = if args.prompt == "-" {
        let mut buf = String::new();
        stdin
            .read_to_string(&mut buf)
            .context("Failed to read prompt from stdin")?;
        buf.trim_end_matches(['\r', '\n']).to_string()
    } else {
        args.prompt.clone()
    };

    let input = SessionInput {
        prompt,
        choice: args.sentiment,
        max_length: args.max_length,
        sample_count: usize::from(args.num_sequences),
    };
    input.validate()?;
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    let input = session_input(&args, std::io::stdin().lock())?;
    let settings = Settings::load(&args.config)?;

    let model: Qwen3Size = args.model.as_deref().unwrap_or(&settings.model).parse()?;
    let seed = args.seed.unwrap_or(settings.seed);

    let resolver = SentimentResolver::new(
        InferenceApiClassifier::from_settings(&settings)?,
        settings.api_key().map(str::to_owned),
    )
    .confidence_floor(settings.confidence_floor);

    let mut builder = TextGenerationPipelineBuilder::qwen3(model).seed(seed);
    if let Some(index) = args.cuda {
        builder = builder.cuda(index);
    }

    let pipeline = builder.build().await?;
    let composer = PromptComposer::new(pipeline).temperature(settings.temperature);
    let session = MoodSession::new(resolver, composer);

    let report = session.run(&input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mood_pipelines::mood::EMPTY_PROMPT_MESSAGE;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn max_length_follows_slider_steps() {
        assert_eq!(parse_max_length("175"), Ok(175));
        assert!(parse_max_length("160").is_err());
        assert!(parse_max_length("25").is_err());
        assert!(parse_max_length("325").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["moodgen"]).unwrap();
        assert_eq!(args.prompt, DEFAULT_PROMPT);
        assert_eq!(args.sentiment, SentimentChoice::AutoDetect);
        assert_eq!(args.max_length, 150);
        assert_eq!(args.num_sequences, 1);
    }

    #[test]
    fn stdin_prompt_drops_line_terminator() {
        let args = Args::try_parse_from(["moodgen", "--prompt", "-"]).unwrap();
        let input = session_input(&args, "Tell me about cats.\r\n".as_bytes()).unwrap();
        assert_eq!(input.prompt, "Tell me about cats.");
    }

    #[test]
    fn empty_prompt_rejected_before_loading() {
        let args = Args::try_parse_from(["moodgen", "--prompt", ""]).unwrap();
        let err = session_input(&args, std::io::empty()).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_PROMPT_MESSAGE);

        let args = Args::try_parse_from(["moodgen", "--prompt", "-"]).unwrap();
        assert!(session_input(&args, "\n".as_bytes()).is_err());
    }

    #[test]
    fn rejects_zero_sequences() {
        assert!(Args::try_parse_from(["moodgen", "--num-sequences", "0"]).is_err());
    }
}
