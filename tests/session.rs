//! End-to-end sessions with a counting classifier and generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use mood_pipelines::error::{PipelineError, Result};
use mood_pipelines::mood::*;
use mood_pipelines::sentiment::*;
use mood_pipelines::text_generation::{GenerateOptions, GeneratedSequence, TextGenerator};

struct Classifier {
    label: &'static str,
    score: f32,
    calls: AtomicUsize,
}

impl Classifier {
    fn new(label: &'static str, score: f32) -> Self {
        Self {
            label,
            score,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentClassifier for Classifier {
    async fn classify(
        &self,
        _text: &str,
        _api_key: &str,
    ) -> std::result::Result<Prediction, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Prediction {
            label: self.label.to_string(),
            score: self.score,
        })
    }
}

struct Generator {
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl Generator {
    fn new() -> Self {
        Self {
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for Generator {
    fn model_name(&self) -> String {
        "Stub 1B".into()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(PipelineError::Generation("device lost".into()));
        }
        Ok(vec![
            GeneratedSequence {
                generated_text: format!("{prompt} And then the sun came out."),
            };
            options.num_return_sequences
        ])
    }
}

fn session<'a>(
    classifier: &'a Classifier,
    generator: &'a Generator,
    key: Option<&str>,
) -> MoodSession<&'a Classifier, &'a Generator> {
    MoodSession::new(
        SentimentResolver::new(classifier, key.map(str::to_owned)),
        PromptComposer::new(generator),
    )
}

fn input(prompt: &str, choice: SentimentChoice) -> SessionInput {
    SessionInput {
        prompt: prompt.to_string(),
        choice,
        ..SessionInput::default()
    }
}

#[tokio::test]
async fn detected_sentiment_steers_generation() -> anyhow::Result<()> {
    let classifier = Classifier::new("POS", 0.97);
    let generator = Generator::new();

    let report = session(&classifier, &generator, Some("hf_test"))
        .run(&input("I love sunny mornings.", SentimentChoice::AutoDetect))
        .await?;

    assert_eq!(report.sentiment, SentimentLabel::Positive);
    assert_eq!(report.source, SentimentSource::Detected);
    assert!(report.warning.is_none());
    assert_eq!(report.text, "And then the sun came out.");
    assert_eq!(report.seed_prompt, "I love sunny mornings.");
    assert_eq!(report.model_name, "Stub 1B");
    assert_eq!(report.status_line(), "Detected Sentiment: **POSITIVE**");

    assert_eq!(classifier.calls(), 1);
    assert_eq!(
        generator.prompts(),
        ["The overall mood should be **positive**. I love sunny mornings."]
    );
    Ok(())
}

#[tokio::test]
async fn selected_sentiment_skips_classifier() -> anyhow::Result<()> {
    let classifier = Classifier::new("POS", 0.97);
    let generator = Generator::new();

    let report = session(&classifier, &generator, Some("hf_test"))
        .run(&input(
            "I love sunny mornings.",
            SentimentChoice::Fixed(SentimentLabel::Negative),
        ))
        .await?;

    assert_eq!(report.sentiment, SentimentLabel::Negative);
    assert_eq!(report.source, SentimentSource::Selected);
    assert_eq!(report.status_line(), "Selected Sentiment: **NEGATIVE**");
    assert_eq!(classifier.calls(), 0);
    assert!(generator.prompts()[0].starts_with("The overall mood should be **negative**. "));
    Ok(())
}

#[tokio::test]
async fn missing_key_still_generates_neutral_text() -> anyhow::Result<()> {
    let classifier = Classifier::new("POS", 0.97);
    let generator = Generator::new();

    let report = session(&classifier, &generator, None)
        .run(&input("I love sunny mornings.", SentimentChoice::AutoDetect))
        .await?;

    assert_eq!(report.sentiment, SentimentLabel::Neutral);
    assert_eq!(report.warning, Some(ResolveWarning::MissingCredential));
    assert_eq!(report.text, "And then the sun came out.");
    let rendered = report.render();
    assert!(rendered.starts_with("Warning: HUGGINGFACE_API_KEY not found"));
    assert_eq!(rendered.matches("Warning:").count(), 1);
    assert_eq!(classifier.calls(), 0);
    assert_eq!(generator.prompts().len(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_prompt_calls_nothing() {
    let classifier = Classifier::new("POS", 0.97);
    let generator = Generator::new();
    let session = session(&classifier, &generator, Some("hf_test"));

    for prompt in ["", "   \n\t"] {
        match session.run(&input(prompt, SentimentChoice::AutoDetect)).await {
            Err(PipelineError::InvalidInput(msg)) => assert_eq!(msg, EMPTY_PROMPT_MESSAGE),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    assert_eq!(classifier.calls(), 0);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn out_of_range_length_calls_nothing() {
    let classifier = Classifier::new("POS", 0.97);
    let generator = Generator::new();

    let mut request = input("Hello.", SentimentChoice::AutoDetect);
    request.max_length = 1000;
    let result = session(&classifier, &generator, Some("hf_test"))
        .run(&request)
        .await;

    assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    assert_eq!(classifier.calls(), 0);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn generation_failure_is_returned() {
    let classifier = Classifier::new("NEG", 0.9);
    let generator = Generator::failing();

    let result = session(&classifier, &generator, Some("hf_test"))
        .run(&input("Mondays.", SentimentChoice::AutoDetect))
        .await;

    assert!(matches!(result, Err(PipelineError::Generation(_))));
    assert_eq!(classifier.calls(), 1);
}
