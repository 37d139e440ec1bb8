//! Steered prompt composition with stand-in generators.

use std::sync::Mutex;

use mood_pipelines::error::{PipelineError, Result};
use mood_pipelines::mood::*;
use mood_pipelines::sentiment::SentimentLabel;
use mood_pipelines::text_generation::{GenerateOptions, GeneratedSequence, TextGenerator};

/// Echoes the prompt followed by fixed continuations, one per requested sequence.
struct Echo {
    continuations: Vec<&'static str>,
    calls: Mutex<Vec<(String, GenerateOptions)>>,
}

impl Echo {
    fn new(continuations: &[&'static str]) -> Self {
        Self {
            continuations: continuations.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, GenerateOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextGenerator for Echo {
    fn model_name(&self) -> String {
        "echo".into()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        Ok(self
            .continuations
            .iter()
            .cycle()
            .take(options.num_return_sequences)
            .map(|continuation| GeneratedSequence {
                generated_text: format!("{prompt}{continuation}"),
            })
            .collect())
    }
}

/// Returns the same text regardless of the prompt.
struct Canned(&'static str);

impl TextGenerator for Canned {
    fn model_name(&self) -> String {
        "canned".into()
    }

    fn generate(&self, _prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        Ok(vec![
            GeneratedSequence {
                generated_text: self.0.to_string(),
            };
            options.num_return_sequences
        ])
    }
}

struct Broken;

impl TextGenerator for Broken {
    fn model_name(&self) -> String {
        "broken".into()
    }

    fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        Err(PipelineError::Generation("out of memory".into()))
    }
}

#[test]
fn cats_are_wonderful() -> anyhow::Result<()> {
    let generator = Echo::new(&[" Cats are wonderful creatures."]);
    let composer = PromptComposer::new(&generator);

    let request = GenerationRequest::with_defaults("Tell me about cats.", SentimentLabel::Positive)?;
    assert_eq!(composer.compose(request)?, "Cats are wonderful creatures.");
    Ok(())
}

#[test]
fn generator_sees_prefixed_prompt_and_options() -> anyhow::Result<()> {
    let generator = Echo::new(&[" Rain again."]);
    let composer = PromptComposer::new(&generator);

    let request = GenerationRequest::new("Describe Monday.", SentimentLabel::Negative, 200, 1)?;
    composer.compose(request)?;

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let (prompt, options) = &calls[0];
    assert_eq!(
        prompt,
        "The overall mood should be **negative**. Describe Monday."
    );
    assert_eq!(
        *options,
        GenerateOptions {
            max_length: 200,
            num_return_sequences: 1,
            temperature: Some(0.9),
            do_sample: true,
        }
    );
    Ok(())
}

#[test]
fn temperature_can_be_overridden() -> anyhow::Result<()> {
    let generator = Echo::new(&[" ok"]);
    let composer = PromptComposer::new(&generator).temperature(0.4);

    composer.compose(GenerationRequest::with_defaults("Hi.", SentimentLabel::Neutral)?)?;
    assert_eq!(generator.calls()[0].1.temperature, Some(0.4));
    Ok(())
}

#[test]
fn first_of_several_samples_is_returned() -> anyhow::Result<()> {
    let generator = Echo::new(&[" first.", " second.", " third."]);
    let composer = PromptComposer::new(&generator);

    let request = GenerationRequest::new("Count.", SentimentLabel::Neutral, 100, 3)?;
    assert_eq!(composer.compose(request)?, "first.");
    assert_eq!(generator.calls()[0].1.num_return_sequences, 3);
    Ok(())
}

#[test]
fn prompt_only_output_is_empty() -> anyhow::Result<()> {
    let generator = Echo::new(&[""]);
    let composer = PromptComposer::new(&generator);

    let request = GenerationRequest::with_defaults("Tell me about cats.", SentimentLabel::Positive)?;
    assert_eq!(composer.compose(request)?, "");
    Ok(())
}

#[test]
fn output_without_prefix_is_returned_verbatim() -> anyhow::Result<()> {
    let raw = "  A model that ignored its instructions.  ";
    let composer = PromptComposer::new(Canned(raw));

    let request = GenerationRequest::with_defaults("Tell me about cats.", SentimentLabel::Positive)?;
    assert_eq!(composer.compose(request)?, raw);
    Ok(())
}

#[test]
fn generation_errors_propagate() -> anyhow::Result<()> {
    let composer = PromptComposer::new(Broken);

    let request = GenerationRequest::with_defaults("Tell me about cats.", SentimentLabel::Positive)?;
    match composer.compose(request) {
        Err(PipelineError::Generation(reason)) => assert_eq!(reason, "out of memory"),
        other => panic!("expected a generation error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_requests_are_rejected() {
    assert!(matches!(
        GenerationRequest::with_defaults("   ", SentimentLabel::Positive),
        Err(PipelineError::InvalidInput(msg)) if msg == EMPTY_PROMPT_MESSAGE
    ));
    assert!(GenerationRequest::new("Hi.", SentimentLabel::Positive, 49, 1).is_err());
    assert!(GenerationRequest::new("Hi.", SentimentLabel::Positive, 301, 1).is_err());
    assert!(GenerationRequest::new("Hi.", SentimentLabel::Positive, 150, 0).is_err());
}
