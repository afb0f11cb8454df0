use anyhow::{Context as _, bail};
use serde_json::json;

use crate::{
    model::{APIModel, LangModelInferConfig},
    value::Embedding,
};

/// Gemini addresses models as `models/<name>`. Accepts either form.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_owned()
    } else {
        format!("models/{model}")
    }
}

fn request(api_model: &APIModel, method: &str, body: serde_json::Value) -> reqwest::RequestBuilder {
    let url = format!(
        "{}/{}:{}",
        api_model.base_url,
        model_path(&api_model.model),
        method
    );
    api_model
        .client
        .post(url)
        .header("x-goog-api-key", api_model.api_key.clone())
        .json(&body)
}

pub fn make_generate_request(
    api_model: &APIModel,
    prompt: &str,
    config: &LangModelInferConfig,
) -> reqwest::RequestBuilder {
    let mut generation_config = serde_json::Map::new();
    if let Some(temperature) = config.temperature {
        generation_config.insert("temperature".into(), temperature.into());
    }
    if let Some(top_p) = config.top_p {
        generation_config.insert("topP".into(), top_p.into());
    }
    if let Some(max_tokens) = config.max_tokens {
        generation_config.insert("maxOutputTokens".into(), max_tokens.into());
    }

    let body = json!({
        "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        "generationConfig": generation_config,
    });
    request(api_model, "generateContent", body)
}

pub fn parse_generate_response(body: serde_json::Value) -> anyhow::Result<String> {
    let Some(candidate) = body.pointer("/candidates/0") else {
        let reason = body
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        bail!("Gemini returned no candidates (block reason: {reason})");
    };

    match candidate.pointer("/finishReason").and_then(|v| v.as_str()) {
        None | Some("STOP") | Some("MAX_TOKENS") => {}
        Some(reason) => bail!("Gemini refused to answer (finish reason: {reason})"),
    }

    let text = candidate
        .pointer("/content/parts")
        .and_then(|v| v.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p.get("thought").and_then(|t| t.as_bool()).unwrap_or(false))
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.is_empty() {
        bail!("Gemini returned an empty response");
    }
    Ok(text)
}

pub fn make_embed_request(api_model: &APIModel, text: &str) -> reqwest::RequestBuilder {
    let body = json!({
        "model": model_path(&api_model.model),
        "content": {"parts": [{"text": text}]},
        "taskType": "RETRIEVAL_QUERY",
    });
    request(api_model, "embedContent", body)
}

pub fn parse_embed_response(body: serde_json::Value) -> anyhow::Result<Embedding> {
    let values = body
        .pointer("/embedding/values")
        .cloned()
        .context("Gemini response has no embedding values")?;
    let values: Vec<f32> =
        serde_json::from_value(values).context("Gemini embedding values are not numbers")?;
    Ok(Embedding::new(values))
}
