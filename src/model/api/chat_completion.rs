use anyhow::{Context as _, bail};
use serde_json::json;

use crate::{
    model::{APIModel, LangModelInferConfig},
    value::Embedding,
};

fn request(api_model: &APIModel, route: &str, body: serde_json::Value) -> reqwest::RequestBuilder {
    api_model
        .client
        .post(format!("{}/{}", api_model.base_url, route))
        .bearer_auth(&api_model.api_key)
        .json(&body)
}

pub fn make_generate_request(
    api_model: &APIModel,
    prompt: &str,
    config: &LangModelInferConfig,
) -> reqwest::RequestBuilder {
    let mut body = json!({
        "model": api_model.model,
        "messages": [{"role": "user", "content": prompt}],
    });
    if let Some(temperature) = config.temperature {
        body["temperature"] = temperature.into();
    }
    if let Some(top_p) = config.top_p {
        body["top_p"] = top_p.into();
    }
    if let Some(max_tokens) = config.max_tokens {
        body["max_tokens"] = max_tokens.into();
    }
    request(api_model, "chat/completions", body)
}

pub fn parse_generate_response(body: serde_json::Value) -> anyhow::Result<String> {
    let choice = body
        .pointer("/choices/0")
        .context("Chat completion response has no choices")?;
    if let Some("content_filter") = choice.pointer("/finish_reason").and_then(|v| v.as_str()) {
        bail!("Chat completion was filtered");
    }
    let text = choice
        .pointer("/message/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if text.is_empty() {
        bail!("Chat completion returned an empty message");
    }
    Ok(text.to_owned())
}

pub fn make_embed_request(api_model: &APIModel, text: &str) -> reqwest::RequestBuilder {
    let body = json!({"model": api_model.model, "input": text});
    request(api_model, "embeddings", body)
}

pub fn parse_embed_response(body: serde_json::Value) -> anyhow::Result<Embedding> {
    let values = body
        .pointer("/data/0/embedding")
        .cloned()
        .context("Embedding response has no data")?;
    let values: Vec<f32> =
        serde_json::from_value(values).context("Embedding values are not numbers")?;
    Ok(Embedding::new(values))
}
