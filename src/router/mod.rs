pub(crate) mod query;

use std::sync::Arc;

use async_trait::async_trait;

pub use query::{classify, contains_fence_marker, extract_query, strip_mention};

use crate::{
    constants::{
        CODE_ACK, CODE_ANSWER_PREFIX, CODE_APOLOGY, DOC_ACK, DOC_APOLOGY, EMPTY_QUERY_HINT,
        LOG_EXCERPT_LEN,
    },
    engine::{AnswerError, CodeExplainer, DocAnswerer},
    utils::Ellipsis as _,
    value::{IncomingMessage, Query, QueryKind},
};

/// Where replies go. The chat platform client implements this.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn post_reply(
        &self,
        conversation_id: &str,
        reply_target: &str,
        text: &str,
    ) -> anyhow::Result<()>;
}

pub fn acknowledgment(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Question => DOC_ACK,
        QueryKind::CodeSnippet => CODE_ACK,
    }
}

pub fn apology(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Question => DOC_APOLOGY,
        QueryKind::CodeSnippet => CODE_APOLOGY,
    }
}

/// Turns mentions into replies. Holds only read-only handles, so one instance
/// serves any number of concurrent messages.
#[derive(Clone)]
pub struct Router {
    doc: DocAnswerer,
    code: CodeExplainer,
    sink: Arc<dyn ReplySink>,
}

impl Router {
    pub fn new(doc: DocAnswerer, code: CodeExplainer, sink: Arc<dyn ReplySink>) -> Self {
        Self { doc, code, sink }
    }

    pub async fn handle(&self, message: IncomingMessage) {
        let query = extract_query(&message.raw_text);
        if query.is_empty() {
            self.reply(&message, EMPTY_QUERY_HINT).await;
            return;
        }

        log::info!(
            "Received {} in {}: {}",
            query.kind,
            message.conversation_id,
            query.content.log_excerpt(LOG_EXCERPT_LEN)
        );
        self.reply(&message, acknowledgment(query.kind)).await;

        let text = self.respond(&query).await;
        self.reply(&message, &text).await;
    }

    /// The final reply text for `query`: the answer, or the apology for its
    /// kind. Fault details are logged and never returned.
    pub async fn respond(&self, query: &Query) -> String {
        match self.dispatch(query).await {
            Ok(text) => text,
            Err(e) => {
                log::error!(
                    "Failed to answer {} ({} fault): {}; content: {}",
                    query.kind,
                    e.kind(),
                    e,
                    query.content.log_excerpt(LOG_EXCERPT_LEN)
                );
                apology(query.kind).to_owned()
            }
        }
    }

    async fn dispatch(&self, query: &Query) -> Result<String, AnswerError> {
        match query.kind {
            QueryKind::Question => Ok(self.doc.answer(&query.content).await?.text),
            QueryKind::CodeSnippet => {
                let answer = self.code.explain(&query.content).await?;
                Ok(format!("{CODE_ANSWER_PREFIX}{}", answer.text))
            }
        }
    }

    async fn reply(&self, message: &IncomingMessage, text: &str) {
        if let Err(e) = self
            .sink
            .post_reply(&message.conversation_id, &message.reply_target, text)
            .await
        {
            log::warn!(
                "Failed to post reply to {} ({}): {e:#}",
                message.conversation_id,
                message.reply_target
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    use super::*;
    use crate::{
        boxed, logged_test,
        model::{APIModel, APISpecification, LangModel, LangModelInferConfig},
        prompt::PromptLibrary,
        utils::test::{Calls, failing_knowledge, recording_knowledge, recording_lm},
        value::RetrievedChunk,
    };

    type Posted = (String, String, String);

    fn posted(conversation_id: &str, reply_target: &str, text: &str) -> Posted {
        (conversation_id.into(), reply_target.into(), text.into())
    }

    #[derive(Default)]
    struct RecordingSink {
        posted: Calls<Posted>,
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn post_reply(
            &self,
            conversation_id: &str,
            reply_target: &str,
            text: &str,
        ) -> anyhow::Result<()> {
            self.posted
                .push((conversation_id.into(), reply_target.into(), text.into()));
            Ok(())
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl ReplySink for BrokenSink {
        async fn post_reply(
            &self,
            _conversation_id: &str,
            _reply_target: &str,
            _text: &str,
        ) -> anyhow::Result<()> {
            anyhow::bail!("channel_not_found")
        }
    }

    fn router(
        knowledge: crate::knowledge::Knowledge,
        lm: LangModel,
        sink: Arc<dyn ReplySink>,
    ) -> Router {
        let prompts = Arc::new(PromptLibrary::new().unwrap());
        Router::new(
            DocAnswerer::new(
                knowledge,
                lm.clone(),
                prompts.clone(),
                3,
                LangModelInferConfig::with_temperature(0.3),
            ),
            CodeExplainer::new(lm, prompts, LangModelInferConfig::with_temperature(0.2)),
            sink,
        )
    }

    fn password_chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk::new("Passwords are hashed with bcrypt.", "docs/auth.md"),
            RetrievedChunk::new("The cost factor is 12.", "docs/auth.md"),
            RetrievedChunk::new("Plaintext is never logged.", "docs/security.md"),
        ]
    }

    logged_test! {
        async fn question_is_answered_in_thread() {
            let (knowledge, retrievals) = recording_knowledge(password_chunks());
            let (lm, prompts) = recording_lm(|_| Ok("They are hashed with bcrypt.".to_owned()));
            let sink = Arc::new(RecordingSink::default());
            let router = router(knowledge, lm, sink.clone());

            router
                .handle(IncomingMessage::new(
                    "<@U012AB3CD> How are user passwords stored?",
                    "C1",
                    "1700000000.000100",
                ))
                .await;

            assert_eq!(
                retrievals.snapshot(),
                vec![("How are user passwords stored?".to_owned(), 3)]
            );
            let prompts = prompts.snapshot();
            assert_eq!(prompts.len(), 1);
            assert!(prompts[0].0.contains(
                "Passwords are hashed with bcrypt.\n\nThe cost factor is 12.\n\nPlaintext is never logged."
            ));
            assert_eq!(
                sink.posted.snapshot(),
                vec![
                    posted("C1", "1700000000.000100", DOC_ACK),
                    posted("C1", "1700000000.000100", "They are hashed with bcrypt."),
                ]
            );
        }
    }

    logged_test! {
        async fn snippet_is_explained_without_retrieval() {
            let snippet = "```python\ndef factorial(n):\n    return 1 if n == 0 else n * factorial(n-1)\n```";
            let (knowledge, retrievals) = recording_knowledge(password_chunks());
            let (lm, prompts) = recording_lm(|_| Ok("**1. Purpose:** factorial".to_owned()));
            let sink = Arc::new(RecordingSink::default());
            let router = router(knowledge, lm, sink.clone());

            router
                .handle(IncomingMessage::new(format!("<@U1> {snippet}"), "C2", "42.1"))
                .await;

            assert_eq!(retrievals.len(), 0);
            let prompts = prompts.snapshot();
            assert_eq!(prompts.len(), 1);
            assert!(prompts[0].0.contains(snippet));
            assert!(prompts[0].0.contains("Architectural Context"));
            assert_eq!(prompts[0].1.temperature, Some(0.2));

            let texts = sink
                .posted
                .snapshot()
                .into_iter()
                .map(|(_, target, text)| {
                    assert_eq!(target, "42.1");
                    text
                })
                .collect::<Vec<_>>();
            assert_eq!(
                texts,
                vec![
                    CODE_ACK.to_owned(),
                    "Here's the analysis:\n\n**1. Purpose:** factorial".to_owned()
                ]
            );
        }
    }

    logged_test! {
        async fn search_failure_posts_doc_apology_only() {
            let (lm, prompts) = recording_lm(|_| Ok("unused".to_owned()));
            let sink = Arc::new(RecordingSink::default());
            let router = router(
                failing_knowledge("index exploded: secret detail"),
                lm,
                sink.clone(),
            );

            router
                .handle(IncomingMessage::new("<@U1> where is the VPN?", "C1", "1.0"))
                .await;

            assert_eq!(prompts.len(), 0);
            let posted = sink.posted.snapshot();
            assert_eq!(posted.last().unwrap().2, DOC_APOLOGY);
            assert!(posted.iter().all(|(_, _, text)| !text.contains("secret detail")));
        }
    }

    logged_test! {
        async fn generation_failure_on_code_posts_code_apology() {
            let (knowledge, _) = recording_knowledge(vec![]);
            let (lm, _) = recording_lm(|_| Err(anyhow::anyhow!("quota exhausted")));
            let sink = Arc::new(RecordingSink::default());
            let router = router(knowledge, lm, sink.clone());

            router
                .handle(IncomingMessage::new("<@U1> ```\nx = 1\n```", "C1", "1.0"))
                .await;

            let posted = sink.posted.snapshot();
            assert_eq!(posted.last().unwrap().2, CODE_APOLOGY);
            assert_ne!(CODE_APOLOGY, DOC_APOLOGY);
        }
    }

    logged_test! {
        async fn empty_mention_gets_usage_hint() {
            let (knowledge, retrievals) = recording_knowledge(password_chunks());
            let (lm, prompts) = recording_lm(|_| Ok("unused".to_owned()));
            let sink = Arc::new(RecordingSink::default());
            let router = router(knowledge, lm, sink.clone());

            router
                .handle(IncomingMessage::new("<@U012AB3CD>   ", "C1", "1.0"))
                .await;

            assert_eq!(retrievals.len(), 0);
            assert_eq!(prompts.len(), 0);
            assert_eq!(
                sink.posted.snapshot(),
                vec![posted("C1", "1.0", EMPTY_QUERY_HINT)]
            );
        }
    }

    logged_test! {
        async fn reply_failures_do_not_escape() {
            let (knowledge, _) = recording_knowledge(password_chunks());
            let (lm, prompts) = recording_lm(|_| Ok("answer".to_owned()));
            let router = router(knowledge, lm, Arc::new(BrokenSink));

            router
                .handle(IncomingMessage::new("<@U1> hello?", "C1", "1.0"))
                .await;
            assert_eq!(prompts.len(), 1);
        }
    }

    logged_test! {
        async fn concurrent_requests_reply_to_their_own_threads() {
            // The first question is slower, so its answer lands after the second one.
            let lm = LangModel::new_custom(Arc::new(
                |prompt: String, _config: LangModelInferConfig| {
                    boxed!(async move {
                        let (delay, answer) = if prompt.contains("slow question") {
                            (50, "slow answer")
                        } else {
                            (0, "fast answer")
                        };
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        anyhow::Ok(answer.to_owned())
                    })
                },
            ));
            let (knowledge, _) = recording_knowledge(password_chunks());
            let sink = Arc::new(RecordingSink::default());
            let router = Arc::new(router(knowledge, lm, sink.clone()));

            let slow = tokio::spawn({
                let router = router.clone();
                async move {
                    router
                        .handle(IncomingMessage::new("<@U1> slow question", "C-A", "A.1"))
                        .await
                }
            });
            let fast = tokio::spawn({
                let router = router.clone();
                async move {
                    router
                        .handle(IncomingMessage::new("<@U1> fast question", "C-B", "B.1"))
                        .await
                }
            });
            slow.await.unwrap();
            fast.await.unwrap();

            let posted = sink.posted.snapshot();
            assert_eq!(posted.len(), 4);
            for (conversation, target, text) in posted {
                match conversation.as_str() {
                    "C-A" => {
                        assert_eq!(target, "A.1");
                        assert!(text == DOC_ACK || text == "slow answer");
                    }
                    "C-B" => {
                        assert_eq!(target, "B.1");
                        assert!(text == DOC_ACK || text == "fast answer");
                    }
                    other => panic!("unexpected conversation {other}"),
                }
            }
        }
    }

    logged_test! {
        async fn stalled_model_call_ends_in_apology() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({
                            "candidates": [{
                                "content": { "parts": [{ "text": "too late" }] },
                                "finishReason": "STOP"
                            }]
                        }))
                        .set_delay(Duration::from_secs(5)),
                )
                .mount(&server)
                .await;
            let lm = LangModel::from_api_model(
                APIModel::new(APISpecification::Gemini, "gemini-1.5-flash", "key")
                    .with_base_url(server.uri())
                    .unwrap()
                    .with_timeout(Duration::from_millis(200)),
            );
            let (knowledge, _) = recording_knowledge(password_chunks());
            let sink = Arc::new(RecordingSink::default());
            let router = router(knowledge, lm, sink.clone());

            router
                .handle(IncomingMessage::new(
                    "<@U1> How are user passwords stored?",
                    "C1",
                    "1.0",
                ))
                .await;

            assert_eq!(
                sink.posted.snapshot(),
                vec![posted("C1", "1.0", DOC_ACK), posted("C1", "1.0", DOC_APOLOGY)]
            );
        }
    }
}
