use dedent::dedent;
use indexmap::IndexMap;
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Placeholder name to value. Extra entries are ignored by the renderer.
pub type Bindings = IndexMap<String, String>;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TemplateId {
    DocAnswer,
    CodeExplain,
}

impl TemplateId {
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            TemplateId::DocAnswer => &["context", "input"],
            TemplateId::CodeExplain => &["code_snippet"],
        }
    }

    fn source_name(&self) -> &'static str {
        match self {
            TemplateId::DocAnswer => "doc_answer",
            TemplateId::CodeExplain => "code_explain",
        }
    }

    fn source(&self) -> &'static str {
        let source = match self {
            TemplateId::DocAnswer => dedent!(
                r#"
                You are CodeQuest, an expert AI assistant for onboarding software engineers.
                Your goal is to answer questions accurately based on the provided documentation context.
                Provide a clear and concise answer. If the context doesn't contain the answer,
                state that you couldn't find the information in the available documents.

                Context:
                {{ context }}

                Question:
                {{ input }}

                Answer:
                "#
            ),
            TemplateId::CodeExplain => dedent!(
                r#"
                You are CodeQuest, an expert AI software architect. Your task is to analyze and explain the following code snippet.
                Provide a clear, structured explanation that would be helpful for a new engineer.

                Format your response as follows:
                **1. Purpose:** Briefly describe the overall goal of this code.
                **2. Language:** Identify the programming language.
                **3. Breakdown:** Provide a step-by-step explanation of what the code is doing. Explain complex lines or logic in detail.
                **4. Architectural Context & Best Practices:** Suggest how this code might fit into a larger application. Mention any potential improvements, best practices, or design patterns (e.g., error handling, modularity, performance).

                Here is the code snippet:
                ---
                {{ code_snippet }}
                ---
                "#
            ),
        };
        source.trim_start_matches('\n')
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("placeholder `{placeholder}` of template `{template}` is not bound")]
    Unbound {
        template: TemplateId,
        placeholder: &'static str,
    },

    #[error("failed to render template `{template}`: {source}")]
    Render {
        template: TemplateId,
        #[source]
        source: minijinja::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInstance {
    pub template_id: TemplateId,
    pub filled_text: String,
}

/// The fixed instruction templates, compiled once.
///
/// Rendering is strict: every placeholder a template declares must be present
/// in the bindings. Missing values are a programming error and are reported as
/// [`PromptError::Unbound`] instead of rendering an empty hole.
#[derive(Debug)]
pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    pub fn new() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for id in TemplateId::iter() {
            env.add_template(id.source_name(), id.source())
                .map_err(|source| PromptError::Render {
                    template: id,
                    source,
                })?;
        }
        Ok(Self { env })
    }

    pub fn render(
        &self,
        template_id: TemplateId,
        bindings: &Bindings,
    ) -> Result<PromptInstance, PromptError> {
        if let Some(placeholder) = template_id
            .placeholders()
            .iter()
            .copied()
            .find(|p| !bindings.contains_key(*p))
        {
            return Err(PromptError::Unbound {
                template: template_id,
                placeholder,
            });
        }

        let render_err = |source| PromptError::Render {
            template: template_id,
            source,
        };
        let filled_text = self
            .env
            .get_template(template_id.source_name())
            .map_err(render_err)?
            .render(bindings)
            .map_err(render_err)?;

        Ok(PromptInstance {
            template_id,
            filled_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use yare::parameterized;

    use super::*;

    fn bindings<const N: usize>(pairs: [(&str, &str); N]) -> Bindings {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn templates_declare_every_placeholder_they_use() {
        let library = PromptLibrary::new().unwrap();
        for id in TemplateId::iter() {
            let full: Bindings = id
                .placeholders()
                .iter()
                .map(|p| (p.to_string(), format!("<{p}>")))
                .collect();
            let prompt = library.render(id, &full).unwrap();
            for p in id.placeholders() {
                assert!(prompt.filled_text.contains(&format!("<{p}>")));
            }
            assert!(!prompt.filled_text.contains("{{"));
        }
    }

    #[test]
    fn doc_answer_with_empty_context_is_complete() {
        let library = PromptLibrary::new().unwrap();
        let prompt = library
            .render(
                TemplateId::DocAnswer,
                &bindings([("context", ""), ("input", "How do I reset a password?")]),
            )
            .unwrap();
        assert_eq!(prompt.template_id, TemplateId::DocAnswer);
        assert!(prompt.filled_text.starts_with("You are CodeQuest"));
        assert!(prompt.filled_text.contains("Context:\n\n\nQuestion:"));
        assert!(
            prompt
                .filled_text
                .contains("Question:\nHow do I reset a password?\n\nAnswer:")
        );
    }

    #[test]
    fn doc_answer_instructs_to_admit_missing_information() {
        let library = PromptLibrary::new().unwrap();
        let prompt = library
            .render(
                TemplateId::DocAnswer,
                &bindings([("context", "ctx"), ("input", "q")]),
            )
            .unwrap();
        assert!(
            prompt
                .filled_text
                .contains("state that you couldn't find the information")
        );
    }

    #[test]
    fn code_explain_has_four_sections_and_the_snippet() {
        let library = PromptLibrary::new().unwrap();
        let snippet = "```python\ndef factorial(n):\n    return 1 if n == 0 else n * factorial(n-1)\n```";
        let prompt = library
            .render(TemplateId::CodeExplain, &bindings([("code_snippet", snippet)]))
            .unwrap();
        for section in [
            "**1. Purpose:**",
            "**2. Language:**",
            "**3. Breakdown:**",
            "**4. Architectural Context & Best Practices:**",
        ] {
            assert!(prompt.filled_text.contains(section), "missing {section}");
        }
        assert!(prompt.filled_text.contains(&format!("---\n{snippet}\n---")));
    }

    #[test]
    fn values_are_not_interpreted_as_template_syntax() {
        let library = PromptLibrary::new().unwrap();
        let snippet = "{{ context }} {% if x %}";
        let prompt = library
            .render(TemplateId::CodeExplain, &bindings([("code_snippet", snippet)]))
            .unwrap();
        assert!(prompt.filled_text.contains(snippet));
    }

    #[parameterized(
        doc_answer_without_context = { TemplateId::DocAnswer, bindings([("input", "q")]), "context" },
        doc_answer_without_input = { TemplateId::DocAnswer, bindings([("context", "c")]), "input" },
        code_explain_without_snippet = { TemplateId::CodeExplain, bindings([("input", "q")]), "code_snippet" },
    )]
    fn missing_placeholder_is_a_binding_error(
        id: TemplateId,
        given: Bindings,
        expected: &str,
    ) {
        let library = PromptLibrary::new().unwrap();
        match library.render(id, &given) {
            Err(PromptError::Unbound {
                template,
                placeholder,
            }) => {
                assert_eq!(template, id);
                assert_eq!(placeholder, expected);
            }
            other => panic!("expected an unbound placeholder error, got {other:?}"),
        }
    }
}
