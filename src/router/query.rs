use crate::{
    constants::FENCE_MARKER,
    value::{Query, QueryKind},
};

/// Removes every leading `<@...>` mention token and surrounding whitespace.
/// Applying it twice gives the same result as applying it once.
pub fn strip_mention(text: &str) -> &str {
    let mut rest = text.trim();
    while let Some(after) = rest.strip_prefix("<@") {
        let Some(end) = after.find('>') else {
            break;
        };
        rest = after[end + 1..].trim_start();
    }
    rest
}

/// Pasted code is recognized by the fenced-block marker alone. A question that
/// quotes a fenced block is therefore treated as code.
pub fn contains_fence_marker(content: &str) -> bool {
    content.contains(FENCE_MARKER)
}

pub fn classify(content: &str) -> QueryKind {
    if contains_fence_marker(content) {
        QueryKind::CodeSnippet
    } else {
        QueryKind::Question
    }
}

pub fn extract_query(raw_text: &str) -> Query {
    let content = strip_mention(raw_text);
    Query::new(classify(content), content)
}

#[cfg(test)]
mod tests {
    use yare::parameterized;

    use super::*;

    #[parameterized(
        plain = { "<@U012AB3CD> How are user passwords stored?", "How are user passwords stored?" },
        no_space = { "<@U012AB3CD>where is the VPN config?", "where is the VPN config?" },
        two_mentions = { "<@U1> <@U2>  hi there ", "hi there" },
        no_mention = { "  just text  ", "just text" },
        unterminated = { "<@U1 what", "<@U1 what" },
        mention_only = { "<@U012AB3CD>", "" },
        inner_mention_kept = { "<@U1> ask <@U2> about it", "ask <@U2> about it" },
    )]
    fn strips_leading_mentions(raw: &str, expected: &str) {
        assert_eq!(strip_mention(raw), expected);
    }

    #[parameterized(
        plain = { "<@U1> How are user passwords stored?" },
        nested = { "<@U1> <@U2> <@U3>" },
        spaced = { "   <@U1>   \n ```x```  " },
        unterminated = { "<@U1> <@U2" },
        empty = { "" },
    )]
    fn stripping_is_idempotent(raw: &str) {
        let once = strip_mention(raw);
        assert_eq!(strip_mention(once), once);
    }

    #[parameterized(
        python = { "```python\ndef f(): pass\n```", QueryKind::CodeSnippet },
        unclosed = { "explain ```let x = 1;", QueryKind::CodeSnippet },
        question_quoting_code = { "why does ``` break here?", QueryKind::CodeSnippet },
        question = { "How are user passwords stored?", QueryKind::Question },
        inline_code = { "what does `foo()` return?", QueryKind::Question },
        two_backticks = { "`` is not a fence", QueryKind::Question },
        empty = { "", QueryKind::Question },
    )]
    fn classifies_by_fence_marker(content: &str, expected: QueryKind) {
        assert_eq!(classify(content), expected);
    }

    #[test]
    fn extracted_query_keeps_snippet_verbatim() {
        let query = extract_query("<@U1> ```\nfn main() {}\n```");
        assert_eq!(query.kind, QueryKind::CodeSnippet);
        assert_eq!(query.content, "```\nfn main() {}\n```");
    }
}
