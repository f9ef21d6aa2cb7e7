//! Unit tests for core types

#[cfg(test)]
mod core_tests {
    use crate::tool::string_argument;
    use crate::{ChatMessage, ChatRequest, ChatResponse, RetryConfig, Role, ToolSpec};
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_structured_output_forces_single_tool() {
        let spec = ToolSpec::single_string_arg("grade", "Binary grade", "binary_score");
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a grader"),
            ChatMessage::user("Is it relevant?"),
        ])
        .with_tools(vec![ToolSpec::single_string_arg("other", "Other tool", "query")])
        .with_structured_output(spec);

        assert_eq!(request.forced_tool.as_deref(), Some("grade"));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "grade");
        assert_eq!(request.system_prompt(), Some("You are a grader"));
        assert_eq!(request.last_user_message(), Some("Is it relevant?"));
    }

    #[test]
    fn test_single_string_arg_schema() {
        let spec = ToolSpec::single_string_arg("arxiv", "Search arxiv", "query");
        assert_eq!(spec.parameters["type"], "object");
        assert_eq!(spec.parameters["properties"]["query"]["type"], "string");
        assert_eq!(spec.parameters["required"], json!(["query"]));
    }

    #[test]
    fn test_string_argument_forms() {
        assert_eq!(string_argument(&json!({"query": "rust"}), "query").unwrap(), "rust");
        assert_eq!(string_argument(&json!("bare"), "query").unwrap(), "bare");
        assert!(string_argument(&json!({"q": "rust"}), "query").is_err());
    }

    #[test]
    fn test_role_serialization() {
        let message = ChatMessage::user("hello");
        assert_eq!(message.role, Role::User);
        assert_yaml_snapshot!(message, @r###"
        ---
        role: user
        content: hello
        "###);
    }

    #[test]
    fn test_response_text_or_empty() {
        assert_eq!(ChatResponse::text("hi").text_or_empty(), "hi");
        assert_eq!(ChatResponse::calls(vec![]).text_or_empty(), "");
    }

    #[test]
    fn test_retry_delay_grows_linearly() {
        let retry = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(1),
        };
        assert_eq!(retry.delay_after(1), Duration::from_millis(100));
        assert_eq!(retry.delay_after(3), Duration::from_millis(300));
    }

    struct LengthEmbedder;

    #[async_trait::async_trait]
    impl crate::Embedder for LengthEmbedder {
        async fn embed(&self, inputs: &[String]) -> crate::Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|s| vec![s.len() as f32]).collect())
        }
    }

    #[tokio::test]
    async fn test_embed_query_uses_batch_embedding() {
        use crate::Embedder;
        let vector = LengthEmbedder.embed_query("four").await.unwrap();
        assert_eq!(vector, vec![4.0]);
    }
}
