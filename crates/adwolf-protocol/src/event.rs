use serde::{Deserialize, Serialize};

/// Events emitted by the server during a streaming chat response.
///
/// Each frame on the wire is one of these, tagged by its `type` field. A
/// well-behaved server always ends a stream with a terminal [`Done`] or
/// [`Error`] event before closing the connection.
///
/// [`Done`]: StreamEvent::Done
/// [`Error`]: StreamEvent::Error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of assistant text to append to the in-flight message.
    TextDelta {
        /// The content fragment.
        content: String,
    },

    /// The assistant invoked a tool.
    ToolCall {
        /// Name of the invoked tool.
        tool_name: String,
        /// JSON arguments of the invocation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_args: Option<serde_json::Value>,
    },

    /// A previously announced tool call resolved.
    ///
    /// Carries no correlation id; the protocol assumes at most one tool is
    /// active at a time.
    ToolResult {
        /// Name of the tool that resolved.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
    },

    /// A new thread was created server-side; emitted at most once per stream,
    /// only for conversations that had no thread yet.
    ThreadCreated {
        /// The server-assigned thread id.
        thread_id: String,
    },

    /// Terminal: the exchange completed. No further events follow.
    Done {
        /// Thread id of the exchange.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        /// Server id of the finalized assistant message; may be empty.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },

    /// Terminal: the exchange failed server-side.
    Error {
        /// Human-readable description of the failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta_deserialization() {
        let ev: StreamEvent =
            serde_json::from_str(r#"{"type": "text_delta", "content": "Merhaba"}"#).unwrap();
        assert_eq!(
            ev,
            StreamEvent::TextDelta {
                content: "Merhaba".to_string()
            }
        );
    }

    #[test]
    fn test_tool_call_with_args() {
        let ev: StreamEvent = serde_json::from_str(
            r#"{"type": "tool_call", "tool_name": "get_campaign_list", "tool_args": {"platform": "google"}}"#,
        )
        .unwrap();
        match ev {
            StreamEvent::ToolCall {
                tool_name,
                tool_args,
            } => {
                assert_eq!(tool_name, "get_campaign_list");
                assert_eq!(tool_args.unwrap()["platform"], "google");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_done_fields_are_optional() {
        let ev: StreamEvent = serde_json::from_str(r#"{"type": "done"}"#).unwrap();
        assert_eq!(
            ev,
            StreamEvent::Done {
                thread_id: None,
                message_id: None
            }
        );

        let ev: StreamEvent =
            serde_json::from_str(r#"{"type": "done", "thread_id": "t1", "message_id": ""}"#)
                .unwrap();
        assert_eq!(
            ev,
            StreamEvent::Done {
                thread_id: Some("t1".to_string()),
                message_id: Some(String::new())
            }
        );
    }

    #[test]
    fn test_unknown_type_is_a_parse_error() {
        // The frame parser skips these; they must not deserialize silently.
        let result = serde_json::from_str::<StreamEvent>(r#"{"type": "heartbeat"}"#);
        assert!(result.is_err());
    }
}
