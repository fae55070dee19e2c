use serde::{ Deserialize, Serialize };
use serde_json::{ json, Value as JsonValue };

/// Result reported back to the model for every function call it requests.
pub const TOOL_RESULT_EXECUTED: &str = "executed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub args: JsonValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: JsonValue,
}

/// One piece of turn content, serialized in the `generateContent` wire shape
/// (`{"text": ..}`, `{"functionCall": ..}`, `{"functionResponse": ..}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl ConversationTurn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model_function_call(call: FunctionCall) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::FunctionCall(call)],
        }
    }

    /// Synthetic user turn acknowledging a function call as done.
    pub fn tool_result(name: &str) -> Self {
        Self {
            role: Role::User,
            parts: vec![
                Part::FunctionResponse(FunctionResponse {
                    name: name.to_string(),
                    response: json!({ "result": TOOL_RESULT_EXECUTED }),
                })
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn user_turn_uses_wire_shape() {
        let turn = ConversationTurn::user_text("calculator");
        assert_eq!(
            serde_json::to_value(&turn).unwrap(),
            json!({ "role": "user", "parts": [{ "text": "calculator" }] })
        );
    }

    #[test]
    fn function_call_and_result_turns() {
        let call = FunctionCall {
            name: "executeCommand".to_string(),
            args: json!({ "command": "mkdir site" }),
        };
        let call_turn = ConversationTurn::model_function_call(call);
        assert_eq!(
            serde_json::to_value(&call_turn).unwrap(),
            json!({
                "role": "model",
                "parts": [{ "functionCall": { "name": "executeCommand", "args": { "command": "mkdir site" } } }]
            })
        );

        let result_turn = ConversationTurn::tool_result("executeCommand");
        assert_eq!(
            serde_json::to_value(&result_turn).unwrap(),
            json!({
                "role": "user",
                "parts": [{
                    "functionResponse": { "name": "executeCommand", "response": { "result": "executed" } }
                }]
            })
        );
    }

    #[test]
    fn function_call_without_args_omits_field() {
        let call: FunctionCall = serde_json::from_value(json!({ "name": "noop" })).unwrap();
        assert!(call.args.is_null());
        assert_eq!(serde_json::to_value(&call).unwrap(), json!({ "name": "noop" }));
    }
}
