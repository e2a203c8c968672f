//! Non-stream response extraction.

use serde_json::Value;
use tracing::trace;

use crate::provider::ProviderAdapter;
use crate::types::ChatCompletionResponse;

/// Pulls one unified result out of a complete vendor response.
///
/// A response without a completion choice produces the empty result, never
/// an error. Text, function calls, and finish reason are extracted
/// independently from the same choice record; a response may legitimately
/// carry both text and function calls.
pub fn extract_response<A: ProviderAdapter>(
    adapter: &A,
    response: &Value,
) -> ChatCompletionResponse {
    let Some(choice) = adapter.extract_core_data(response) else {
        trace!(
            provider = adapter.provider_id(),
            "response carried no completion choice"
        );
        return ChatCompletionResponse::empty();
    };

    ChatCompletionResponse {
        text: adapter.extract_text_content(&choice),
        function_calls: adapter.extract_function_calls(&choice),
        finish_reason: adapter.extract_finish_reason(&choice),
    }
}
