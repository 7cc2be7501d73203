//! Rendering of chat replies for the terminal.

use anyhow::Result;

use crate::models::ChatReply;

pub const THINKING_LABEL: &str = "思考内容";
pub const ANSWER_LABEL: &str = "回答内容";

/// Plain-text form: a labelled thinking section, then the answer.
pub fn render_reply(reply: &ChatReply) -> String {
    format!(
        "{}:\n{}\n\n{}:\n{}",
        THINKING_LABEL, reply.thinking, ANSWER_LABEL, reply.answer
    )
}

/// Pretty JSON object with `thinking` and `answer` keys.
pub fn render_reply_json(reply: &ChatReply) -> Result<String> {
    Ok(serde_json::to_string_pretty(reply)?)
}
