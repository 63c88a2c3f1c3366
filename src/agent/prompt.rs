//! Decision prompt assembly
//!
//! Builds the per-turn message list: fixed instructions stating the action
//! grammar, then the task, the numbered element descriptions, the scratchpad,
//! and the annotated screenshot. The instructions are model-agnostic.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::agent::state::AgentState;
use crate::core::Message;

/// Fixed per-run instructions for the decision model.
pub const SYSTEM_PROMPT: &str = "\
You are a web browsing agent. Each turn you receive a screenshot of the \
current page with its interactive elements tagged by numbered bounding \
boxes, a text list of those elements, and numbered observations from your \
previous actions.

Choose exactly one action per turn:
- Click [index] -- click the numbered element
- Type [index]; [text] -- clear the numbered field, type the text, and submit
- Scroll [WINDOW or index]; [up or down] -- scroll the page or an element
- Wait -- pause while the page loads
- GoBack -- go back one page in history
- Google -- go to the Google start page
- ANSWER; [text] -- finish the task and report the answer

You may reason before acting, but your reply must end with a single line of \
the form:

Action: <name> <arguments>";

/// Build the message list for one decision call.
pub fn build_messages(state: &AgentState) -> Vec<Message> {
    let mut content = format!("Task: {}\n\n{}", state.task, state.description);

    if !state.scratchpad.is_empty() {
        content.push_str("\n\n");
        content.push_str(state.scratchpad.as_text());
    }

    let user = if state.screenshot.is_empty() {
        Message::user(content)
    } else {
        Message::user_with_image(content, BASE64.encode(&state.screenshot))
    };

    vec![Message::system(SYSTEM_PROMPT), user]
}
