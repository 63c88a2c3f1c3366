//! Action parsing
//!
//! Extracts one symbolic action from the model's free-text response. Only
//! the final line is consulted: a model that reasons out loud before the
//! action line is the expected shape. Anything unparseable becomes the
//! `retry` pseudo-action, which is a normal outcome the loop feeds back to
//! the model, not an error.

/// Marker that must begin the final line of a decision response.
pub const ACTION_PREFIX: &str = "Action: ";

/// Sentinel action name that ends the task with an answer.
const ANSWER_NAME: &str = "ANSWER";

/// The closed set of browser tools the model can invoke. Dispatch matches
/// exhaustively on this enum, so every action the parser can produce has a
/// handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Click,
    Type,
    Scroll,
    Wait,
    GoBack,
    Google,
}

impl ToolKind {
    /// Resolve an action name, case-sensitively, to a tool.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Click" => Some(Self::Click),
            "Type" => Some(Self::Type),
            "Scroll" => Some(Self::Scroll),
            "Wait" => Some(Self::Wait),
            "GoBack" => Some(Self::GoBack),
            "Google" => Some(Self::Google),
            _ => None,
        }
    }

    /// The action name the model uses for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::Type => "Type",
            Self::Scroll => "Scroll",
            Self::Wait => "Wait",
            Self::GoBack => "GoBack",
            Self::Google => "Google",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The parsed decision of one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// Dispatch a browser tool with its raw argument list
    Tool { tool: ToolKind, args: Vec<String> },
    /// Terminal: the task is answered
    Answer { args: Vec<String> },
    /// The output was unusable; re-enter the decide state
    Retry { reason: String },
}

impl Prediction {
    /// The final answer carried by an `Answer` prediction, empty when the
    /// model supplied none.
    pub fn final_answer(&self) -> Option<String> {
        match self {
            Self::Answer { args } => Some(args.first().cloned().unwrap_or_default()),
            _ => None,
        }
    }
}

/// Parse the model's raw response into a prediction.
///
/// Grammar of the final line: `Action: <Name>` optionally followed by
/// arguments separated by `;`, each argument trimmed of whitespace and
/// surrounding brackets.
pub fn parse(text: &str) -> Prediction {
    let last_line = text.trim().lines().last().unwrap_or("");

    let Some(action_str) = last_line.strip_prefix(ACTION_PREFIX) else {
        return Prediction::Retry {
            reason: format!("Could not parse LLM Output: {}", text),
        };
    };

    // `ANSWER; [text]` tokenizes the separator onto the name; strip it.
    let (name, args_blob) = match action_str.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.trim().trim_end_matches(';'), Some(rest)),
        None => (action_str.trim().trim_end_matches(';'), None),
    };

    let args: Vec<String> = args_blob
        .map(|blob| {
            blob.trim()
                .split(';')
                .map(|part| part.trim().trim_matches(|c| c == '[' || c == ']').to_string())
                .collect()
        })
        .unwrap_or_default();

    if name == ANSWER_NAME {
        return Prediction::Answer { args };
    }

    match ToolKind::from_name(name) {
        Some(tool) => Prediction::Tool { tool, args },
        None => Prediction::Retry {
            reason: format!(
                "Unknown action '{}'. Valid actions: Click, Type, Scroll, Wait, GoBack, Google, ANSWER.",
                name
            ),
        },
    }
}
