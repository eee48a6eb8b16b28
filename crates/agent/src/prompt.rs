//! Prompt assembly for the loop's model queries.

use codelore_core::message::Message;

/// The fixed system role description. Declares the directive protocol the
/// parser understands.
pub const SYSTEM_PROMPT: &str = "You are an assistant specialized in code analysis. \
Answer accurately and concisely, using only the provided context. \
Do not state anything the context does not support. \
If you need more information from the knowledge store, reply with only 'QUERY:' followed by the search query. \
If you need the contents of a specific file, reply with only 'FILE:' followed by the file path.";

/// Build the user prompt from the instruction and the current context.
pub fn user_prompt(instruction: &str, context: &str) -> String {
    format!(
        "Instruction:\n{instruction}\n\nContext:\n{context}\n\n\
         Reply with your answer, or with a single QUERY: or FILE: line if you need more context."
    )
}

/// Build the full message sequence for one completion call.
pub fn build_messages(instruction: &str, context: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(user_prompt(instruction, context)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelore_core::message::Role;

    #[test]
    fn messages_are_system_then_user() {
        let messages = build_messages("explain X", "some context");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn user_prompt_carries_instruction_and_context() {
        let prompt = user_prompt("explain the lexer", "tokens are lazy");
        assert!(prompt.contains("explain the lexer"));
        assert!(prompt.contains("tokens are lazy"));
    }

    #[test]
    fn system_prompt_declares_both_markers() {
        assert!(SYSTEM_PROMPT.contains("QUERY:"));
        assert!(SYSTEM_PROMPT.contains("FILE:"));
    }
}
