//! System prompt assembly
//!
//! The base persona plus the per-turn, never-persisted context addendum:
//! user location hints and any tool results gathered before generation.

use agrivoice_core::{Language, UserContext};

pub(crate) fn system_prompt(
    language: Language,
    ctx: &UserContext,
    tool_blocks: &[String],
) -> String {
    let mut prompt = format!(
        "You are a calm, confident farming assistant for Indian farmers.\n\
         \n\
         Rules:\n\
         - ALWAYS respond in {lang}.\n\
         - This is a voice assistant: keep answers under 3-4 short sentences.\n\
         - Only answer agriculture-related questions: crops, weather for farming, \
           fertilizers, pests and diseases, mandi prices, irrigation, seeds, and \
           government schemes, loans, and subsidies for farmers.\n\
         - Politely decline anything else and steer back to farming.\n\
         - Give ONE clear answer. No alternatives, no uncertainty language, and \
           never mention systems, models, or data sources.\n\
         - Never repeat the full greeting after the first message.",
        lang = language.name()
    );

    let mut context_lines = Vec::new();
    if let Some(location) = ctx.best_location() {
        context_lines.push(format!("Location: {location}"));
    }
    if let Some(state) = ctx.state.as_deref() {
        context_lines.push(format!("State: {state}"));
    }
    if !ctx.crops.is_empty() {
        context_lines.push(format!("Crops they grow: {}", ctx.crops.join(", ")));
    }
    if !context_lines.is_empty() {
        prompt.push_str("\n\nUser's context:\n");
        for line in &context_lines {
            prompt.push_str("- ");
            prompt.push_str(line);
            prompt.push('\n');
        }
    }

    if !tool_blocks.is_empty() {
        prompt.push_str(
            "\n\nCurrent data (use these exact figures when answering; present them \
             as agricultural guidance):\n",
        );
        for block in tool_blocks {
            prompt.push_str("- ");
            prompt.push_str(block);
            prompt.push('\n');
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_response_language() {
        let prompt = system_prompt(Language::Kannada, &UserContext::default(), &[]);
        assert!(prompt.contains("respond in Kannada"));
        assert!(!prompt.contains("User's context"));
    }

    #[test]
    fn folds_context_and_tool_blocks() {
        let ctx = UserContext {
            district: Some("Mandya".into()),
            state: Some("Karnataka".into()),
            crops: vec!["ragi".into(), "sugarcane".into()],
            ..Default::default()
        };
        let blocks = vec!["get_weather result: {\"temp_c\":28}".to_string()];
        let prompt = system_prompt(Language::English, &ctx, &blocks);
        assert!(prompt.contains("Location: Mandya"));
        assert!(prompt.contains("ragi, sugarcane"));
        assert!(prompt.contains("get_weather result"));
    }
}
