//! System instruction for the translation model.

/// Display name of a language code, for prompt text.
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "ja" => "Japanese",
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        "zh" => "Chinese",
        "ko" => "Korean",
        other => other,
    }
}

/// Register rule for target languages that need one.
fn register_rule(target: &str) -> Option<&'static str> {
    match target {
        "ja" => Some(
            "Write in the plain academic register (da/de-aru). Never use polite forms \
             (desu/masu) or honorifics.",
        ),
        _ => None,
    }
}

/// Build the system instruction for translating `source` text into `target`.
pub fn system_instruction(source: &str, target: &str) -> String {
    let source_name = language_name(source);
    let target_name = language_name(target);
    let mut prompt = format!(
        "# Role\n\
         Professional academic translator from {source_name} to {target_name}.\n\n\
         # Task\n\
         Translate the user's {source_name} text into formal, objective {target_name} \
         suitable for an encyclopedia article.\n\n\
         # Constraints\n\
         - Keep the exact meaning. Do not omit, add, or interpret content.\n\
         - Output only the translated text, with no greetings or commentary.\n\
         - Never invent facts that are not present in the source.\n"
    );
    if let Some(rule) = register_rule(target) {
        prompt.push_str("- ");
        prompt.push_str(rule);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\n# Placeholders\n\
         - Tokens of the form ⟨elem:N⟩ stand for citations, templates, and formulas. \
         Copy every one exactly once, unchanged, at the grammatically matching position.\n\
         - Links arrive as ⟨wp_link title=\"T\" ja=\"T\"⟩label⟨/wp_link⟩. Keep `title` \
         unchanged, replace the `ja` value with the most likely {target_name} article \
         title, and translate only the label.\n\
         - Keep any markup tags and entities as they are.\n"
    ));
    prompt
}
