//! Prompt construction for the advisory model

/// Placeholder replaced with the brand name
pub const BRAND_PLACEHOLDER: &str = "{marca}";

/// Placeholder replaced with the business description
pub const DESCRIPTION_PLACEHOLDER: &str = "{descripcion}";

/// Default instruction sent to the model
pub const DEFAULT_TEMPLATE: &str = "Analiza la marca '{marca}' para el giro '{descripcion}' en México. \
Responde solo un JSON con: viabilidad (0-100), clases (lista), nota (texto).";

/// Render `template` with both inputs embedded verbatim.
///
/// Substitution is single-pass: placeholder text occurring inside the
/// inputs themselves is left alone.
pub fn render(template: &str, brand: &str, description: &str) -> String {
    let mut out = String::with_capacity(template.len() + brand.len() + description.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix(BRAND_PLACEHOLDER) {
            out.push_str(brand);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(DESCRIPTION_PLACEHOLDER) {
            out.push_str(description);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Render the default template
pub fn build_prompt(brand: &str, description: &str) -> String {
    render(DEFAULT_TEMPLATE, brand, description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_embeds_inputs() {
        let prompt = build_prompt("Zyrqon", "software tools");
        assert!(prompt.contains("'Zyrqon'"));
        assert!(prompt.contains("'software tools'"));
        assert!(prompt.contains("viabilidad (0-100)"));
    }

    #[test]
    fn test_empty_inputs_pass_through() {
        let prompt = build_prompt("", "");
        assert!(prompt.starts_with("Analiza la marca '' para el giro ''"));
    }

    #[test]
    fn test_placeholder_inside_input_not_expanded() {
        let prompt = render("{marca}|{descripcion}", "{descripcion}", "cafe");
        assert_eq!(prompt, "{descripcion}|cafe");
    }

    #[test]
    fn test_unknown_braces_preserved() {
        let prompt = render("JSON {\"a\": 1} for {marca}", "X", "");
        assert_eq!(prompt, "JSON {\"a\": 1} for X");
    }
}
