/// Fixed system instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str =
    "You are an expert game development assistant specializing in HTML5 games.";

/// Embeds the caller's request in the rigid output template the file
/// extractor understands.
///
/// The template mandates `<FILE:name>` framing, a UTF-8 charset declaration,
/// `lang="en"`, English-only user-visible text, and no external network
/// references. These demands are a property of the prompt text only; nothing
/// enforces them on the returned content beyond the content-policy hook.
pub fn build_game_prompt(user_input: &str) -> String {
    format!(
        r#"Generate a complete HTML5 game for the following request: {user_input}

Requirements:
1. Produce a complete, playable HTML5 game containing all necessary HTML, CSS and JavaScript.
2. The game must be fully self-contained and must not reference any external resource, link or network endpoint.
3. Keep the code lean and suitable for modern browsers.
4. The game must be genuinely interactive and playable.
5. The HTML must declare UTF-8 encoding: <meta charset="UTF-8">.
6. The root element must carry the language attribute: <html lang="en">.
7. Every user-visible string (title, buttons, alerts, instructions) must be in English.

Output format — wrap each generated file in its own marker pair:

<FILE:index.html>
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Game title</title>
</head>
<body>
    <!-- game markup -->
    <script>
        // game logic
    </script>
</body>
</html>
</FILE:index.html>

<FILE:style.css>
/* stylesheet, if split out */
</FILE:style.css>

<FILE:script.js>
/* game logic, if split out */
</FILE:script.js>

If everything fits in a single HTML file, emit only index.html. Generate the game now:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_caller_request() {
        let prompt = build_game_prompt("a falling-blocks puzzle");
        assert!(prompt.contains("a falling-blocks puzzle"));
    }

    #[test]
    fn prompt_demands_marker_framing_and_encoding() {
        let prompt = build_game_prompt("pong");
        assert!(prompt.contains("<FILE:index.html>"));
        assert!(prompt.contains("</FILE:index.html>"));
        assert!(prompt.contains(r#"<meta charset="UTF-8">"#));
        assert!(prompt.contains(r#"<html lang="en">"#));
    }
}
