//! Presentation-only mapping from raw agent payloads to short summaries.
//!
//! Nothing here feeds back into session transitions.

use regex::Regex;

const PREVIEW_CHARS: usize = 40;

/// Render a raw tool-invocation line as a short operator-facing summary.
///
/// First matching action keyword wins; each pattern pulls its salient
/// argument out of the python-repr argument dict when present.
pub fn format_tool_log(raw: &str) -> String {
    let text = raw.replace("🔧 ", "");
    if text.contains("navigate") {
        let url = extract_arg(&text, "url").unwrap_or_else(|| "сайт".to_string());
        return format!("🌐 Перехожу: {url}");
    }
    if text.contains("click") {
        let selector = extract_arg(&text, "selector")
            .map(|selector| selector.replace("text=", ""))
            .unwrap_or_else(|| "элемент".to_string());
        return format!("👆 Клик: {selector}");
    }
    if text.contains("type_text") || text.contains("fill") {
        let typed = extract_arg(&text, "text").unwrap_or_else(|| "...".to_string());
        return format!("✍️ Ввод: \"{typed}\"");
    }
    if text.contains("press_key") {
        return "↵ Enter".to_string();
    }
    if text.contains("scroll") {
        return "📜 Скролл...".to_string();
    }
    if text.contains("get_page_content") {
        return "👀 Смотрю на страницу...".to_string();
    }
    if text.contains("wait") {
        return "⏳ Жду...".to_string();
    }
    format!("⚙️ {}", preview(&text))
}

/// Render a task-completion payload as the final agent entry.
pub fn summarize_success(raw: &str) -> String {
    let rest = raw.replacen("Task completed", "", 1);
    let rest = rest.trim();
    let rest = rest
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(rest);
    format!("✅ Готово! {}", rest.trim())
}

fn extract_arg(text: &str, key: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"'{key}':\s*'([^']+)'")).expect("valid regex");
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_extracts_url() {
        assert_eq!(
            format_tool_log("🔧 navigate {'url': 'example.com'}"),
            "🌐 Перехожу: example.com"
        );
        assert_eq!(format_tool_log("navigate {}"), "🌐 Перехожу: сайт");
    }

    #[test]
    fn click_strips_text_selector_prefix() {
        assert_eq!(
            format_tool_log("🔧 click {'selector': 'text=Войти'}"),
            "👆 Клик: Войти"
        );
        assert_eq!(
            format_tool_log("🔧 click {'selector': '#submit'}"),
            "👆 Клик: #submit"
        );
        assert_eq!(format_tool_log("click"), "👆 Клик: элемент");
    }

    #[test]
    fn typing_quotes_the_entered_text() {
        assert_eq!(
            format_tool_log("🔧 type_text {'selector': '#q', 'text': 'борщ'}"),
            "✍️ Ввод: \"борщ\""
        );
        assert_eq!(
            format_tool_log("🔧 fill {'selector': '#q'}"),
            "✍️ Ввод: \"...\""
        );
    }

    #[test]
    fn fixed_summaries_for_remaining_actions() {
        assert_eq!(format_tool_log("🔧 press_key {'key': 'Enter'}"), "↵ Enter");
        assert_eq!(format_tool_log("🔧 scroll {'direction': 'down'}"), "📜 Скролл...");
        assert_eq!(
            format_tool_log("🔧 get_page_content {}"),
            "👀 Смотрю на страницу..."
        );
        assert_eq!(format_tool_log("🔧 wait {'seconds': '2'}"), "⏳ Жду...");
    }

    #[test]
    fn unmatched_tools_fall_back_to_truncated_preview() {
        let raw = "🔧 report_result {'result': 'нашёл три варианта дешевле тысячи рублей'}";
        let rendered = format_tool_log(raw);
        assert!(rendered.starts_with("⚙️ "));
        let body = rendered.trim_start_matches("⚙️ ");
        assert_eq!(body.chars().count(), 40);
        assert!(body.starts_with("report_result"));
    }

    #[test]
    fn success_summary_unwraps_braces() {
        assert_eq!(
            summarize_success("Task completed {done}"),
            "✅ Готово! done"
        );
        assert_eq!(summarize_success("Task completed"), "✅ Готово! ");
        assert_eq!(
            summarize_success("Task completed нашёл билеты"),
            "✅ Готово! нашёл билеты"
        );
    }
}
