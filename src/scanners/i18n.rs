//! Internationalisation readiness: locale files, hardcoded Japanese UI
//! strings, and translation key suggestions.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use super::{display_path, project_files, read_lossy, ReportGenerator};

/// Locale directories probed in order, relative to the root.
const LOCALE_DIR_CANDIDATES: &[&str] = &["locales", "translations", "public/locales", "i18n"];

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Longer texts are reported but get no key suggestion.
const MAX_SUGGESTION_CHARS: usize = 100;

/// Characters of surrounding source kept on each side of a match.
const CONTEXT_CHARS: usize = 20;

const TOP_FILES: usize = 10;
const SAMPLE_SUGGESTIONS: usize = 20;
const LISTED_SUGGESTIONS: usize = 30;
const LISTED_LOCALE_FILES: usize = 5;

static JAPANESE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ぁ-んァ-ヶ一-龥]").expect("valid japanese regex"));
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']([^"']*[ぁ-んァ-ヶ一-龥][^"']*)["']"#).expect("valid quoted regex")
});
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]*[ぁ-んァ-ヶ一-龥][^`]*)`").expect("valid template regex")
});

/// Key prefixes, each with the words that select it. First match wins.
const KEY_RULES: &[(&str, &[&str])] = &[
    ("errors.", &["ください", "エラー", "失敗"]),
    ("actions.", &["追加", "削除", "保存", "編集", "キャンセル"]),
    ("labels.", &["氏名", "年齢", "日付", "時間"]),
];
const DEFAULT_KEY_PREFIX: &str = "common.";

/// A string literal containing Japanese text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardcodedText {
    pub line: usize,
    pub text: String,
    pub context: String,
}

/// A proposed translation key for a hardcoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySuggestion {
    pub key: String,
    pub text: String,
    pub file: String,
    pub line: usize,
}

/// Everything the i18n scanner found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct I18nDetection {
    pub locales_dir: Option<String>,
    /// Locale files keyed by language directory (`unknown` at top level).
    pub locale_files: IndexMap<String, Vec<String>>,
    /// Hardcoded texts keyed by file, in walk order.
    pub hardcoded: IndexMap<String, Vec<HardcodedText>>,
    pub suggestions: Vec<KeySuggestion>,
}

impl I18nDetection {
    pub fn hardcoded_count(&self) -> usize {
        self.hardcoded.values().map(Vec::len).sum()
    }
}

/// Scans for locale infrastructure and hardcoded Japanese strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct I18nScanner;

impl ReportGenerator for I18nScanner {
    type Detection = I18nDetection;

    const REPORT_FILENAME: &'static str = "i18n-analysis.md";

    fn detect(&self, root: &Path) -> I18nDetection {
        let locales_dir = LOCALE_DIR_CANDIDATES
            .iter()
            .map(|c| root.join(c))
            .find(|p| p.is_dir());

        let locale_files = locales_dir
            .as_deref()
            .map(|dir| find_locale_files(root, dir))
            .unwrap_or_default();

        let mut hardcoded = IndexMap::new();
        for path in project_files(root) {
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
            if !is_source {
                continue;
            }
            let Some(content) = read_lossy(&path) else {
                continue;
            };
            let texts = extract_hardcoded(&content);
            if !texts.is_empty() {
                hardcoded.insert(display_path(root, &path), texts);
            }
        }

        let suggestions = suggest_keys(&hardcoded);
        I18nDetection {
            locales_dir: locales_dir.map(|d| display_path(root, &d)),
            locale_files,
            hardcoded,
            suggestions,
        }
    }

    fn render(&self, detection: &I18nDetection) -> String {
        render_report(detection)
    }

    fn summarize(&self, detection: &I18nDetection) -> String {
        format!(
            "i18n_reviewer: {} hardcoded string(s) in {} file(s), {} key suggestion(s), locales dir: {}",
            detection.hardcoded_count(),
            detection.hardcoded.len(),
            detection.suggestions.len(),
            detection.locales_dir.as_deref().unwrap_or("none"),
        )
    }
}

fn find_locale_files(root: &Path, dir: &Path) -> IndexMap<String, Vec<String>> {
    let mut files: IndexMap<String, Vec<String>> = IndexMap::new();
    for path in project_files(dir) {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        let mut components = relative.components();
        let first = components.next();
        let lang = match (first, components.next()) {
            (Some(lang), Some(_)) => lang.as_os_str().to_string_lossy().into_owned(),
            _ => "unknown".to_string(),
        };
        files
            .entry(lang)
            .or_default()
            .push(display_path(root, &path));
    }
    files
}

/// Find string and template literals containing Japanese text. Lines that
/// start a comment are skipped.
pub fn extract_hardcoded(content: &str) -> Vec<HardcodedText> {
    let mut results = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") {
            continue;
        }
        for re in [&*QUOTED_RE, &*TEMPLATE_RE] {
            for c in re.captures_iter(line) {
                let (Some(whole), Some(inner)) = (c.get(0), c.get(1)) else {
                    continue;
                };
                let text = inner.as_str().trim();
                if !JAPANESE_RE.is_match(text) {
                    continue;
                }
                results.push(HardcodedText {
                    line: idx + 1,
                    text: text.to_string(),
                    context: context(line, whole.start(), whole.end()),
                });
            }
        }
    }
    results
}

/// The match plus up to [`CONTEXT_CHARS`] characters on each side.
fn context(line: &str, start: usize, end: usize) -> String {
    let from = line[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = line[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(line.len(), |(i, _)| end + i);
    line[from..to].trim().to_string()
}

/// Propose one key per distinct text of at most [`MAX_SUGGESTION_CHARS`]
/// characters.
pub fn suggest_keys(hardcoded: &IndexMap<String, Vec<HardcodedText>>) -> Vec<KeySuggestion> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut suggestions = Vec::new();
    for (file, texts) in hardcoded {
        for item in texts {
            if item.text.chars().count() > MAX_SUGGESTION_CHARS || !seen.insert(item.text.as_str()) {
                continue;
            }
            suggestions.push(KeySuggestion {
                key: translation_key(&item.text),
                text: item.text.clone(),
                file: file.clone(),
                line: item.line,
            });
        }
    }
    suggestions
}

/// `<prefix>text<NNNN>`, where the suffix is a stable hash of the text.
pub fn translation_key(text: &str) -> String {
    let prefix = KEY_RULES
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map_or(DEFAULT_KEY_PREFIX, |(prefix, _)| *prefix);
    format!("{prefix}text{}", xxh3_64(text.as_bytes()) % 10_000)
}

fn render_report(detection: &I18nDetection) -> String {
    let mut lines: Vec<String> = vec![
        "# Internationalization (i18n) Analysis Report".into(),
        String::new(),
        "## Infrastructure Detection".into(),
        String::new(),
    ];

    match &detection.locales_dir {
        None => {
            lines.push("⚠️ **No locales directory detected**".into());
            lines.push(String::new());
            lines.push("### Current State:".into());
            lines.push(format!(
                "- Found {} files with hardcoded Japanese text",
                detection.hardcoded.len()
            ));
            lines.push(format!(
                "- Total {} hardcoded strings detected",
                detection.hardcoded_count()
            ));
            lines.extend(
                [
                    "",
                    "### Recommendations:",
                    "- Set up an i18n library (next-i18next, react-i18next, etc.)",
                    "- Create a `locales/` directory structure:",
                    "  ```",
                    "  locales/",
                    "    ja/",
                    "      common.json",
                    "      errors.json",
                    "    en/",
                    "      common.json",
                    "      errors.json",
                    "  ```",
                    "- Replace hardcoded texts with translation function calls: `t('key')`",
                    "",
                ]
                .map(String::from),
            );
        }
        Some(dir) => {
            lines.push("✅ **Locales directory detected**".into());
            lines.push(String::new());
            lines.push(format!("**Location:** `{dir}`"));
            lines.push(String::new());
            if !detection.locale_files.is_empty() {
                lines.push("**Available locales:**".into());
                for (lang, files) in &detection.locale_files {
                    lines.push(format!("- `{lang}`: {} file(s)", files.len()));
                    lines.extend(
                        files
                            .iter()
                            .take(LISTED_LOCALE_FILES)
                            .map(|f| format!("  - `{f}`")),
                    );
                }
                lines.push(String::new());
            }
        }
    }

    if !detection.hardcoded.is_empty() {
        lines.push("## Hardcoded Japanese Text Analysis".into());
        lines.push(String::new());
        lines.push(format!("**Files with hardcoded text:** {}", detection.hardcoded.len()));
        lines.push(format!("**Total hardcoded strings:** {}", detection.hardcoded_count()));
        lines.push(String::new());
        lines.push(format!("### Top {TOP_FILES} Files:"));
        lines.push(String::new());

        let mut by_count: Vec<(&String, usize)> =
            detection.hardcoded.iter().map(|(f, t)| (f, t.len())).collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));
        lines.extend(
            by_count
                .iter()
                .take(TOP_FILES)
                .map(|(file, n)| format!("- `{file}`: {n} strings")),
        );
        lines.push(String::new());
    }

    let suggestions = &detection.suggestions;
    if !suggestions.is_empty() {
        lines.push("## Translation Key Suggestions".into());
        lines.push(String::new());
        lines.push(format!("**Total suggestions:** {}", suggestions.len()));
        lines.push(String::new());
        lines.push(format!("### Sample Translations (first {SAMPLE_SUGGESTIONS}):"));
        lines.push(String::new());

        let sample: IndexMap<&str, &str> = suggestions
            .iter()
            .take(SAMPLE_SUGGESTIONS)
            .map(|s| (s.key.as_str(), s.text.as_str()))
            .collect();
        lines.push("```json".into());
        lines.push(serde_json::to_string_pretty(&sample).unwrap_or_else(|_| "{}".into()));
        lines.push("```".into());
        lines.push(String::new());
        lines.push("### Full Suggestion List:".into());
        lines.push(String::new());
        for s in suggestions.iter().take(LISTED_SUGGESTIONS) {
            lines.push(format!("- **`{}`**: \"{}\"", s.key, s.text));
            lines.push(format!("  - File: `{}` (line {})", s.file, s.line));
        }
        if suggestions.len() > LISTED_SUGGESTIONS {
            lines.push(format!(
                "- ... and {} more",
                suggestions.len() - LISTED_SUGGESTIONS
            ));
        }
        lines.push(String::new());
    }

    lines.extend(
        [
            "---",
            "",
            "## Action Items",
            "",
            "1. **Set up an i18n library** if not already configured",
            "2. **Create translation files** in the `locales/<lang>/` directory",
            "3. **Replace hardcoded strings** with `t('key')` function calls",
            "4. **Add English translations** for all keys",
            "5. **Configure a language switcher** in the UI",
            "6. **Test all translations** before deployment",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"import { toast } from "sonner";
// "コメントの日本語"
/* '無視される' */
export function Form() {
  alert("氏名を入力してください");
  const label = '保存';
  const msg = `こんにちは ${name}`;
  const en = "english only";
  return <button title="保存">{"日付"}</button>;
}
"#;

    #[test]
    fn extracts_literals_and_skips_comments() {
        let texts = extract_hardcoded(SOURCE);
        let found: Vec<(usize, &str)> = texts.iter().map(|t| (t.line, t.text.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (5, "氏名を入力してください"),
                (6, "保存"),
                (7, "こんにちは ${name}"),
                (9, "保存"),
                (9, "日付"),
            ]
        );
        assert_eq!(texts[0].context, r#"alert("氏名を入力してください");"#);
    }

    #[test]
    fn key_prefix_rules() {
        assert!(translation_key("氏名を入力してください").starts_with("errors.text"));
        assert!(translation_key("保存").starts_with("actions.text"));
        assert!(translation_key("日付").starts_with("labels.text"));
        assert!(translation_key("こんにちは").starts_with("common.text"));
    }

    #[test]
    fn keys_are_stable() {
        assert_eq!(translation_key("保存"), translation_key("保存"));
        let suffix: u64 = translation_key("保存")
            .trim_start_matches("actions.text")
            .parse()
            .unwrap();
        assert!(suffix < 10_000);
    }

    #[test]
    fn suggestions_dedupe_and_skip_long_texts() {
        let mut hardcoded = IndexMap::new();
        let long = "あ".repeat(101);
        hardcoded.insert(
            "a.tsx".to_string(),
            vec![
                HardcodedText { line: 1, text: "保存".into(), context: String::new() },
                HardcodedText { line: 2, text: long, context: String::new() },
            ],
        );
        hardcoded.insert(
            "b.tsx".to_string(),
            vec![HardcodedText { line: 3, text: "保存".into(), context: String::new() }],
        );
        let suggestions = suggest_keys(&hardcoded);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].file, "a.tsx");
        assert_eq!(suggestions[0].line, 1);
    }

    #[test]
    fn detect_with_locales_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("locales/ja")).unwrap();
        std::fs::create_dir_all(root.join("app")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        std::fs::write(root.join("locales/ja/common.json"), "{}").unwrap();
        std::fs::write(root.join("locales/index.json"), "{}").unwrap();
        std::fs::write(root.join("app/page.tsx"), SOURCE).unwrap();
        std::fs::write(root.join("node_modules/lib/x.js"), "alert('エラー')").unwrap();

        let detection = I18nScanner.detect(root);
        assert_eq!(detection.locales_dir.as_deref(), Some("locales"));
        assert_eq!(detection.locale_files["ja"].len(), 1);
        assert_eq!(detection.locale_files["unknown"].len(), 1);
        assert_eq!(detection.hardcoded.len(), 1);
        assert_eq!(detection.hardcoded_count(), 5);
        // "保存" appears twice but is suggested once.
        assert_eq!(detection.suggestions.len(), 4);

        let report = I18nScanner.render(&detection);
        assert!(report.contains("✅ **Locales directory detected**"));
        assert!(report.contains("- `app/page.tsx`: 5 strings"));
        assert!(report.contains("## Translation Key Suggestions"));
        assert!(report.contains("## Action Items"));
    }

    #[test]
    fn detect_without_locales_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.ts"), "const a = 1;\n").unwrap();
        let detection = I18nScanner.detect(dir.path());
        assert!(detection.locales_dir.is_none());
        assert!(detection.suggestions.is_empty());
        let report = I18nScanner.render(&detection);
        assert!(report.contains("No locales directory detected"));
        assert!(report.contains("- Found 0 files with hardcoded Japanese text"));
        assert!(
            I18nScanner
                .summarize(&detection)
                .ends_with("locales dir: none")
        );
    }
}
