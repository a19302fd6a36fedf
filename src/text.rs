//! Plain-text helpers shared by the stages and their checks.

use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Ended by `.`, `!` or `?`
    Terminal,
    /// Run-on clause ended by `, ` before a capitalised word
    Comma,
    /// Rest of the line
    End,
}

#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    text: &'a str,
    sep: &'a str,
    boundary: Boundary,
}

/// Removes every sentence that repeats an earlier one, keeping the first.
///
/// Sentences are compared on their lowercased words, so punctuation and
/// spacing differences do not hide a repeat. Run-on clauses joined with a
/// comma ("The water is murky, The water is murky.") count as sentences.
/// Line structure is kept; lines left empty are dropped.
pub fn dedupe_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }

        let segments = split_segments(line);
        let kept: Vec<bool> = segments
            .iter()
            .map(|segment| {
                let key = normalize(segment.text);
                key.is_empty() || seen.insert(key)
            })
            .collect();

        let mut rebuilt = String::with_capacity(line.len());
        for (i, segment) in segments.iter().enumerate() {
            if !kept[i] {
                continue;
            }
            rebuilt.push_str(segment.text);
            let next_kept = kept.get(i + 1).copied().unwrap_or(false);
            match segment.boundary {
                Boundary::Comma if next_kept => rebuilt.push_str(segment.sep),
                Boundary::Comma => {
                    rebuilt.push('.');
                    rebuilt.push(' ');
                }
                _ => rebuilt.push_str(segment.sep),
            }
        }

        let rebuilt = rebuilt.trim_end();
        if !rebuilt.trim().is_empty() {
            lines.push(rebuilt.to_string());
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Sentences of `text` that appear more than once, normalised.
pub fn duplicate_sentences(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for line in text.lines() {
        for segment in split_segments(line) {
            let key = normalize(segment.text);
            if !key.is_empty() && !seen.insert(key.clone()) {
                duplicates.push(key);
            }
        }
    }
    duplicates
}

fn split_segments(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (idx, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);

        let boundary = match c {
            '.' | '!' | '?' if next.map_or(true, char::is_whitespace) => {
                let body = line[start..idx].trim();
                let following = next_visible(&chars[i + 1..]);
                // list numbering such as "1."
                if body.chars().all(|ch| ch.is_ascii_digit())
                    || (c == '.' && ends_with_abbreviation(body))
                    || following.is_some_and(|ch| !ch.is_uppercase())
                {
                    None
                } else {
                    Some((Boundary::Terminal, idx + c.len_utf8()))
                }
            }
            ',' if next == Some(' ') => {
                let after = next_visible(&chars[i + 1..]);
                let words = line[start..idx].split_whitespace().count();
                if after.is_some_and(char::is_uppercase) && words >= 3 {
                    Some((Boundary::Comma, idx))
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some((kind, text_end)) = boundary {
            // separator runs to the next non-whitespace char
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            let sep_end = chars.get(j).map_or(line.len(), |&(k, _)| k);
            segments.push(Segment {
                text: &line[start..text_end],
                sep: &line[text_end..sep_end],
                boundary: kind,
            });
            start = sep_end;
            i = j;
            continue;
        }
        i += 1;
    }

    if start < line.len() {
        segments.push(Segment {
            text: &line[start..],
            sep: "",
            boundary: Boundary::End,
        });
    }
    segments
}

/// Abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: [&str; 12] = [
    "e.g", "i.e", "approx", "etc", "vs", "cf", "ca", "fig", "no", "dr", "mr", "st",
];

fn next_visible(chars: &[(usize, char)]) -> Option<char> {
    chars
        .iter()
        .map(|&(_, ch)| ch)
        .find(|ch| !ch.is_whitespace())
}

fn ends_with_abbreviation(body: &str) -> bool {
    let word = body
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

fn normalize(sentence: &str) -> String {
    let sentence = sentence.trim_start().trim_start_matches('#').trim_start();
    strip_list_marker(sentence)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops Markdown markup, keeping the words.
pub fn strip_markdown(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.trim_start_matches('#').trim_start_matches('>');
            let line = strip_list_marker(line.trim_start());
            let line = strip_links(line);
            line.replace(['*', '_', '`'], "")
        })
        .filter(|line| !line.trim().is_empty() && !is_rule(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest;
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return rest;
        }
    }
    line
}

// [text](url) -> text
fn strip_links(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find("](").map(|c| open + c) else {
            break;
        };
        let Some(end) = rest[close..].find(')').map(|e| close + e) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[open + 1..close]);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| matches!(c, '-' | '=' | '|' | ':' | ' '))
}

/// Lowercased words of `text`.
pub fn token_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Share of `source` tokens that also appear in `rendered` once markup is removed.
pub fn token_coverage(source: &str, rendered_markdown: &str) -> f64 {
    let source_tokens = token_set(source);
    if source_tokens.is_empty() {
        return 1.0;
    }
    let rendered_tokens = token_set(&strip_markdown(rendered_markdown));
    let covered = source_tokens.intersection(&rendered_tokens).count();
    covered as f64 / source_tokens.len() as f64
}

/// Number of level-one headings (`# Title`) outside code fences.
pub fn top_level_sections(markdown: &str) -> usize {
    let mut in_fence = false;
    markdown
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                return false;
            }
            !in_fence && trimmed.starts_with("# ")
        })
        .count()
}

/// Blank-line separated paragraphs.
#[cfg(test)]
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Removes a single code fence wrapped around the whole text.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") || !trimmed.ends_with("```") || trimmed.len() < 6 {
        return trimmed;
    }
    let Some(first_newline) = trimmed.find('\n') else {
        return trimmed;
    };
    let body = &trimmed[first_newline + 1..trimmed.len() - 3];
    // an inner fence means the outer one is not a wrapper
    if body.contains("```") {
        return trimmed;
    }
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_on_duplicate_collapses_to_one_mention() {
        let deduped = dedupe_sentences("The water is murky, The water is murky. No sediment visible.");
        assert_eq!(deduped, "The water is murky. No sediment visible.");
        assert_eq!(deduped.matches("murky").count(), 1);
    }

    #[test]
    fn duplicates_across_lines_are_removed() {
        let text = "The water looks unsafe.\n\nThe water looks unsafe.\nAlgae present.";
        assert_eq!(dedupe_sentences(text), "The water looks unsafe.\n\nAlgae present.");

        let text = "Algae present. Foam on surface.\nALGAE PRESENT!\nFoam on surface.";
        assert_eq!(dedupe_sentences(text), "Algae present. Foam on surface.");
    }

    #[test]
    fn text_without_duplicates_is_unchanged() {
        let text = "1. Safety Overview: Low risk.\n2. Key Features: Clear, calm water.\n\n3. Classification (Clean, Polluted, Requires Further Testing): Clean.";
        assert_eq!(dedupe_sentences(text), text);
    }

    #[test]
    fn abbreviations_do_not_split_distinct_sentences() {
        let text = "Further testing (e.g. lab analysis) is recommended. \
            Further testing (e.g. microbial counts) is required.";
        assert_eq!(dedupe_sentences(text), text);

        let text = "Visibility is approx. 1 meter. Secchi depth is approx. 1 meter.";
        assert_eq!(dedupe_sentences(text), text);
        assert!(duplicate_sentences(text).is_empty());
    }

    #[test]
    fn period_before_lowercase_word_is_not_a_boundary() {
        let text = "Foam near the inlet, i.e. along the bank. Foam near the inlet, i.e. by the weir.";
        assert_eq!(dedupe_sentences(text), text);
        assert_eq!(
            dedupe_sentences("Algae etc. visible. Algae etc. visible."),
            "Algae etc. visible."
        );
    }

    #[test]
    fn numbered_items_are_not_sentences() {
        assert_eq!(
            dedupe_sentences("1. Murky water.\n2. Murky water."),
            "1. Murky water."
        );
    }

    #[test]
    fn duplicate_sentences_are_listed() {
        assert_eq!(
            duplicate_sentences("Calm. Calm. Clear."),
            vec!["calm".to_string()]
        );
        assert!(duplicate_sentences("Calm. Clear.").is_empty());
    }

    #[test]
    fn strip_markdown_keeps_words() {
        let markdown = "# Safety Overview\n\n- **Murky** water\n1. See [guide](http://x)\n---\n> `pH` unknown";
        assert_eq!(
            strip_markdown(markdown),
            "Safety Overview\nMurky water\nSee guide\npH unknown"
        );
    }

    #[test]
    fn coverage_detects_dropped_content() {
        let source = "The water is murky. No sediment visible.";
        assert_eq!(
            token_coverage(source, "# Appearance\n- The water is murky.\n- No sediment visible."),
            1.0
        );
        assert!(token_coverage(source, "# Appearance\n- Murky.") < 0.5);
    }

    #[test]
    fn counts_only_level_one_headings() {
        let markdown = "# One\n## Sub\n# Two\n```\n# not a heading\n```\n# Three";
        assert_eq!(top_level_sections(markdown), 3);
    }

    #[test]
    fn splits_paragraphs_on_blank_lines() {
        let text = "Safety is low.\n\n\nFeatures: algae.\nMore algae.\n\nEconomy: costly.";
        assert_eq!(
            paragraphs(text),
            vec!["Safety is low.", "Features: algae.\nMore algae.", "Economy: costly."]
        );
    }

    #[test]
    fn wrapping_fence_is_removed() {
        assert_eq!(strip_code_fence("```markdown\n# Title\n- item\n```"), "# Title\n- item");
        assert_eq!(strip_code_fence("# Title"), "# Title");
        let nested = "```\na\n```\ntext\n```\nb\n```";
        assert_eq!(strip_code_fence(nested), nested);
    }
}
