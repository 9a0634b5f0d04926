use std::collections::HashSet;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::model::*;
use crate::settings::{extract_globals, GlobalDefaults};
use crate::token;

const TICK: char = '✓';

static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]").expect("valid regex"));
static QUESTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[.)](?:\s+|$)").expect("valid regex"));
static ANSWER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[Answer:[^\]]+\]").expect("valid regex"));
static ANSWER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[Answer:\s*([A-Z,\s]+)\]").expect("valid regex"));
static TICK_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)([A-Z])\s*✓").expect("valid regex"));
static POINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*\+?(\d*\.?\d+)\s*/\s*([-+]?\d*\.?\d+)\s*\)").expect("valid regex")
});
static TIMER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(time:\s*(\d+)s?\)").expect("valid regex"));
static EXPLANATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[Explanation:\s*([^\]\n]*?)\s*\]").expect("valid regex"));
// Anything that opens an inline annotation ends the option text in front of it.
static OPTION_STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\((?:time\b|\+|default\s*timer|negative\s*:|all[\s-]visible)",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub author: String,
    pub base_url: String,
    pub language: String,
    pub token_length: usize,
    pub settings: QuizSettings,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            author: "Teacher".to_string(),
            base_url: "http://localhost:8080".to_string(),
            language: "en".to_string(),
            token_length: DEFAULT_TOKEN_LENGTH,
            settings: QuizSettings::default(),
        }
    }
}

pub fn parse_document(text: &str, author: &str) -> ParseResult {
    let options = ParseOptions {
        author: author.to_string(),
        ..ParseOptions::default()
    };
    parse_document_with(text, &options)
}

pub fn parse_document_with(text: &str, options: &ParseOptions) -> ParseResult {
    parse_document_at(text, options, &mut rand::thread_rng(), Utc::now())
}

/// Same as [`parse_document_with`] with the random source and clock supplied
/// by the caller.
pub fn parse_document_at<R: Rng + ?Sized>(
    text: &str,
    options: &ParseOptions,
    rng: &mut R,
    now: DateTime<Utc>,
) -> ParseResult {
    let globals = extract_globals(text, &options.settings);
    let mut diag = Diagnostics {
        warnings: globals.warnings.clone(),
        ..Diagnostics::default()
    };

    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.lines().collect();
    let (title, description, start) = split_header(&lines);

    let mut questions: Vec<Question> = Vec::new();
    let mut seen_numbers: HashSet<String> = HashSet::new();

    for block in split_blocks(&lines[start..]) {
        if block.content.trim().is_empty() {
            log::debug!("skipping empty block for question {}", block.number);
            continue;
        }
        if let Some(question) = parse_block(&block, &globals, &mut diag) {
            if !seen_numbers.insert(block.number.clone()) {
                diag.warn(&block.number, "Duplicate question number");
            }
            questions.push(question);
        }
    }

    if questions.is_empty() {
        diag.errors.push("No valid questions found in the document".to_string());
    }

    log::debug!(
        "parsed {} question(s), {} error(s), {} warning(s)",
        questions.len(),
        diag.errors.len(),
        diag.warnings.len()
    );

    let token = token::generate_token_with(rng, options.token_length);
    let quiz_id = token::generate_quiz_id_with(rng, &title, now.date_naive());

    let quiz = QuizDraft {
        join: Join {
            join_url_pattern: format!(
                "{}/j/{{quizId}}?t={{token}}",
                options.base_url.trim_end_matches('/')
            ),
            qr_payload: format!("{}|{}", quiz_id, token),
            token_length: options.token_length,
            token,
        },
        quiz_id,
        title,
        description,
        settings: globals.settings,
        questions,
        participants: Vec::new(),
        leaderboard: Leaderboard::default(),
        metadata: Metadata {
            created_by: options.author.clone(),
            created_at: now,
            language: options.language.clone(),
            notes: diag.warnings.join("; "),
            source_hash: source_hash(text),
        },
        errors: diag.errors.clone(),
        warnings: diag.warnings.clone(),
        answer_key_missing: diag.answer_key_missing,
        status: if diag.answer_key_missing {
            QuizStatus::Draft
        } else {
            QuizStatus::Ready
        },
        current_question_index: -1,
    };

    ParseResult {
        quiz,
        errors: diag.errors,
        warnings: diag.warnings,
        answer_key_missing: diag.answer_key_missing,
    }
}

#[derive(Debug, Default)]
struct Diagnostics {
    errors: Vec<String>,
    warnings: Vec<String>,
    answer_key_missing: bool,
}

impl Diagnostics {
    fn warn(&mut self, number: &str, message: &str) {
        self.warnings.push(format!("Question {}: {}", number, message));
    }
}

#[derive(Debug)]
struct Block {
    number: String,
    content: String,
}

fn split_header(lines: &[&str]) -> (String, String, usize) {
    let first = match lines.first() {
        Some(line) if !is_numbered(line) => line.trim(),
        _ => return (UNTITLED_QUIZ.to_string(), String::new(), 0),
    };

    let title = first.strip_prefix('#').unwrap_or(first).trim();
    let title = if title.is_empty() {
        UNTITLED_QUIZ.to_string()
    } else {
        title.to_string()
    };

    match lines.get(1) {
        Some(second) if !second.trim().is_empty() && !is_numbered(second) => {
            (title, second.trim().to_string(), 2)
        }
        _ => (title, String::new(), 1),
    }
}

fn is_numbered(line: &str) -> bool {
    NUMBERED_LINE.is_match(line.trim_start())
}

/// Cuts the body into question blocks. Lines before the first marker are
/// preamble and belong to no block.
fn split_blocks(lines: &[&str]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in lines {
        let trimmed = line.trim_start();
        if let Some(caps) = QUESTION_MARKER.captures(trimmed) {
            let marker_end = caps.get(0).map_or(0, |m| m.end());
            blocks.push(Block {
                number: caps[1].to_string(),
                content: trimmed[marker_end..].to_string(),
            });
        } else if let Some(block) = blocks.last_mut() {
            block.content.push('\n');
            block.content.push_str(line);
        }
    }

    blocks
}

fn parse_block(block: &Block, globals: &GlobalDefaults, diag: &mut Diagnostics) -> Option<Question> {
    let n = block.number.as_str();
    let raw = block.content.as_str();

    // Ticks stay in for now so the tokenizer can see which options carry one.
    let without_key = ANSWER_TAG.replace_all(raw, "");
    let scan = scan_options(&without_key);

    if scan.options.len() < 2 {
        log::debug!("question {}: {} option(s), discarded", n, scan.options.len());
        diag.errors.push(format!("Question {}: Must have at least 2 options", n));
        return None;
    }

    let stem = match scan.stem_end {
        Some(0) => String::new(),
        Some(end) => strip_ticks(&without_key[..end]),
        None => strip_ticks(without_key.lines().next().unwrap_or("")),
    };

    let (correct, ignored) = answer_key(raw, &scan.options);
    for token in &ignored {
        diag.warn(n, &format!("Answer key ignores unrecognised text \"{}\"", token));
    }
    if correct.is_empty() {
        diag.answer_key_missing = true;
        diag.warn(n, "Answer key missing, please specify correct answer");
    }

    // A bare `(P / M)` inside an option is option text, e.g. `A) (1/2)`.
    let points = POINTS
        .captures_iter(&without_key)
        .find(|caps| caps.get(0).map_or(false, |m| !scan.in_option(m.start())));
    let (points_if_correct, points_if_wrong) = match points {
        Some(caps) => (
            caps[1].parse::<f64>().unwrap_or(1.0),
            caps[2].parse::<f64>().unwrap_or(globals.points_if_wrong()),
        ),
        None => (1.0, globals.points_if_wrong()),
    };

    let timer_seconds = match TIMER.captures(raw).map(|caps| caps[1].parse::<u32>()) {
        Some(Ok(secs)) if secs < MIN_TIMER_SECONDS => {
            diag.warn(n, "Timer increased to minimum 3 seconds");
            MIN_TIMER_SECONDS
        }
        Some(Ok(secs)) => secs,
        Some(Err(_)) => {
            diag.warn(n, "Timer value out of range, using default");
            globals.timer_seconds()
        }
        None => globals.timer_seconds(),
    };

    let explanation = EXPLANATION
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
        .filter(|text| !text.is_empty());

    let options: Vec<QuizOption> = scan
        .options
        .into_iter()
        .map(|o| QuizOption {
            oid: o.oid,
            text: o.text,
        })
        .collect();

    if stem.is_empty() {
        diag.warn(n, "Question text is missing");
    }
    let mut seen_oids = HashSet::new();
    for option in &options {
        if !seen_oids.insert(option.oid) {
            diag.warn(n, &format!("Duplicate option {}", option.oid));
        }
        if option.text.is_empty() {
            diag.warn(n, &format!("Option {} has no text", option.oid));
        }
    }
    for oid in &correct {
        if !seen_oids.contains(oid) {
            diag.warn(n, &format!("Answer key references undeclared option {}", oid));
        }
    }

    log::debug!(
        "question {}: {} option(s), correct={:?}, timer={}s",
        n,
        options.len(),
        correct,
        timer_seconds
    );

    Some(Question {
        qid: format!("q{}", n),
        raw_text: raw.trim().to_string(),
        stem,
        media: Vec::new(),
        options,
        correct,
        points_if_correct,
        points_if_wrong,
        timer_seconds,
        open_at: None,
        close_at: None,
        explanation,
    })
}

/// `[Answer: ...]` wins; otherwise ticked options, then a bare `X ✓`.
/// Also returns the answer-key words that were not read as letters.
fn answer_key(raw: &str, options: &[ScannedOption]) -> (Vec<char>, Vec<String>) {
    if let Some(caps) = ANSWER_KEY.captures(raw) {
        let (letters, ignored) = answer_letters(&caps[1]);
        if !letters.is_empty() {
            return (letters, ignored);
        }
    }

    let ticked = unique_letters(options.iter().filter(|o| o.ticked).map(|o| o.oid));
    if !ticked.is_empty() {
        return (ticked, Vec::new());
    }

    let bare = unique_letters(
        TICK_LETTER
            .captures_iter(raw)
            .filter_map(|caps| caps[1].chars().next()),
    );
    (bare, Vec::new())
}

/// `B, C` and `B C` list letters. A run like `AB` only counts as letters
/// when no single-letter token is present, so `B or C` keeps just B and C.
fn answer_letters(list: &str) -> (Vec<char>, Vec<String>) {
    let tokens: Vec<&str> = list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| t.chars().count() == 1) {
        let (single, words): (Vec<&str>, Vec<&str>) =
            tokens.into_iter().partition(|t| t.chars().count() == 1);
        let letters = unique_letters(single.iter().flat_map(|t| t.chars()));
        (letters, words.into_iter().map(str::to_string).collect())
    } else {
        (unique_letters(tokens.iter().flat_map(|t| t.chars())), Vec::new())
    }
}

fn unique_letters(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut letters: Vec<char> = Vec::new();
    for c in chars.filter(|c| c.is_ascii_alphabetic()) {
        let c = c.to_ascii_uppercase();
        if !letters.contains(&c) {
            letters.push(c);
        }
    }
    letters
}

fn strip_ticks(text: &str) -> String {
    text.replace(TICK, "").trim().to_string()
}

fn source_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("sha256:{}", hex)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    Stem,
    Option { oid: char, start: usize },
    // Past an annotation; text is dropped until the next option marker.
    Skip,
}

#[derive(Debug)]
struct ScannedOption {
    oid: char,
    text: String,
    ticked: bool,
    span: (usize, usize),
}

#[derive(Debug, Default)]
struct OptionScan {
    options: Vec<ScannedOption>,
    stem_end: Option<usize>,
}

impl OptionScan {
    fn close(&mut self, state: ScanState, content: &str, end: usize) {
        if let ScanState::Option { oid, start } = state {
            let raw = content.get(start..end).unwrap_or("");
            self.options.push(ScannedOption {
                oid,
                ticked: raw.contains(TICK),
                text: strip_ticks(raw),
                span: (start, end),
            });
        }
    }

    fn in_option(&self, pos: usize) -> bool {
        self.options
            .iter()
            .any(|o| o.span.0 <= pos && pos < o.span.1)
    }
}

fn scan_options(content: &str) -> OptionScan {
    let stops: Vec<usize> = OPTION_STOP.find_iter(content).map(|m| m.start()).collect();
    let mut scan = OptionScan::default();
    let mut state = ScanState::Stem;
    let mut prev: Option<char> = None;

    for (i, c) in content.char_indices() {
        if let Some(body) = option_marker(content, i, c, prev) {
            scan.close(state, content, i);
            scan.stem_end.get_or_insert(i);
            state = ScanState::Option { oid: c, start: body };
        } else if c == '[' || stops.binary_search(&i).is_ok() {
            if let ScanState::Option { .. } = state {
                scan.close(state, content, i);
                state = ScanState::Skip;
            }
        } else if c == TICK && state == ScanState::Skip {
            // `B) yes (time: 5s) ✓` still ticks B.
            if let Some(last) = scan.options.last_mut() {
                last.ticked = true;
            }
        }
        prev = Some(c);
    }
    scan.close(state, content, content.len());

    scan
}

/// An uppercase letter at a word start followed by `.` or `)` and then
/// whitespace or the end. Returns where the option text begins.
fn option_marker(content: &str, i: usize, c: char, prev: Option<char>) -> Option<usize> {
    if !c.is_ascii_uppercase() || prev.is_some_and(|p| !p.is_whitespace()) {
        return None;
    }
    let rest = &content[i + 1..];
    let after = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    let body = after.trim_start();
    if !after.is_empty() && body.len() == after.len() {
        return None;
    }
    Some(content.len() - body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(scan: &OptionScan) -> Vec<(char, &str)> {
        scan.options.iter().map(|o| (o.oid, o.text.as_str())).collect()
    }

    #[test]
    fn scan_inline_options() {
        let scan = scan_options("What is 2+2? A) 3 B) 4 C) 5");
        assert_eq!(texts(&scan), vec![('A', "3"), ('B', "4"), ('C', "5")]);
        assert_eq!(scan.stem_end, Some(13));
    }

    #[test]
    fn scan_stops_at_annotations() {
        let scan = scan_options("Pick one\nA. red (time: 5s) ignored\nB. blue [Explanation: x]\n(+2 / -1)");
        assert_eq!(texts(&scan), vec![('A', "red"), ('B', "blue")]);
    }

    #[test]
    fn abbreviations_are_not_options() {
        let scan = scan_options("Capital of the U.S.? A) Washington B) Boston");
        assert_eq!(texts(&scan), vec![('A', "Washington"), ('B', "Boston")]);
    }

    #[test]
    fn ticks_are_recorded() {
        let scan = scan_options("Q? A) no B) yes ✓");
        assert!(!scan.options[0].ticked);
        assert!(scan.options[1].ticked);
        assert_eq!(scan.options[1].text, "yes");
    }

    #[test]
    fn parenthesized_fractions_stay_in_option_text() {
        let scan = scan_options("What is half of one? A) (1/2) B) (1/3)");
        assert_eq!(texts(&scan), vec![('A', "(1/2)"), ('B', "(1/3)")]);
    }

    #[test]
    fn tick_after_annotation_marks_previous_option() {
        let scan = scan_options("Q? A) no B) yes (time: 5s) ✓");
        assert!(!scan.options[0].ticked);
        assert!(scan.options[1].ticked);
        assert_eq!(scan.options[1].text, "yes");
    }

    #[test]
    fn marker_at_end_has_empty_text() {
        let scan = scan_options("Q? A) x B)");
        assert_eq!(texts(&scan), vec![('A', "x"), ('B', "")]);
    }

    #[test]
    fn header_detection() {
        let lines = vec!["# Biology", "Unit 2 review", "1) Q"];
        assert_eq!(
            split_header(&lines),
            ("Biology".to_string(), "Unit 2 review".to_string(), 2)
        );

        let lines = vec!["Biology", "", "1) Q"];
        assert_eq!(split_header(&lines), ("Biology".to_string(), String::new(), 1));

        let lines = vec!["1) Q", "A) x"];
        assert_eq!(split_header(&lines), (UNTITLED_QUIZ.to_string(), String::new(), 0));
    }

    #[test]
    fn blocks_follow_markers() {
        let lines = vec!["intro text", "1. First", "A) a", "  2) Second", "10.", "B) b"];
        let blocks = split_blocks(&lines);
        let numbers: Vec<&str> = blocks.iter().map(|b| b.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "10"]);
        assert_eq!(blocks[0].content, "First\nA) a");
        assert_eq!(blocks[2].content, "\nB) b");
    }

    fn option(oid: char, ticked: bool) -> ScannedOption {
        ScannedOption { oid, text: "x".into(), ticked, span: (0, 0) }
    }

    #[test]
    fn answer_key_precedence() {
        let options = vec![option('A', true), option('B', false)];
        assert_eq!(answer_key("[answer: b, c]", &options).0, vec!['B', 'C']);
        assert_eq!(answer_key("no key here", &options).0, vec!['A']);
        assert_eq!(answer_key("[Answer: ]", &options).0, vec!['A']);

        let unticked = vec![option('A', false)];
        assert_eq!(answer_key("Correct: C ✓", &unticked).0, vec!['C']);
        assert!(answer_key("nothing", &unticked).0.is_empty());
    }

    #[test]
    fn answer_key_words() {
        assert_eq!(
            answer_letters("B or C"),
            (vec!['B', 'C'], vec!["or".to_string()])
        );
        assert_eq!(answer_letters("AB"), (vec!['A', 'B'], Vec::new()));
        assert_eq!(answer_letters("A,B  d"), (vec!['A', 'B', 'D'], Vec::new()));
    }
}
