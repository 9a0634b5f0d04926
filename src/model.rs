use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMER_SECONDS: u32 = 8;
pub const MIN_TIMER_SECONDS: u32 = 3;
pub const DEFAULT_TOKEN_LENGTH: usize = 8;
pub const UNTITLED_QUIZ: &str = "Untitled Quiz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    #[default]
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
    pub mode: QuizMode,
    pub creator_only_login: bool,
    pub join_requires_login: bool,
    pub guest_name_unique: bool,
    pub default_timer_seconds: u32,
    pub display_all_questions_at_once: bool,
    pub negative_marking_default: f64,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub max_participants: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            mode: QuizMode::Live,
            creator_only_login: true,
            join_requires_login: false,
            guest_name_unique: true,
            default_timer_seconds: DEFAULT_TIMER_SECONDS,
            display_all_questions_at_once: false,
            negative_marking_default: 0.0,
            shuffle_questions: false,
            shuffle_options: false,
            max_participants: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub join_url_pattern: String,
    pub qr_payload: String,
    pub token_length: usize,
    pub token: String,
}

impl Join {
    /// Fills the `{quizId}` and `{token}` placeholders of the URL pattern.
    pub fn join_url(&self, quiz_id: &str) -> String {
        self.join_url_pattern
            .replace("{quizId}", quiz_id)
            .replace("{token}", &self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub enabled: bool,
    pub display_names_anonymized: bool,
    pub top_n: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self {
            enabled: true,
            display_names_anonymized: false,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub notes: String,
    pub source_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub oid: char,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub qid: String,
    pub raw_text: String,
    pub stem: String,
    pub media: Vec<Media>,
    pub options: Vec<QuizOption>,
    pub correct: Vec<char>,
    pub points_if_correct: f64,
    pub points_if_wrong: f64,
    pub timer_seconds: u32,
    pub open_at: Option<DateTime<Utc>>,
    pub close_at: Option<DateTime<Utc>>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub participant_id: String,
    pub display_name: String,
    pub score: f64,
    pub correct_count: u32,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Draft,
    Ready,
    Live,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub quiz_id: String,
    pub title: String,
    pub description: String,
    pub settings: QuizSettings,
    pub join: Join,
    pub questions: Vec<Question>,
    pub participants: Vec<Participant>,
    pub leaderboard: Leaderboard,
    pub metadata: Metadata,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub answer_key_missing: bool,
    pub status: QuizStatus,
    pub current_question_index: i64,
}

impl QuizDraft {
    /// A draft with errors is not a complete quiz and must not be hosted.
    pub fn is_hostable(&self) -> bool {
        self.errors.is_empty() && self.status == QuizStatus::Ready
    }

    pub fn join_url(&self) -> String {
        self.join.join_url(&self.quiz_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub quiz: QuizDraft,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub answer_key_missing: bool,
}
