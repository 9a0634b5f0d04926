use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{Participant, Question, QuizDraft};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub qid: String,
    pub selected: Vec<char>,
    pub is_correct: bool,
    pub points_earned: f64,
}

/// All-or-nothing: the selection must be non-empty and equal the key as a set.
pub fn is_correct(question: &Question, selected: &[char]) -> bool {
    !selected.is_empty()
        && selected.iter().all(|oid| question.correct.contains(oid))
        && question.correct.iter().all(|oid| selected.contains(oid))
}

/// Unanswered questions neither gain nor lose points.
pub fn points_for(question: &Question, selected: &[char]) -> f64 {
    if selected.is_empty() {
        0.0
    } else if is_correct(question, selected) {
        question.points_if_correct
    } else {
        question.points_if_wrong
    }
}

impl Participant {
    pub fn record_answer(&mut self, question: &Question, selected: &[char]) -> AnswerOutcome {
        let is_correct = is_correct(question, selected);
        let points_earned = points_for(question, selected);

        self.score += points_earned;
        if is_correct {
            self.correct_count += 1;
        }

        AnswerOutcome {
            qid: question.qid.clone(),
            selected: selected.to_vec(),
            is_correct,
            points_earned,
        }
    }
}

fn leaderboard_order(a: &Participant, b: &Participant) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.correct_count.cmp(&a.correct_count))
        .then_with(|| a.joined_at.cmp(&b.joined_at))
}

/// Highest score first, then most correct answers, then earliest join.
pub fn rank(participants: &[Participant], top_n: usize) -> Vec<&Participant> {
    let mut ranked: Vec<&Participant> = participants.iter().collect();
    ranked.sort_by(|a, b| leaderboard_order(a, b));
    ranked.truncate(top_n);
    ranked
}

/// 1-based leaderboard position.
pub fn position_of(participants: &[Participant], participant_id: &str) -> Option<usize> {
    rank(participants, participants.len())
        .iter()
        .position(|p| p.participant_id == participant_id)
        .map(|idx| idx + 1)
}

pub fn display_name(quiz: &QuizDraft, position: usize, participant: &Participant) -> String {
    if quiz.leaderboard.display_names_anonymized {
        format!("Participant {}", position)
    } else {
        participant.display_name.clone()
    }
}

pub fn results_csv(participants: &[Participant]) -> String {
    let mut out = String::from("Position,Display Name,Score,Correct Answers\n");
    for (idx, p) in rank(participants, participants.len()).iter().enumerate() {
        out.push_str(&format!(
            "{},{},{},{}\n",
            idx + 1,
            csv_field(&p.display_name),
            p.score,
            p.correct_count
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
