use rand::Rng;

use crate::model::{Question, QuizDraft};
use crate::shuffle::shuffle_with;

/// Questions in the order a participant sees them, honouring the quiz's
/// shuffle settings. The draft itself keeps document order.
pub fn delivery_order<R: Rng + ?Sized>(quiz: &QuizDraft, rng: &mut R) -> Vec<Question> {
    let mut questions = if quiz.settings.shuffle_questions {
        shuffle_with(rng, &quiz.questions)
    } else {
        quiz.questions.clone()
    };

    if quiz.settings.shuffle_options {
        for question in &mut questions {
            question.options = shuffle_with(rng, &question.options);
        }
    }

    questions
}
