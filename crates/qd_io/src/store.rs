//! Document-store contract and an in-memory implementation backed by a JSON
//! snapshot.
//!
//! The store is the only place that enforces "one answer per user per
//! question"; the engine relies on it and never re-checks.
//!
//! Embedded user copies inside answers are never touched by profile updates.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use qd_core::{Answer, AnswerId, AnswerOption, OptionId, Question, QuestionId, User, UserId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Backend could not be reached or returned garbage. Callers do not retry.
    #[error("transport: {0}")]
    Transport(String),

    #[error("user {user} already answered question {question}")]
    DuplicateAnswer { user: UserId, question: QuestionId },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
}

/// Read capability the report pipeline needs from the document store.
pub trait DocumentStore {
    /// All answers to `question`, oldest first.
    fn answers_for_question(&self, question: &QuestionId) -> Result<Vec<Answer>, StoreError>;
    fn answer(&self, id: &AnswerId) -> Result<Answer, StoreError>;
    fn question(&self, id: &QuestionId) -> Result<Question, StoreError>;
    fn option(&self, id: &OptionId) -> Result<AnswerOption, StoreError>;
    fn user(&self, id: &UserId) -> Result<User, StoreError>;
}

/// Wire shape of a store dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    questions: BTreeMap<QuestionId, Question>,
    options: BTreeMap<OptionId, AnswerOption>,
    users: BTreeMap<UserId, User>,
    /// Insertion order is kept; it breaks ties between equal timestamps.
    answers: Vec<Answer>,
    answer_ids: BTreeSet<AnswerId>,
    responded: BTreeSet<(UserId, QuestionId)>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a dump, enforcing id uniqueness and single answers.
    pub fn from_snapshot(s: Snapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for q in s.questions {
            store.insert_question(q)?;
        }
        for o in s.options {
            store.insert_option(o)?;
        }
        for u in s.users {
            if store.users.contains_key(&u.id) {
                return Err(StoreError::DuplicateId { kind: "user", id: u.id.to_string() });
            }
            store.users.insert(u.id.clone(), u);
        }
        for a in s.answers {
            store.record_answer(a)?;
        }
        debug!(
            questions = store.questions.len(),
            options = store.options.len(),
            users = store.users.len(),
            answers = store.answers.len(),
            "snapshot store built"
        );
        Ok(store)
    }

    pub fn insert_question(&mut self, q: Question) -> Result<(), StoreError> {
        if self.questions.contains_key(&q.id) {
            return Err(StoreError::DuplicateId { kind: "question", id: q.id.to_string() });
        }
        self.questions.insert(q.id.clone(), q);
        Ok(())
    }

    pub fn insert_option(&mut self, o: AnswerOption) -> Result<(), StoreError> {
        if self.options.contains_key(&o.id) {
            return Err(StoreError::DuplicateId { kind: "option", id: o.id.to_string() });
        }
        self.options.insert(o.id.clone(), o);
        Ok(())
    }

    /// Insert or replace the live profile. Existing answers keep their copy.
    pub fn update_user(&mut self, u: User) {
        self.users.insert(u.id.clone(), u);
    }

    /// Record a new answer. A second answer by the same user to the same
    /// question is rejected.
    pub fn record_answer(&mut self, a: Answer) -> Result<(), StoreError> {
        if self.answer_ids.contains(&a.id) {
            return Err(StoreError::DuplicateId { kind: "answer", id: a.id.to_string() });
        }
        let pair = (a.user.id.clone(), a.question_id.clone());
        if self.responded.contains(&pair) {
            return Err(StoreError::DuplicateAnswer { user: pair.0, question: pair.1 });
        }
        self.responded.insert(pair);
        self.answer_ids.insert(a.id.clone());
        self.answers.push(a);
        Ok(())
    }

    pub fn has_answered(&self, user: &UserId, question: &QuestionId) -> bool {
        self.responded.contains(&(user.clone(), question.clone()))
    }
}

fn not_found(kind: &'static str, id: impl ToString) -> StoreError {
    StoreError::NotFound { kind, id: id.to_string() }
}

impl DocumentStore for SnapshotStore {
    fn answers_for_question(&self, question: &QuestionId) -> Result<Vec<Answer>, StoreError> {
        let mut out: Vec<Answer> = self
            .answers
            .iter()
            .filter(|a| &a.question_id == question)
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        out.sort_by_key(|a| a.created_at);
        Ok(out)
    }

    fn answer(&self, id: &AnswerId) -> Result<Answer, StoreError> {
        self.answers
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| not_found("answer", id))
    }

    fn question(&self, id: &QuestionId) -> Result<Question, StoreError> {
        self.questions.get(id).cloned().ok_or_else(|| not_found("question", id))
    }

    fn option(&self, id: &OptionId) -> Result<AnswerOption, StoreError> {
        self.options.get(id).cloned().ok_or_else(|| not_found("option", id))
    }

    fn user(&self, id: &UserId) -> Result<User, StoreError> {
        self.users.get(id).cloned().ok_or_else(|| not_found("user", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qd_core::Mbti;

    fn user(id: &str, mbti: Option<Mbti>) -> User {
        User {
            id: id.parse().unwrap(),
            nickname: id.to_string(),
            region: None,
            birth: None,
            gender: None,
            mbti,
            marketing_opt_in: false,
        }
    }

    fn answer(id: &str, u: &User, q: &str, opt: &str, at: i64) -> Answer {
        Answer {
            id: id.parse().unwrap(),
            user: u.clone(),
            question_id: q.parse().unwrap(),
            option_id: opt.parse().unwrap(),
            created_at: at,
        }
    }

    #[test]
    fn second_answer_to_same_question_is_rejected() {
        let u = user("u1", None);
        let mut s = SnapshotStore::new();
        s.record_answer(answer("a1", &u, "q1", "o1", 10)).unwrap();
        let err = s.record_answer(answer("a2", &u, "q1", "o2", 11)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAnswer { .. }));
        // other question is fine
        s.record_answer(answer("a3", &u, "q2", "o1", 12)).unwrap();
        assert!(s.has_answered(&u.id, &"q2".parse().unwrap()));
    }

    #[test]
    fn duplicate_answer_id_is_rejected() {
        let mut s = SnapshotStore::new();
        s.record_answer(answer("a1", &user("u1", None), "q1", "o1", 1)).unwrap();
        let err = s.record_answer(answer("a1", &user("u2", None), "q1", "o1", 2)).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId { kind: "answer", id: "a1".into() });
    }

    #[test]
    fn answers_come_back_oldest_first_with_stable_ties() {
        let mut s = SnapshotStore::new();
        s.record_answer(answer("a1", &user("u1", None), "q1", "o1", 30)).unwrap();
        s.record_answer(answer("a2", &user("u2", None), "q1", "o1", 10)).unwrap();
        s.record_answer(answer("a3", &user("u3", None), "q1", "o1", 10)).unwrap();
        s.record_answer(answer("a4", &user("u4", None), "q9", "o1", 0)).unwrap();
        let got: Vec<String> = s
            .answers_for_question(&"q1".parse().unwrap())
            .unwrap()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(got, vec!["a2", "a3", "a1"]);
    }

    #[test]
    fn profile_update_leaves_answer_copy_alone() {
        let before = user("u1", Some(Mbti::Infp));
        let mut s = SnapshotStore::new();
        s.update_user(before.clone());
        s.record_answer(answer("a1", &before, "q1", "o1", 1)).unwrap();

        s.update_user(user("u1", Some(Mbti::Estj)));
        assert_eq!(s.user(&before.id).unwrap().mbti, Some(Mbti::Estj));
        assert_eq!(s.answer(&"a1".parse().unwrap()).unwrap().user.mbti, Some(Mbti::Infp));
    }

    #[test]
    fn missing_documents_are_not_found() {
        let s = SnapshotStore::new();
        let err = s.question(&"nope".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "question not found: nope");
    }
}
