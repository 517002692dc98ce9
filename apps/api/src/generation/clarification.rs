//! Clarification Session: questions, in-flight answers, and everything
//! carried forward between rounds of one submission.
//!
//! Precedence on resubmit, highest first: in-flight answers, answers from
//! earlier rounds, data the server extracted on the first round.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::generation::client::Answers;

/// One question as shown to the user, with the key its answer is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClarificationQuestion {
    pub key: String,
    pub prompt: String,
}

impl ClarificationQuestion {
    /// Decodes question `index` from the wire.
    ///
    /// Accepts a bare string or `{field, question}`; the backend also sends
    /// the misspelling `feild`. Questions without a field get `q_<index>`.
    pub fn from_wire(index: usize, value: &Value) -> Self {
        let positional = || format!("q_{index}");
        match value {
            Value::String(text) => Self {
                key: positional(),
                prompt: text.clone(),
            },
            Value::Object(fields) => {
                let field = ["field", "feild"]
                    .iter()
                    .find_map(|k| fields.get(*k).and_then(Value::as_str))
                    .filter(|f| !f.trim().is_empty());
                let prompt = fields
                    .get("question")
                    .and_then(Value::as_str)
                    .filter(|q| !q.trim().is_empty())
                    .or(field)
                    .map(String::from)
                    .unwrap_or_else(|| value.to_string());
                Self {
                    key: field.map(String::from).unwrap_or_else(positional),
                    prompt,
                }
            }
            other => Self {
                key: positional(),
                prompt: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClarificationSession {
    questions: Vec<ClarificationQuestion>,
    answers: Answers,
    accumulated: Answers,
    extracted: Option<Map<String, Value>>,
}

impl ClarificationSession {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> &[ClarificationQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[cfg(test)]
    pub fn accumulated(&self) -> &Answers {
        &self.accumulated
    }

    #[cfg(test)]
    pub fn extracted(&self) -> Option<&Map<String, Value>> {
        self.extracted.as_ref()
    }

    /// Stores the in-flight answer for `key`, replacing any earlier one.
    /// Empty strings are kept.
    pub fn record_answer(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(key.into(), Value::String(value.into()));
    }

    /// Starts a clarification round. The first round's extracted data is kept
    /// for the whole submission; later rounds only replace the questions.
    pub fn begin_round(
        &mut self,
        questions: Vec<ClarificationQuestion>,
        extracted: Map<String, Value>,
    ) {
        self.questions = questions;
        if self.extracted.is_none() {
            self.extracted = Some(extracted);
        }
    }

    /// Builds the answers for the next request and rolls the in-flight
    /// answers into the accumulated set.
    pub fn merge_for_resubmit(&mut self) -> Answers {
        let mut merged: Answers = self
            .extracted
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merged.extend(self.accumulated.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(std::mem::take(&mut self.answers));

        self.accumulated = merged.clone();
        merged
    }

    /// Forgets everything. Called once per fresh prompt submission.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracted(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_question_from_string_gets_positional_key() {
        let q = ClarificationQuestion::from_wire(2, &json!("Where do you live?"));
        assert_eq!(q.key, "q_2");
        assert_eq!(q.prompt, "Where do you live?");
    }

    #[test]
    fn test_question_from_object() {
        let q = ClarificationQuestion::from_wire(
            0,
            &json!({"field": "education", "question": "What is your educational background?"}),
        );
        assert_eq!(q.key, "education");
        assert_eq!(q.prompt, "What is your educational background?");
    }

    #[test]
    fn test_question_accepts_misspelled_field() {
        let q = ClarificationQuestion::from_wire(0, &json!({"feild": "skills", "question": "Skills?"}));
        assert_eq!(q.key, "skills");
    }

    #[test]
    fn test_question_object_fallbacks() {
        let field_only = ClarificationQuestion::from_wire(1, &json!({"field": "contact"}));
        assert_eq!(field_only.key, "contact");
        assert_eq!(field_only.prompt, "contact");

        let question_only = ClarificationQuestion::from_wire(1, &json!({"question": "Projects?"}));
        assert_eq!(question_only.key, "q_1");

        let neither = ClarificationQuestion::from_wire(3, &json!({"hint": 1}));
        assert_eq!(neither.key, "q_3");
        assert_eq!(neither.prompt, r#"{"hint":1}"#);
    }

    #[test]
    fn test_record_answer_overwrites() {
        let mut session = ClarificationSession::new();
        session.record_answer("q_0", "Engineer");
        session.record_answer("q_0", "Staff Engineer");
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()["q_0"], json!("Staff Engineer"));
    }

    #[test]
    fn test_first_round_extracted_data_wins() {
        let mut session = ClarificationSession::new();
        session.begin_round(vec![], extracted(json!({"company": "Acme"})));
        session.begin_round(vec![], extracted(json!({"company": "Globex"})));
        assert_eq!(session.extracted().unwrap()["company"], json!("Acme"));
    }

    #[test]
    fn test_merge_precedence() {
        let mut session = ClarificationSession::new();
        session.begin_round(
            vec![],
            extracted(json!({"company": "Acme", "role": "dev", "years": "5"})),
        );
        session.record_answer("role", "Engineer");
        session.record_answer("q_0", "Berlin");
        let first = session.merge_for_resubmit();
        assert_eq!(
            first,
            Answers::from([
                ("company".to_string(), json!("Acme")),
                ("q_0".to_string(), json!("Berlin")),
                ("role".to_string(), json!("Engineer")),
                ("years".to_string(), json!("5")),
            ])
        );
        assert!(session.answers().is_empty());
        assert_eq!(session.accumulated(), &first);

        // Second round: in-flight beats accumulated, accumulated beats extracted.
        session.record_answer("years", "7");
        let second = session.merge_for_resubmit();
        assert_eq!(second["years"], json!("7"));
        assert_eq!(second["role"], json!("Engineer"));
        assert_eq!(second["company"], json!("Acme"));
    }

    #[test]
    fn test_merge_without_any_state_is_empty() {
        let mut session = ClarificationSession::new();
        assert!(session.merge_for_resubmit().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = ClarificationSession::new();
        session.begin_round(
            vec![ClarificationQuestion::from_wire(0, &json!("Q"))],
            extracted(json!({"a": "b"})),
        );
        session.record_answer("q_0", "x");
        session.merge_for_resubmit();

        session.reset();
        assert_eq!(session, ClarificationSession::default());
    }
}
