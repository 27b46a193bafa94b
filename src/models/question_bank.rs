use crate::error::BankError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of the merged bank written into the destination directory
pub const MERGED_FILE_NAME: &str = "all_questions.json";
pub const MERGED_BANK_ID: &str = "all-questions";
pub const MERGED_BANK_TITLE: &str = "All Questions";
pub const MERGED_BANK_DESCRIPTION: &str =
    "Every question from all question banks combined into a single set";

/// A single question record. Only `id` is interpreted; every other field is
/// carried through untouched and in its original order.
pub type QuestionRecord = Map<String, Value>;

/// Top-level question bank document as served to the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankDocument {
    pub question_bank: QuestionBank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: String,
    pub title: String,
    pub description: String,
    pub total_questions: usize,
    pub questions: Vec<QuestionRecord>,
}

impl QuestionBankDocument {
    /// Build the merged document; the count always follows the records
    pub fn merged(questions: Vec<QuestionRecord>) -> Self {
        Self {
            question_bank: QuestionBank {
                id: MERGED_BANK_ID.to_string(),
                title: MERGED_BANK_TITLE.to_string(),
                description: MERGED_BANK_DESCRIPTION.to_string(),
                total_questions: questions.len(),
                questions,
            },
        }
    }
}

/// Pull `questionBank.questions` out of a parsed bank.
///
/// Source banks are read leniently: only the wrapper and the record list are
/// required, and every record must be an object. The whole list is checked
/// before anything is returned, so a bad record rejects the entire file.
pub fn extract_questions(document: Value) -> Result<Vec<QuestionRecord>, BankError> {
    let Value::Object(mut root) = document else {
        return Err(BankError::MissingWrapper);
    };

    let Some(Value::Object(mut bank)) = root.remove("questionBank") else {
        return Err(BankError::MissingWrapper);
    };

    let Some(Value::Array(questions)) = bank.remove("questions") else {
        return Err(BankError::MissingQuestions);
    };

    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| match question {
            Value::Object(record) => Ok(record),
            _ => Err(BankError::InvalidRecord(index)),
        })
        .collect()
}

/// Overwrite the `id` of each record with consecutive numbers from `next_id`.
/// Returns the id following the last one assigned.
pub fn renumber_questions(questions: &mut [QuestionRecord], mut next_id: u64) -> u64 {
    for question in questions.iter_mut() {
        question.insert("id".to_string(), Value::from(next_id));
        next_id += 1;
    }
    next_id
}
