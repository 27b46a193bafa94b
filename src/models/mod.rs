pub mod question_bank;

pub use question_bank::{
    extract_questions, renumber_questions, QuestionBank, QuestionBankDocument, QuestionRecord,
    MERGED_BANK_DESCRIPTION, MERGED_BANK_ID, MERGED_BANK_TITLE, MERGED_FILE_NAME,
};
