use crate::error::BankError;
use crate::models::{
    extract_questions, renumber_questions, QuestionBankDocument, QuestionRecord, MERGED_FILE_NAME,
};
use crate::utils::list_files_with_extensions;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for the merge phase
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub output_file_name: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("question_banks"),
            destination_dir: PathBuf::from("docs/assets/question_banks"),
            output_file_name: MERGED_FILE_NAME.to_string(),
        }
    }
}

impl MergeConfig {
    pub fn output_path(&self) -> PathBuf {
        self.destination_dir.join(&self.output_file_name)
    }
}

/// Read one bank file and return its question records
pub fn load_bank_questions(path: &Path) -> Result<Vec<QuestionRecord>, BankError> {
    let content = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    extract_questions(document)
}

/// Merge every top-level JSON bank in the source directory into one document
/// with ids renumbered from 1.
///
/// Banks that cannot be read or lack the expected structure are skipped with a
/// warning and consume no ids.
pub fn merge_question_banks(config: &MergeConfig) -> Result<MergeReport> {
    info!("Merging question banks from {}", config.source_dir.display());

    let bank_files = list_files_with_extensions(&config.source_dir, &["json"])?;
    debug!("Found {} JSON banks", bank_files.len());

    let mut combined: Vec<QuestionRecord> = Vec::new();
    let mut merged_banks = Vec::new();
    let mut skipped_banks = Vec::new();
    let mut next_id = 1;

    for path in bank_files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        match load_bank_questions(&path) {
            Ok(mut questions) => {
                next_id = renumber_questions(&mut questions, next_id);
                debug!("Merged {} questions from {}", questions.len(), file_name);
                merged_banks.push(MergedBank {
                    file_name,
                    question_count: questions.len(),
                });
                combined.extend(questions);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped_banks.push(SkippedBank {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    let document = QuestionBankDocument::merged(combined);
    let output_path = config.output_path();
    write_merged_document(&output_path, &document)?;

    let report = MergeReport {
        merged_banks,
        skipped_banks,
        total_questions: document.question_bank.total_questions,
        output_path,
    };

    info!(
        "Merge completed. Banks: {}, Skipped: {}, Questions: {}",
        report.merged_banks.len(),
        report.skipped_banks.len(),
        report.total_questions
    );

    Ok(report)
}

/// Serialize with two-space indentation and a trailing newline, overwriting
/// any existing file
fn write_merged_document(path: &Path, document: &QuestionBankDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let mut pretty =
        serde_json::to_string_pretty(document).context("Failed to serialize merged bank")?;
    pretty.push('\n');

    fs::write(path, pretty).with_context(|| format!("Failed to write {:?}", path))
}

/// Report structure for the merge phase
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub merged_banks: Vec<MergedBank>,
    pub skipped_banks: Vec<SkippedBank>,
    pub total_questions: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MergedBank {
    pub file_name: String,
    pub question_count: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedBank {
    pub file_name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn bank(ids: &[&str]) -> String {
        let questions: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "title": format!("Question {}", id) }))
            .collect();
        json!({
            "questionBank": {
                "id": "part",
                "title": "Part",
                "description": "",
                "totalQuestions": questions.len(),
                "questions": questions
            }
        })
        .to_string()
    }

    fn read_output(config: &MergeConfig) -> Value {
        serde_json::from_str(&fs::read_to_string(config.output_path()).unwrap()).unwrap()
    }

    fn config_for(source: &Path, destination: &Path) -> MergeConfig {
        MergeConfig {
            source_dir: source.to_path_buf(),
            destination_dir: destination.to_path_buf(),
            ..MergeConfig::default()
        }
    }

    #[test]
    fn test_merge_renumbers_in_file_name_order() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        fs::write(source.path().join("b.json"), bank(&["b1", "b2", "b3"])).unwrap();
        fs::write(source.path().join("a.json"), bank(&["a1", "a2"])).unwrap();

        let config = config_for(source.path(), destination.path());
        let report = merge_question_banks(&config).unwrap();
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.merged_banks.len(), 2);

        let output = read_output(&config);
        let bank = &output["questionBank"];
        assert_eq!(bank["totalQuestions"], 5);
        let questions = bank["questions"].as_array().unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let titles: Vec<&str> = questions.iter().map(|q| q["title"].as_str().unwrap()).collect();
        assert_eq!(
            titles,
            vec!["Question a1", "Question a2", "Question b1", "Question b2", "Question b3"]
        );
    }

    #[test]
    fn test_invalid_json_skipped_without_consuming_ids() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        fs::write(source.path().join("a.json"), bank(&["a1"])).unwrap();
        fs::write(source.path().join("b.json"), "{ not json").unwrap();
        fs::write(source.path().join("c.json"), json!({ "other": {} }).to_string()).unwrap();
        fs::write(source.path().join("d.json"), bank(&["d1", "d2"])).unwrap();

        let config = config_for(source.path(), destination.path());
        let report = merge_question_banks(&config).unwrap();

        assert_eq!(report.total_questions, 3);
        let skipped: Vec<&str> = report
            .skipped_banks
            .iter()
            .map(|s| s.file_name.as_str())
            .collect();
        assert_eq!(skipped, vec!["b.json", "c.json"]);

        let output = read_output(&config);
        let questions = output["questionBank"]["questions"].as_array().unwrap();
        assert_eq!(questions[1]["title"], "Question d1");
        assert_eq!(questions[1]["id"], 2);
        assert_eq!(questions[2]["id"], 3);
    }

    #[test]
    fn test_no_banks_writes_empty_document() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        fs::write(source.path().join("readme.md"), "# Banks").unwrap();

        let config = config_for(source.path(), destination.path());
        let report = merge_question_banks(&config).unwrap();
        assert_eq!(report.total_questions, 0);

        let output = read_output(&config);
        assert_eq!(output["questionBank"]["totalQuestions"], 0);
        assert_eq!(output["questionBank"]["questions"], json!([]));
        assert_eq!(output["questionBank"]["title"], "All Questions");
    }

    #[test]
    fn test_output_overwritten_and_field_order_stable() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        fs::write(source.path().join("a.json"), bank(&["a1"])).unwrap();

        let config = config_for(source.path(), destination.path());
        fs::write(config.output_path(), "stale").unwrap();
        merge_question_banks(&config).unwrap();

        let text = fs::read_to_string(config.output_path()).unwrap();
        let keys = ["\"id\"", "\"title\"", "\"description\"", "\"totalQuestions\"", "\"questions\""];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.starts_with("{\n  \"questionBank\": {\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_numbers_pass_through_exactly() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        fs::write(
            source.path().join("a.json"),
            r#"{"questionBank":{"questions":[{"id":1,"ref":123456789012345678901234567890,"w":0.1000000000000000055511151231257827}]}}"#,
        )
        .unwrap();

        let config = config_for(source.path(), destination.path());
        merge_question_banks(&config).unwrap();

        let text = fs::read_to_string(config.output_path()).unwrap();
        assert!(text.contains("\"ref\": 123456789012345678901234567890"));
        assert!(text.contains("\"w\": 0.1000000000000000055511151231257827"));
    }

    #[test]
    fn test_merge_creates_missing_destination() {
        let source = tempdir().unwrap();
        let destination = tempdir().unwrap();
        let nested = destination.path().join("docs").join("assets");

        let config = config_for(source.path(), &nested);
        merge_question_banks(&config).unwrap();
        assert!(config.output_path().is_file());
    }
}
