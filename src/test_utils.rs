#[cfg(test)]
pub mod fixtures {
    use std::io::{Cursor, Write};

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::RwLock;
    use zip::write::SimpleFileOptions;

    use crate::errors::{AppError, AppResult};
    use crate::models::domain::{Difficulty, Quiz, QuizQuestion, ResultReport};
    use crate::repositories::HistoryRepository;

    const LETTERS: [&str; 4] = ["A", "B", "C", "D"];

    /// Correct answer of the `i`-th generated question (0-based).
    pub fn correct_letter(i: usize) -> &'static str {
        LETTERS[i % LETTERS.len()]
    }

    /// Answers matching every question produced by `questions_json(count)`.
    pub fn answer_key(count: usize) -> Vec<String> {
        (0..count).map(|i| correct_letter(i).to_string()).collect()
    }

    /// A well-formed model response with `count` questions.
    pub fn questions_json(count: usize) -> Value {
        let difficulties = ["Easy", "Medium", "Hard"];
        Value::Array(
            (0..count)
                .map(|i| {
                    json!({
                        "question": format!("Question {}?", i + 1),
                        "options": LETTERS,
                        "correct_answer": correct_letter(i),
                        "difficulty": difficulties[i % difficulties.len()],
                    })
                })
                .collect(),
        )
    }

    pub fn sample_questions(count: usize) -> Vec<QuizQuestion> {
        (0..count)
            .map(|i| QuizQuestion {
                question: format!("Question {}?", i + 1),
                options: LETTERS.iter().map(|l| l.to_string()).collect(),
                correct_answer: correct_letter(i).to_string(),
                difficulty: Difficulty::Medium,
            })
            .collect()
    }

    pub fn sample_quiz(count: usize) -> Quiz {
        Quiz::new(sample_questions(count), "lecture.pdf")
    }

    /// Minimal DOCX archive with one paragraph per line of `text`.
    pub fn docx_bytes(text: &str) -> Vec<u8> {
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", line))
            .collect();
        let body = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            paragraphs
        );
        zip_bytes(vec![("word/document.xml".to_string(), body)])
    }

    /// Minimal PPTX archive; each slide is a list of shape texts.
    pub fn pptx_bytes(slides: &[&[&str]]) -> Vec<u8> {
        let entries: Vec<(String, String)> = slides
            .iter()
            .enumerate()
            .map(|(i, shapes)| {
                let shapes: String = shapes
                    .iter()
                    .map(|text| {
                        format!(
                            "<p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
                            text
                        )
                    })
                    .collect();
                (
                    format!("ppt/slides/slide{}.xml", i + 1),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:p="urn:p" xmlns:a="urn:a"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
                        shapes
                    ),
                )
            })
            .collect();
        zip_bytes(entries)
    }

    /// PDF with one page per entry; an empty string leaves that page without
    /// any text operators.
    pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let operations = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ]
                };
                let content = Content { operations };
                let content_id = doc.add_object(Stream::new(
                    dictionary! {},
                    content.encode().expect("page content should encode"),
                ));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                });
                page_id.into()
            })
            .collect();

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("pdf should serialize");
        bytes
    }

    /// WordprocessingML part with one paragraph per line of `text`.
    pub fn word_part(root: &str, text: &str) -> String {
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", line))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:{root} xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{paragraphs}</w:{root}>"#
        )
    }

    pub fn zip_bytes(entries: Vec<(String, String)>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("zip entry should start");
            writer
                .write_all(content.as_bytes())
                .expect("zip entry should be written");
        }
        writer.finish().expect("zip should finish").into_inner()
    }

    /// Multipart form body with a single file field. Returns the content type
    /// header value and the body.
    pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
        let boundary = "docquiz-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    /// History store that keeps reports in memory and can be told to fail.
    #[derive(Default)]
    pub struct RecordingHistory {
        reports: RwLock<Vec<ResultReport>>,
        fail_appends: bool,
    }

    impl RecordingHistory {
        pub fn failing() -> Self {
            Self {
                reports: RwLock::new(Vec::new()),
                fail_appends: true,
            }
        }

        pub async fn reports(&self) -> Vec<ResultReport> {
            self.reports.read().await.clone()
        }
    }

    #[async_trait]
    impl HistoryRepository for RecordingHistory {
        async fn append(&self, report: ResultReport) -> AppResult<()> {
            if self.fail_appends {
                return Err(AppError::DatabaseError("history store unavailable".to_string()));
            }
            self.reports.write().await.push(report);
            Ok(())
        }

        async fn list_for(&self, username: &str) -> AppResult<Vec<ResultReport>> {
            let reports = self.reports.read().await;
            let mut items: Vec<_> = reports
                .iter()
                .filter(|r| r.username == username)
                .cloned()
                .collect();
            items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
            Ok(items)
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use mongodb::Client;

    use crate::{
        app_state::AppState, config::Config, db::Database, repositories::HistoryRepository,
        services::generation_client::TextGenerator,
    };

    /// App state over the given collaborators. The database handle never
    /// connects unless a test pings it.
    pub async fn test_app_state(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        history: Arc<dyn HistoryRepository>,
    ) -> AppState {
        let client = Client::with_uri_str(&config.mongo_conn_string)
            .await
            .expect("test connection string should parse");
        let db = Database::from_client(client, &config.mongo_db_name);
        AppState::from_parts(config, db, generator, history).expect("valid test config")
    }

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::Document;
    use crate::services::extractor::DocumentExtractor;

    #[test]
    fn test_fixtures_answer_key_matches_questions() {
        let quiz = sample_quiz(6);
        let key = answer_key(6);
        for (question, answer) in quiz.questions.iter().zip(&key) {
            assert_eq!(&question.correct_answer, answer);
        }
    }

    #[test]
    fn test_fixtures_docx_is_extractable() {
        let document = Document::from_upload("a.docx", docx_bytes("First line\nSecond line"));
        let text = DocumentExtractor::new().extract(&document).unwrap();
        assert_eq!(text, "First line\nSecond line");
    }

    #[test]
    fn test_fixtures_pptx_keeps_slide_then_shape_order() {
        let slides: [&[&str]; 2] = [&["Intro", "Agenda"], &["Summary"]];
        let document = Document::from_upload("deck.pptx", pptx_bytes(&slides));
        let text = DocumentExtractor::new().extract(&document).unwrap();
        assert_eq!(text, "Intro\nAgenda\nSummary");
    }
}
