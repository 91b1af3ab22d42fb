pub mod batch;
pub mod config;
pub mod doctor;
pub mod errlog;
pub mod exiftool;
pub mod normalizer;
pub mod ollama;
pub mod review;
pub mod scan;
pub mod session;
pub mod thumbs;
pub mod tui;
pub mod worker;

pub use batch::{BatchPipeline, BatchReport, SuggestionRecord};
pub use config::Config;
pub use errlog::ErrorLog;
pub use exiftool::{ExifToolWriter, KeywordWriter};
pub use normalizer::TagNormalizer;
pub use ollama::{OllamaClient, OllamaClientBuilder, SuggestionClient};
pub use review::{CommitReport, ReviewQueue};
pub use session::Session;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_types_accessible_from_crate_root() {
        assert_eq!(TagNormalizer::normalize("a,b"), "a; b");

        let mut session = Session::new("qwen2.5vl:7b");
        assert_eq!(session.model(), "qwen2.5vl:7b");
        session.load_images(vec![std::path::PathBuf::from("a.jpg")]);
        assert_eq!(session.len(), 1);

        let queue = ReviewQueue::default();
        assert!(queue.is_empty());
    }
}
