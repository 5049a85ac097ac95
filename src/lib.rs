pub mod config;
pub mod deck;
pub mod epub;
pub mod error;
pub mod frequency;
pub mod jpdb;
pub mod xhtml;

#[cfg(test)]
mod testing;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{error, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::deck::{list_decks, DeckSynchronizer};
use crate::error::{DocumentError, Error, Result, Stage};
use crate::frequency::WordCounter;
use crate::jpdb::models::Deck;
use crate::jpdb::DeckService;

pub const EPUB_EXTENSION: &str = "epub";

/// Deck name for a document: its file name without the extension.
pub fn deck_name_for(epub_path: &Path) -> Option<String> {
    epub_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// The `.epub` files directly inside `dir`, in the order the directory lists them.
pub fn find_epubs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut epubs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(EPUB_EXTENSION)
        {
            epubs.push(path.to_path_buf());
        }
    }
    Ok(epubs)
}

#[derive(Debug)]
pub struct ReportEntry {
    pub document: PathBuf,
    pub deck: Deck,
}

#[derive(Debug)]
pub struct SkippedDocument {
    pub document: PathBuf,
    pub existing: Deck,
}

/// Outcome of a directory run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub created: Vec<ReportEntry>,
    pub skipped: Vec<SkippedDocument>,
    pub failed: Vec<DocumentError>,
}

pub fn format_deck(deck: &Deck) -> String {
    format!(
        "Successfully created new deck: {} with ID: {}\n\
         Total unique words added: {}\n\
         Current user coverage of words: {:.2}%",
        deck.name, deck.id, deck.vocabulary_count, deck.known_coverage
    )
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "================ RESULTS ================")?;
        for entry in &self.created {
            writeln!(f, "{}", format_deck(&entry.deck))?;
        }
        for skipped in &self.skipped {
            writeln!(
                f,
                "Skipped {}: deck '{}' already exists (ID: {})",
                skipped.document.display(),
                skipped.existing.name,
                skipped.existing.id
            )?;
        }
        for failed in &self.failed {
            writeln!(f, "FAILED: {}", failed)?;
        }
        Ok(())
    }
}

/// Creates one deck per epub in `dir`, skipping epubs whose name is already a deck.
///
/// The deck listing is fetched once up front. A failing document is logged and recorded in
/// the report; the remaining documents are still processed.
pub async fn process_directory<S, C>(
    service: &S,
    counter: &C,
    config: &Config,
    dir: &Path,
) -> Result<PipelineReport>
where
    S: DeckService + ?Sized,
    C: WordCounter + ?Sized,
{
    let existing = list_decks(service).await?;
    let epubs = find_epubs(dir)?;
    info!(count = epubs.len(), dir = %dir.display(), "found files for processing");

    let synchronizer = DeckSynchronizer::new(service, counter, config.batch_size);
    let mut report = PipelineReport::default();

    for epub in epubs {
        let Some(deck_name) = deck_name_for(&epub) else {
            error!(document = %epub.display(), "file name is not valid UTF-8");
            report.failed.push(DocumentError::new(
                &epub,
                Stage::Prepare,
                Error::Config("file name is not valid UTF-8".to_string()),
            ));
            continue;
        };

        // Exact, case-sensitive match.
        if let Some(deck) = existing.iter().find(|deck| deck.name == deck_name) {
            info!(name = %deck.name, deck = deck.id, "found deck with the same name, skipping this file");
            report.skipped.push(SkippedDocument {
                document: epub,
                existing: deck.clone(),
            });
            continue;
        }

        match synchronizer
            .create_deck_from_epub(&epub, &deck_name, config.default_position)
            .await
        {
            Ok(deck) => report.created.push(ReportEntry {
                document: epub,
                deck,
            }),
            Err(e) => {
                error!("{}", e);
                report.failed.push(e);
            }
        }
    }

    Ok(report)
}

/// Creates a deck from a single epub.
///
/// Without a name the file stem is used; without a position the deck goes after the user's
/// existing decks.
pub async fn process_file<S, C>(
    service: &S,
    counter: &C,
    config: &Config,
    epub_path: &Path,
    deck_name: Option<String>,
    deck_position: Option<u32>,
) -> Result<Deck, DocumentError>
where
    S: DeckService + ?Sized,
    C: WordCounter + ?Sized,
{
    let deck_name = match deck_name.or_else(|| deck_name_for(epub_path)) {
        Some(name) => name,
        None => {
            return Err(DocumentError::new(
                epub_path,
                Stage::Prepare,
                Error::Config("no deck name given and the file name is not valid UTF-8".into()),
            ))
        }
    };

    let deck_position = match deck_position {
        Some(position) => position,
        None => {
            let decks = list_decks(service)
                .await
                .map_err(|e| DocumentError::new(epub_path, Stage::Prepare, e))?;
            u32::try_from(decks.len()).unwrap_or(u32::MAX)
        }
    };

    info!(document = %epub_path.display(), name = %deck_name, position = deck_position, "processing epub");

    DeckSynchronizer::new(service, counter, config.batch_size)
        .create_deck_from_epub(epub_path, &deck_name, deck_position)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::tests::{chapter, write_epub};
    use crate::jpdb::models::JpdbConfiguration;
    use crate::testing::{Call, FakeDeckService, WhitespaceCounter};
    use tempfile::tempdir;

    fn test_config() -> Config {
        Config::new(
            JpdbConfiguration::new("mock_api_key".to_string()),
            PathBuf::from("unused.dic.zst"),
        )
    }

    fn write_book(dir: &Path, file_name: &str, words: &str) {
        let body = format!("<p>{}</p>", words);
        write_epub(&dir.join(file_name), &[("chapter.xhtml", &chapter(&body))]).unwrap();
    }

    #[test]
    fn test_deck_name_for() {
        assert_eq!(
            deck_name_for(Path::new("/books/konbini.epub")),
            Some("konbini".to_string())
        );
        assert_eq!(
            deck_name_for(Path::new("books/vol.2.epub")),
            Some("vol.2".to_string())
        );
    }

    #[test]
    fn test_find_epubs_ignores_other_files() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "a.epub", "x");
        write_book(temp_dir.path(), "b.epub", "y");
        std::fs::write(temp_dir.path().join("notes.txt"), "n").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        write_book(&temp_dir.path().join("nested"), "c.epub", "z");

        let mut names: Vec<String> = find_epubs(temp_dir.path())
            .unwrap()
            .iter()
            .filter_map(|path| deck_name_for(path))
            .collect();
        names.sort();

        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_directory_run_skips_existing_decks() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "book1.epub", "猫 犬");
        write_book(temp_dir.path(), "book2.epub", "鳥 魚 鳥");
        let service = FakeDeckService::new().with_deck(7, "book1");

        let report = process_directory(&service, &WhitespaceCounter, &test_config(), temp_dir.path())
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].deck.name, "book2");
        assert_eq!(report.created[0].deck.vocabulary_count, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].existing.id, 7);
        assert!(report.failed.is_empty());
        assert_eq!(service.created_names(), vec!["book2".to_string()]);
    }

    #[tokio::test]
    async fn test_skip_match_is_exact() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "Book1.epub", "猫");
        let service = FakeDeckService::new().with_deck(7, "book1");

        let report = process_directory(&service, &WhitespaceCounter, &test_config(), temp_dir.path())
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_one_corrupt_container_does_not_stop_the_run() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "first.epub", "猫 犬");
        std::fs::write(temp_dir.path().join("second.epub"), b"PK\x03\x04 truncated").unwrap();
        write_book(temp_dir.path(), "third.epub", "鳥");
        let service = FakeDeckService::new();

        let report = process_directory(&service, &WhitespaceCounter, &test_config(), temp_dir.path())
            .await
            .unwrap();

        let mut created: Vec<&str> = report
            .created
            .iter()
            .map(|entry| entry.deck.name.as_str())
            .collect();
        created.sort();
        assert_eq!(created, vec!["first", "third"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].stage, Stage::Extract);
        assert!(matches!(
            report.failed[0].source,
            Error::ContainerFormat { .. }
        ));
        assert!(report.failed[0].document.ends_with("second.epub"));
    }

    #[tokio::test]
    async fn test_directory_listing_happens_once_up_front() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "a.epub", "猫");
        write_book(temp_dir.path(), "b.epub", "犬");
        let service = FakeDeckService::new();

        process_directory(&service, &WhitespaceCounter, &test_config(), temp_dir.path())
            .await
            .unwrap();

        let calls = service.calls();
        assert_eq!(calls[0], Call::List);
        // One up-front listing plus one verification per deck.
        assert_eq!(calls.iter().filter(|call| **call == Call::List).count(), 3);
        assert!(calls.iter().all(|call| match call {
            Call::Create { position, .. } => *position == 0,
            _ => true,
        }));
    }

    #[tokio::test]
    async fn test_single_file_defaults() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "konbini.epub", "猫 犬 猫");
        let service = FakeDeckService::new().with_deck(1, "a").with_deck(2, "b");

        let deck = process_file(
            &service,
            &WhitespaceCounter,
            &test_config(),
            &temp_dir.path().join("konbini.epub"),
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(deck.name, "konbini");
        assert!(service.calls().contains(&Call::Create {
            name: "konbini".to_string(),
            position: 2
        }));
    }

    #[tokio::test]
    async fn test_single_file_missing() {
        let temp_dir = tempdir().unwrap();
        let service = FakeDeckService::new();

        let err = process_file(
            &service,
            &WhitespaceCounter,
            &test_config(),
            &temp_dir.path().join("missing.epub"),
            Some("deck".to_string()),
            Some(0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err.source, Error::NotFound(_)));
        assert!(service.created_names().is_empty());
    }

    #[tokio::test]
    async fn test_single_file_position_lookup_failure() {
        let temp_dir = tempdir().unwrap();
        write_book(temp_dir.path(), "konbini.epub", "猫");
        let service = FakeDeckService::new().failing_deck_listing();

        let err = process_file(
            &service,
            &WhitespaceCounter,
            &test_config(),
            &temp_dir.path().join("konbini.epub"),
            None,
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Prepare);
        assert!(matches!(err.source, Error::ServiceStatus { .. }));
        assert!(err.to_string().contains("failed while preparing deck"));
        assert!(service.created_names().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_directory_run_reports_undecodable_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = tempdir().unwrap();
        let file_name = OsStr::from_bytes(b"caf\xe9.epub");
        if std::fs::write(temp_dir.path().join(file_name), b"").is_err() {
            // Some filesystems reject names that are not UTF-8.
            return;
        }
        let service = FakeDeckService::new();

        let report = process_directory(&service, &WhitespaceCounter, &test_config(), temp_dir.path())
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].stage, Stage::Prepare);
        assert!(service.created_names().is_empty());
    }

    #[test]
    fn test_report_display() {
        let report = PipelineReport {
            created: vec![ReportEntry {
                document: PathBuf::from("book2.epub"),
                deck: Deck {
                    id: 12,
                    name: "book2".to_string(),
                    vocabulary_count: 345,
                    known_coverage: 61.234,
                },
            }],
            ..Default::default()
        };

        let text = report.to_string();

        assert!(text.contains("Successfully created new deck: book2 with ID: 12"));
        assert!(text.contains("Total unique words added: 345"));
        assert!(text.contains("Current user coverage of words: 61.23%"));
    }
}
