//! # Feature: Static Emoji Library
//!
//! A folder of ready-made emoji images that can be browsed, searched and used
//! as reactions without calling the image API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.0.0: Listing, substring search and 25-per-page pagination

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::emoji_image::EmojiImage;
use crate::emoji_workflow::WorkflowError;

/// Discord allows at most 25 options in a select menu.
pub const PAGE_SIZE: usize = 25;

/// Discord's limit for select option labels and descriptions.
const OPTION_TEXT_LIMIT: usize = 100;

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone)]
pub struct StaticLibrary {
    dir: PathBuf,
}

impl StaticLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StaticLibrary { dir: dir.into() }
    }

    /// All emoji image file names in the library, sorted.
    pub async fn list(&self) -> Vec<String> {
        debug!("🔍 Searching for static files in: {}", self.dir.display());

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("❌ Static folder {} unavailable: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let is_file = entry
                        .file_type()
                        .await
                        .map(|t| t.is_file())
                        .unwrap_or(false);
                    if !is_file {
                        continue;
                    }
                    // Select option values are capped at 100 characters, so longer names can't be picked.
                    if let Some(name) = entry.file_name().to_str() {
                        if has_image_extension(name) && name.len() <= OPTION_TEXT_LIMIT {
                            files.push(name.to_string());
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Error while reading static folder: {}", e);
                    break;
                }
            }
        }

        files.sort();
        info!("✅ Found {} static files.", files.len());
        files
    }

    /// Files whose name contains `query`, ignoring case. An empty query returns everything.
    pub async fn search(&self, query: &str) -> Vec<String> {
        filter_matches(self.list().await, query)
    }

    /// Loads one library file. Only bare file names with a known extension are accepted.
    pub async fn read(&self, file_name: &str) -> Result<EmojiImage, WorkflowError> {
        if !is_plain_file_name(file_name) || !has_image_extension(file_name) {
            warn!("Rejected static emoji file name: {:?}", file_name);
            return Err(WorkflowError::StaticFileMissing);
        }

        let path = self.dir.join(file_name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(EmojiImage::new(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(WorkflowError::StaticFileMissing)
            }
            Err(e) => Err(WorkflowError::StaticFileUnreadable(e.to_string())),
        }
    }
}

pub fn filter_matches(files: Vec<String>, query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return files;
    }

    files
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&query))
        .collect()
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub items: &'a [String],
    /// Zero-based, clamped to the last page.
    pub index: usize,
    pub total_pages: usize,
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }

    /// Index of the neighbouring page, if there is one.
    pub fn step(&self, forward: bool) -> Option<usize> {
        if forward {
            self.has_next().then(|| self.index + 1)
        } else {
            self.has_previous().then(|| self.index - 1)
        }
    }
}

pub fn total_pages(count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (count - 1) / PAGE_SIZE + 1
    }
}

pub fn paginate(results: &[String], page: usize) -> Page<'_> {
    let total_pages = total_pages(results.len());
    let index = page.min(total_pages.saturating_sub(1));
    let start = (index * PAGE_SIZE).min(results.len());
    let end = (start + PAGE_SIZE).min(results.len());

    Page {
        items: &results[start..end],
        index,
        total_pages,
    }
}

/// File name without its image extension.
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Human-friendly select label: no extension, underscores as spaces.
pub fn display_label(file_name: &str) -> String {
    let mut label = file_name.to_string();
    for ext in EXTENSIONS {
        if let Some(stripped) = strip_suffix_ignore_case(&label, &format!(".{}", ext)) {
            label = stripped.to_string();
            break;
        }
    }
    truncate_for_option(&label.replace('_', " "))
}

pub fn display_description(file_name: &str) -> String {
    truncate_for_option(file_name)
}

fn truncate_for_option(text: &str) -> String {
    if text.chars().count() <= OPTION_TEXT_LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(OPTION_TEXT_LIMIT - 3).collect();
        format!("{}...", head)
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if text.is_char_boundary(split) && text[split..].eq_ignore_ascii_case(suffix) {
        Some(&text[..split])
    } else {
        None
    }
}

fn has_image_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn is_plain_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.contains(['/', '\\'])
        && file_name != "."
        && file_name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_matches_is_case_insensitive() {
        let files = names(&["Cat_Smile.png", "dog.gif", "happy_cat.jpg"]);
        assert_eq!(
            filter_matches(files.clone(), "CAT"),
            names(&["Cat_Smile.png", "happy_cat.jpg"])
        );
        assert_eq!(filter_matches(files.clone(), "  "), files);
        assert!(filter_matches(files, "logo").is_empty());
    }

    #[test]
    fn test_pagination() {
        let files: Vec<String> = (0..60).map(|i| format!("emoji_{:02}.png", i)).collect();

        let first = paginate(&files, 0);
        assert_eq!(first.items.len(), 25);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = paginate(&files, 2);
        assert_eq!(last.items.len(), 10);
        assert_eq!(last.items[0], "emoji_50.png");
        assert!(last.has_previous());
        assert!(!last.has_next());

        let clamped = paginate(&files, 99);
        assert_eq!(clamped.index, 2);

        assert_eq!(first.step(true), Some(1));
        assert_eq!(first.step(false), None);
        assert_eq!(last.step(false), Some(1));
        assert_eq!(last.step(true), None);
    }

    #[test]
    fn test_pagination_empty() {
        let page = paginate(&[], 0);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert_eq!(total_pages(25), 1);
        assert_eq!(total_pages(26), 2);
    }

    #[test]
    fn test_labels() {
        assert_eq!(display_label("happy_cat_face.PNG"), "happy cat face");
        assert_eq!(display_label("logo.jpeg"), "logo");
        assert_eq!(file_stem("party_parrot.gif"), "party_parrot");

        let long = format!("{}.png", "x".repeat(150));
        let label = display_label(&long);
        assert_eq!(label.chars().count(), 100);
        assert!(label.ends_with("..."));
        assert_eq!(display_description(&long).chars().count(), 100);
    }

    #[tokio::test]
    async fn test_list_only_returns_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.GIF", "notes.txt", "c.jpeg"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let library = StaticLibrary::new(dir.path());
        assert_eq!(library.list().await, names(&["a.GIF", "b.png", "c.jpeg"]));
        assert_eq!(library.search("b").await, names(&["b.png"]));
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_empty() {
        let library = StaticLibrary::new("/definitely/not/here");
        assert!(library.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_rejects_paths_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"bytes").unwrap();
        let library = StaticLibrary::new(dir.path());

        assert_eq!(library.read("cat.png").await.unwrap().bytes, b"bytes".to_vec());
        assert_eq!(
            library.read("../cat.png").await.unwrap_err(),
            WorkflowError::StaticFileMissing
        );
        assert_eq!(
            library.read("dog.png").await.unwrap_err(),
            WorkflowError::StaticFileMissing
        );
        assert_eq!(
            library.read("cat.txt").await.unwrap_err(),
            WorkflowError::StaticFileMissing
        );
    }
}
