//! Page text sources
//!
//! The pipeline reads page text only through the [`PageSource`] trait.
//! [`InMemoryPageSource`] backs tests; [`DirectoryPageSource`] reads one
//! text file per page from disk, which is how the CLI feeds productions
//! that have already been through OCR.

use crate::{CapabilityError, PageSource};
use async_trait::async_trait;
use std::path::PathBuf;

/// Page source backed by a vector of page texts (page 1 is index 0)
#[derive(Debug, Clone, Default)]
pub struct InMemoryPageSource {
    pages: Vec<String>,
}

impl InMemoryPageSource {
    /// Create from page texts in page order
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Convenience: `count` pages of placeholder text
    pub fn blank(count: u32) -> Self {
        Self {
            pages: (1..=count).map(|p| format!("(page {})", p)).collect(),
        }
    }
}

#[async_trait]
impl PageSource for InMemoryPageSource {
    fn total_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn page_text(&self, page: u32) -> Result<String, CapabilityError> {
        if page == 0 || page as usize > self.pages.len() {
            return Err(CapabilityError::Permanent(format!(
                "page {} out of range 1..={}",
                page,
                self.pages.len()
            )));
        }
        Ok(self.pages[page as usize - 1].clone())
    }
}

/// Page source reading `page-0001.txt`, `page-0002.txt`, ... from a
/// directory of pre-extracted page text.
pub struct DirectoryPageSource {
    dir: PathBuf,
    total_pages: u32,
}

impl DirectoryPageSource {
    /// Open a directory, counting its `page-NNNN.txt` files
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CapabilityError> {
        let dir = dir.into();
        let mut count = 0u32;
        loop {
            if !dir.join(Self::file_name(count + 1)).exists() {
                break;
            }
            count += 1;
        }
        if count == 0 {
            return Err(CapabilityError::Permanent(format!(
                "no page files found in {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir,
            total_pages: count,
        })
    }

    fn file_name(page: u32) -> String {
        format!("page-{:04}.txt", page)
    }
}

#[async_trait]
impl PageSource for DirectoryPageSource {
    fn total_pages(&self) -> u32 {
        self.total_pages
    }

    async fn page_text(&self, page: u32) -> Result<String, CapabilityError> {
        if page == 0 || page > self.total_pages {
            return Err(CapabilityError::Permanent(format!(
                "page {} out of range 1..={}",
                page, self.total_pages
            )));
        }
        let path = self.dir.join(Self::file_name(page));
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            // Disk reads can fail transiently; the retry wrapper decides
            CapabilityError::Transient(format!("read {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pages() {
        let source = InMemoryPageSource::new(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(source.total_pages(), 2);
        assert_eq!(source.page_text(1).await.unwrap(), "one");
        assert_eq!(source.page_text(2).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_in_memory_out_of_range() {
        let source = InMemoryPageSource::blank(3);
        assert!(source.page_text(0).await.is_err());
        assert!(source.page_text(4).await.is_err());
    }

    #[test]
    fn test_directory_file_names() {
        assert_eq!(DirectoryPageSource::file_name(1), "page-0001.txt");
        assert_eq!(DirectoryPageSource::file_name(123), "page-0123.txt");
    }
}
