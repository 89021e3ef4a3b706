use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::page::{PageError, Separator, SharedPage};
use crate::preview::RenderError;

#[derive(Debug)]
pub enum BookletError {
    NotADirectory(PathBuf),
    CreateFolder { path: PathBuf, source: io::Error },
    /// `page` is 1-based, matching the file name.
    Draw { page: usize, source: PageError },
    Save { page: usize, source: RenderError },
}

impl fmt::Display for BookletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            Self::CreateFolder { path, source } => {
                write!(f, "unable to create {}: {}", path.display(), source)
            }
            Self::Draw { page, source } => write!(f, "page {} failed to draw: {}", page, source),
            Self::Save { page, source } => write!(f, "page {} failed to save: {}", page, source),
        }
    }
}

impl std::error::Error for BookletError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotADirectory(_) => None,
            Self::CreateFolder { source, .. } => Some(source),
            Self::Draw { source, .. } => Some(source),
            Self::Save { source, .. } => Some(source),
        }
    }
}

/// Ordered collection of pages persisted together.
#[derive(Clone, Debug, Default)]
pub struct FontBooklet {
    pages: Vec<SharedPage>,
}

impl FontBooklet {
    pub fn new(pages: Vec<SharedPage>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, SharedPage> {
        self.pages.iter()
    }

    /// Compose every page in order.
    pub fn draw(&self, separator: Option<Separator>) -> Result<(), BookletError> {
        for (idx, page) in self.pages.iter().enumerate() {
            page.borrow_mut()
                .draw(separator)
                .map_err(|source| BookletError::Draw {
                    page: idx + 1,
                    source,
                })?;
        }
        Ok(())
    }

    /// Write `page1.<extension>`, `page2.<extension>`, ... into `folder`.
    ///
    /// The folder is created when missing. Pages are saved as they are; call
    /// [`FontBooklet::draw`] first to compose them.
    pub fn save(
        &self,
        folder: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Vec<PathBuf>, BookletError> {
        let folder = folder.as_ref();
        if folder.exists() {
            if !folder.is_dir() {
                return Err(BookletError::NotADirectory(folder.to_path_buf()));
            }
        } else {
            std::fs::create_dir_all(folder).map_err(|source| BookletError::CreateFolder {
                path: folder.to_path_buf(),
                source,
            })?;
        }

        let extension = extension.trim_start_matches('.');
        let mut written = Vec::with_capacity(self.pages.len());
        for (idx, page) in self.pages.iter().enumerate() {
            let path = folder.join(format!("page{}.{}", idx + 1, extension));
            let saved = page
                .borrow()
                .save(Some(path.as_path()))
                .map_err(|source| BookletError::Save {
                    page: idx + 1,
                    source,
                })?;
            written.push(saved);
        }
        log::info!("saved {} pages to {}", written.len(), folder.display());
        Ok(written)
    }
}

impl From<Vec<SharedPage>> for FontBooklet {
    fn from(pages: Vec<SharedPage>) -> Self {
        Self::new(pages)
    }
}

impl FromIterator<SharedPage> for FontBooklet {
    fn from_iter<I: IntoIterator<Item = SharedPage>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FontBooklet {
    type Item = &'a SharedPage;
    type IntoIter = core::slice::Iter<'a, SharedPage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::page::FontPage;
    use crate::test_support::temp_dir;
    use std::rc::Rc;

    fn blank_page(width: u32) -> SharedPage {
        FontPage::with_dimension(Size::new(width, 20)).into_shared()
    }

    #[test]
    fn iteration_keeps_construction_order() {
        let pages = vec![blank_page(10), blank_page(20), blank_page(30)];
        let booklet = FontBooklet::new(pages.clone());
        assert_eq!(booklet.len(), 3);
        assert!(!booklet.is_empty());
        for (page, expected) in (&booklet).into_iter().zip(&pages) {
            assert!(Rc::ptr_eq(page, expected));
        }
    }

    #[test]
    fn save_creates_folder_and_numbers_pages() {
        let folder = temp_dir("booklet").join("nested");
        let booklet: FontBooklet = vec![blank_page(10), blank_page(20)].into();
        let written = booklet.save(&folder, "png").expect("save booklet");
        assert_eq!(
            written,
            vec![folder.join("page1.png"), folder.join("page2.png")]
        );
        assert!(written.iter().all(|path| path.is_file()));
        assert!(!folder.join("page3.png").exists());
        let _ = std::fs::remove_dir_all(folder.parent().unwrap_or(&folder));
    }

    #[test]
    fn save_rejects_file_path() {
        let dir = temp_dir("booklet-file");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let file = dir.join("occupied");
        std::fs::write(&file, b"x").expect("write file");
        let booklet = FontBooklet::new(vec![blank_page(10)]);
        let err = booklet.save(&file, "png").expect_err("file is not a folder");
        assert!(matches!(err, BookletError::NotADirectory(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn draw_reports_failing_page() {
        let booklet = FontBooklet::new(vec![blank_page(10)]);
        let err = booklet.draw(None).expect_err("page has no bands");
        assert!(matches!(err, BookletError::Draw { page: 1, .. }));
    }
}
