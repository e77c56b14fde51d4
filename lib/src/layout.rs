use std::sync::Arc;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{Chainable, Result};
use crate::tree::{ElementId, Tree};
use crate::include;

/// File name of a layout template.
pub const TEMPLATE_FILE: &str = "_template.html";

/// A layout template, read and include-expanded.
#[derive(Debug)]
pub struct Layout {
    pub path: PathBuf,
    pub text: String,
}

/// Finds the layout template nearest to a page.
///
/// The search starts in the page's directory and climbs the tree one parent
/// at a time. It never leaves the tree: a page with no `_template.html` in
/// any directory up to and including the source root has no layout.
#[derive(Debug, Default)]
pub struct Layouts {
    cache: FxHashMap<ElementId, Arc<Layout>>,
}

impl Layouts {
    pub fn new() -> Self {
        Layouts::default()
    }

    /// Resolves the layout for the element `page`.
    pub fn resolve(&mut self, tree: &Tree, page: ElementId) -> Result<Arc<Layout>> {
        let mut searched = vec![];
        for dir in tree.ancestors_of(page) {
            if let Some(layout) = self.cache.get(&dir) {
                let layout = layout.clone();
                self.remember(&searched, &layout);
                return Ok(layout);
            }

            let dir_path = &tree[dir].path;
            log::debug!("finding template in {}", dir_path.display());
            searched.push(dir);

            let candidate = dir_path.join(TEMPLATE_FILE);
            if candidate.is_file() {
                let layout = Arc::new(Layout::read(candidate)?);
                self.remember(&searched, &layout);
                return Ok(layout);
            }
        }

        err! {
            "no layout template found",
            "page" => tree[page].path.display(),
            "expected file" => TEMPLATE_FILE,
            "searched up to" => tree.root().path.display(),
        }
    }

    fn remember(&mut self, dirs: &[ElementId], layout: &Arc<Layout>) {
        for &dir in dirs {
            self.cache.insert(dir, layout.clone());
        }
    }
}

impl Layout {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Layout> {
        let path = path.as_ref();
        let text = include::read_expanded(path).chain_with(|| error! {
            "failed to load layout template",
            "path" => path.display(),
        })?;

        Ok(Layout { path: path.to_path_buf(), text })
    }
}
