use std::sync::Arc;
use std::path::{Component, Path};
use std::{fmt, fs};

use rustc_hash::FxHashMap;

use crate::error::{Chainable, Result};
use crate::include;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

/// The source tree, read completely into memory.
///
/// Elements live in an arena indexed by [`ElementId`]. A directory owns the
/// ids of its children; `parent` is a plain id pointing back up, so the tree
/// is never cyclic in terms of ownership.
#[derive(Debug)]
pub struct Tree {
    elements: Vec<Element>,
    map: FxHashMap<Arc<Path>, ElementId>,
}

#[derive(Debug)]
pub struct Element {
    pub id: ElementId,
    pub path: Arc<Path>,
    pub file_name: String,
    pub parent: Option<ElementId>,
    pub depth: usize,
    /// Location of the element relative to the site root, always starting
    /// with `/`. Everything but a directory ends in `.html`.
    pub url: String,
    pub kind: Kind,
}

#[derive(Debug)]
pub enum Kind {
    /// Children in directory listing order.
    Dir(Vec<ElementId>),
    Page(Page),
    /// Opaque file, read only when copied.
    File,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Origin {
    Markdown,
    Html,
}

#[derive(Debug)]
pub struct Page {
    pub origin: Origin,
    /// First line of a markdown source. Always empty for HTML sources.
    pub title: String,
    /// Raw markdown, or include-expanded HTML.
    pub content: String,
}

/// Entries starting with `_` are layouts and partials, never content.
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('_')
}

impl Tree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            elements: vec![],
        }
    }

    /// Reads the directory at `root` and everything below it, classifying
    /// each non-hidden entry. Any unreadable entry fails the whole build.
    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        use jwalk::{Parallelism, WalkDir};

        let root = root.as_ref();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .skip_hidden(false)
            .sort(false)
            .parallelism(Parallelism::Serial)
            .process_read_dir(|_, _, _, children| {
                children.retain(|child| match child {
                    Ok(entry) => !is_hidden(&entry.file_name.to_string_lossy()),
                    Err(_) => true,
                });
            });

        let mut tree = Tree::new();
        for entry in walker {
            let mut entry = entry.chain_with(|| error! {
                "failed to walk source directory",
                "source root" => root.display(),
            })?;

            if let Some(e) = entry.read_children_error.take() {
                return Err(crate::Error::from(e).chain(error! {
                    "failed to list directory",
                    "path" => entry.path().display(),
                }));
            }

            tree.insert(entry)?;
        }

        match tree.elements.first() {
            None => err! {
                "source directory could not be read",
                "source root" => root.display(),
            },
            Some(e) if !matches!(e.kind, Kind::Dir(_)) => err! {
                "source root must be a directory",
                "source root" => root.display(),
            },
            Some(_) => Ok(tree),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn root(&self) -> &Element {
        &self[self.root_id()]
    }

    pub fn root_id(&self) -> ElementId {
        ElementId(0)
    }

    /// Looks up an element by its path relative to the tree root.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Element> {
        let full_path = self.root().path.join(path.as_ref());
        self.map.get(&*full_path).map(|&id| &self[id])
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        match &self[id].kind {
            Kind::Dir(children) => children,
            _ => &[],
        }
    }

    pub fn ancestors_of(&self, mut element: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::from_fn(move || {
            let parent = self[element].parent?;
            element = parent;
            Some(parent)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Visits `root` and its descendants in pre-order, children in listing
    /// order, stopping at the first error.
    pub fn try_depth_first_search<F, E>(&self, root: ElementId, mut visit: F) -> Result<(), E>
        where F: FnMut(&Element) -> Result<(), E>
    {
        fn _dfs<F, E>(tree: &Tree, root: ElementId, visit: &mut F) -> Result<(), E>
            where F: FnMut(&Element) -> Result<(), E>
        {
            visit(&tree[root])?;
            for &child in tree.children(root) {
                _dfs(tree, child, visit)?;
            }

            Ok(())
        }

        _dfs(self, root, &mut visit)
    }

    /// Renders the tree in a compact single line form, for diagnostics:
    /// `(dir: src [(page: index.md Home), (file: logo.png)])`.
    pub fn visualize(&self) -> Visualize<'_> {
        Visualize(self, self.root_id())
    }

    fn insert(&mut self, entry: jwalk::DirEntry<((), ())>) -> Result<ElementId> {
        let path: Arc<Path> = Arc::from(entry.path().into_boxed_path());
        let parent = self.map.get(&entry.parent_path).cloned()
            .filter(|_| entry.depth > 0);

        let kind = if entry.file_type.is_dir() {
            Kind::Dir(vec![])
        } else {
            classify(&path)?
        };

        let element = Element {
            id: ElementId(self.elements.len()),
            url: url_of(&path, entry.depth, &kind),
            file_name: entry.file_name.to_string_lossy().into_owned(),
            path,
            parent,
            depth: entry.depth,
            kind,
        };

        log::trace!("found {} at {}", element.url, element.path.display());
        self.map.insert(element.path.clone(), element.id);
        if let Some(parent) = element.parent {
            if let Kind::Dir(children) = &mut self.elements[parent.0].kind {
                children.push(element.id);
            }
        }

        let id = element.id;
        self.elements.push(element);
        Ok(id)
    }
}

fn classify(path: &Path) -> Result<Kind> {
    let read = || fs::read_to_string(path).chain_with(|| error! {
        "failed to read page source",
        "path" => path.display(),
    });

    let kind = match path.extension().and_then(|e| e.to_str()) {
        Some("md") => Kind::Page(Page::from_markdown(&read()?)),
        Some("html") => {
            let dir = path.parent().unwrap_or(Path::new(""));
            let content = include::expand(&read()?, dir).chain_with(|| error! {
                "include expansion failed",
                "page" => path.display(),
            })?;

            Kind::Page(Page { origin: Origin::Html, title: String::new(), content })
        }
        _ => Kind::File,
    };

    Ok(kind)
}

fn url_of(path: &Path, depth: usize, kind: &Kind) -> String {
    let relative = relative_to_depth(path, depth);
    let mut url = String::from("/");
    let components = relative.components().filter_map(|c| match c {
        Component::Normal(c) => Some(c.to_string_lossy()),
        _ => None,
    });

    for (i, component) in components.enumerate() {
        if i > 0 {
            url.push('/');
        }

        url.push_str(&component);
    }

    if !matches!(kind, Kind::Dir(_)) {
        let stem_end = url.rfind('.').filter(|&i| i > url.rfind('/').unwrap_or(0) + 1);
        if let Some(i) = stem_end {
            url.truncate(i);
        }

        url.push_str(".html");
    }

    url
}

/// The trailing `depth` components of `path`.
fn relative_to_depth(path: &Path, depth: usize) -> &Path {
    let mut components = path.components();
    for _ in 0..(path.components().count().saturating_sub(depth)) {
        components.next();
    }

    components.as_path()
}

impl Page {
    /// Splits a markdown source into its title, on the first line, and its
    /// content, everything after the second line. The second line is a
    /// separator and is dropped.
    pub fn from_markdown(text: &str) -> Page {
        let mut lines = text.split('\n');
        let title = lines.next().unwrap_or("").trim_end_matches('\r').to_string();
        let content = lines.skip(1).collect::<Vec<_>>().join("\n");
        Page { origin: Origin::Markdown, title, content }
    }
}

impl Element {
    /// Path relative to the root of the tree.
    pub fn relative_path(&self) -> &Path {
        relative_to_depth(&self.path, self.depth)
    }

    pub fn as_page(&self) -> Option<&Page> {
        match &self.kind {
            Kind::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, Kind::Dir(_))
    }
}

pub struct Visualize<'a>(&'a Tree, ElementId);

impl fmt::Display for Visualize<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Visualize(tree, id) = *self;
        let element = &tree[id];
        match &element.kind {
            Kind::Page(page) => write!(f, "(page: {} {})", element.file_name, page.title),
            Kind::File => write!(f, "(file: {})", element.file_name),
            Kind::Dir(children) => {
                write!(f, "(dir: {} [", element.file_name)?;
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    Visualize(tree, child).fmt(f)?;
                }

                write!(f, "])")
            }
        }
    }
}

impl std::ops::Index<ElementId> for Tree {
    type Output = Element;

    fn index(&self, index: ElementId) -> &Self::Output {
        &self.elements[index.0]
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
