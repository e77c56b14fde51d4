use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Chainable, Result};
use crate::layout::Layouts;
use crate::render::{Renderer, TemplateSource};
use crate::tree::{Element, Kind, Origin, Tree};

/// Writes a source tree out as a site.
///
/// The tree is read completely when the generator is created. Generation
/// then walks it depth first, rendering pages and copying files into the
/// output directory, and stops at the first failure.
#[derive(Debug)]
pub struct Generator {
    config: Config,
    tree: Tree,
    layouts: Layouts,
    renderer: Renderer,
}

/// What a generation run produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub rendered: usize,
    pub copied: usize,
}

impl Generator {
    pub fn new(config: Config) -> Result<Self> {
        let tree = Tree::build(&config.src).chain_with(|| error! {
            "failed to read source tree",
            "source directory" => config.src.display(),
        })?;

        log::debug!("source tree: {}", tree.visualize());
        Ok(Generator { config, tree, layouts: Layouts::new(), renderer: Renderer::new() })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Where `element` is written to: the output directory joined with the
    /// element's path relative to the source root. Pages always end in
    /// `.html`.
    pub fn destination(&self, element: &Element) -> PathBuf {
        destination(&self.config.out, element)
    }

    pub fn generate(&mut self) -> Result<Summary> {
        let Generator { config, tree, layouts, renderer } = self;
        let tree = &*tree;
        let mut summary = Summary::default();

        tree.try_depth_first_search(tree.root_id(), |element| -> Result<()> {
            let output = destination(&config.out, element);
            match &element.kind {
                Kind::Dir(_) => Ok(()),
                Kind::Page(page) => {
                    log::info!("rendering {}", element.path.display());
                    let rendered = match page.origin {
                        Origin::Html => renderer.render(element, page, TemplateSource::OwnContent)?,
                        Origin::Markdown => {
                            let layout = layouts.resolve(tree, element.id)?;
                            renderer.render(element, page, TemplateSource::Layout(&layout))?
                        }
                    };

                    write(&output, rendered.as_bytes())?;
                    summary.rendered += 1;
                    Ok(())
                }
                Kind::File => {
                    log::info!("copying {}", element.path.display());
                    copy(&element.path, &output)?;
                    summary.copied += 1;
                    Ok(())
                }
            }
        })?;

        Ok(summary)
    }
}

fn destination(out: &Path, element: &Element) -> PathBuf {
    let path = out.join(element.relative_path());
    match element.kind {
        Kind::Page(_) => path.with_extension("html"),
        _ => path,
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .chain_with(|| error! {
                "failed to create output directory",
                "path" => dir.display(),
            }),
        _ => Ok(()),
    }
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).chain_with(|| error! {
        "failed to write output file",
        "path" => path.display(),
    })
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    ensure_parent(to)?;
    fs::copy(from, to).map(|_| ()).chain_with(|| error! {
        "failed to copy file",
        "source path" => from.display(),
        "destination path" => to.display(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config::Config;
    use super::{Generator, Summary};

    fn write(root: &Path, path: &str, contents: &[u8]) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn maps_destinations() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src, "docs/page.md", b"Docs\n\nBody");
        write(&src, "img/logo.png", b"\x89PNG");
        write(&src, "about.html", b"<p/>");

        let out = dir.path().join("www");
        let generator = Generator::new(Config::new(&src, &out)).unwrap();
        let tree = generator.tree();

        let page = tree.get("docs/page.md").unwrap();
        assert_eq!(generator.destination(page), out.join("docs/page.html"));

        let logo = tree.get("img/logo.png").unwrap();
        assert_eq!(generator.destination(logo), out.join("img/logo.png"));

        let about = tree.get("about.html").unwrap();
        assert_eq!(generator.destination(about), out.join("about.html"));
    }

    #[test]
    fn relative_config_paths_map_like_the_site() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/docs/page.md", b"Docs\n\nBody");

        // Element paths keep the configured prefix; only the relative part
        // is joined onto the output root.
        let src = dir.path().join("src");
        let generator = Generator::new(Config::new(&src, "www")).unwrap();
        let page = generator.tree().get("docs/page.md").unwrap();
        assert_eq!(generator.destination(page), Path::new("www/docs/page.html"));
    }

    #[test]
    fn generates_pages_and_files() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src, "_template.html", b"<h1>{{ Title }}</h1>{{ markdown(Content) }}");
        write(&src, "docs/page.md", b"Docs\n\nBody");
        write(&src, "img/logo.png", &[0, 159, 146, 150, 255]);

        let out = dir.path().join("www");
        let summary = Generator::new(Config::new(&src, &out)).unwrap().generate().unwrap();
        assert_eq!((summary.rendered, summary.copied), (1, 1));

        let html = fs::read_to_string(out.join("docs/page.html")).unwrap();
        assert_eq!(html, "<h1>Docs</h1><p>Body</p>\n");
        assert_eq!(fs::read(out.join("img/logo.png")).unwrap(), [0, 159, 146, 150, 255]);
        assert!(!out.join("_template.html").exists());
    }

    #[test]
    fn empty_source_generates_nothing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();

        let out = dir.path().join("www");
        let summary = Generator::new(Config::new(&src, &out)).unwrap().generate().unwrap();
        assert_eq!(summary, Summary::default());
        assert!(!out.exists());
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src, "index.html", b"fresh");

        let out = dir.path().join("www");
        write(&out, "index.html", b"stale and much longer");
        Generator::new(Config::new(&src, &out)).unwrap().generate().unwrap();
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "fresh");
    }

    #[test]
    fn missing_layout_aborts() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src, "page.md", b"Page\n\nBody");

        let out = dir.path().join("www");
        let e = Generator::new(Config::new(&src, &out)).unwrap().generate().unwrap_err();
        assert_eq!(e.message(), "no layout template found");
        assert!(!out.join("page.html").exists());
    }
}
