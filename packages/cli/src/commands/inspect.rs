use super::{load_config, DEFAULT_PAGES_FILE};
use anyhow::{anyhow, Result};
use canvas_engine::{DocumentEngine, Element, JsonFileStore, PageId, PageStore};
use canvas_preview::RenderSurface;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Page store to read
    #[arg(default_value = DEFAULT_PAGES_FILE)]
    pub pages: PathBuf,

    /// Only show this page
    #[arg(short, long)]
    pub page: Option<String>,

    /// Print the rendered HTML instead of the element tree
    #[arg(long)]
    pub html: bool,
}

pub fn inspect(args: InspectArgs, config: Option<&Path>, cwd: &Path) -> Result<()> {
    let config = load_config(config, cwd)?;
    let path = cwd.join(&args.pages);
    let store = JsonFileStore::new(&path);

    // Inspect reports a broken store instead of quietly starting empty
    if store.load()?.is_none() {
        return Err(anyhow!("No page store at {}", path.display()));
    }
    let engine = DocumentEngine::load(config, &store);

    let pages: Vec<_> = match &args.page {
        Some(id) => {
            let page = engine
                .registry()
                .get(&PageId::new(id.as_str()))
                .ok_or_else(|| anyhow!("No page with id {}", id))?;
            vec![page]
        }
        None => engine.registry().pages().iter().collect(),
    };

    for page in pages {
        let marker = if &page.id == engine.registry().current_id() {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "{} {} {} ({} elements)",
            marker,
            page.name.bright_white().bold(),
            page.id.as_str().dimmed(),
            canvas_engine::tree::count(&page.elements)
        );

        if args.html {
            print!("{}", render_html(&engine, &page.elements));
        } else if page.elements.is_empty() {
            println!("    {}", "(empty)".dimmed());
        } else {
            for element in &page.elements {
                print_element(element, 1);
            }
        }
        println!();
    }

    Ok(())
}

fn print_element(element: &Element, depth: usize) {
    let mut line = format!("{}{}", "  ".repeat(depth), element.tag.cyan());
    line.push_str(&format!(" #{}", element.id.as_str().dimmed()));
    if !element.classes.is_empty() {
        line.push_str(&format!(" .{}", element.classes.join(".").yellow()));
    }
    if let Some(content) = &element.content {
        line.push_str(&format!(" {:?}", content));
    }
    println!("{}", line);

    for child in &element.children {
        print_element(child, depth + 1);
    }
}

fn render_html(engine: &DocumentEngine, elements: &[Element]) -> String {
    let mut surface = RenderSurface::new(engine.config().origin.clone());
    surface.boot();
    surface.apply(canvas_engine::AuthorityMessage::FullSync {
        elements: elements.to_vec(),
        style_config: engine.config().style_config.clone(),
    });
    surface.to_html()
}
