use super::{load_config, DEFAULT_PAGES_FILE};
use anyhow::{Context, Result};
use canvas_engine::{
    DocumentEngine, ElementId, EngineConfig, JsonFileStore, ManualClock, Mutation, PageId,
    PageRegistry,
};
use canvas_preview::RenderSurface;
use canvas_protocol::{channel, PortReceiver, PortSender};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Script file: a JSON array of steps
    pub script: PathBuf,

    /// Page store to start from (empty default page otherwise)
    #[arg(long)]
    pub pages: Option<PathBuf>,

    /// Write the resulting pages back to the store
    #[arg(long)]
    pub save: bool,

    /// Print the render surface as HTML when done
    #[arg(long)]
    pub html: bool,
}

/// One scripted action, either on the engine (panel side) or on the surface
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Step {
    Mutate {
        mutation: Mutation,
    },
    Select {
        #[serde(default)]
        element_id: Option<ElementId>,
    },
    Hover {
        #[serde(default)]
        element_id: Option<ElementId>,
    },
    Undo,
    Redo,
    CreatePage {
        name: String,
    },
    SwitchPage {
        page_id: PageId,
    },
    DeletePage {
        page_id: PageId,
    },
    /// Click a node in the surface
    Click {
        element_id: ElementId,
    },
    /// Put the surface caret into a node
    Focus {
        element_id: ElementId,
        #[serde(default)]
        offset: usize,
    },
    /// Type at the surface caret
    Type {
        text: String,
    },
    /// Let time pass so debounce and echo windows can expire
    Wait {
        ms: u64,
    },
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Step::Mutate { mutation } => format!("mutate {}", mutation.name()),
            Step::Select { element_id } => format!("select {}", label(element_id.as_ref())),
            Step::Hover { element_id } => format!("hover {}", label(element_id.as_ref())),
            Step::Undo => "undo".to_string(),
            Step::Redo => "redo".to_string(),
            Step::CreatePage { name } => format!("create page {:?}", name),
            Step::SwitchPage { page_id } => format!("switch to {}", page_id),
            Step::DeletePage { page_id } => format!("delete page {}", page_id),
            Step::Click { element_id } => format!("click {}", element_id),
            Step::Focus { element_id, offset } => format!("focus {} at {}", element_id, offset),
            Step::Type { text } => format!("type {:?}", text),
            Step::Wait { ms } => format!("wait {}ms", ms),
        }
    }
}

fn label(id: Option<&ElementId>) -> String {
    id.map(ToString::to_string)
        .unwrap_or_else(|| "nothing".to_string())
}

fn check(ok: bool, reason: &str) -> Result<Option<String>, String> {
    if ok {
        Ok(None)
    } else {
        Err(reason.to_string())
    }
}

/// Engine and render surface wired together through ports
struct Session {
    engine: DocumentEngine,
    surface: RenderSurface,
    clock: ManualClock,
    to_surface: PortSender,
    surface_inbox: PortReceiver,
    to_engine: PortSender,
    engine_inbox: PortReceiver,
}

impl Session {
    fn new(config: EngineConfig, registry: PageRegistry) -> Self {
        let clock = ManualClock::new();
        let engine = DocumentEngine::new(config)
            .with_clock(clock.clone())
            .with_registry(registry);
        let surface = RenderSurface::new(engine.config().origin.clone());
        let (to_surface, surface_inbox) = channel();
        let (to_engine, engine_inbox) = channel();

        Self {
            engine,
            surface,
            clock,
            to_surface,
            surface_inbox,
            to_engine,
            engine_inbox,
        }
    }

    async fn start(&mut self) -> Result<usize> {
        self.surface.boot();
        self.settle().await
    }

    /// Deliver frames both ways until neither side has anything to say.
    /// Returns how many frames were delivered.
    async fn settle(&mut self) -> Result<usize> {
        let mut delivered = 0;
        loop {
            self.to_surface
                .post_all(self.engine.take_outgoing_frames())?;
            self.to_engine
                .post_all(self.surface.take_outgoing_frames())?;
            tokio::task::yield_now().await;

            let for_surface = self.surface_inbox.drain();
            let for_engine = self.engine_inbox.drain();
            if for_surface.is_empty() && for_engine.is_empty() {
                return Ok(delivered);
            }
            delivered += for_surface.len() + for_engine.len();

            for frame in &for_surface {
                // already logged by the surface
                let _ = self.surface.receive(frame);
            }
            for frame in &for_engine {
                self.engine.handle_frame(frame);
            }
        }
    }

    fn run_step(&mut self, step: Step) -> Result<Option<String>, String> {
        match step {
            Step::Mutate { mutation } => self
                .engine
                .try_apply(mutation)
                .map(|result| result.created.map(|id| id.to_string()))
                .map_err(|e| e.to_string()),
            Step::Select { element_id } => {
                self.engine.select(element_id);
                Ok(None)
            }
            Step::Hover { element_id } => {
                self.engine.hover(element_id);
                Ok(None)
            }
            Step::Undo => check(self.engine.undo(), "nothing to undo"),
            Step::Redo => check(self.engine.redo(), "nothing to redo"),
            Step::CreatePage { name } => self
                .engine
                .create_page(name)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| "engine disposed".to_string()),
            Step::SwitchPage { page_id } => {
                check(self.engine.switch_page(&page_id), "no such page")
            }
            Step::DeletePage { page_id } => {
                check(self.engine.delete_page(&page_id), "page cannot be deleted")
            }
            Step::Click { element_id } => self
                .surface
                .click(&element_id)
                .map(|_| None)
                .map_err(|e| e.to_string()),
            Step::Focus { element_id, offset } => self
                .surface
                .focus(&element_id, offset)
                .map(|_| None)
                .map_err(|e| e.to_string()),
            Step::Type { text } => self
                .surface
                .type_text(&text)
                .map(|_| None)
                .map_err(|e| e.to_string()),
            Step::Wait { ms } => {
                self.clock.advance(Duration::from_millis(ms));
                self.engine.poll();
                Ok(None)
            }
        }
    }
}

pub async fn replay(args: ReplayArgs, config: Option<&Path>, cwd: &Path) -> Result<()> {
    let config = load_config(config, cwd)?;

    let script_path = cwd.join(&args.script);
    let content = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read script {}", script_path.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;

    let pages_path = args
        .pages
        .as_deref()
        .unwrap_or(Path::new(DEFAULT_PAGES_FILE));
    let store = JsonFileStore::new(cwd.join(pages_path));
    let registry = if args.pages.is_some() {
        PageRegistry::load_or_default(&store)
    } else {
        PageRegistry::new()
    };

    println!(
        "{}",
        format!("▶ Replaying {} steps...", steps.len())
            .bright_blue()
            .bold()
    );

    let mut session = Session::new(config, registry);
    session.start().await?;

    let mut failures = 0;
    for (i, step) in steps.into_iter().enumerate() {
        let description = step.describe();
        match session.run_step(step) {
            Ok(note) => println!(
                "  {} {:>3} {}{}",
                "✓".green(),
                i + 1,
                description,
                note.map(|n| format!(" → {}", n.dimmed())).unwrap_or_default()
            ),
            Err(reason) => {
                failures += 1;
                println!(
                    "  {} {:>3} {} - {}",
                    "✗".red(),
                    i + 1,
                    description,
                    reason.red()
                );
            }
        }
        let frames = session.settle().await?;
        tracing::debug!(step = i + 1, frames, "Settled");
    }

    // let the last burst of typing land in history
    session.clock.advance(session.engine.config().debounce());
    session.engine.poll();

    let engine = &session.engine;
    println!();
    println!(
        "Page {} with {} elements, {} history entries (undo: {}, redo: {})",
        engine.current_page().name.bright_white(),
        canvas_engine::tree::count(engine.elements()),
        engine.history().map(|h| h.len()).unwrap_or_default(),
        engine.can_undo(),
        engine.can_redo()
    );
    println!("Surface shows {} nodes", session.surface.node_count());

    if args.html {
        println!();
        print!("{}", session.surface.to_html());
    }

    if args.save {
        engine.save(&store)?;
        println!("  {} Saved {}", "✓".green(), store.path().display());
    }

    if failures == 0 {
        println!("{}", "✨ Replay complete".green().bold());
    } else {
        println!("{}", format!("⚠️  {} steps rejected", failures).yellow());
    }

    Ok(())
}
