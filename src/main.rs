use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;

use pagescroll::config::{self, Config};
use pagescroll::layout::PageSize;
use pagescroll::source::{PageSource, SyntheticPages};
use pagescroll::surface::{Axis, Surface, ViewportId, VirtualSurface};
use pagescroll::viewer::{self, ContinuousDocument, Direction, RunOptions};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PAGESCROLL_BUILD_GIT_HASH"),
    " ",
    env!("PAGESCROLL_BUILD_PROFILE"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "pagescroll",
    version = VERSION,
    about = "Continuous page scrolling: layout, simulation and an interactive page map"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pixels per scroll step
    #[arg(long, global = true)]
    step: Option<u32>,

    /// Gap between pages in pixels
    #[arg(long, global = true)]
    gap: Option<u32>,

    /// Log output file path
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Args, Clone, Copy)]
struct PageArgs {
    /// Number of pages
    #[arg(long, default_value_t = 10)]
    pages: usize,

    /// Page height in pixels
    #[arg(long, default_value_t = 1014)]
    height: u32,

    /// Page width in pixels
    #[arg(long, default_value_t = 784)]
    width: u32,
}

impl PageArgs {
    fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }

    fn source(&self) -> SyntheticPages {
        SyntheticPages::uniform(self.pages, self.size())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the cumulative page offsets
    Layout {
        #[command(flatten)]
        pages: PageArgs,
    },
    /// Run scroll steps on virtual viewports and print their state
    Simulate {
        #[command(flatten)]
        pages: PageArgs,

        /// Number of scroll steps
        #[arg(long, default_value_t = 21)]
        steps: u32,

        /// Scroll backward (starting from the last page)
        #[arg(long)]
        backward: bool,

        /// Number of viewports showing the document
        #[arg(long, default_value_t = 1)]
        viewports: u32,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 800)]
        viewport_height: u32,
    },
    /// Interactive page map in the terminal
    View {
        #[command(flatten)]
        pages: PageArgs,

        /// Scale pages to the terminal width
        #[arg(long)]
        fit_width: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Command::View { .. });

    if let Some(log_path) = &cli.log {
        let file = match std::fs::File::create(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: failed to open log file {}: {e}", log_path.display());
                std::process::exit(1);
            }
        };
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if !interactive {
        env_logger::init();
    }
    // view mode + no --log → logger not initialized (no log output)

    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    cfg.merge_cli(cli.step, cli.gap);
    let config = cfg.resolve();

    let result = match cli.command {
        Command::Layout { pages } => cmd_layout(pages, &config),
        Command::Simulate {
            pages,
            steps,
            backward,
            viewports,
            viewport_height,
        } => cmd_simulate(pages, &config, steps, backward, viewports, viewport_height),
        Command::View { pages, fit_width } => viewer::run(
            pages.source(),
            &config,
            &RunOptions {
                page_size: pages.size(),
                fit_width,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_layout(pages: PageArgs, config: &Config) -> Result<()> {
    let doc_layout = pagescroll::layout::Layout::new(
        vec![pages.size(); pages.pages],
        config.scroll.page_gap,
    );
    println!("{:>6}  {:>10}  {:>10}", "page", "start", "end");
    for page in 1..=doc_layout.page_count() {
        println!(
            "{:>6}  {:>10}  {:>10}",
            page,
            doc_layout.page_start(page),
            doc_layout.page_start(page) + doc_layout.extent(page)
        );
    }
    println!("total extent: {}", doc_layout.total_extent());
    Ok(())
}

fn cmd_simulate(
    pages: PageArgs,
    config: &Config,
    steps: u32,
    backward: bool,
    viewports: u32,
    viewport_height: u32,
) -> Result<()> {
    if viewports == 0 {
        bail!("at least one viewport is required");
    }
    let mut doc = ContinuousDocument::new(pages.source(), config.scroll.clone());
    let mut surfaces: Vec<VirtualSurface> = (1..=viewports)
        .map(|i| VirtualSurface::new(ViewportId(i), pages.width, viewport_height))
        .collect();

    let (first, rest) = surfaces.split_at_mut(1);
    let primary = &mut first[0];
    doc.sync_viewport(primary);

    let direction = if backward {
        doc.last_page(primary);
        Direction::Backward
    } else {
        Direction::Forward
    };

    let mut crossings = 0;
    for i in 1..=steps {
        if let Some(out) = doc.scroll_by(primary, direction, config.scroll.step_size)
            && out.crossed
        {
            crossings += 1;
            info!(
                "step {i}: offset {} entered page {}, rendered {:?}",
                out.offset, out.page, out.materialized
            );
        }
    }

    for surface in rest.iter_mut() {
        doc.sync_viewport(surface);
    }

    println!(
        "{} page(s), {} step(s) of {}px {}, {crossings} page crossing(s), {} layout build(s), {} render(s)",
        doc.source().page_count(),
        steps,
        config.scroll.step_size,
        if backward { "backward" } else { "forward" },
        doc.layout_builds(),
        doc.source().render_count(),
    );
    for surface in &surfaces {
        let Some(state) = doc.state(surface.id()) else {
            continue;
        };
        let rel = state
            .relative_scroll()
            .map_or_else(|| "-".to_string(), |r| format!("{}+{:.4}", r.page, r.fraction));
        println!(
            "viewport {}: page {}, offset {}, relative {rel}, materialized {:?}",
            surface.id().0,
            state.current_page(),
            surface.read_scroll(Axis::Vertical),
            state.materialized(),
        );
    }
    Ok(())
}
