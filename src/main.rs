//! refdoc: generate API reference pages from reflected descriptor manifests.
//!
//! Supports three modes:
//!
//! - **stdin mode**: `refdoc < manifest.json` prints the index page
//! - **file mode**: `refdoc -o docs/api build/reflection/*.json`
//! - **route mode**: `refdoc --route '\App\Foo' build/reflection/*.json`

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use refdoc::descriptor::DescriptorGraph;
use refdoc::parser::{self, Populator};
use refdoc::render::{self, RenderContext, Renderer};
use refdoc::router::{
    ExternalLink, ExternalRouter, Router, RouterKind, RouterQueue, StandardRouter, Subject,
};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "refdoc",
    about = "Generate API reference pages from reflected descriptor manifests"
)]
struct Cli {
    /// Manifest files (glob patterns and directories supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), html, json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Link elements under a namespace prefix to external docs, as PREFIX=URL.
    /// `{FQSEN}` in the URL is replaced by the element path.
    /// Can be specified multiple times. E.g. --external 'Psr=https://www.php-fig.org/{FQSEN}'
    #[arg(long)]
    external: Vec<String>,

    /// Print where each reference is routed and exit. Manifests given as
    /// files are loaded so known elements route by their kind.
    #[arg(long, value_name = "REF")]
    route: Vec<String>,

    /// Route mode only: consult a single router (standard or external)
    #[arg(long, requires = "route")]
    router: Option<RouterKind>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.route.is_empty() {
        return route_mode(&cli);
    }

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// route mode: print `REF<TAB>destination` for every routed reference.
/// References naming a loaded element are routed as that element.
fn route_mode(cli: &Cli) -> Result<()> {
    let renderer: Box<dyn Renderer> = render::create_renderer(&cli.format)?;
    let graph = load_manifests(&expand_globs(&cli.files)?)?;
    let (_, links) = build_routers(renderer.file_extension(), &cli.external, &graph)?;

    let route = |subject: &Subject<'_>| match cli.router {
        Some(kind) => links.get(kind).and_then(|router| router.route(subject)),
        None => links.route(subject),
    };

    for reference in &cli.route {
        let subject = match graph.lookup(reference) {
            Some(id) => Subject::node(&graph, id),
            None => Subject::reference(reference),
        };
        match route(&subject) {
            Some(dest) => println!("{}\t{}", reference, dest),
            None => warn!(%reference, "no router matched"),
        }
    }
    Ok(())
}

/// stdin mode: read one manifest from stdin, write the index page to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let renderer: Box<dyn Renderer> = render::create_renderer(&cli.format)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let mut populator = Populator::new();
    populator
        .add_manifest(parser::parse(&input)?)
        .context("failed to load manifest from stdin")?;
    let graph = populator.finish();
    report_cycles(&graph);

    let (pages, links) = build_routers(renderer.file_extension(), &cli.external, &graph)?;
    let ctx = RenderContext {
        graph: &graph,
        pages: &pages,
        links: &links,
    };
    print!("{}", renderer.render_index(&ctx));
    Ok(())
}

/// file mode: load every manifest into one graph, write the index and one
/// page per file, namespace and class-like element.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;
    let renderer: Box<dyn Renderer> = render::create_renderer(&cli.format)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let graph = load_manifests(&expand_globs(&cli.files)?)?;

    let ext = renderer.file_extension().to_string();
    let (pages, links) = build_routers(&ext, &cli.external, &graph)?;
    let ctx = RenderContext {
        graph: &graph,
        pages: &pages,
        links: &links,
    };

    write_page(output_dir, &format!("index.{}", ext), &renderer.render_index(&ctx))?;
    let mut written = 1;
    for id in ctx.page_elements() {
        let Some(relative) = ctx.page_of(id) else {
            debug!(%id, "element has no page route");
            continue;
        };
        write_page(output_dir, &relative, &renderer.render_page(&ctx, id))?;
        written += 1;
    }

    info!(pages = written, dir = %output_dir.display(), "documentation written");
    Ok(())
}

/// Load every manifest into one graph. Unparsable files are skipped.
fn load_manifests(paths: &[PathBuf]) -> Result<DescriptorGraph> {
    let mut populator = Populator::new();
    for path in paths {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match parser::parse_file(path, &content) {
            Ok(manifest) => populator
                .add_manifest(manifest)
                .with_context(|| format!("failed to load {}", path.display()))?,
            Err(e) => warn!(path = %path.display(), error = %e, "skipping manifest"),
        }
    }
    let graph = populator.finish();
    report_cycles(&graph);
    Ok(graph)
}

/// Page placement router plus the link queue. External links are consulted
/// first so a configured prefix wins over a local page.
fn build_routers(
    ext: &str,
    external: &[String],
    graph: &DescriptorGraph,
) -> Result<(Router, RouterQueue)> {
    let links = external
        .iter()
        .map(|s| s.parse::<ExternalLink>())
        .collect::<Result<Vec<_>>>()?;

    let standard = StandardRouter::new(ext).with_graph(graph);
    let mut queue = RouterQueue::new();
    queue.push(Router::configure(
        RouterKind::External.as_str(),
        &ExternalRouter::new(links),
    ));
    queue.push(Router::configure(RouterKind::Standard.as_str(), &standard));

    Ok((Router::configure(RouterKind::Standard.as_str(), &standard), queue))
}

fn report_cycles(graph: &DescriptorGraph) {
    for err in graph.validate() {
        warn!(error = %err, "inheritance cycle; inherited values read as empty");
    }
}

fn write_page(output_dir: &Path, relative: &str, content: &str) -> Result<()> {
    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// File extensions recognized as manifests.
const SUPPORTED_EXTENSIONS: &[&str] = &["json"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for manifests.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                let supported = p
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
                if p.is_file() && supported {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!(%pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
