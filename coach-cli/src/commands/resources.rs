//! Terminal front end for the resource directory.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shared::{
    browser::{CategoryFilter, PageView, ResourceBrowser},
    language::Translator,
    models::{Resource, ResourceCatalog, ResourceCategory},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error};

use super::AppContext;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};

#[derive(Args, Debug)]
#[command(about = "Browse the resource directory")]
pub struct ResourcesArgs {
    /// Text matched against titles, descriptions and keywords
    #[arg(long, short)]
    pub query: Option<String>,

    /// Category name or short tag (official, trauma, research, tools, community, all)
    #[arg(long, short)]
    pub category: Option<String>,

    /// Page to show
    #[arg(long, short, default_value_t = 1)]
    pub page: usize,

    /// Read the catalog from a local JSON file instead of the server
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Keep the browser open and read searches and commands from stdin
    #[arg(long, short)]
    pub interactive: bool,
}

/// Accepts a catalog category name or its short tag, in any case.
pub(crate) fn resolve_category(input: &str) -> Option<CategoryFilter> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Some(CategoryFilter::All);
    }
    ResourceCategory::all()
        .into_iter()
        .find(|category| {
            category.as_str().eq_ignore_ascii_case(input)
                || ResourceCategory::style_tag(category.as_str()).eq_ignore_ascii_case(input)
        })
        .map(|category| CategoryFilter::Only(category.as_str().to_string()))
}

async fn read_catalog(path: &Path) -> Result<ResourceCatalog> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    ResourceCatalog::from_json(&raw).with_context(|| format!("invalid catalog {}", path.display()))
}

/// Reads the catalog from `file`, or fetches it from the server.
///
/// # Errors
/// Fails when the catalog cannot be read, fetched, or parsed.
pub async fn load_catalog(ctx: &AppContext, file: Option<&Path>) -> Result<ResourceCatalog> {
    if let Some(path) = file {
        return read_catalog(path).await;
    }
    let url = ctx
        .config
        .resources_url()
        .context("server URL cannot locate the resource directory")?;
    let catalog = ctx.client()?.fetch_resources(url).await?;
    Ok(catalog)
}

fn category_label(category: &str, translator: Translator) -> String {
    ResourceCategory::try_from(category).map_or_else(
        |_| category.to_string(),
        |known| translator.t(known.translation_key()),
    )
}

/// One resource card.
pub(crate) fn render_card(resource: &Resource, translator: Translator) -> String {
    let locale = translator.locale();
    let kind = resource.kind();
    let mut badges = vec![
        format!("[{}]", category_label(&resource.category, translator)),
        kind.label(translator),
    ];
    if let Some(location) = resource.location_label(translator) {
        badges.push(location);
    }

    let mut lines = vec![
        resource.localized_title(locale).bold().to_string(),
        format!("   {}", badges.join("  ")),
        format!("   {}", resource.localized_description(locale)),
    ];
    if !resource.grade_levels.is_empty() {
        lines.push(format!("   {}", resource.grade_levels.join(" · ").dimmed()));
    }
    lines.push(match resource.link() {
        Some(url) => format!("   {} {}", translator.t("visitResource"), url.underline()),
        None => format!("   {}", translator.t("viewDetails").dimmed()),
    });
    lines.join("\n")
}

fn pagination_line(view: &PageView<'_>, translator: Translator) -> Option<String> {
    let window = view.window.clone()?;
    let previous = translator.t("previous");
    let next = translator.t("next");
    let mut parts = vec![if view.previous_enabled {
        previous
    } else {
        previous.dimmed().to_string()
    }];
    parts.extend(window.map(|page| {
        if page == view.current_page {
            format!("[{page}]")
        } else {
            page.to_string()
        }
    }));
    parts.push(if view.next_enabled {
        next
    } else {
        next.dimmed().to_string()
    });
    Some(parts.join(" "))
}

/// The whole browser screen: summary, cards or placeholder, pagination.
pub(crate) fn render_page(browser: &ResourceBrowser, translator: Translator) -> String {
    let view = browser.view();
    let mut sections = vec![browser.results_summary(translator)];

    if view.is_empty() {
        sections.push(format!(
            "{}\n{}",
            translator.t("noResourcesTitle").bold(),
            translator.t("noResourcesText")
        ));
        return sections.join("\n\n");
    }

    sections.extend(view.items.iter().map(|resource| render_card(resource, translator)));
    if let Some(info) = browser.page_info(translator) {
        sections.push(info);
    }
    if let Some(line) = pagination_line(&view, translator) {
        sections.push(line);
    }
    sections.join("\n\n")
}

/// A line typed into the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowserInput {
    Search(String),
    Next,
    Previous,
    Go(Option<usize>),
    Category(String),
    ClearFilters,
    Help,
    Quit,
}

fn parse_browser_input(line: &str) -> BrowserInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return BrowserInput::Search(trimmed.to_string());
    };
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));
    match name {
        "n" | "next" => BrowserInput::Next,
        "p" | "prev" => BrowserInput::Previous,
        "g" | "go" => BrowserInput::Go(arg.parse().ok()),
        "c" | "category" => BrowserInput::Category(arg.to_string()),
        "clear" => BrowserInput::ClearFilters,
        "q" | "quit" => BrowserInput::Quit,
        _ => BrowserInput::Help,
    }
}

/// Applies a non-search command. Returns `false` to leave the browser.
fn apply(browser: &mut ResourceBrowser, input: BrowserInput, translator: Translator) -> bool {
    match input {
        BrowserInput::Search(query) => browser.set_query(query),
        BrowserInput::Next => {
            browser.next_page();
        }
        BrowserInput::Previous => {
            browser.previous_page();
        }
        BrowserInput::Go(Some(page)) => {
            if !browser.go_to_page(page) {
                debug!(page, "ignoring out-of-range page");
            }
        }
        BrowserInput::Category(raw) => match resolve_category(&raw) {
            Some(filter) => browser.set_category(filter),
            None => eprintln!(
                "{}",
                translator.format("unknownCategory", &[("category", raw.as_str())]).red()
            ),
        },
        BrowserInput::ClearFilters => browser.clear_filters(),
        BrowserInput::Go(None) | BrowserInput::Help => {
            println!("{}", translator.t("browserHelp"));
        }
        BrowserInput::Quit => return false,
    }
    true
}

async fn draw<W>(out: &mut W, screen: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(screen.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Reads searches and commands from `input` until `:q` or the end of input,
/// drawing every new page to `out`. Typed searches wait for the debounce;
/// a command or the end of input applies a pending search at once.
async fn browse<R, W>(
    mut browser: ResourceBrowser,
    translator: Translator,
    input: R,
    out: &mut W,
) -> Result<ResourceBrowser>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut search = Debouncer::new(SEARCH_DEBOUNCE);
    let help = translator.t("browserHelp").dimmed().to_string();
    draw(out, &help).await?;
    draw(out, &render_page(&browser, translator)).await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else { break };
                match parse_browser_input(&line) {
                    BrowserInput::Search(query) => search.push(query),
                    command => {
                        if let Some(query) = search.flush() {
                            browser.set_query(query);
                        }
                        if !apply(&mut browser, command, translator) {
                            return Ok(browser);
                        }
                        draw(out, &render_page(&browser, translator)).await?;
                    }
                }
            }
            query = search.settled(), if search.is_pending() => {
                browser.set_query(query);
                draw(out, &render_page(&browser, translator)).await?;
            }
        }
    }
    if let Some(query) = search.flush() {
        browser.set_query(query);
        draw(out, &render_page(&browser, translator)).await?;
    }
    Ok(browser)
}

/// `coach resources`.
///
/// # Errors
/// Fails when the catalog cannot be loaded or the category is unknown.
pub async fn run(ctx: &AppContext, args: ResourcesArgs) -> Result<()> {
    let translator = ctx.translator;
    let catalog = match load_catalog(ctx, args.file.as_deref()).await {
        Ok(catalog) => catalog,
        Err(err) => {
            error!(error = format!("{err:#}"), "resource directory unavailable");
            eprintln!("{}", translator.t("resourcesLoadError").red());
            return Err(err);
        }
    };

    let mut browser = ResourceBrowser::new(catalog.resources);
    if let Some(raw) = args.category.as_deref() {
        let Some(filter) = resolve_category(raw) else {
            anyhow::bail!(translator.format("unknownCategory", &[("category", raw)]));
        };
        browser.set_category(filter);
    }
    if let Some(query) = args.query {
        browser.set_query(query);
    }
    browser.go_to_page(args.page);

    if args.interactive {
        let input = BufReader::new(tokio::io::stdin());
        browse(browser, translator, input, &mut tokio::io::stdout()).await?;
        return Ok(());
    }
    println!("{}", render_page(&browser, translator));
    Ok(())
}
