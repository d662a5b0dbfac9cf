// CLI commands for the practice workbench
use anyhow::{Context, Result};
use codelab_client::editor::{boilerplate, syntax_mode, BufferEditor, Editor, FileEditor};
use codelab_client::execution::RunOutcome;
use codelab_client::history::{render_detail, render_summary, status_style, HistoryView, StatusStyle};
use codelab_client::output::{OutputRegion, OutputState};
use codelab_client::prompt::{Confirmer, Notifier};
use codelab_client::store::FileStore;
use codelab_client::theme::{Document, StaticColorScheme, ThemeIcon, ThemePreference};
use codelab_client::transport::HttpTransport;
use codelab_client::workbench::{Workbench, WorkbenchParts};
use codelab_common::config::{parse_base_url, ClientConfig};
use codelab_common::types::{Language, RunMode};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Flags shared by every command
pub struct Options {
    pub base_url: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub buffer: Option<PathBuf>,
}

/// Notices go to stderr; confirmations read a y/N answer from stdin
struct TerminalPrompts {
    assume_yes: bool,
}

impl Notifier for TerminalPrompts {
    fn notify(&self, message: &str) {
        eprintln!("⚠️  {}", message);
    }
}

impl Confirmer for TerminalPrompts {
    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{}\nContinue? (y/N): ", question);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => input.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

struct Workspace {
    workbench: Workbench,
    config: ClientConfig,
    buffer_path: PathBuf,
}

fn load_config(options: &Options) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = &options.base_url {
        config.base_url = parse_base_url(raw).context("Invalid --base-url")?;
    }
    if let Some(dir) = &options.state_dir {
        config.state_dir = dir.clone();
    }
    Ok(config)
}

fn assemble(config: &ClientConfig, editor: Box<dyn Editor>, assume_yes: bool) -> Result<Workbench> {
    let transport = HttpTransport::new(
        config.base_url.clone(),
        config.cookies.clone(),
        config.csrf_cookie.clone(),
    )
    .context("Failed to create HTTP client")?;
    let prompts = Arc::new(TerminalPrompts { assume_yes });

    let mut parts = WorkbenchParts::new(
        Arc::new(FileStore::in_dir(&config.state_dir)),
        Arc::new(transport),
        editor,
        Arc::new(StaticColorScheme::new(config.color_scheme.clone())),
        prompts.clone(),
        prompts,
    );
    parts.autosave_period = config.autosave_period;
    Ok(Workbench::new(parts))
}

/// Workbench for commands that never touch the buffer file
fn connect(options: &Options) -> Result<Workspace> {
    let config = load_config(options)?;
    let buffer_path = buffer_path(options, &config);
    let workbench = assemble(&config, Box::new(BufferEditor::new()), false)?;
    Ok(Workspace {
        workbench,
        config,
        buffer_path,
    })
}

fn buffer_path(options: &Options, config: &ClientConfig) -> PathBuf {
    options
        .buffer
        .clone()
        .unwrap_or_else(|| config.state_dir.join("buffer"))
}

/// Assemble the workbench over the on-disk buffer.
///
/// Mirrors opening the editor page: the buffer's current content is
/// saved as a draft first, and a brand-new buffer gets the current
/// language's draft or starter program.
async fn open(options: &Options, assume_yes: bool) -> Result<Workspace> {
    let config = load_config(options)?;
    let buffer_path = buffer_path(options, &config);

    let editor = FileEditor::open(&buffer_path)
        .with_context(|| format!("Failed to open buffer {}", buffer_path.display()))?;
    let fresh_buffer = !editor.exists();
    let workbench = assemble(&config, Box::new(editor), assume_yes)?;

    if fresh_buffer {
        debug!(buffer = %buffer_path.display(), "New buffer; resolving initial content");
        workbench.load().await;
        flush(&workbench, &buffer_path).await?;
    } else {
        workbench.save_draft().await;
    }

    Ok(Workspace {
        workbench,
        config,
        buffer_path,
    })
}

async fn flush(workbench: &Workbench, buffer_path: &Path) -> Result<()> {
    workbench
        .sync_editor()
        .await
        .with_context(|| format!("Failed to write buffer {}", buffer_path.display()))
}

/// List the language catalog
pub async fn list_languages(options: &Options) -> Result<bool> {
    let ctx = connect(options)?;
    let current = ctx.workbench.current_language().await;

    println!("📚 Languages:");
    for language in Language::CATALOG.iter() {
        let marker = if *language == current { "*" } else { " " };
        println!(
            "  {} {:<8} {:<6} mode: {:<14} starter: {} lines",
            marker,
            language.as_str(),
            language.display_name(),
            syntax_mode(language).as_str(),
            boilerplate(language).lines().count()
        );
    }
    if !current.is_catalog() {
        println!("  * {:<8} (plain text, no starter program)", current.as_str());
    }
    Ok(true)
}

/// Switch the buffer to another language
pub async fn select_language(options: &Options, language: &str) -> Result<bool> {
    let ctx = open(options, false).await?;
    let language = Language::from(language);

    ctx.workbench.select_language(language.clone()).await;
    flush(&ctx.workbench, &ctx.buffer_path).await?;

    println!(
        "🔤 Switched to {} (mode: {})",
        language.display_name(),
        syntax_mode(&language).as_str()
    );
    println!("📝 Buffer: {}", ctx.buffer_path.display());
    Ok(true)
}

/// Confirmation-gated reset to the starter program
pub async fn reset(options: &Options, yes: bool) -> Result<bool> {
    let ctx = open(options, yes).await?;

    if !ctx.workbench.reset_code().await {
        println!("❌ Aborted");
        return Ok(true);
    }
    flush(&ctx.workbench, &ctx.buffer_path).await?;
    println!("♻️  Buffer reset to the {} starter program", ctx.workbench.current_language().await.display_name());
    Ok(true)
}

fn read_program_input(input: Option<&Path>, stdin_text: Option<&str>) -> Result<String> {
    match (input, stdin_text) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        (None, Some(text)) => Ok(text.to_string()),
        (None, None) => Ok(String::new()),
    }
}

fn print_output(region: &OutputRegion) {
    match region.state() {
        OutputState::Success => println!("✅ Success"),
        OutputState::Failed => println!("❌ Failed"),
        OutputState::Loading => println!("⏳ Executing..."),
        OutputState::Idle => {}
    }
    println!("{}", region.content());
}

/// Execute the buffer and print the result
pub async fn run(
    options: &Options,
    input: Option<&Path>,
    stdin_text: Option<&str>,
    problem: Option<u64>,
    mode: Option<RunMode>,
) -> Result<bool> {
    let program_input = read_program_input(input, stdin_text)?;
    let ctx = open(options, false).await?;
    let language = ctx.workbench.current_language().await;

    println!("🚀 Running {} on {}", language.display_name(), ctx.config.base_url);
    let outcome = match problem {
        Some(problem_id) => {
            let mode = mode.unwrap_or(RunMode::Run);
            ctx.workbench.run_problem(&program_input, problem_id, mode).await
        }
        None => ctx.workbench.run(&program_input).await,
    };

    if outcome == RunOutcome::Rejected {
        return Ok(false);
    }
    print_output(&ctx.workbench.output().await);
    info!(outcome = ?outcome, "Run finished");
    Ok(outcome == RunOutcome::Succeeded)
}

/// Autosave loop until Ctrl-C
pub async fn watch(options: &Options) -> Result<bool> {
    let ctx = open(options, false).await?;
    let registration = ctx.workbench.start();

    println!(
        "👀 Autosaving {} every {}s as the {} draft (Ctrl-C to stop)",
        ctx.buffer_path.display(),
        ctx.config.autosave_period.as_secs(),
        ctx.workbench.current_language().await.display_name()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    registration.dispose();
    ctx.workbench.save_draft().await;
    println!("\n💾 Draft saved");
    Ok(true)
}

fn style_marker(style: StatusStyle) -> &'static str {
    match style {
        StatusStyle::Positive => "✅",
        StatusStyle::Negative => "❌",
        StatusStyle::Pending => "⏳",
        StatusStyle::Neutral => "•",
    }
}

/// List past submissions
pub async fn history(options: &Options) -> Result<bool> {
    let ctx = connect(options)?;

    match ctx.workbench.list_submissions().await {
        HistoryView::Entries(entries) => {
            for entry in &entries {
                println!("{} {}", style_marker(status_style(&entry.status)), render_summary(entry));
            }
            Ok(true)
        }
        view @ HistoryView::Empty => {
            println!("{}", view);
            Ok(true)
        }
        view @ HistoryView::Unavailable => {
            println!("{}", view);
            Ok(false)
        }
    }
}

/// Show one submission
pub async fn show(options: &Options, id: u64) -> Result<bool> {
    let ctx = connect(options)?;
    match ctx.workbench.view_submission(id).await {
        Some(detail) => {
            println!("{}", render_detail(&detail));
            Ok(true)
        }
        None => Ok(false),
    }
}

fn icon_glyph(icon: ThemeIcon) -> &'static str {
    match icon {
        ThemeIcon::Moon => "🌙",
        ThemeIcon::Sun => "☀️",
        ThemeIcon::Desktop => "🖥️",
    }
}

/// Set or re-apply the theme preference
pub async fn theme(options: &Options, preference: Option<ThemePreference>) -> Result<bool> {
    let ctx = connect(options)?;
    let mut document = Document::default();

    let preference = preference.unwrap_or_else(|| ctx.workbench.saved_theme());
    let theme = ctx
        .workbench
        .set_theme(preference, &mut document)
        .context("Failed to save theme preference")?;

    let glyph = document.icon.map(icon_glyph).unwrap_or("");
    println!("{} Theme: {} (preference: {})", glyph, theme.as_str(), preference);
    Ok(true)
}
