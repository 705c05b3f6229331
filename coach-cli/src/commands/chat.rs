//! Chat session with the support coach.
//!
//! [`ChatSession`] owns the transcript and enforces one outstanding request
//! at a time. Anything that draws the conversation implements [`ChatView`]
//! and is told about each change as it happens, so the user's bubble and the
//! typing indicator appear before the backend answers.

use std::{
    fmt,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shared::{
    config::client::ClientConfig,
    language::{Locale, Translator},
    models::{ChatMessage, ChatRequest, LoadingId, Notice, Sender, Transcript, cap_sources},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    AppContext, documents, print_notice, styled_notice,
    status::{self, StatusReport},
    upload,
};
use crate::api::CoachClient;

#[derive(Args, Debug)]
#[command(about = "Chat with the support coach")]
pub struct ChatArgs {
    /// Send one message, print the reply and exit
    #[arg(long, short)]
    pub message: Option<String>,

    /// Answer without searching uploaded documents
    #[arg(long)]
    pub no_rag: bool,
}

/// Result of [`ChatSession::send_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Empty,
    /// Another reply is still pending; nothing happened.
    Busy,
    /// The coach answered.
    Replied,
    /// The request failed and the apology was shown.
    Failed,
}

/// Receives transcript changes as they happen.
pub trait ChatView: fmt::Debug + Send + Sync {
    fn user_message(&self, message: &ChatMessage, translator: Translator);
    fn loading(&self, visible: bool, translator: Translator);
    fn assistant_message(&self, message: &ChatMessage, translator: Translator);
}

#[derive(Debug, Clone)]
struct ChatSettings {
    use_rag: bool,
    provider: Option<String>,
    translator: Translator,
    sources_limit: usize,
}

#[derive(Debug)]
pub struct ChatSession {
    client: CoachClient,
    session_id: Uuid,
    settings: Mutex<ChatSettings>,
    transcript: Mutex<Transcript>,
    in_flight: AtomicBool,
    view: Arc<dyn ChatView>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the single-flight flag; released on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Removes the typing indicator if the send ends early.
struct LoadingCleanup<'a> {
    session: &'a ChatSession,
    id: LoadingId,
    translator: Translator,
}

impl Drop for LoadingCleanup<'_> {
    fn drop(&mut self) {
        self.session.finish_loading(self.id, self.translator);
    }
}

impl ChatSession {
    /// Starts a session with a fresh random id.
    pub fn new(
        client: CoachClient,
        config: &ClientConfig,
        translator: Translator,
        view: Arc<dyn ChatView>,
    ) -> Self {
        Self {
            client,
            session_id: Uuid::new_v4(),
            settings: Mutex::new(ChatSettings {
                use_rag: config.use_rag,
                provider: config.provider.clone(),
                translator,
                sources_limit: config.sources_limit,
            }),
            transcript: Mutex::new(Transcript::new()),
            in_flight: AtomicBool::new(false),
            view,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn client(&self) -> &CoachClient {
        &self.client
    }

    /// Copy of the transcript as it stands now.
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        lock(&self.transcript).clone()
    }

    #[must_use]
    pub fn translator(&self) -> Translator {
        lock(&self.settings).translator
    }

    pub fn set_translator(&self, translator: Translator) {
        lock(&self.settings).translator = translator;
    }

    #[must_use]
    pub fn use_rag(&self) -> bool {
        lock(&self.settings).use_rag
    }

    pub fn set_use_rag(&self, enabled: bool) {
        lock(&self.settings).use_rag = enabled;
    }

    #[must_use]
    pub fn provider(&self) -> Option<String> {
        lock(&self.settings).provider.clone()
    }

    pub fn set_provider(&self, provider: Option<String>) {
        lock(&self.settings).provider = provider;
    }

    /// Sends `text` to the coach and records both sides of the exchange.
    ///
    /// Blank input and sends made while a reply is pending are rejected
    /// without touching the transcript or the network. Any failure is
    /// turned into the apology bubble.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Empty;
        }
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!("send rejected while a reply is pending");
            return SendOutcome::Busy;
        };

        let settings = lock(&self.settings).clone();
        let translator = settings.translator;
        let request = ChatRequest {
            message: message.to_string(),
            session_id: Some(self.session_id.to_string()),
            use_rag: settings.use_rag,
            provider: settings.provider.clone(),
            language: Some(translator.locale().code().to_string()),
        };

        let user = ChatMessage::user(message);
        let loading = {
            let mut transcript = lock(&self.transcript);
            transcript.push_user(message);
            transcript.begin_loading()
        };
        self.view.user_message(&user, translator);
        self.view.loading(true, translator);
        let _cleanup = LoadingCleanup {
            session: self,
            id: loading,
            translator,
        };

        let (reply, outcome) = match self.client.chat(&request).await {
            Ok(response) => {
                let sources = cap_sources(response.sources, settings.sources_limit);
                (
                    ChatMessage::assistant(response.response, sources, response.provider),
                    SendOutcome::Replied,
                )
            }
            Err(err) => {
                warn!(session = %self.session_id, error = %err, "chat request failed");
                (
                    ChatMessage::assistant(translator.t("chatApology"), Vec::new(), None),
                    SendOutcome::Failed,
                )
            }
        };

        self.finish_loading(loading, translator);
        lock(&self.transcript).push_assistant(
            reply.text.clone(),
            reply.sources.clone(),
            reply.provider.clone(),
        );
        self.view.assistant_message(&reply, translator);
        outcome
    }

    fn finish_loading(&self, id: LoadingId, translator: Translator) {
        let removed = {
            let mut transcript = lock(&self.transcript);
            let was_loading = transcript.is_loading();
            transcript.end_loading(id);
            was_loading && !transcript.is_loading()
        };
        if removed {
            self.view.loading(false, translator);
        }
    }
}

/// Draws the conversation on stdout.
#[derive(Debug, Default)]
pub struct TerminalView;

impl ChatView for TerminalView {
    fn user_message(&self, message: &ChatMessage, translator: Translator) {
        println!("{}", format_message(message, translator));
    }

    fn loading(&self, visible: bool, translator: Translator) {
        if visible {
            println!("{}", translator.t("typingIndicator").dimmed());
        }
    }

    fn assistant_message(&self, message: &ChatMessage, translator: Translator) {
        println!("{}", format_message(message, translator));
    }
}

/// One bubble as terminal text.
pub(crate) fn format_message(message: &ChatMessage, translator: Translator) -> String {
    match message.sender {
        Sender::User => format!(
            "{} {}",
            format!("{}:", translator.t("userLabel")).cyan().bold(),
            message.text
        ),
        Sender::Assistant => {
            let mut label = translator.t("coachBadge").green().bold().to_string();
            if let Some(provider) = &message.provider {
                label = format!("{label} {}", format!("[{provider}]").dimmed());
            }
            let mut lines = vec![label, message.text.clone()];
            if !message.sources.is_empty() {
                lines.push(translator.t("sourcesHeader").yellow().to_string());
                lines.extend(message.source_lines().into_iter().map(|line| format!("  {line}")));
            }
            lines.join("\n")
        }
    }
}

pub(crate) fn welcome_banner(translator: Translator) -> String {
    format!(
        "{}\n{} {}\n{}\n  - {}\n  - {}\n{}\n{}",
        translator.t("welcomeTitle").bold(),
        translator.t("welcomeStrong").bold(),
        translator.t("welcomeIntro"),
        translator.t("welcomePrompt"),
        translator.t("welcomeQuestion1"),
        translator.t("welcomeQuestion2"),
        translator.t("welcomeClosing"),
        translator.t("chatHelp").dimmed(),
    )
}

/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplInput {
    Message(String),
    Upload(Option<PathBuf>),
    Clear,
    Status,
    Rag(Option<bool>),
    Provider(Option<String>),
    Language(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> ReplInput {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Message(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|arg| !arg.is_empty())),
        None => (command, None),
    };
    match name {
        "upload" => ReplInput::Upload(arg.map(PathBuf::from)),
        "clear" => ReplInput::Clear,
        "status" => ReplInput::Status,
        "rag" => ReplInput::Rag(match arg {
            Some("on") => Some(true),
            Some("off") => Some(false),
            _ => None,
        }),
        "provider" => ReplInput::Provider(arg.map(ToString::to_string)),
        "lang" => ReplInput::Language(arg.map(ToString::to_string)),
        "help" => ReplInput::Help,
        "quit" | "exit" => ReplInput::Quit,
        other => ReplInput::Unknown(other.to_string()),
    }
}

/// Per-run state of the interactive prompt.
struct Repl<'a, R> {
    ctx: &'a AppContext,
    session: ChatSession,
    status: StatusReport,
    last_notice: Option<(Notice, Instant)>,
    input: Lines<R>,
}

impl<'a, R> Repl<'a, R>
where
    R: AsyncBufRead + Unpin,
{
    fn new(ctx: &'a AppContext, session: ChatSession, status: StatusReport, input: R) -> Self {
        Self {
            ctx,
            session,
            status,
            last_notice: None,
            input: input.lines(),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.input.next_line().await?)
    }

    /// Handles lines until `/quit` or the end of input.
    async fn drive(&mut self) -> Result<()> {
        while let Some(line) = self.read_line("> ").await.context("failed to read input")? {
            if !self.handle(&line).await? {
                break;
            }
        }
        Ok(())
    }

    fn show_notice(&mut self, notice: Notice, status: Option<StatusReport>) {
        print_notice(&notice);
        if let Some(status) = status {
            self.status = status;
        }
        self.last_notice = Some((notice, Instant::now()));
    }

    /// Status bar plus the latest notice while it is still visible.
    fn status_lines(&self) -> Vec<String> {
        let mut lines = self.status.render(self.session.translator());
        if let Some((notice, shown_at)) = &self.last_notice
            && notice.is_visible_after(shown_at.elapsed())
        {
            lines.push(styled_notice(notice));
        }
        lines
    }

    fn show_status(&self) {
        for line in self.status_lines() {
            println!("{line}");
        }
    }

    /// Banner, status bar and the whole transcript in the current language.
    fn screen(&self) -> String {
        let translator = self.session.translator();
        let mut sections = vec![welcome_banner(translator)];
        sections.extend(self.status_lines());
        sections.extend(
            self.session
                .transcript()
                .messages()
                .iter()
                .map(|message| format_message(message, translator)),
        );
        sections.join("\n")
    }

    fn redraw(&self) {
        println!("{}", self.screen());
    }

    /// Selects `name` when the backend lists it. Unknown names leave the
    /// current provider in place.
    fn select_provider(&mut self, name: String) {
        let translator = self.session.translator();
        if !self.status.providers.accepts(&name) {
            eprintln!(
                "{}",
                translator.format("providerUnknown", &[("provider", name.as_str())]).red()
            );
            println!(
                "{}: {}",
                translator.t("providersAvailable"),
                self.status.providers.available.join(", ")
            );
            return;
        }
        println!("{}", translator.format("providerSet", &[("provider", name.as_str())]));
        self.status.providers.selected = Some(name.clone());
        self.session.set_provider(Some(name));
    }

    /// Saves the language, then redraws everything in it.
    fn switch_language(&mut self, code: &str) {
        let locale = match code.parse::<Locale>() {
            Ok(locale) => locale,
            Err(message) => {
                eprintln!("{}", message.red());
                return;
            }
        };
        if let Err(err) = self.ctx.preferences.set_language(locale) {
            warn!(error = %err, "could not save language preference");
        }
        let translator = Translator::new(locale);
        self.session.set_translator(translator);
        self.redraw();
        let name = super::language::native_name(locale);
        println!("{}", translator.format("languageSet", &[("language", name.as_str())]));
    }

    /// Handles one line; `false` ends the session.
    async fn handle(&mut self, line: &str) -> Result<bool> {
        let translator = self.session.translator();
        let provider = self.session.provider();
        match parse_input(line) {
            ReplInput::Message(text) => {
                if self.session.send_message(&text).await == SendOutcome::Busy {
                    println!("{}", translator.t("busyMessage").yellow());
                }
            }
            ReplInput::Upload(path) => {
                if path.is_some() {
                    println!("{}", translator.t("uploadInProgress"));
                }
                let outcome = upload::upload_document(
                    self.session.client(),
                    path.as_deref(),
                    translator,
                    provider.as_deref(),
                )
                .await;
                self.show_notice(outcome.notice, outcome.status);
            }
            ReplInput::Clear => {
                let answer = self
                    .read_line(&format!("{} [y/N] ", translator.t("clearConfirm")))
                    .await?
                    .unwrap_or_default();
                if documents::is_yes(&answer) {
                    let outcome = documents::clear_documents(
                        self.session.client(),
                        translator,
                        provider.as_deref(),
                    )
                    .await;
                    self.show_notice(outcome.notice, outcome.status);
                } else {
                    println!("{}", translator.t("clearCancelled"));
                }
            }
            ReplInput::Status => {
                self.status = status::check_status(self.session.client(), provider.as_deref()).await;
                self.show_status();
            }
            ReplInput::Rag(Some(enabled)) => {
                self.session.set_use_rag(enabled);
                let key = if enabled { "ragEnabled" } else { "ragDisabled" };
                println!("{}", translator.t(key));
            }
            ReplInput::Rag(None) => {
                let key = if self.session.use_rag() { "ragEnabled" } else { "ragDisabled" };
                println!("{}", translator.t(key));
            }
            ReplInput::Provider(Some(name)) => self.select_provider(name),
            ReplInput::Provider(None) => self.show_status(),
            ReplInput::Language(Some(code)) => self.switch_language(&code),
            ReplInput::Language(None) => {
                for line in super::language::language_menu(translator.locale()) {
                    println!("{line}");
                }
            }
            ReplInput::Quit => return Ok(false),
            ReplInput::Help | ReplInput::Unknown(_) => println!("{}", translator.t("chatHelp")),
        }
        Ok(true)
    }
}

/// `coach chat`: one message with `--message`, otherwise the interactive
/// prompt.
///
/// # Errors
/// Fails when the client cannot be built, stdin cannot be read, or a
/// one-shot message gets no answer.
pub async fn run(ctx: &AppContext, args: ChatArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    if args.no_rag {
        config.use_rag = false;
    }
    let client = ctx.client()?;
    let session = ChatSession::new(client, &config, ctx.translator, Arc::new(TerminalView));

    if let Some(message) = args.message {
        return match session.send_message(&message).await {
            SendOutcome::Replied => Ok(()),
            SendOutcome::Empty => anyhow::bail!("message is empty"),
            SendOutcome::Busy | SendOutcome::Failed => anyhow::bail!("the coach did not answer"),
        };
    }

    debug!(session = %session.session_id(), "chat session started");
    let status = status::check_status(session.client(), config.provider.as_deref()).await;
    if status.providers.selected.is_some() {
        session.set_provider(status.providers.selected.clone());
    }
    let mut repl = Repl::new(ctx, session, status, BufReader::new(tokio::io::stdin()));
    repl.redraw();
    repl.drive().await
}
