//! Folio - 书籍写作服务命令行客户端
//!
//! 组装: 配置 → 日志 → 草稿存储 / HTTP 传输 / 事件发布 → 服务 → 命令处理器

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use folio::application::ports::{DraftStorePort, HttpTransportPort, WorkflowEvent, WorkflowEventPort};
use folio::application::services::{
    ChapterSynchronizer, ProgressObserver, ProjectSynchronizer, RemoteBookApi, RunLauncher,
    TransportFallbackCoordinator,
};
use folio::application::{
    FinalizeProfile, FinalizeProfileHandler, Generate, GenerateHandler, GetDraft, GetDraftHandler,
    ResetDraft, ResetDraftHandler, UpdateProfile, UpdateProfileHandler, WorkflowError,
};
use folio::config::{load_config, load_config_from_path, print_config, AppConfig};
use folio::domain::draft::{ExportFormat, ProfileUpdate};
use folio::domain::run::{ModeRequest, Outcome, ProgressSnapshot};
use folio::infrastructure::{
    ArtifactWriter, EventPublisher, ReqwestTransport, ReqwestTransportConfig, SledDraftStore,
    SledDraftStoreConfig,
};

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Client for the book-writing service")]
struct Cli {
    /// 配置文件路径（默认搜索 folio.toml / folio.local.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the local draft
    Show,
    /// Edit profile fields locally
    Set(ProfileArgs),
    /// Generate the table of contents
    Toc,
    /// Refine the table of contents with feedback
    RefineToc {
        #[arg(long)]
        feedback: String,
    },
    /// Generate one chapter
    Chapter {
        #[arg(long)]
        number: u32,
    },
    /// Export the manuscript
    Export {
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Confirm the profile and save it to the remote project
    FinalizeProfile(ProfileArgs),
    /// Delete the remote project and start a fresh draft
    Reset,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    audience: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    tone: Option<String>,
    #[arg(long)]
    words: Option<u32>,
    #[arg(long)]
    subtitle: Option<String>,
    #[arg(long)]
    brief: Option<String>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        ProfileUpdate {
            title: args.title,
            genre: args.genre,
            target_audience: args.audience,
            language: args.language,
            tone: args.tone,
            target_word_count: args.words,
            subtitle: args.subtitle,
            instruction_brief: args.brief,
        }
    }
}

/// 组装好的处理器
struct App {
    store: Arc<dyn DraftStorePort>,
    events: Arc<EventPublisher>,
    generate: GenerateHandler,
    finalize: FinalizeProfileHandler,
    reset: ResetDraftHandler,
}

fn build_app(config: &AppConfig) -> anyhow::Result<App> {
    let store: Arc<dyn DraftStorePort> = Arc::new(SledDraftStore::new(&SledDraftStoreConfig {
        db_path: config.storage.draft_db_path.clone(),
        key: config.storage.draft_key.clone(),
    })?);

    let mut transport_config = ReqwestTransportConfig::new(&config.api.base_url)
        .with_timeout(config.api.timeout_secs);
    if let Some(token) = &config.api.token {
        transport_config = transport_config.with_token(token);
    }
    let transport: Arc<dyn HttpTransportPort> = Arc::new(ReqwestTransport::new(transport_config)?);

    let publisher = Arc::new(EventPublisher::new());
    let events: Arc<dyn WorkflowEventPort> = publisher.clone();

    let api = Arc::new(RemoteBookApi::new(transport, config.api.routes.route_table()));
    let projects = Arc::new(ProjectSynchronizer::new(api.clone(), store.clone(), events.clone()));
    let chapters = Arc::new(ChapterSynchronizer::new(api.clone(), events.clone()));
    let launcher = Arc::new(RunLauncher::new(
        api.clone(),
        projects.clone(),
        chapters,
        events.clone(),
        config.poll.policy(),
    ));
    let coordinator = Arc::new(TransportFallbackCoordinator::new(
        launcher,
        api.clone(),
        events.clone(),
    ));

    Ok(App {
        generate: GenerateHandler::new(coordinator, store.clone()),
        finalize: FinalizeProfileHandler::new(projects, store.clone(), events),
        reset: ResetDraftHandler::new(api, store.clone()),
        store,
        events: publisher,
    })
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("warn,folio={}", config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // 日志走 stderr，stdout 留给命令输出
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// 只在阶段变化时打印一行
fn progress_printer() -> ProgressObserver {
    let last = Mutex::new(String::new());
    Arc::new(move |snapshot: &ProgressSnapshot| {
        let line = format!("[{}] {}", snapshot.status, snapshot.describe());
        if let Ok(mut last) = last.lock() {
            if *last != line {
                println!("{}", line);
                *last = line;
            }
        }
    })
}

fn print_outcome(outcome: &Outcome) {
    for warning in &outcome.warnings {
        println!("warning: {}", warning);
    }
    if let Some(outline) = &outcome.outline {
        if !outline.synopsis.is_empty() {
            println!("{}", outline.synopsis);
        }
        for chapter in &outline.chapters {
            println!("  {:>2}. {}", chapter.number, chapter.title);
        }
    }
    if let Some(chapter) = &outcome.chapter {
        println!(
            "Chapter {}: {} ({} words)",
            chapter.number.map(|n| n.to_string()).unwrap_or_default(),
            chapter.title,
            chapter.content.split_whitespace().count()
        );
    }
    for step in &outcome.next_steps {
        println!("next: {}", step);
    }
    if outcome.used_fallback {
        println!("note: server used fallback for {}", outcome.fallback_stages.join(", "));
    }
}

async fn generate(app: &App, request: ModeRequest) -> Result<Outcome, WorkflowError> {
    let outcome = app
        .generate
        .handle(Generate::new(request).with_observer(progress_printer()))
        .await?;
    print_outcome(&outcome);
    if !outcome.success {
        return Err(WorkflowError::from_failed_outcome(&outcome));
    }
    Ok(outcome)
}

async fn run(app: &App, command: Command) -> anyhow::Result<Result<(), WorkflowError>> {
    let result = match command {
        Command::Show => {
            let summary = GetDraftHandler::new(app.store.clone()).handle(GetDraft).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Set(args) => UpdateProfileHandler::new(app.store.clone())
            .handle(UpdateProfile { update: args.into() })
            .await
            .map(|draft| println!("Profile updated: {}", draft.profile().title)),
        Command::Toc => generate(app, ModeRequest::Outline).await.map(|_| ()),
        Command::RefineToc { feedback } => generate(app, ModeRequest::RefineOutline { feedback })
            .await
            .map(|_| ()),
        Command::Chapter { number } => generate(app, ModeRequest::Chapter { number })
            .await
            .map(|_| ()),
        Command::Export { format, out_dir } => {
            match generate(app, ModeRequest::Export { format }).await {
                Ok(outcome) => {
                    let writer = ArtifactWriter::new(&out_dir);
                    for path in writer.write_artifacts(&outcome).await? {
                        println!("wrote {}", path.display());
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Command::FinalizeProfile(args) => {
            let mut events = app.events.subscribe_global();
            match app
                .finalize
                .handle(FinalizeProfile { update: args.into() })
                .await
            {
                Ok(Some(task)) => {
                    task.await?;
                    while let Ok(event) = events.try_recv() {
                        if let WorkflowEvent::ProfileSyncFinished { ok, message } = event {
                            println!("{}{}", if ok { "" } else { "error: " }, message);
                        }
                    }
                    Ok(())
                }
                Ok(None) => {
                    println!("A profile sync is already running.");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Command::Reset => app.reset.handle(ResetDraft).await.map(|report| {
            if let Some(project_id) = report.deleted_project {
                println!("Deleted remote project {}", project_id);
            }
            if let Some(error) = report.remote_error {
                println!("warning: remote project not deleted: {}", error);
            }
            println!("Local draft reset.");
        }),
    };
    Ok(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    if let Some(parent) = std::path::Path::new(&config.storage.draft_db_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let app = build_app(&config)?;

    if let Err(e) = run(&app, cli.command).await? {
        eprintln!("error: {}", e.user_message());
        if let Some(trace_id) = e.trace_id() {
            eprintln!("trace id: {}", trace_id);
        }
        std::process::exit(1);
    }

    Ok(())
}
