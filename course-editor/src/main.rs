mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use course_editor::{
    adapters::outbound::{
        lms::LmsCourseBackend,
        memory::{InMemoryCourseBackend, DEMO_COURSE_ID},
    },
    config,
    domain::{
        drag::{DragEvent, DragGesture},
        models::{ActivityId, CourseId, NewActivity, NewSection, SectionId},
        ports::outbound::CourseBackend,
        services::CourseEditor,
    },
    runtime::{channel, run_actions, Action},
};
use lms_client::LmsClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::ConfigPath = cli.command {
        println!("{}", config::config_directory().display());
        println!("environment: {}", config::app_environment()?);
        return Ok(());
    }

    let settings = config::read_config().context("Failed to read configuration")?;
    init_tracing(&settings.log.filter);

    if cli.dev {
        let course_id = cli.course.unwrap_or_else(|| DEMO_COURSE_ID.to_string());
        let backend = Arc::new(InMemoryCourseBackend::seeded());
        return run(cli.command, backend, CourseId::new(course_id)).await;
    }

    let course_id = cli
        .course
        .or(settings.editor.course_id)
        .context("No course given. Pass --course or set editor.course_id")?;

    let mut client = LmsClient::new(&settings.api.base_url, settings.api.timeout())
        .context("Failed to create LMS client")?;
    if let Some(token) = settings.api.token {
        client = client.with_token(token);
    }
    info!(base_url = %client.base_url(), course_id = %course_id, "Using LMS backend");
    let backend = Arc::new(LmsCourseBackend::new(client));
    run(cli.command, backend, CourseId::new(course_id)).await
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run<B: CourseBackend>(
    command: Commands,
    backend: Arc<B>,
    course_id: CourseId,
) -> Result<()> {
    let mut editor = CourseEditor::new(backend, course_id);
    editor.load().await.context("Failed to load course")?;

    let actions = actions_for(command)?;
    let total = actions.len();

    let (action_tx, action_rx) = channel();
    for action in actions {
        action_tx.send(action).context("Action queue closed")?;
    }
    drop(action_tx);

    let summary = run_actions(action_rx, &mut editor).await;
    print_course(&editor);

    if let Some(status) = editor.status() {
        eprintln!("{}", status);
    }
    if summary.failed > 0 {
        bail!("{} of {} actions failed", summary.failed, total);
    }
    Ok(())
}

fn actions_for(command: Commands) -> Result<Vec<Action>> {
    let action = match command {
        Commands::Show | Commands::ConfigPath => return Ok(Vec::new()),
        Commands::Replay { path } => {
            return Ok(read_gestures(&path)?
                .into_iter()
                .map(|gesture| Action::Drag(DragEvent::from(gesture)))
                .collect());
        }
        Commands::MoveSection { from, to } => Action::Drag(DragEvent::SectionMove {
            from_index: from,
            to_index: to,
        }),
        Commands::MoveActivity {
            from_section,
            from_index,
            to_section,
            to_index,
        } => Action::Drag(DragEvent::ActivityMove {
            source_section_id: SectionId::new(from_section),
            source_index: from_index,
            dest_section_id: SectionId::new(to_section),
            dest_index: to_index,
        }),
        Commands::AddSection { title, description } => {
            Action::CreateSection(NewSection { title, description })
        }
        Commands::RenameSection { section_id, title } => Action::RenameSection {
            section_id: SectionId::new(section_id),
            title,
        },
        Commands::DeleteSection { section_id } => {
            Action::DeleteSection(SectionId::new(section_id))
        }
        Commands::AddActivity {
            section_id,
            title,
            kind,
            content,
            description,
        } => {
            let mut activity = NewActivity::new(title, kind);
            activity.content = content;
            activity.description = description;
            Action::AddActivity {
                section_id: SectionId::new(section_id),
                activity,
            }
        }
        Commands::RenameActivity {
            section_id,
            activity_id,
            title,
        } => Action::RenameActivity {
            section_id: SectionId::new(section_id),
            activity_id: ActivityId::new(activity_id),
            name: title,
        },
        Commands::DeleteActivity {
            section_id,
            activity_id,
        } => Action::DeleteActivity {
            section_id: SectionId::new(section_id),
            activity_id: ActivityId::new(activity_id),
        },
    };
    Ok(vec![action])
}

fn read_gestures(path: &Path) -> Result<Vec<DragGesture>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse drag gestures in {}", path.display()))
}

fn print_course<B: CourseBackend>(editor: &CourseEditor<B>) {
    println!("Course {}", editor.course_id());
    if editor.store().is_empty() {
        println!("  (no sections)");
    }
    for section in editor.store().sections() {
        println!("{:>3}. {} [{}]", section.order, section.title, section.id);
        for activity in &section.activities {
            println!(
                "     {:>3}. {} ({}) [{}]",
                activity.order, activity.name, activity.kind, activity.id
            );
        }
    }
}
