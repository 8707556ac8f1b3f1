use crate::cli::commands::{
    AuthCommands, Cli, Commands, FeedCommands, NoteCommands, PageArgs, QuestionCommands,
};
use anyhow::{Context, Result, bail};
use rednote::api::{Id, ImageUpload, NoteDraft, QuestionQuery, RegisterRequest, UserInfo};
use rednote::app::status::render_status;
use rednote::feed::{FeedTab, LoadMore};
use rednote::router::Resolution;
use rednote::{AppContext, Config};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

/// What `auth` commands print; the token itself never leaves the store.
#[derive(Serialize)]
struct SessionView {
    logged_in: bool,
    phone: Option<String>,
    user: Option<UserInfo>,
}

impl SessionView {
    fn of(app: &AppContext) -> Self {
        Self {
            logged_in: app.session_store.is_logged_in(),
            phone: app.session_store.phone(),
            user: app.session_store.user_info(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let app = AppContext::from_config(config).context("Failed to set up the client")?;

    match cli.command {
        Commands::Auth { auth_command } => run_auth(&app, auth_command).await,
        Commands::Feed { feed_command } => match feed_command {
            FeedCommands::Recommend { paging } => run_feed(&app, FeedTab::Recommend, paging).await,
            FeedCommands::Following { paging } => run_feed(&app, FeedTab::Following, paging).await,
        },
        Commands::Note { note_command } => run_note(&app, note_command).await,
        Commands::Question { question_command } => run_question(&app, question_command).await,
        Commands::Route { path } => run_route(&app, &path),
    }
}

async fn run_auth(app: &AppContext, command: AuthCommands) -> Result<()> {
    let store = &app.session_store;
    match command {
        AuthCommands::SendCode { phone } => {
            if !store.send_code(&phone).await {
                bail!("Verification code was not sent");
            }
        }
        AuthCommands::Login { phone, code } => {
            if !store.login(&phone, &code).await {
                bail!("Login failed");
            }
            // Profile caching is best effort; login already succeeded.
            store.fetch_user_info().await;
        }
        AuthCommands::Register {
            phone,
            code,
            nickname,
            password,
        } => {
            let request = RegisterRequest {
                phone,
                code,
                nickname,
                password,
                ..RegisterRequest::default()
            };
            if !store.register(&request).await {
                bail!("Registration failed");
            }
        }
        AuthCommands::Logout => store.logout(),
        AuthCommands::Status => {
            println!("{}", render_status(&app.config, store));
            return Ok(());
        }
        AuthCommands::Whoami => {
            if !store.is_logged_in() {
                bail!("Not logged in; run `rednote auth login` first");
            }
            let Some(info) = store.fetch_user_info().await else {
                bail!("Could not fetch the user profile");
            };
            return print_json(&info);
        }
    }
    print_json(&SessionView::of(app))
}

async fn run_feed(app: &AppContext, tab: FeedTab, paging: PageArgs) -> Result<()> {
    app.feed.select_tab(tab);
    app.feed.fetch_notes(paging.page).await?;

    for _ in 1..paging.pages {
        match app.feed.load_more_notes().await? {
            LoadMore::Fetched(outcome) => debug!(outcome = ?outcome, "feed.page"),
            LoadMore::Skipped => break,
        }
    }
    print_json(&app.feed.snapshot())
}

async fn run_note(app: &AppContext, command: NoteCommands) -> Result<()> {
    match command {
        NoteCommands::Show { id, comments } => {
            let id = Id::new(id);
            app.feed.fetch_note_detail(&id).await?;
            if comments {
                app.feed.fetch_note_comments(&id, 1).await?;
            }
            print_json(&json!({
                "note": app.feed.current_note(),
                "comments": comments.then(|| app.feed.comments()),
            }))
        }
        NoteCommands::Like { id } => {
            let id = Id::new(id);
            app.feed.fetch_note_detail(&id).await?;
            let like_count = app.feed.like_note(&id).await?;
            print_json(&json!({ "id": id, "liked": true, "likeCount": like_count }))
        }
        NoteCommands::Unlike { id } => {
            let id = Id::new(id);
            app.feed.fetch_note_detail(&id).await?;
            let like_count = app.feed.unlike_note(&id).await?;
            print_json(&json!({ "id": id, "liked": false, "likeCount": like_count }))
        }
        NoteCommands::Comment { id, content } => {
            let comment = app.feed.comment_note(&Id::new(id), &content).await?;
            print_json(&comment)
        }
        NoteCommands::Publish {
            title,
            content,
            images,
            tags,
        } => {
            let mut urls = Vec::with_capacity(images.len());
            for path in &images {
                let upload = ImageUpload::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                urls.push(app.notes.upload_image(upload).await?);
            }
            info!(images = urls.len(), "note.publish.uploaded");

            let draft = NoteDraft {
                title,
                content,
                images: urls,
                tags,
                ..NoteDraft::default()
            };
            let created = app.feed.publish_note(&draft).await?;
            print_json(&created)
        }
        NoteCommands::Upload { path } => {
            let upload = ImageUpload::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let url = app.notes.upload_image(upload).await?;
            print_json(&json!({ "url": url }))
        }
        NoteCommands::Delete { id } => {
            let payload = app.notes.delete(&Id::new(id)).await?;
            print_json(&payload.into_value())
        }
    }
}

async fn run_question(app: &AppContext, command: QuestionCommands) -> Result<()> {
    let payload = match command {
        QuestionCommands::List {
            page,
            size,
            tag,
            keyword,
        } => {
            let query = QuestionQuery {
                current: page,
                size,
                tag_id: tag.map(Id::new),
                keyword,
            };
            app.questions.page_question_list(&query).await?
        }
        QuestionCommands::Show { id } => app.questions.question_detail(&Id::new(id)).await?,
        QuestionCommands::Tags => app.questions.tags().await?,
        QuestionCommands::ByTag { tag_id, page, size } => {
            app.questions.by_tag(&Id::new(tag_id), page, size).await?
        }
    };
    print_json(&payload.into_value())
}

fn run_route(app: &AppContext, path: &str) -> Result<()> {
    match app.navigate(path) {
        Resolution::Render(route) => print_json(&json!({
            "view": route.view.to_string(),
            "name": route.name,
            "path": route.full_path,
            "params": route.params,
            "title": route.title,
            "requiresAuth": route.requires_auth,
            "showCategoryNav": route.show_category_nav,
        })),
        Resolution::Redirect { location } => print_json(&json!({ "redirect": location })),
    }
}
