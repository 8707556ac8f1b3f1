use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `RedNote` - notes, feeds and the question bank from the terminal.
#[derive(Parser, Debug)]
#[command(name = "rednote")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(about = "Command-line client for the RedNote notes service.", long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verification codes, login and the local session
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },

    /// Browse the recommended and following feeds
    Feed {
        #[command(subcommand)]
        feed_command: FeedCommands,
    },

    /// Read, like, comment on and publish notes
    Note {
        #[command(subcommand)]
        note_command: NoteCommands,
    },

    /// Browse the question bank
    Question {
        #[command(subcommand)]
        question_command: QuestionCommands,
    },

    /// Resolve a client route against the current session
    Route {
        /// Full path, optionally with a query string
        path: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Send a verification code by SMS
    SendCode { phone: String },

    /// Log in with a phone number and verification code
    Login { phone: String, code: String },

    /// Create an account (log in afterwards)
    Register {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Drop the local session
    Logout,

    /// Show configuration and session state
    Status,

    /// Fetch and cache the signed-in user's profile
    Whoami,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// First page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Number of pages to walk, following the server's page count
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

#[derive(Subcommand, Debug)]
pub enum FeedCommands {
    /// Recommended notes
    Recommend {
        #[command(flatten)]
        paging: PageArgs,
    },

    /// Notes from followed users
    Following {
        #[command(flatten)]
        paging: PageArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Show a note, optionally with its first page of comments
    Show {
        id: String,
        #[arg(long)]
        comments: bool,
    },

    Like { id: String },

    Unlike { id: String },

    /// Comment on a note
    Comment { id: String, content: String },

    /// Publish a note; local images are uploaded first
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image file to upload and attach (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Upload an image and print its URL
    Upload { path: PathBuf },

    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    /// Paged question list, optionally filtered
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
    },

    Show { id: String },

    /// List question tags
    Tags,

    /// Questions under one tag
    ByTag {
        tag_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feed_paging_defaults() {
        let cli = Cli::try_parse_from(["rednote", "feed", "recommend", "--pages", "3"]).unwrap();
        match cli.command {
            Commands::Feed {
                feed_command: FeedCommands::Recommend { paging },
            } => {
                assert_eq!(paging.page, 1);
                assert_eq!(paging.pages, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn publish_collects_repeated_images() {
        let cli = Cli::try_parse_from([
            "rednote", "note", "publish", "--title", "t", "--content", "c", "--image", "a.png",
            "--image", "b.jpg", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Note {
                note_command: NoteCommands::Publish { images, tags, .. },
            } => {
                assert_eq!(images.len(), 2);
                assert!(tags.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
