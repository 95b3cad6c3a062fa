//! Encore CLI - operate the review store directly
//!
//! Every write goes through the same services a server would use, so vote
//! and patch commands get the transactional retry behaviour.

mod app;
mod config;
mod logging;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Settings;
use encore_core::application::{CommentPatch, NewPost, NewUser, PostPatch, ProfilePatch};
use encore_core::domain::{Post, VoteCounts, VoteTarget};
use tabled::{Table, Tabled};

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Encore music review store CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage posts
    Post {
        #[command(subcommand)]
        action: PostAction,
    },

    /// Manage comments
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Like, dislike or withdraw a vote
    Vote {
        #[command(subcommand)]
        action: VoteAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    Create {
        /// Account id on the music service
        #[arg(long)]
        provider_id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    Show {
        user_id: String,
    },
    /// Partially update a profile, e.g. --set '{"bio": "hi"}'
    Patch {
        user_id: String,
        #[arg(long)]
        set: String,
    },
}

#[derive(Subcommand)]
enum PostAction {
    Create {
        #[arg(long)]
        author: String,
        /// Track id on the music service
        #[arg(long)]
        song: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
        /// 1-10
        #[arg(long)]
        rating: i64,
    },
    Show {
        post_id: String,
    },
    List {
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "20")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Partially update a post, e.g. --set '{"rating": 8}'
    Patch {
        post_id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        set: String,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    Create {
        #[arg(long)]
        author: String,
        #[arg(long)]
        post: String,
        #[arg(long)]
        body: String,
    },
    List {
        #[arg(long)]
        post: String,
    },
    Patch {
        comment_id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        set: String,
    },
}

#[derive(Subcommand)]
enum VoteAction {
    Like(VoteArgs),
    Dislike(VoteArgs),
    Remove(VoteArgs),
}

#[derive(clap::Args)]
struct VoteArgs {
    #[arg(long)]
    user: String,
    #[arg(long, conflicts_with = "comment", required_unless_present = "comment")]
    post: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

impl VoteArgs {
    fn target(&self) -> Result<VoteTarget> {
        match (&self.post, &self.comment) {
            (Some(id), None) => Ok(VoteTarget::Post(id.clone())),
            (None, Some(id)) => Ok(VoteTarget::Comment(id.clone())),
            _ => anyhow::bail!("exactly one of --post or --comment is required"),
        }
    }
}

#[derive(Tabled)]
struct PostLine {
    id: String,
    song: String,
    title: String,
    rating: i64,
    updated_at: i64,
}

impl From<&Post> for PostLine {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            song: post.song_id.clone(),
            title: post.title.clone(),
            rating: post.rating,
            updated_at: post.updated_at,
        }
    }
}

fn parse_json(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("Invalid JSON for --set")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_counts(target: &VoteTarget, counts: VoteCounts) {
    println!(
        "{}  {} {}  {} {}",
        target.to_string().bold(),
        "likes:".green(),
        counts.likes,
        "dislikes:".red(),
        counts.dislikes,
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();

    let policy = cli.settings.retry_policy()?;
    let app = App::connect(&cli.settings.database_url(), policy).await?;

    match cli.command {
        Commands::Migrate => {
            println!("{}", "✓ Schema up to date".green().bold());
        }

        Commands::User { action } => match action {
            UserAction::Create {
                provider_id,
                username,
                display_name,
            } => {
                let user = app
                    .reviews
                    .create_user(NewUser {
                        provider_id,
                        username,
                        display_name,
                    })
                    .await?;
                println!("{}", format!("✓ User {} created", user.id).green().bold());
                print_json(&user)?;
            }
            UserAction::Show { user_id } => {
                print_json(&app.reviews.get_user(&user_id).await?)?;
            }
            UserAction::Patch { user_id, set } => {
                let patch = ProfilePatch::from_json(parse_json(&set)?)?;
                let user = app.patches.patch_profile(&user_id, patch).await?;
                println!("{}", "✓ Profile updated".green().bold());
                print_json(&user)?;
            }
        },

        Commands::Post { action } => match action {
            PostAction::Create {
                author,
                song,
                title,
                body,
                rating,
            } => {
                let post = app
                    .reviews
                    .create_post(
                        &author,
                        NewPost {
                            song_id: song,
                            title,
                            body,
                            rating,
                        },
                    )
                    .await?;
                println!("{}", format!("✓ Post {} created", post.id).green().bold());
                println!("{}", Table::new(vec![PostLine::from(&post)]));
            }
            PostAction::Show { post_id } => {
                print_json(&app.reviews.get_post(&post_id).await?)?;
            }
            PostAction::List {
                author,
                limit,
                offset,
            } => {
                let posts = app
                    .reviews
                    .list_posts_by_author(&author, limit, offset)
                    .await?;
                if posts.is_empty() {
                    println!("{}", "No posts".yellow());
                } else {
                    println!("{}", Table::new(posts.iter().map(PostLine::from)));
                }
            }
            PostAction::Patch {
                post_id,
                author,
                set,
            } => {
                let patch = PostPatch::from_json(parse_json(&set)?)?;
                let post = app.patches.patch_post(&author, &post_id, patch).await?;
                println!("{}", "✓ Post updated".green().bold());
                println!("{}", Table::new(vec![PostLine::from(&post)]));
            }
        },

        Commands::Comment { action } => match action {
            CommentAction::Create { author, post, body } => {
                let comment = app.reviews.create_comment(&author, &post, body).await?;
                println!("{}", format!("✓ Comment {} created", comment.id).green().bold());
            }
            CommentAction::List { post } => {
                print_json(&app.reviews.list_comments(&post).await?)?;
            }
            CommentAction::Patch {
                comment_id,
                author,
                set,
            } => {
                let patch = CommentPatch::from_json(parse_json(&set)?)?;
                let comment = app.patches.patch_comment(&author, &comment_id, patch).await?;
                println!("{}", "✓ Comment updated".green().bold());
                print_json(&comment)?;
            }
        },

        Commands::Vote { action } => {
            let (args, counts) = match &action {
                VoteAction::Like(args) => (args, app.votes.like(&args.user, &args.target()?).await?),
                VoteAction::Dislike(args) => {
                    (args, app.votes.dislike(&args.user, &args.target()?).await?)
                }
                VoteAction::Remove(args) => {
                    (args, app.votes.remove_vote(&args.user, &args.target()?).await?)
                }
            };
            print_counts(&args.target()?, counts);
        }
    }

    Ok(())
}
