use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voicenotes_core::config::Config;
use voicenotes_core::storage::operator_from_uri;
use voicenotes_core::{share_text, ListingQuery, Note, NoteDraft, NotePatch, NoteStore, StoreError};

#[derive(Parser, Debug)]
#[command(name = "voicenotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage URI (memory://, file:///path or a directory); overrides VOICENOTES_STORAGE_URI
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a transcribed recording as a new note
    Add {
        /// Transcript text
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Path of the audio file the transcript came from
        #[arg(long)]
        recording: Option<String>,
        /// Creation time, YYYY-MM-DD HH:MM:SS (defaults to now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List notes, newest first
    List {
        /// Only favorites (ignored when --search is given)
        #[arg(long)]
        liked: bool,
        /// Case-insensitive text to look for in title, transcript or tags
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single note
    Show { id: String },
    /// Print the shareable transcript of a note
    Share { id: String },
    /// Change title, transcript or tags
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Replace the tags of a note
    Tag { id: String, tags: String },
    /// Mark a note as favorite
    Like { id: String },
    /// Remove a note from favorites
    Unlike { id: String },
    /// Delete a note permanently
    Delete { id: String },
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    NotFound = 3,
    StorageError = 4,
}

impl Exit {
    pub fn from_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<StoreError>() {
            Some(StoreError::EmptyContent) | Some(StoreError::InvalidUri(_)) => Exit::InvalidArguments,
            Some(_) => Exit::StorageError,
            None => Exit::GeneralError,
        }
    }
}

impl From<Exit> for std::process::ExitCode {
    fn from(exit: Exit) -> Self {
        std::process::ExitCode::from(exit as u8)
    }
}

#[derive(Serialize)]
struct Created<'a> {
    id: &'a str,
}

pub async fn run(cli: Cli, config: Config) -> Result<Exit> {
    let uri = cli.storage.unwrap_or(config.storage_uri);
    let op = operator_from_uri(&uri)?;
    let store = NoteStore::open(op)
        .await
        .with_context(|| format!("failed to open note store at {}", uri))?;
    let json = cli.json;

    match cli.command {
        Commands::Add {
            content,
            title,
            tags,
            recording,
            date,
        } => {
            let mut draft = NoteDraft::new(title, content);
            draft.tags = tags;
            draft.recording_path = recording;
            draft.created_at = date;
            let id = store.insert(draft).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&Created { id: &id })?);
            } else {
                println!("{}", id);
            }
        }
        Commands::List { liked, search } => {
            let query = ListingQuery::new(search.unwrap_or_default(), liked);
            let notes = query.run(&store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for note in &notes {
                    println!("{}", list_line(note));
                }
            }
        }
        Commands::Show { id } => {
            let Some(note) = store.get(&id).await? else {
                eprintln!("note {} not found", id);
                return Ok(Exit::NotFound);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                print_detail(&note);
            }
        }
        Commands::Share { id } => {
            let Some(note) = store.get(&id).await? else {
                eprintln!("note {} not found", id);
                return Ok(Exit::NotFound);
            };
            println!("{}", share_text(&note));
        }
        Commands::Edit {
            id,
            title,
            content,
            tags,
        } => {
            if content.as_deref().is_some_and(|c| c.trim().is_empty()) {
                eprintln!("transcript cannot be empty");
                return Ok(Exit::InvalidArguments);
            }
            let patch = NotePatch {
                title,
                content,
                tags,
            };
            if patch.is_empty() {
                eprintln!("nothing to change; pass --title, --content or --tags");
                return Ok(Exit::InvalidArguments);
            }
            store.update(&id, patch).await?;
        }
        Commands::Tag { id, tags } => store.update(&id, NotePatch::tags(tags)).await?,
        Commands::Like { id } => store.set_liked(&id, true).await?,
        Commands::Unlike { id } => store.set_liked(&id, false).await?,
        Commands::Delete { id } => store.delete(&id).await?,
    }

    Ok(Exit::Success)
}

fn list_line(note: &Note) -> String {
    let star = if note.is_liked { "*" } else { " " };
    let tags = note.tag_list().join(", ");
    if tags.is_empty() {
        format!("{:>4} {} {} {}", note.id, star, note.created_at, note.display_title())
    } else {
        format!(
            "{:>4} {} {} {} [{}]",
            note.id,
            star,
            note.created_at,
            note.display_title(),
            tags
        )
    }
}

fn print_detail(note: &Note) {
    println!("{}", note.display_title());
    println!("id:        {}", note.id);
    println!("created:   {}", note.created_at);
    println!("liked:     {}", if note.is_liked { "yes" } else { "no" });
    if !note.tags.trim().is_empty() {
        println!("tags:      {}", note.tag_list().join(", "));
    }
    if note.has_recording() {
        println!("recording: {}", note.recording_path);
    }
    println!();
    println!("{}", note.content);
}
