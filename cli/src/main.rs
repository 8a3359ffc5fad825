use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;

use devotional::{Language, NotificationAction};

use crate::commands::{alarms, bible, devotion, notes};
use crate::config::Config;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "holyword", version)]
#[command(about = "Read the English and Telugu Bible, keep notes and prayer alarms")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a passage, e.g. "John 3:16-18" or "యోహాను సువార్త 3"
    Read { reference: String },

    /// List the books of the Bible
    Books,

    /// List the chapters of a book, or the verses of one chapter
    Chapters {
        book: String,
        chapter: Option<i32>,
    },

    /// Show the cross references of a verse
    Xref { reference: String },

    /// Notes with attached verses
    #[command(subcommand)]
    Note(NoteCommand),

    /// Verse highlight colors
    #[command(subcommand)]
    Highlight(HighlightCommand),

    /// Prayer alarms
    #[command(subcommand)]
    Alarm(AlarmCommand),

    /// Print the verse of the day
    Votd {
        /// Skip the network and use the cache or the bundled list
        #[arg(long)]
        offline: bool,
    },

    /// Print the audio URL of a chapter
    Audio {
        reference: String,

        /// Download the recording to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// The saved display language
    #[command(subcommand)]
    Lang(LangCommand),
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Create a note, optionally with verses
    New {
        title: String,
        #[arg(short, long = "verse")]
        verses: Vec<String>,
    },
    List,
    Show { id: i32 },
    /// Attach a verse or range to a note
    Add { id: i32, reference: String },
    Rename { id: i32, title: String },
    Delete { id: i32 },
    /// Detach one verse, by the id shown in `note show`
    Remove { verse_id: i32 },
}

#[derive(Subcommand)]
enum HighlightCommand {
    /// Color a verse or range: yellow, green, cyan, orange, pink, light-blue or #AARRGGBB
    Set { reference: String, color: String },
    /// Show the color of a verse, or every highlight in a chapter
    Get { reference: String },
    Clear { reference: String },
}

#[derive(Subcommand)]
enum AlarmCommand {
    Add {
        name: String,
        /// HH:MM, 24 hour
        time: String,
        /// "all", "weekdays", "weekends", "mon,wed,fri" or "0111110"
        #[arg(short, long, default_value = "all")]
        days: String,
    },
    List,
    Edit {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        days: Option<String>,
    },
    /// Turn an alarm on or off
    Toggle { id: i32 },
    Delete { id: i32 },
    /// Show when each active alarm fires next
    Next,
    /// Fire reminders in this terminal until interrupted
    Watch {
        /// Pretend exact alarms are unavailable
        #[arg(long)]
        inexact: bool,
        /// Answer every reminder with this action, e.g. SNOOZE_5
        #[arg(long)]
        answer: Option<NotificationAction>,
    },
}

#[derive(Subcommand)]
enum LangCommand {
    Get,
    Set { language: Language },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    db::books::validate()?;
    let cli = Cli::parse();
    let config = &cli.config;
    config.first_run()?;

    match cli.command {
        Command::Read { reference } => bible::read(config, &reference),
        Command::Books => bible::books(config),
        Command::Chapters { book, chapter } => bible::chapters(config, &book, chapter),
        Command::Xref { reference } => bible::cross_references(config, &reference),
        Command::Note(cmd) => match cmd {
            NoteCommand::New { title, verses } => notes::create(config, &title, &verses),
            NoteCommand::List => notes::list(config),
            NoteCommand::Show { id } => notes::show(config, id),
            NoteCommand::Add { id, reference } => notes::add(config, id, &reference),
            NoteCommand::Rename { id, title } => notes::rename(config, id, &title),
            NoteCommand::Delete { id } => notes::delete(config, id),
            NoteCommand::Remove { verse_id } => notes::remove_verse(config, verse_id),
        },
        Command::Highlight(cmd) => match cmd {
            HighlightCommand::Set { reference, color } => {
                notes::highlight(config, &reference, &color)
            }
            HighlightCommand::Get { reference } => notes::show_highlights(config, &reference),
            HighlightCommand::Clear { reference } => notes::clear_highlight(config, &reference),
        },
        Command::Alarm(cmd) => match cmd {
            AlarmCommand::Add { name, time, days } => alarms::add(config, &name, &time, &days),
            AlarmCommand::List => alarms::list(config),
            AlarmCommand::Edit {
                id,
                name,
                time,
                days,
            } => alarms::edit(
                config,
                id,
                name.as_deref(),
                time.as_deref(),
                days.as_deref(),
            ),
            AlarmCommand::Toggle { id } => alarms::toggle(config, id),
            AlarmCommand::Delete { id } => alarms::delete(config, id),
            AlarmCommand::Next => alarms::next(config),
            AlarmCommand::Watch { inexact, answer } => {
                alarms::watch(config, !inexact, answer).await
            }
        },
        Command::Votd { offline } => devotion::verse_of_the_day(config, offline).await,
        Command::Audio { reference, output } => {
            devotion::chapter_audio(config, &reference, output.as_deref()).await
        }
        Command::Lang(cmd) => match cmd {
            LangCommand::Get => {
                devotion::show_language(config);
                Ok(())
            }
            LangCommand::Set { language } => devotion::set_language(config, language),
        },
    }
}
