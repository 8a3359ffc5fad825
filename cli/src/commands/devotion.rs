use std::error::Error;
use std::path::Path;

use chrono::Utc;

use db::models::Reference;
use devotional::daily_verse::{self, Sources};
use devotional::prefs::DAILY_VERSE;
use devotional::{audio, Language};

use crate::config::Config;

/// Prints the verse of the day.
pub async fn verse_of_the_day(config: &Config, offline: bool) -> Result<(), Box<dyn Error>> {
    let mut prefs = config.prefs(DAILY_VERSE);
    let bundled = config.daily_verse_file();
    let sources = Sources {
        url: if offline {
            None
        } else {
            Some(config.daily_verse_url.as_str())
        },
        bundled: &bundled,
    };

    let verse = daily_verse::load(&mut prefs, sources, Utc::now()).await;
    let (text, reference) = verse.text(config.language());
    println!("{text}");
    println!("  {reference}");
    Ok(())
}

/// Prints the audio URL of a chapter, downloading it when `output` is set.
pub async fn chapter_audio(
    config: &Config,
    reference: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let reference: Reference = reference.parse()?;
    let entry = reference.book_entry()?;
    let url = audio::chapter_audio_url(config.language(), entry.number, reference.chapter)?;
    println!("{url}");

    if let Some(dest) = output {
        let client = audio::client()?;
        let written = audio::download(&client, &url, dest).await?;
        println!("Saved {} bytes to {}", written, dest.display());
    }
    Ok(())
}

pub fn show_language(config: &Config) {
    let language = config.language();
    println!("{} ({})", language, language.code());
}

pub fn set_language(config: &Config, language: Language) -> Result<(), Box<dyn Error>> {
    language.save(&mut config.app_prefs())?;
    println!("Language set to {language}");
    Ok(())
}
