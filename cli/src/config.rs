use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::{info, warn};

use db::{assets, CrossReferenceStore, DbConnection, DbError, Translation, VerseStore};
use devotional::prefs::{self, Preferences, APP_PREFS};
use devotional::Language;

const NOTES_FILE: &str = "bible_notes.db";

/// Where things live. Each option can also come from the environment or a
/// `.env` file.
#[derive(Args, Debug)]
pub struct Config {
    /// Directory holding the bundled databases and verse list
    #[arg(long, global = true, env = "HOLYWORD_ASSETS", default_value = "assets")]
    pub assets: PathBuf,

    /// Writable directory for installed databases and preferences
    #[arg(long, global = true, env = "HOLYWORD_DATA", default_value = ".holyword")]
    pub data: PathBuf,

    /// Notes and highlights database, defaults to bible_notes.db in the data directory
    #[arg(long, global = true, env = "NOTES_DATABASE_URL")]
    pub notes_db: Option<String>,

    /// Daily verse endpoint
    #[arg(
        long,
        global = true,
        env = "DAILY_VERSE_URL",
        default_value = devotional::daily_verse::DEFAULT_URL
    )]
    pub daily_verse_url: String,

    /// Language for this run only, instead of the saved one
    #[arg(long, global = true)]
    pub lang: Option<Language>,
}

impl Config {
    pub fn app_prefs(&self) -> Preferences {
        Preferences::open(&self.data, APP_PREFS)
    }

    pub fn prefs(&self, namespace: &str) -> Preferences {
        Preferences::open(&self.data, namespace)
    }

    pub fn language(&self) -> Language {
        self.lang.unwrap_or_else(|| Language::load(&self.app_prefs()))
    }

    /// Installs every bundled database on the first run.
    pub fn first_run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.app_prefs();
        if prefs::onboarding_complete(&app) {
            return Ok(());
        }

        info!("First run, installing bundled databases into {}", self.data.display());
        fs::create_dir_all(&self.data)?;
        for file in [
            Translation::Kjv.file_name(),
            Translation::Telugu.file_name(),
            db::cross_refs::FILE_NAME,
        ] {
            self.bundled(file);
        }
        prefs::set_onboarding_complete(&mut app)?;
        Ok(())
    }

    /// Path of an installed bundled file, installing it when needed. A file
    /// that cannot be installed is still returned; opening it degrades.
    fn bundled(&self, file_name: &str) -> PathBuf {
        match assets::install(&self.assets, &self.data, file_name) {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}");
                self.data.join(file_name)
            }
        }
    }

    pub fn verse_store(&self, language: Language) -> VerseStore {
        let translation = language.translation();
        VerseStore::open(self.bundled(translation.file_name()), translation)
    }

    pub fn cross_references(&self) -> CrossReferenceStore {
        CrossReferenceStore::open(self.bundled(db::cross_refs::FILE_NAME))
    }

    pub fn notes_db(&self) -> Result<DbConnection, DbError> {
        let url = match &self.notes_db {
            Some(url) => url.clone(),
            None => {
                if let Err(e) = fs::create_dir_all(&self.data) {
                    warn!("Could not create {}: {}", self.data.display(), e);
                }
                self.data.join(NOTES_FILE).to_string_lossy().into_owned()
            }
        };
        db::open_notes_db(&url)
    }

    pub fn daily_verse_file(&self) -> PathBuf {
        self.assets.join(devotional::daily_verse::BUNDLED_FILE)
    }
}
