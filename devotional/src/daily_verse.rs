//! The verse of the day.
//!
//! A verse is looked up in order: the 24 hour cache, the remote endpoint,
//! the bundled rotation file, and finally a built-in John 3:16.
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, CACHE_CONTROL, USER_AGENT};
use reqwest::Client;
use serde_derive::{Deserialize, Serialize};

use crate::language::Language;
use crate::prefs::Preferences;
use crate::DevotionalError;

pub const DEFAULT_URL: &str = "https://holyword.vercel.app/api/daily-verse";

/// File name of the bundled verse list.
pub const BUNDLED_FILE: &str = "daily verse.json";

const TIMEOUT: Duration = Duration::from_secs(15);
const CLIENT_NAME: &str = "HolyWordApp/1.0";
const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

const CURRENT_INDEX: &str = "current_verse_index";
const LAST_DATE: &str = "last_verse_date";
const CACHED_ENGLISH_TEXT: &str = "cached_english_text";
const CACHED_ENGLISH_REF: &str = "cached_english_ref";
const CACHED_TELUGU_TEXT: &str = "cached_telugu_text";
const CACHED_TELUGU_REF: &str = "cached_telugu_ref";
const CACHE_TIME: &str = "cache_time";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyVerse {
    pub english: String,
    pub english_reference: String,
    pub telugu: String,
    pub telugu_reference: String,
}

impl DailyVerse {
    /// The verse and reference in `language`.
    pub fn text(&self, language: Language) -> (&str, &str) {
        match language {
            Language::English => (&self.english, &self.english_reference),
            Language::Telugu => (&self.telugu, &self.telugu_reference),
        }
    }
}

impl Default for DailyVerse {
    fn default() -> Self {
        DailyVerse {
            english: "For God so loved the world that he gave his one and only Son, \
                      that whoever believes in him shall not perish but have eternal life."
                .to_string(),
            english_reference: "John 3:16".to_string(),
            telugu: "దేవుడు లోకాన్ని ఎంతో ప్రేమించాడు. అందుకే తన ఏకైక కుమారుడిని ఇచ్చాడు. \
                     అతనిలో నమ్మకముంచే ప్రతి వ్యక్తి నశించకుండా నిత్యజీవాన్ని పొందును."
                .to_string(),
            telugu_reference: "యోహాను 3:16".to_string(),
        }
    }
}

/// Shape served by the endpoint.
#[derive(Deserialize)]
struct RemoteVerse {
    english: String,
    #[serde(rename = "englishReference", default)]
    english_reference: String,
    telugu: String,
    #[serde(rename = "teluguReference", default)]
    telugu_reference: String,
}

/// One entry of the bundled file.
#[derive(Deserialize)]
struct BundledVerse {
    #[serde(rename = "English verse", default)]
    english: String,
    #[serde(rename = "English reference", default)]
    english_reference: String,
    #[serde(rename = "Telugu verse part 1", default)]
    telugu_1: String,
    #[serde(rename = "Telugu verse part 2", default)]
    telugu_2: String,
    #[serde(rename = "Telugu reference", default)]
    telugu_reference: String,
}

impl From<BundledVerse> for DailyVerse {
    fn from(v: BundledVerse) -> Self {
        let telugu = if v.telugu_2.is_empty() {
            v.telugu_1
        } else {
            format!("{}\n{}", v.telugu_1, v.telugu_2)
        };
        DailyVerse {
            english: v.english,
            english_reference: v.english_reference,
            telugu,
            telugu_reference: v.telugu_reference,
        }
    }
}

pub fn client() -> Result<Client, DevotionalError> {
    Client::builder()
        .timeout(TIMEOUT)
        .connect_timeout(TIMEOUT)
        .build()
        .map_err(|e| DevotionalError::Http {
            url: DEFAULT_URL.to_string(),
            cause: e.to_string(),
        })
}

/// Gets today's verse from `url`.
pub async fn fetch(client: &Client, url: &str) -> Result<DailyVerse, DevotionalError> {
    let http_error = |cause: String| DevotionalError::Http {
        url: url.to_string(),
        cause,
    };

    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, CLIENT_NAME)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|e| http_error(e.to_string()))?;

    let status = response.status();
    debug!("Daily verse request to {url} returned {status}");
    if !status.is_success() {
        return Err(http_error(format!("HTTP {status}")));
    }

    let body = response.text().await.map_err(|e| http_error(e.to_string()))?;
    parse_response(&body)
}

/// Parses an endpoint response. The JSON may arrive wrapped in an HTML page.
pub fn parse_response(body: &str) -> Result<DailyVerse, DevotionalError> {
    let json = extract_json(body).ok_or_else(|| DevotionalError::DailyVerse {
        cause: "no JSON object in the response".to_string(),
    })?;
    let remote: RemoteVerse = serde_json::from_str(json).map_err(|e| DevotionalError::DailyVerse {
        cause: e.to_string(),
    })?;
    if remote.english.trim().is_empty() || remote.telugu.trim().is_empty() {
        return Err(DevotionalError::DailyVerse {
            cause: "the response has an empty verse".to_string(),
        });
    }

    Ok(DailyVerse {
        english: remote.english,
        english_reference: remote.english_reference,
        telugu: remote.telugu,
        telugu_reference: remote.telugu_reference,
    })
}

fn extract_json(body: &str) -> Option<&str> {
    if let (Some(start), Some(end)) = (body.find("<pre>"), body.find("</pre>")) {
        if let Some(inner) = body.get(start + "<pre>".len()..end) {
            let inner = inner.trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end > start {
        body.get(start..=end)
    } else {
        None
    }
}

/// Whether less than a day has passed from `since` to `now`. A stored time
/// in the future or too far off to subtract counts as a day gone by.
fn within_a_day(since: i64, now: i64) -> bool {
    matches!(now.checked_sub(since), Some(elapsed) if (0..DAY_MILLIS).contains(&elapsed))
}

/// Picks today's verse from the bundled list, moving on to the next entry
/// once a day has passed since the last move and wrapping at the end.
pub fn from_bundled(
    path: &Path,
    prefs: &mut Preferences,
    now: DateTime<Utc>,
) -> Result<DailyVerse, DevotionalError> {
    let raw = fs::read_to_string(path).map_err(|e| DevotionalError::Io {
        path: path.display().to_string(),
        cause: e.to_string(),
    })?;
    let mut verses: Vec<BundledVerse> =
        serde_json::from_str(&raw).map_err(|e| DevotionalError::DailyVerse {
            cause: e.to_string(),
        })?;
    if verses.is_empty() {
        return Err(DevotionalError::DailyVerse {
            cause: format!("{} has no verses", path.display()),
        });
    }

    let len = verses.len() as i64;
    let now_millis = now.timestamp_millis();
    let mut index = prefs.i64_or(CURRENT_INDEX, 0);

    match prefs.get_i64(LAST_DATE) {
        Some(last) if within_a_day(last, now_millis) => {
            debug!("Same day, keeping verse {index}");
        }
        last => {
            if last.is_some() {
                index += 1;
            }
            if index < 0 || index >= len {
                info!("Reached the end of the bundled verses, starting over");
                index = 0;
            }
            prefs
                .edit()
                .put_i64(CURRENT_INDEX, index)
                .put_i64(LAST_DATE, now_millis)
                .commit()?;
            debug!("Moved to bundled verse {index}");
        }
    }

    let index = if (0..len).contains(&index) { index } else { 0 };
    Ok(verses.swap_remove(index as usize).into())
}

/// The cached verse, if all of it is present and younger than a day.
pub fn cached(prefs: &Preferences, now: DateTime<Utc>) -> Option<DailyVerse> {
    let stored = prefs.get_i64(CACHE_TIME)?;
    if !within_a_day(stored, now.timestamp_millis()) {
        debug!("Cached daily verse has expired");
        return None;
    }
    Some(DailyVerse {
        english: prefs.get_string(CACHED_ENGLISH_TEXT)?,
        english_reference: prefs.get_string(CACHED_ENGLISH_REF)?,
        telugu: prefs.get_string(CACHED_TELUGU_TEXT)?,
        telugu_reference: prefs.get_string(CACHED_TELUGU_REF)?,
    })
}

pub fn store_cache(
    prefs: &mut Preferences,
    verse: &DailyVerse,
    now: DateTime<Utc>,
) -> Result<(), DevotionalError> {
    prefs
        .edit()
        .put_string(CACHED_ENGLISH_TEXT, &verse.english)
        .put_string(CACHED_ENGLISH_REF, &verse.english_reference)
        .put_string(CACHED_TELUGU_TEXT, &verse.telugu)
        .put_string(CACHED_TELUGU_REF, &verse.telugu_reference)
        .put_i64(CACHE_TIME, now.timestamp_millis())
        .commit()
}

pub fn clear_cache(prefs: &mut Preferences) -> Result<(), DevotionalError> {
    prefs
        .edit()
        .remove(CACHED_ENGLISH_TEXT)
        .remove(CACHED_ENGLISH_REF)
        .remove(CACHED_TELUGU_TEXT)
        .remove(CACHED_TELUGU_REF)
        .remove(CACHE_TIME)
        .commit()
}

/// Where [load] looks for a verse.
pub struct Sources<'a> {
    /// Endpoint to ask; `None` skips the network.
    pub url: Option<&'a str>,
    pub bundled: &'a Path,
}

/// Today's verse. Never fails: every source that errors is logged and the
/// next one tried.
pub async fn load(prefs: &mut Preferences, sources: Sources<'_>, now: DateTime<Utc>) -> DailyVerse {
    if let Some(verse) = cached(prefs, now) {
        debug!("Using the cached daily verse");
        return verse;
    }

    if let Some(url) = sources.url {
        let remote = match client() {
            Ok(client) => fetch(&client, url).await,
            Err(e) => Err(e),
        };
        match remote {
            Ok(verse) => {
                if let Err(e) = store_cache(prefs, &verse, now) {
                    warn!("Could not cache the daily verse: {e}");
                }
                return verse;
            }
            Err(e) => warn!("{e}"),
        }
    }

    match from_bundled(sources.bundled, prefs, now) {
        Ok(verse) => verse,
        Err(e) => {
            warn!("{e} Using the default verse");
            DailyVerse::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::DAILY_VERSE;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const BUNDLED: &str = r#"[
        {"English verse": "In the beginning God created the heaven and the earth.",
         "English reference": "Genesis 1:1",
         "Telugu verse part 1": "ఆదియందు దేవుడు",
         "Telugu verse part 2": "భూమ్యాకాశములను సృజించెను.",
         "Telugu reference": "ఆదికాండము 1:1"},
        {"English verse": "The LORD is my shepherd; I shall not want.",
         "English reference": "Psalms 23:1",
         "Telugu verse part 1": "యెహోవా నా కాపరి",
         "Telugu reference": "కీర్తనల గ్రంథము 23:1"}
    ]"#;

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap()
    }

    fn bundled_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join(BUNDLED_FILE);
        fs::write(&path, BUNDLED).unwrap();
        path
    }

    /// Serves `body` once on a local port and returns the URL.
    async fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/api/daily-verse")
    }

    #[test]
    fn parses_plain_and_wrapped_json() {
        let json = r#"{"english":"Jesus wept.","englishReference":"John 11:35","telugu":"యేసు కన్నీళ్లు విడిచెను.","teluguReference":"యోహాను 11:35"}"#;
        let plain = parse_response(json).unwrap();
        assert_eq!(plain.english_reference, "John 11:35");

        let wrapped = format!("<html><body><pre>\n{json}\n</pre></body></html>");
        assert_eq!(parse_response(&wrapped).unwrap(), plain);

        assert!(parse_response("<html>Service unavailable</html>").is_err());
        assert!(parse_response(r#"{"english":"","telugu":""}"#).is_err());
    }

    #[test]
    fn bundled_rotates_once_a_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = bundled_file(dir.path());
        let mut prefs = Preferences::open(dir.path(), DAILY_VERSE);

        let first = from_bundled(&path, &mut prefs, morning()).unwrap();
        assert_eq!(first.english_reference, "Genesis 1:1");
        assert_eq!(first.telugu, "ఆదియందు దేవుడు\nభూమ్యాకాశములను సృజించెను.");

        let later = from_bundled(&path, &mut prefs, morning() + ChronoDuration::hours(10)).unwrap();
        assert_eq!(later, first);

        let next_day = morning() + ChronoDuration::hours(24);
        let second = from_bundled(&path, &mut prefs, next_day).unwrap();
        assert_eq!(second.english_reference, "Psalms 23:1");
        assert_eq!(second.telugu, "యెహోవా నా కాపరి");

        // Wraps back to the start
        let third = from_bundled(&path, &mut prefs, next_day + ChronoDuration::hours(24)).unwrap();
        assert_eq!(third.english_reference, "Genesis 1:1");
    }

    #[test]
    fn corrupt_stored_times_count_as_a_day_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = bundled_file(dir.path());
        let mut prefs = Preferences::open(dir.path(), DAILY_VERSE);
        prefs
            .edit()
            .put_i64(CURRENT_INDEX, 0)
            .put_i64(LAST_DATE, i64::MIN)
            .commit()
            .unwrap();

        let verse = from_bundled(&path, &mut prefs, morning()).unwrap();
        assert_eq!(verse.english_reference, "Psalms 23:1");
        assert_eq!(prefs.get_i64(LAST_DATE), Some(morning().timestamp_millis()));

        // A date in the future does not pin the rotation either
        let future = morning() + ChronoDuration::days(365);
        prefs.edit().put_i64(LAST_DATE, future.timestamp_millis()).commit().unwrap();
        let verse = from_bundled(&path, &mut prefs, morning()).unwrap();
        assert_eq!(verse.english_reference, "Genesis 1:1");

        store_cache(&mut prefs, &DailyVerse::default(), morning()).unwrap();
        prefs.edit().put_i64(CACHE_TIME, i64::MIN).commit().unwrap();
        assert_eq!(cached(&prefs, morning()), None);
        prefs.edit().put_i64(CACHE_TIME, i64::MAX).commit().unwrap();
        assert_eq!(cached(&prefs, morning()), None);
    }

    #[test]
    fn cache_expires_after_a_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::open(dir.path(), DAILY_VERSE);
        assert_eq!(cached(&prefs, morning()), None);

        let verse = DailyVerse::default();
        store_cache(&mut prefs, &verse, morning()).unwrap();
        assert_eq!(cached(&prefs, morning() + ChronoDuration::hours(23)), Some(verse));
        assert_eq!(cached(&prefs, morning() + ChronoDuration::hours(24)), None);

        clear_cache(&mut prefs).unwrap();
        assert_eq!(cached(&prefs, morning()), None);
    }

    #[tokio::test]
    async fn fetch_reads_remote_verse() {
        let url = serve_once(
            r#"<pre>{"english":"Jesus wept.","englishReference":"John 11:35","telugu":"యేసు కన్నీళ్లు విడిచెను.","teluguReference":"యోహాను 11:35"}</pre>"#,
        )
        .await;
        let verse = fetch(&client().unwrap(), &url).await.unwrap();
        assert_eq!(verse.text(Language::English), ("Jesus wept.", "John 11:35"));
        assert_eq!(verse.text(Language::Telugu).1, "యోహాను 11:35");
    }

    #[tokio::test]
    async fn load_falls_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = bundled_file(dir.path());
        let mut prefs = Preferences::open(dir.path(), DAILY_VERSE);

        // Nothing listening on the remote, so the bundled file answers
        let sources = Sources {
            url: Some("http://127.0.0.1:9/api/daily-verse"),
            bundled: &bundled,
        };
        let verse = load(&mut prefs, sources, morning()).await;
        assert_eq!(verse.english_reference, "Genesis 1:1");

        let missing = dir.path().join("missing.json");
        let sources = Sources {
            url: None,
            bundled: &missing,
        };
        assert_eq!(load(&mut prefs, sources, morning()).await, DailyVerse::default());

        // A cached verse wins over everything
        let stored = DailyVerse {
            english_reference: "Psalms 23:1".to_string(),
            ..DailyVerse::default()
        };
        store_cache(&mut prefs, &stored, morning()).unwrap();
        let sources = Sources {
            url: None,
            bundled: &missing,
        };
        assert_eq!(load(&mut prefs, sources, morning()).await, stored);
    }
}
