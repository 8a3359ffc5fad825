//! Chapter audio from wordfree.net.
use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use log::info;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::language::Language;
use crate::DevotionalError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Version code and host of each language's recordings.
fn source(language: Language) -> (&'static str, &'static str) {
    match language {
        Language::English => ("1", "http://kjv.wordfree.net"),
        Language::Telugu => ("29", "http://audio4.wordfree.net"),
    }
}

/// URL of the recording of a chapter. `book_number` is 1 (Genesis) to 66.
pub fn chapter_audio_url(
    language: Language,
    book_number: i32,
    chapter: i32,
) -> Result<String, DevotionalError> {
    let book = db::books::by_number(book_number).ok_or(DevotionalError::NoSuchChapter {
        book: book_number,
        chapter,
    })?;
    if chapter < 1 || chapter > book.chapters {
        return Err(DevotionalError::NoSuchChapter {
            book: book_number,
            chapter,
        });
    }

    let (code, host) = source(language);
    Ok(format!("{host}/bibles/app/audio/{code}/{book_number}/{chapter}.mp3"))
}

/// Client for downloads. Only connecting is timed out; a chapter can take
/// a while to arrive.
pub fn client() -> Result<Client, DevotionalError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| DevotionalError::Http {
            url: "http://kjv.wordfree.net".to_string(),
            cause: e.to_string(),
        })
}

/// Streams `url` into `dest`, returning the number of bytes written. A
/// failed download leaves no file behind.
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<u64, DevotionalError> {
    let http_error = |cause: String| DevotionalError::Http {
        url: url.to_string(),
        cause,
    };
    let io_error = |e: std::io::Error| DevotionalError::Io {
        path: dest.display().to_string(),
        cause: e.to_string(),
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| http_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(http_error(format!("HTTP {status}")));
    }

    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).await.map_err(io_error)?;
    }
    let partial = dest.with_extension("partial");
    let written = match stream_into(response, &partial, url).await {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    fs::rename(&partial, dest).await.map_err(io_error)?;
    info!("Downloaded {} bytes from {} to {}", written, url, dest.display());
    Ok(written)
}

async fn stream_into(
    response: reqwest::Response,
    path: &Path,
    url: &str,
) -> Result<u64, DevotionalError> {
    let io_error = |e: std::io::Error| DevotionalError::Io {
        path: path.display().to_string(),
        cause: e.to_string(),
    };

    let mut file = File::create(path).await.map_err(io_error)?;
    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DevotionalError::Http {
            url: url.to_string(),
            cause: e.to_string(),
        })?;
        file.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn urls_per_language() {
        assert_eq!(
            chapter_audio_url(Language::English, 43, 3).unwrap(),
            "http://kjv.wordfree.net/bibles/app/audio/1/43/3.mp3"
        );
        assert_eq!(
            chapter_audio_url(Language::Telugu, 1, 50).unwrap(),
            "http://audio4.wordfree.net/bibles/app/audio/29/1/50.mp3"
        );
    }

    #[test]
    fn rejects_unknown_chapters() {
        assert_eq!(
            chapter_audio_url(Language::English, 1, 51),
            Err(DevotionalError::NoSuchChapter { book: 1, chapter: 51 })
        );
        assert!(chapter_audio_url(Language::English, 67, 1).is_err());
        assert!(chapter_audio_url(Language::Telugu, 19, 0).is_err());
    }

    #[tokio::test]
    async fn download_writes_file() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let body = [7u8; 4096];
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("audio").join("43_3.mp3");
        let url = format!("http://{addr}/bibles/app/audio/1/43/3.mp3");
        let written = download(&client().unwrap(), &url, &dest).await.unwrap();

        assert_eq!(written, 4096);
        assert_eq!(std::fs::read(&dest).unwrap().len(), 4096);
        assert!(!dest.with_extension("partial").exists());
    }
}
