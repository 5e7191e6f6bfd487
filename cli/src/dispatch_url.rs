use std::process::Command;

use anyhow::{bail, Context, Result};
use url::Url;

// Hosts that're video sites even though their URLs don't end in a video
// suffix
const VIDEO_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "youtu.be", "vimeo.com"];
const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".webm", ".mkv", ".m3u8"];
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

#[derive(Clone, Copy, Debug, PartialEq)]
enum Handler {
    Browser,
    VideoPlayer,
    ImageViewer,
    Mail,
}

pub fn run(raw_url: String, dry_run: bool) -> Result<()> {
    let url = Url::parse(&raw_url).with_context(|| format!("parsing {}", raw_url))?;
    let program = program_for(classify(&url)?);

    if dry_run {
        println!("{} {}", program, url);
        return Ok(());
    }
    // On a box with no X running there's nothing to dispatch to; just echo
    // the URL so the user can grab it
    if std::env::var("DISPLAY").is_err() {
        println!("{}", url);
        return Ok(());
    }

    // Spawn and detach; the terminal shouldn't wait on a browser
    Command::new(&program)
        .arg(url.as_str())
        .spawn()
        .with_context(|| format!("running {}", program))?;
    Ok(())
}

fn classify(url: &Url) -> Result<Handler> {
    match url.scheme() {
        "mailto" => Ok(Handler::Mail),
        "http" | "https" => {
            let path = url.path().to_ascii_lowercase();
            if VIDEO_SUFFIXES.iter().any(|s| path.ends_with(s))
                || url
                    .host_str()
                    .map(|h| VIDEO_HOSTS.contains(&h))
                    .unwrap_or(false)
            {
                Ok(Handler::VideoPlayer)
            } else if IMAGE_SUFFIXES.iter().any(|s| path.ends_with(s)) {
                Ok(Handler::ImageViewer)
            } else {
                Ok(Handler::Browser)
            }
        }
        "file" => Ok(Handler::Browser),
        x => bail!("no handler for {}: URLs", x),
    }
}

fn program_for(handler: Handler) -> String {
    let (var, fallback) = match handler {
        Handler::Browser => ("BROWSER", "firefox"),
        Handler::VideoPlayer => ("VIDEO_PLAYER", "mpv"),
        Handler::ImageViewer => ("IMAGE_VIEWER", "feh"),
        Handler::Mail => ("MAILER", "thunderbird"),
    };
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(raw: &str) -> Handler {
        classify(&Url::parse(raw).unwrap()).unwrap()
    }

    #[test]
    fn pick_handlers() {
        assert_eq!(classify_str("https://example.com/article"), Handler::Browser);
        assert_eq!(
            classify_str("https://example.com/clip.mp4"),
            Handler::VideoPlayer
        );
        assert_eq!(
            classify_str("https://example.com/CLIP.MP4?t=30"),
            Handler::VideoPlayer
        );
        assert_eq!(
            classify_str("https://youtu.be/dQw4w9WgXcQ"),
            Handler::VideoPlayer
        );
        assert_eq!(
            classify_str("http://example.com/diagram.png"),
            Handler::ImageViewer
        );
        assert_eq!(classify_str("mailto:somebody@example.com"), Handler::Mail);
        assert_eq!(classify_str("file:///tmp/report.html"), Handler::Browser);
    }

    #[test]
    fn unknown_schemes_are_errors() {
        assert!(classify(&Url::parse("gopher://example.com").unwrap()).is_err());
    }
}
