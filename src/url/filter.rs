use url::Url;

/// Path extensions that never lead to a crawlable page
pub const MEDIA_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico",
    // video
    "mp4", "webm", "mkv", "avi", "mov", "m4v", "flv", "wmv",
    // audio
    "mp3", "wav", "ogg", "m4a", "flac", "aac",
    // documents
    "pdf",
];

/// Returns true if the URL path ends in a known image/video/audio/pdf extension
///
/// The check is case-insensitive and ignores query and fragment.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vidtrawl::url::has_media_extension;
///
/// assert!(has_media_extension(&Url::parse("http://example.com/a/clip.MP4").unwrap()));
/// assert!(!has_media_extension(&Url::parse("http://example.com/watch?f=a.mp4").unwrap()));
/// ```
pub fn has_media_extension(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    let last_segment = path.rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => MEDIA_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Returns a copy of the URL without its fragment
pub fn strip_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}
