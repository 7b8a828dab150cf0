/// MIME type assumed when the encoder does not report one.
pub const DEFAULT_MIME_TYPE: &str = "audio/webm";

/// Extension used for unrecognised MIME types.
pub const DEFAULT_EXTENSION: &str = "webm";

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("audio/webm", "webm"),
    ("audio/ogg", "ogg"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/wave", "wav"),
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "mp4"),
    ("audio/x-m4a", "m4a"),
    ("audio/flac", "flac"),
];

/// Maps a MIME type to a file-extension tag.
///
/// Parameters such as `;codecs=opus` are ignored and matching is
/// case-insensitive. Unknown types map to [`DEFAULT_EXTENSION`].
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();

    MIME_EXTENSIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(essence))
        .map_or(DEFAULT_EXTENSION, |(_, extension)| extension)
}
