use crate::{DEFAULT_EXTENSION, extension_for_mime};

/// WHAT: Codec parameters are ignored when mapping MIME types
/// WHY: Encoders report types like audio/webm;codecs=opus
#[test]
fn given_mime_with_codec_parameters_when_mapping_then_essence_decides() {
    // Given: MIME types carrying codec parameters
    let cases = [
        ("audio/webm;codecs=opus", "webm"),
        ("audio/ogg; codecs=vorbis", "ogg"),
        ("audio/mp4;codecs=mp4a.40.2", "mp4"),
    ];

    // When / Then: Each maps by its essence
    for (mime, expected) in cases {
        assert_eq!(extension_for_mime(mime), expected, "{mime}");
    }
}

/// WHAT: Every known audio container has an extension
/// WHY: Saved recordings need a file name players recognise
#[test]
fn given_known_mime_types_when_mapping_then_expected_extensions() {
    // Given: The supported container types
    let cases = [
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

    // When / Then: Each maps to its extension
    for (mime, expected) in cases {
        assert_eq!(extension_for_mime(mime), expected, "{mime}");
    }
}

/// WHAT: MIME matching ignores case and surrounding whitespace
/// WHY: Platforms differ in how they spell the same type
#[test]
fn given_mixed_case_mime_when_mapping_then_matches() {
    // Given: A shouted MIME type with padding
    let mime = "  AUDIO/OGG ;codecs=opus";

    // When: Mapping
    let extension = extension_for_mime(mime);

    // Then: Matches the lowercase entry
    assert_eq!(extension, "ogg");
}

/// WHAT: Unknown or empty MIME types fall back to webm
/// WHY: A recording must always be savable
#[test]
fn given_unknown_mime_when_mapping_then_default_extension() {
    // Given: Types outside the table
    let cases = ["video/quicktime", "", "audio/aac"];

    // When / Then: Each falls back
    for mime in cases {
        assert_eq!(extension_for_mime(mime), DEFAULT_EXTENSION, "{mime}");
    }
}
