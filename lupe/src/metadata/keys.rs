//! Fixed metadata key tables. Keys use the exiv2-style namespaced form
//! (`Exif.Image.Make`, `Xmp.dc.subject`) the consuming indexer knows.

/// Keys whose values contribute to the document `<title>`.
pub const TITLE_KEYS: &[&str] = &[
    "Xmp.MicrosoftPhoto.LastKeywordXMP",
    "Xmp.dc.subject",
    "Xmp.lr.hierarchicalSubject",
];

/// Keys rendered as `key : value` lines in the document body when present.
pub const INTERESTING_KEYS: &[&str] = &[
    "Exif.Image.DateTime",
    "Exif.Image.Make",
    "Exif.Image.Model",
    "Exif.Photo.DateTimeDigitized",
    "Exif.Photo.DateTimeOriginal",
    "Xmp.MicrosoftPhoto.LastKeywordXMP",
    "Xmp.dc.subject",
    "Xmp.digiKam.TagsList",
    "Xmp.lr.hierarchicalSubject",
];

/// Date-bearing keys in priority order; the first present wins and exactly
/// one date element is emitted.
pub const DATE_KEYS: &[&str] = &[
    "Exif.Photo.DateTimeOriginal",
    "Exif.Image.DateTime",
    "Exif.Photo.DateTimeDigitized",
];

/// Vendor tag-list key feeding the keywords meta element.
pub const TAG_LIST_KEY: &str = "Xmp.digiKam.TagsList";

/// Undecoded maker-note blob; never safe to stringify.
pub const MAKER_NOTE_KEY: &str = "Exif.Photo.MakerNote";
