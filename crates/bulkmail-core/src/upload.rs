//! Accepting `config.json` uploads.

/// The only file name accepted as a configuration upload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Whether an attachment with this declared name is a config upload.
///
/// The comparison is exact and case-sensitive.
#[must_use]
pub fn is_config_upload(file_name: Option<&str>) -> bool {
    file_name == Some(CONFIG_FILE_NAME)
}
