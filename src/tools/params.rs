use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Deserialize, JsonSchema)]
pub struct QueryParams {
    /// Search query
    pub query: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct LoadPdfParams {
    /// Path to the PDF file to load
    pub path: String,
    /// Directory for ASCII-named copies of Hangul file names (default: server's copy directory)
    pub copy_dir: Option<String>,
}
