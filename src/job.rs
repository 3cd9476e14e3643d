//! Description of one split handed over to the engine.

use serde::Serialize;

use crate::cli::SilenceParams;

/// Everything the engine needs to split one input file. Serialized as JSON
/// on the engine's stdin.
#[derive(Debug, Clone, Serialize)]
pub struct SplitJob {
    pub file: String,
    pub mode: SplitMode,
    pub output: OutputNaming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m3u: Option<String>,
    pub tags: TagsPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_tags_version: Option<i32>,
    pub frame_mode: bool,
    pub write_xing: bool,
    pub pretend: bool,
    pub seekable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<i64>,
    pub auto_adjust: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence: Option<SilenceParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence_log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_cue: Option<String>,
    pub quiet: bool,
}

/// Where the splitpoints come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitMode {
    /// Positional splitpoints given on the command line.
    Normal { points: Vec<i64> },
    /// A splitpoint every fixed interval.
    Time { interval: i64 },
    /// The file divided into a fixed number of equal pieces.
    EqualParts { count: u32 },
    Silence,
    Error,
    Wrap,
    Cue { file: String },
    Cddb { file: String },
    Audacity { file: String },
}

/// How the output files are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputNaming {
    /// Names derived from the splitpoint times.
    Default,
    /// A user-supplied format string; "-" selects standard output.
    Format { format: String },
    /// Names chosen by the splitpoint source (cddb, cue, audacity labels).
    Custom,
}

/// What tags the split files receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagsPolicy {
    /// Copy the tags of the file being split.
    Original,
    None,
    Custom { tags: String, replace_vars: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_serializes_with_tagged_mode() {
        let job = SplitJob {
            file: "album.mp3".to_string(),
            mode: SplitMode::Normal {
                points: vec![0, 6000],
            },
            output: OutputNaming::Default,
            output_dir: None,
            m3u: None,
            tags: TagsPolicy::Original,
            force_tags_version: None,
            frame_mode: false,
            write_xing: true,
            pretend: false,
            seekable: true,
            overlap: None,
            auto_adjust: false,
            silence: None,
            silence_log: None,
            export_cue: None,
            quiet: false,
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["mode"]["type"], "normal");
        assert_eq!(value["mode"]["points"][1], 6000);
        assert_eq!(value["tags"]["type"], "original");
        // absent options do not clutter the payload
        assert!(value.get("output_dir").is_none());
    }

    #[test]
    fn custom_tags_serialize_value_and_flag() {
        let tags = TagsPolicy::Custom {
            tags: "[@a=artist]".to_string(),
            replace_vars: true,
        };
        let value = serde_json::to_value(&tags).unwrap();
        assert_eq!(value["type"], "custom");
        assert_eq!(value["replace_vars"], true);
    }
}
