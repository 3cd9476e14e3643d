use clap::Parser;
use regex::Regex;
use serde::Serialize;

/// Split audio files at given splitpoints without decoding them
#[derive(Parser, Debug, Default)]
#[command(
    name = "trackcut",
    about,
    override_usage = "trackcut [OPTIONS] FILE1 [FILE2] ... [BEGIN_TIME] [TIME] ... [END_TIME]\n       TIME FORMAT: min.sec[.0-99], even if minutes are over 59 (or EOF for End Of File)"
)]
pub struct Args {
    /// Split files every fixed time length (TIME format as above)
    #[arg(short = 't', value_name = "TIME")]
    pub time_split: Option<String>,

    /// Get splitpoints and filenames from a .cddb or .cue file, or from the
    /// Internet ("query" or "query{album}")
    #[arg(short = 'c', value_name = "SOURCE")]
    pub cddb: Option<String>,

    /// Split with splitpoints from an audacity labels file
    #[arg(short = 'A', value_name = "AUDACITY_FILE")]
    pub audacity_labels: Option<String>,

    /// Split into SPLIT_NUMBER files of equal time length
    #[arg(short = 'S', value_name = "SPLIT_NUMBER")]
    pub equal_parts: Option<u32>,

    /// Silence detection: automatically find splitpoints (use -p for arguments)
    #[arg(short = 's')]
    pub silence: bool,

    /// Auto-adjust splitpoints with silence detection (use -p for arguments)
    #[arg(short = 'a')]
    pub auto_adjust: bool,

    /// Count how many silence splitpoints there are, without splitting
    #[arg(short = 'i')]
    pub count_silence: bool,

    /// Arguments for silence detection (th, off, min, gap, nt, rm)
    #[arg(short = 'p', value_name = "PARAMETERS")]
    pub silence_params: Option<String>,

    /// Split wrapped files back into their original pieces
    #[arg(short = 'w')]
    pub wrap: bool,

    /// List the tracks of a wrapped file without extracting them
    #[arg(short = 'l')]
    pub list_wrapped: bool,

    /// Error mode: split concatenated files with sync error detection
    #[arg(short = 'e')]
    pub error_mode: bool,

    /// Frame mode: process all frames, for higher precision and VBR
    #[arg(short = 'f')]
    pub frame_mode: bool,

    /// Output filename format; a plain '-' writes the split to standard output
    #[arg(short = 'o', value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Put all output files in this directory
    #[arg(short = 'd', value_name = "DIRNAME")]
    pub output_dir: Option<String>,

    /// Append the split filenames to this m3u file
    #[arg(short = 'm', value_name = "M3U_FILE")]
    pub m3u: Option<String>,

    /// Custom tags for the split files (a leading 'r' replaces tag variables)
    #[arg(short = 'g', value_name = "TAGS")]
    pub custom_tags: Option<String>,

    /// Do not write any tags to the split files
    #[arg(short = 'n')]
    pub no_tags: bool,

    /// Force the output tags version: 1, 2 or 12 for both
    #[arg(short = 'T', value_name = "TAGS_VERSION")]
    pub force_tags_version: Option<i32>,

    /// Consider input not seekable (slower); default when input is STDIN (-)
    #[arg(short = 'k')]
    pub not_seekable: bool,

    /// Overlap consecutive split files by TIME (slower)
    #[arg(short = 'O', value_name = "TIME")]
    pub overlap: Option<String>,

    /// Do not create the silence log file when using -s
    #[arg(short = 'N')]
    pub no_silence_log: bool,

    /// Do not write the Xing header (use with -n to concatenate split files)
    #[arg(short = 'x')]
    pub no_xing: bool,

    /// Pretend to split, without creating any files or directories
    #[arg(short = 'P')]
    pub pretend: bool,

    /// Export the splitpoints to a cue file
    #[arg(short = 'E', value_name = "CUE_FILE")]
    pub export_cue: Option<String>,

    /// Quiet mode: fewer messages and no prompts when possible
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Very quiet mode: nothing on stdout and no progress (implies -q)
    #[arg(short = 'Q')]
    pub very_quiet: bool,

    /// Print debug diagnostics
    #[arg(short = 'D')]
    pub debug: bool,

    /// Print the version and exit
    #[arg(short = 'v')]
    pub version: bool,

    /// Input files, directories and splitpoint times
    #[arg(value_name = "FILES_AND_TIMES")]
    pub tokens: Vec<String>,
}

impl Args {
    pub fn is_quiet(&self) -> bool {
        self.quiet || self.very_quiet
    }

    /// The split result goes to standard output instead of files.
    pub fn stdout_output(&self) -> bool {
        self.output_format.as_deref() == Some("-")
    }

    /// The -c argument asks for a remote metadata query.
    pub fn interactive_query(&self) -> bool {
        self.cddb.as_deref().is_some_and(|c| c.starts_with("query"))
    }

    /// Options that need a seekable input file and therefore cannot work on
    /// a stream.
    pub fn has_stdin_incompatible_option(&self) -> bool {
        self.silence
            || self.wrap
            || self.list_wrapped
            || self.error_mode
            || self.count_silence
            || self.auto_adjust
            || self.silence_params.is_some()
            || self.equal_parts.is_some()
    }
}

/// Silence detection parameters carried over to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SilenceParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_count: Option<i32>,
    pub remove_silence: bool,
}

impl SilenceParams {
    /// True when at least one keyword was recognized.
    pub fn any_recognized(&self) -> bool {
        *self != SilenceParams::default()
    }
}

/// Scan the -p argument for each keyword independently, anywhere in the
/// string. Unparseable values produce a warning and are skipped.
pub fn parse_silence_params(arg: &str) -> (SilenceParams, Vec<String>) {
    let mut params = SilenceParams::default();
    let mut warnings = Vec::new();

    if let Some(tail) = value_after(arg, "gap") {
        match leading_int(tail) {
            Some(value) => params.gap = Some(value),
            None => warnings.push("bad gap argument. It will be ignored!".to_string()),
        }
    }
    if let Some(tail) = value_after(arg, "th") {
        match leading_float(tail) {
            Some(value) => params.threshold = Some(value),
            None => warnings.push("bad threshold argument. It will be ignored!".to_string()),
        }
    }
    if let Some(tail) = value_after(arg, "nt") {
        match leading_int(tail) {
            Some(value) => params.track_count = Some(value),
            None => warnings.push("bad tracknumber argument. It will be ignored!".to_string()),
        }
    }
    if arg.contains("rm") {
        params.remove_silence = true;
    }
    if let Some(tail) = value_after(arg, "off") {
        match leading_float(tail) {
            Some(value) => params.offset = Some(value),
            None => warnings.push("bad offset argument. It will be ignored!".to_string()),
        }
    }
    if let Some(tail) = value_after(arg, "min") {
        match leading_float(tail) {
            Some(value) => params.min_length = Some(value),
            None => warnings
                .push("bad minimum silence length argument. It will be ignored!".to_string()),
        }
    }

    (params, warnings)
}

/// The text after the first '=' that follows the keyword, if both exist.
fn value_after<'a>(arg: &'a str, keyword: &str) -> Option<&'a str> {
    let start = arg.find(keyword)?;
    let eq = arg[start..].find('=')?;
    Some(&arg[start + eq + 1..])
}

fn leading_float(text: &str) -> Option<f32> {
    let re = Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)").ok()?;
    re.find(text).and_then(|m| m.as_str().parse().ok())
}

fn leading_int(text: &str) -> Option<i32> {
    let re = Regex::new(r"^[+-]?\d+").ok()?;
    re.find(text).and_then(|m| m.as_str().parse().ok())
}
