use std::io;

use anyhow::{Result, bail};

use crate::arguments::{self, CollectedInputs};
use crate::checks;
use crate::cli::{self, Args, SilenceParams};
use crate::console::{self, Console};
use crate::engine::{CancelFlag, Engine};
use crate::freedb;
use crate::interactive::{self, Confirmation};
use crate::job::{OutputNaming, SplitJob, SplitMode, TagsPolicy};
use crate::query;
use crate::time;

const CDDB_NOTE: &str = "\n\
 +------------------------------------------------------------------+\n\
 | NOTE: cddb/cue splitpoints are often slightly off, because the   |\n\
 | disc rip the metadata describes may not match your file exactly  |\n\
 | (removed silence, extra pause seconds, encoder padding, or an    |\n\
 | imprecise database entry).                                       |\n\
 | If tracks start or end mid-song, retry with auto-adjust (-a).    |\n\
 +------------------------------------------------------------------+";

pub fn run(args: Args, engine: &dyn Engine, cancel: &CancelFlag) -> Result<()> {
    let console = Console::new(args.list_wrapped || args.stdout_output(), args.very_quiet);

    if !args.is_quiet() {
        console::print_banner();
    }

    let time_interval = match &args.time_split {
        Some(raw) => match time::parse_time(raw) {
            Some(interval) => Some(interval),
            None => bail!(
                "bad time expression for the time split.\n\tMust be min.sec, read man page for details."
            ),
        },
        None => None,
    };
    let overlap = match &args.overlap {
        Some(raw) => match time::parse_time(raw) {
            Some(time) => Some(time),
            None => bail!("bad time expression for the overlap time (-O option)"),
        },
        None => None,
    };

    let silence_params = match &args.silence_params {
        Some(raw) => {
            let (params, warnings) = cli::parse_silence_params(raw);
            for warning in &warnings {
                console.warning(warning);
            }
            if !params.any_recognized() {
                bail!("bad argument for -p option. No valid value was recognized!");
            }
            Some(params)
        }
        None => None,
    };

    checks::check_option_constraints(&args)?;

    let inputs = arguments::collect(&args.tokens, engine)?;

    let normal_split = !(args.list_wrapped
        || args.count_silence
        || args.cddb.is_some()
        || args.error_mode
        || args.time_split.is_some()
        || args.wrap
        || args.silence
        || args.audacity_labels.is_some()
        || args.equal_parts.is_some());
    if normal_split && inputs.splitpoints.len() < 2 {
        bail!("not enough splitpoints (at least 2 are needed)");
    }
    if inputs.filenames.is_empty() {
        bail!("no input filename(s).");
    }

    if args.stdout_output() {
        if inputs.splitpoints.len() > 2 {
            console.warning("multiple splitpoints with stdout!");
        } else if args.time_split.is_some() {
            console.warning("using time mode with stdout!");
        }
    }

    if !args.is_quiet() && inputs.had_directory {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = console.writer();
        match interactive::confirm_file_list(&inputs.filenames, &mut input, out.as_mut())? {
            Confirmation::Split => {}
            Confirmation::Cancel => {
                console.message("\n split aborted.");
                return Ok(());
            }
        }
    }

    if inputs.filenames.len() > 1 {
        console.message("");
    }

    for (index, filename) in inputs.filenames.iter().enumerate() {
        if args.pretend {
            console.message(format!(" Pretending to split file '{filename}' ..."));
        } else {
            console.message(format!(" Processing file '{filename}' ..."));
        }

        // splitting a stream forbids everything that needs to seek
        if (filename == "-" || filename == "o-") && args.has_stdin_incompatible_option() {
            bail!(
                "cannot use -k option (or STDIN) with one of the following options: -S -s -w -l -e -i -a -p"
            );
        }

        if args.list_wrapped {
            let tracks = engine.list_wrapped(filename)?;
            println!();
            for track in &tracks {
                println!("{track}");
            }
            println!();
            continue;
        }

        if args.count_silence {
            let params = silence_params.clone().unwrap_or_default();
            let count = engine.count_silence(filename, &params)?;
            console.message(format!(" Total silence points found: {count}"));
            continue;
        }

        // the remote query runs once, before the first split
        if args.interactive_query() && index == 0 {
            let raw = args.cddb.as_deref().unwrap_or_default();
            let (descriptor, warnings) = query::parse_query(raw);
            for warning in &warnings {
                console.warning(warning);
            }
            if descriptor.ambiguous {
                console.warning("freedb query format ambiguous!");
            }
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = console.writer();
            freedb::run_query(&descriptor, engine, &mut input, out.as_mut())?;
        }

        let job = build_job(
            &args,
            &inputs,
            filename,
            time_interval,
            overlap,
            silence_params.clone(),
        );
        let report = engine.split(&job, cancel)?;

        for file in &report.created_files {
            console.message(format!("   File \"{file}\" created"));
        }
        if args.silence {
            if let Some(level) = report.average_silence_level {
                console.message(format!(" Average silence level: {level:.2} dB"));
            }
        }

        if args.cddb.is_some() && !args.is_quiet() {
            console.message(CDDB_NOTE);
        }

        if inputs.filenames.len() > 1 {
            console.message("");
        }
    }

    Ok(())
}

fn split_mode(args: &Args, inputs: &CollectedInputs, time_interval: Option<i64>) -> SplitMode {
    if args.wrap {
        return SplitMode::Wrap;
    }
    if args.error_mode {
        return SplitMode::Error;
    }
    if args.silence {
        return SplitMode::Silence;
    }
    if let Some(interval) = time_interval {
        return SplitMode::Time { interval };
    }
    if let Some(count) = args.equal_parts {
        return SplitMode::EqualParts { count };
    }
    if let Some(labels) = &args.audacity_labels {
        return SplitMode::Audacity {
            file: labels.clone(),
        };
    }
    if let Some(source) = &args.cddb {
        if source.contains(".cue") || source.contains(".CUE") {
            return SplitMode::Cue {
                file: source.clone(),
            };
        }
        if source.starts_with("query") {
            return SplitMode::Cddb {
                file: freedb::QUERY_CDDB_FILE.to_string(),
            };
        }
        return SplitMode::Cddb {
            file: source.clone(),
        };
    }
    SplitMode::Normal {
        points: inputs.splitpoints.clone(),
    }
}

fn tags_policy(args: &Args) -> TagsPolicy {
    if args.no_tags {
        return TagsPolicy::None;
    }
    if let Some(tags) = &args.custom_tags {
        // a leading 'r' asks for tag variable replacement
        if let Some(rest) = tags.strip_prefix('r') {
            if !rest.is_empty() {
                return TagsPolicy::Custom {
                    tags: rest.to_string(),
                    replace_vars: true,
                };
            }
        }
        return TagsPolicy::Custom {
            tags: tags.clone(),
            replace_vars: false,
        };
    }
    TagsPolicy::Original
}

fn build_job(
    args: &Args,
    inputs: &CollectedInputs,
    filename: &str,
    time_interval: Option<i64>,
    overlap: Option<i64>,
    silence_params: Option<SilenceParams>,
) -> SplitJob {
    // cddb, cue and audacity sources name the output files themselves,
    // unless the user gave an explicit format
    let source_names_files =
        (args.cddb.is_some() || args.audacity_labels.is_some()) && args.output_format.is_none();
    let output = if source_names_files {
        OutputNaming::Custom
    } else {
        match &args.output_format {
            Some(format) => OutputNaming::Format {
                format: format.clone(),
            },
            None => OutputNaming::Default,
        }
    };

    SplitJob {
        file: filename.to_string(),
        mode: split_mode(args, inputs, time_interval),
        output,
        output_dir: args.output_dir.clone(),
        m3u: args.m3u.clone(),
        tags: tags_policy(args),
        force_tags_version: args.force_tags_version,
        frame_mode: args.frame_mode,
        write_xing: !args.no_xing,
        pretend: args.pretend,
        seekable: !args.not_seekable,
        overlap,
        auto_adjust: args.auto_adjust,
        silence: silence_params,
        silence_log: if args.silence && !args.no_silence_log {
            Some("trackcut.log".to_string())
        } else {
            None
        },
        export_cue: args.export_cue.clone(),
        quiet: args.is_quiet(),
    }
}
