//! Cross checks over the finished option set.
//!
//! Purely structural rules; nothing here touches the file system or the
//! network. The first violated rule, in the order written below, aborts the
//! run.

use anyhow::{Result, bail};

use crate::cli::Args;

pub fn check_option_constraints(args: &Args) -> Result<()> {
    if args.not_seekable && args.has_stdin_incompatible_option() {
        bail!(
            "cannot use -k option (or STDIN) with one of the following options: -S -s -w -l -e -i -a -p"
        );
    }

    if args.wrap
        && (args.time_split.is_some()
            || args.cddb.is_some()
            || args.silence
            || args.list_wrapped
            || args.error_mode
            || args.count_silence
            || args.frame_mode
            || args.auto_adjust
            || args.silence_params.is_some()
            || args.output_format.is_some()
            || args.custom_tags.is_some()
            || args.no_tags
            || args.no_xing
            || args.audacity_labels.is_some()
            || args.export_cue.is_some()
            || args.equal_parts.is_some())
    {
        bail!("the -w option can only be used with -m, -d, -q and -Q");
    }

    if args.list_wrapped
        && (args.time_split.is_some()
            || args.cddb.is_some()
            || args.silence
            || args.error_mode
            || args.count_silence
            || args.m3u.is_some()
            || args.frame_mode
            || args.auto_adjust
            || args.silence_params.is_some()
            || args.output_format.is_some()
            || args.custom_tags.is_some()
            || args.output_dir.is_some()
            || args.no_tags
            || args.very_quiet
            || args.no_xing
            || args.audacity_labels.is_some()
            || args.equal_parts.is_some())
    {
        bail!("the -l option can only be used with -q");
    }

    if args.error_mode
        && (args.time_split.is_some()
            || args.cddb.is_some()
            || args.silence
            || args.count_silence
            || args.auto_adjust
            || args.silence_params.is_some()
            || args.custom_tags.is_some()
            || args.no_tags
            || args.audacity_labels.is_some()
            || args.export_cue.is_some()
            || args.equal_parts.is_some())
    {
        bail!("the -e option can only be used with -m, -f, -o, -d, -q, -Q");
    }

    if args.cddb.is_some()
        && (args.time_split.is_some()
            || args.silence
            || args.count_silence
            || args.custom_tags.is_some()
            || args.audacity_labels.is_some()
            || args.equal_parts.is_some())
    {
        bail!("the -c option cannot be used with -t, -g, -s, -A, -i or -S");
    }

    if args.audacity_labels.is_some()
        && (args.time_split.is_some()
            || args.silence
            || args.count_silence
            || args.equal_parts.is_some())
    {
        bail!("the -A option cannot be used with -t, -s, -i or -S");
    }

    if args.time_split.is_some()
        && (args.silence || args.count_silence || args.equal_parts.is_some())
    {
        bail!("the -t option cannot be used with -s, -i or -S");
    }

    if args.silence && (args.auto_adjust || args.count_silence || args.equal_parts.is_some()) {
        bail!("the -s option cannot be used with -a, -i or -S");
    }

    if args.auto_adjust && args.count_silence {
        bail!("the -a option cannot be used with -i");
    }

    if args.silence_params.is_some() && !args.auto_adjust && !args.silence && !args.count_silence {
        bail!("the -p option cannot be used without -a, -s or -i");
    }

    if args.output_format.is_some() {
        if args.count_silence {
            bail!("the -o option cannot be used with -i");
        }
        if args.stdout_output() && (args.m3u.is_some() || args.output_dir.is_some()) {
            bail!("cannot use '-o -' (STDOUT) with -m or -d");
        }
    }

    if args.custom_tags.is_some() && (args.count_silence || args.no_tags) {
        bail!("the -g option cannot be used with -n or -i");
    }

    if args.output_dir.is_some() && args.count_silence {
        bail!("the -d option cannot be used with -i");
    }

    if args.no_tags && (args.count_silence || args.force_tags_version.is_some()) {
        bail!("the -n option cannot be used with -i or -T");
    }

    if args.m3u.is_some() && args.count_silence {
        bail!("the -m option cannot be used with -i");
    }

    if args.very_quiet {
        if args.stdout_output() {
            bail!("the -Q option cannot be used with STDOUT output ('-o -')");
        }
        if args.interactive_query() {
            bail!("the -Q option cannot be used with interactive freedb query ('-c query')");
        }
    }

    if args.no_silence_log && !args.silence {
        bail!("the -N option must be used with silence detection (-s option)");
    }

    if args.overlap.is_some()
        && (args.wrap || args.error_mode || args.list_wrapped || args.count_silence)
    {
        bail!("the -O option cannot be used with -w, -e, -l or -i");
    }

    if let Some(version) = args.force_tags_version {
        if version != 1 && version != 2 && version != 12 {
            bail!("the -T option can only have values 1, 2 or 12");
        }
    }

    if args.equal_parts == Some(0) {
        bail!("the -S option must have a positive split number");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Args {
        Args::default()
    }

    #[test]
    fn empty_option_set_passes() {
        assert!(check_option_constraints(&base()).is_ok());
    }

    #[test]
    fn wrap_rejects_cddb() {
        let args = Args {
            wrap: true,
            cddb: Some("album.cddb".to_string()),
            ..base()
        };
        let err = check_option_constraints(&args).unwrap_err();
        assert!(err.to_string().contains("-w option"));
    }

    #[test]
    fn wrap_accepts_m3u_and_quiet() {
        let args = Args {
            wrap: true,
            m3u: Some("out.m3u".to_string()),
            quiet: true,
            output_dir: Some("out".to_string()),
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn list_wrapped_only_with_quiet() {
        let args = Args {
            list_wrapped: true,
            quiet: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());

        let args = Args {
            list_wrapped: true,
            very_quiet: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());
    }

    #[test]
    fn not_seekable_rejects_silence() {
        let args = Args {
            not_seekable: true,
            silence: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());
    }

    #[test]
    fn silence_params_need_a_consumer() {
        let args = Args {
            silence_params: Some("th=-30".to_string()),
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());

        let args = Args {
            silence_params: Some("th=-30".to_string()),
            auto_adjust: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn stdout_format_rejects_m3u_and_dir() {
        let args = Args {
            output_format: Some("-".to_string()),
            m3u: Some("out.m3u".to_string()),
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());

        let args = Args {
            output_format: Some("-".to_string()),
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn very_quiet_rejects_interactive_query() {
        let args = Args {
            very_quiet: true,
            cddb: Some("query{x}".to_string()),
            ..base()
        };
        let err = check_option_constraints(&args).unwrap_err();
        assert!(err.to_string().contains("-Q option"));

        // a cddb file is fine in very quiet mode
        let args = Args {
            very_quiet: true,
            cddb: Some("album.cddb".to_string()),
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn silence_log_suppression_needs_silence_mode() {
        let args = Args {
            no_silence_log: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());

        let args = Args {
            no_silence_log: true,
            silence: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn overlap_rejects_wrap_modes() {
        let args = Args {
            overlap: Some("0.10".to_string()),
            wrap: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());
    }

    #[test]
    fn tags_version_values() {
        for version in [1, 2, 12] {
            let args = Args {
                force_tags_version: Some(version),
                ..base()
            };
            assert!(check_option_constraints(&args).is_ok());
        }
        let args = Args {
            force_tags_version: Some(3),
            ..base()
        };
        let err = check_option_constraints(&args).unwrap_err();
        assert!(err.to_string().contains("1, 2 or 12"));
    }

    #[test]
    fn equal_parts_must_be_positive() {
        let args = Args {
            equal_parts: Some(0),
            ..base()
        };
        assert!(check_option_constraints(&args).is_err());

        let args = Args {
            equal_parts: Some(4),
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }

    #[test]
    fn compatible_combination_passes_unchanged() {
        let args = Args {
            silence: true,
            auto_adjust: false,
            silence_params: Some("th=-30,rm".to_string()),
            output_format: Some("@n-@t".to_string()),
            output_dir: Some("out".to_string()),
            m3u: Some("out.m3u".to_string()),
            frame_mode: true,
            quiet: true,
            ..base()
        };
        assert!(check_option_constraints(&args).is_ok());
    }
}
