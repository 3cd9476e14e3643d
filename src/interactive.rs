//! Paginated console prompts.
//!
//! Both flows page 22 lines at a time and block on stdin. Responses are only
//! honored as a single character followed by the end of the line; anything
//! else pages on (or re-prompts where an answer is mandatory).

use std::io::{self, BufRead, Write};

use crate::engine::AlbumResult;

/// Lines shown between two prompts.
const PAGE_SIZE: usize = 22;

/// Outcome of one page-boundary prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Continue,
    StopToSelect,
    Cancel,
}

/// Outcome of the file-list confirmation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Split,
    Cancel,
}

fn prompt_page_action(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    prompt: &str,
    stop: char,
    cancel: Option<char>,
) -> io::Result<PageAction> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "console input closed",
        ));
    }

    let response = line.trim_end_matches(['\r', '\n']);
    let mut chars = response.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c == stop => Ok(PageAction::StopToSelect),
        (Some(c), None) if Some(c) == cancel => Ok(PageAction::Cancel),
        _ => Ok(PageAction::Continue),
    }
}

/// Page through the search results; 'q' stops the browsing early. Album
/// lines and their revision sub-entries count against the same page.
pub fn browse_results(
    results: &[AlbumResult],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<()> {
    writeln!(out, "List of found cd:")?;

    let mut lines = 0usize;
    for album in results {
        writeln!(out, "{:3}) {}", album.id, album.name)?;
        lines += 1;
        if lines % PAGE_SIZE == 0
            && prompt_page_action(input, out, BROWSE_PROMPT, 'q', None)? != PageAction::Continue
        {
            return Ok(());
        }

        for revision in 0..album.revisions {
            writeln!(
                out,
                "  |\\=>{:3}) Revision: {}",
                album.id + revision + 1,
                revision + 2
            )?;
            lines += 1;
            if lines % PAGE_SIZE == 0
                && prompt_page_action(input, out, BROWSE_PROMPT, 'q', None)? != PageAction::Continue
            {
                return Ok(());
            }
        }
    }
    Ok(())
}

const BROWSE_PROMPT: &str = "-- 'q' to select cd, Enter for more: ";

/// Ask for a result number until a valid one is typed.
pub fn select_result(
    count: usize,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<usize> {
    loop {
        write!(out, "Select cd #: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "console input closed",
            ));
        }

        let response = line.trim_end_matches(['\r', '\n']);
        if response.is_empty() || !response.bytes().all(|b| b.is_ascii_digit()) {
            write!(out, "Please ")?;
            continue;
        }
        match response.parse::<usize>() {
            Ok(selected) if selected < count => return Ok(selected),
            _ => continue,
        }
    }
}

/// Show the expanded file list page by page and ask whether to go on. The
/// final prompt is mandatory; interior ones also accept Enter for the next
/// page.
pub fn confirm_file_list(
    files: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<Confirmation> {
    writeln!(out, "List of found files:\n")?;

    for (index, file) in files.iter().enumerate() {
        writeln!(out, "  {file}")?;
        if (index + 1) % PAGE_SIZE == 0 && index + 1 < files.len() {
            match prompt_page_action(input, out, PAGE_PROMPT, 's', Some('c'))? {
                PageAction::Continue => writeln!(out)?,
                PageAction::StopToSelect => return Ok(Confirmation::Split),
                PageAction::Cancel => return Ok(Confirmation::Cancel),
            }
        }
    }

    loop {
        match prompt_page_action(input, out, FINAL_PROMPT, 's', Some('c'))? {
            PageAction::Continue => {}
            PageAction::StopToSelect => {
                writeln!(out)?;
                return Ok(Confirmation::Split);
            }
            PageAction::Cancel => return Ok(Confirmation::Cancel),
        }
    }
}

const PAGE_PROMPT: &str = "\n-- 'Enter' for more, 's' to split, 'c' to cancel: ";
const FINAL_PROMPT: &str = "\n-- 's' to split, 'c' to cancel: ";

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn files(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("file{i:02}.mp3")).collect()
    }

    fn albums(count: usize) -> Vec<AlbumResult> {
        (0..count as u32)
            .map(|id| AlbumResult {
                id,
                name: format!("Album {id}"),
                revisions: 0,
            })
            .collect()
    }

    #[test]
    fn short_list_splits_on_s() {
        let mut input = Cursor::new(b"s\n".to_vec());
        let mut out = Vec::new();
        let confirmation = confirm_file_list(&files(3), &mut input, &mut out).unwrap();
        assert_eq!(confirmation, Confirmation::Split);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("file00.mp3"));
        assert!(shown.contains("'s' to split"));
    }

    #[test]
    fn cancel_at_final_prompt() {
        let mut input = Cursor::new(b"c\n".to_vec());
        let mut out = Vec::new();
        let confirmation = confirm_file_list(&files(3), &mut input, &mut out).unwrap();
        assert_eq!(confirmation, Confirmation::Cancel);
    }

    #[test]
    fn multi_character_answer_reprompts() {
        let mut input = Cursor::new(b"ss\n\ns\n".to_vec());
        let mut out = Vec::new();
        let confirmation = confirm_file_list(&files(2), &mut input, &mut out).unwrap();
        assert_eq!(confirmation, Confirmation::Split);
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("'s' to split").count(), 3);
    }

    #[test]
    fn long_list_pages_and_continues() {
        // 45 files: prompts after 22 and 44, then the mandatory prompt
        let mut input = Cursor::new(b"\n\ns\n".to_vec());
        let mut out = Vec::new();
        let confirmation = confirm_file_list(&files(45), &mut input, &mut out).unwrap();
        assert_eq!(confirmation, Confirmation::Split);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("file44.mp3"));
        assert_eq!(shown.matches("'Enter' for more").count(), 2);
    }

    #[test]
    fn cancel_at_page_boundary_stops_printing() {
        let mut input = Cursor::new(b"c\n".to_vec());
        let mut out = Vec::new();
        let confirmation = confirm_file_list(&files(45), &mut input, &mut out).unwrap();
        assert_eq!(confirmation, Confirmation::Cancel);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("file21.mp3"));
        assert!(!shown.contains("file22.mp3"));
    }

    #[test]
    fn exact_page_multiple_has_no_interior_prompt() {
        let mut input = Cursor::new(b"s\n".to_vec());
        let mut out = Vec::new();
        confirm_file_list(&files(22), &mut input, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("'Enter' for more").count(), 0);
    }

    #[test]
    fn browsing_shows_revisions_against_the_same_counter() {
        let results = vec![
            AlbumResult {
                id: 0,
                name: "One".to_string(),
                revisions: 2,
            },
            AlbumResult {
                id: 3,
                name: "Two".to_string(),
                revisions: 0,
            },
        ];
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();
        browse_results(&results, &mut input, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("  0) One"));
        assert!(shown.contains("Revision: 2"));
        assert!(shown.contains("Revision: 3"));
        assert!(shown.contains("  3) Two"));
    }

    #[test]
    fn browsing_stops_on_q_at_page_boundary() {
        let mut input = Cursor::new(b"q\n".to_vec());
        let mut out = Vec::new();
        browse_results(&albums(30), &mut input, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Album 21"));
        assert!(!shown.contains("Album 22"));
    }

    #[test]
    fn browsing_enter_shows_next_page() {
        let mut input = Cursor::new(b"\n".to_vec());
        let mut out = Vec::new();
        browse_results(&albums(30), &mut input, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Album 29"));
    }

    #[test]
    fn selection_reprompts_until_valid() {
        let mut input = Cursor::new(b"abc\n\n9\n2\n".to_vec());
        let mut out = Vec::new();
        let selected = select_result(5, &mut input, &mut out).unwrap();
        assert_eq!(selected, 2);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Please "));
        assert_eq!(shown.matches("Select cd #: ").count(), 4);
    }

    #[test]
    fn closed_input_is_an_error_not_a_spin() {
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();
        let err = select_result(3, &mut input, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
