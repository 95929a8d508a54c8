//! Output formatting for search results and word lookups

use crate::index::WordInfo;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One word with everything the long listing shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDetails {
    pub word: String,
    pub front_hooks: String,
    pub back_hooks: String,
    pub probability_order: Option<u32>,
    pub definition: Option<String>,
}

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print one word per line
pub fn print_words(words: &[String], color: bool) -> io::Result<()> {
    write_words(&mut stdout(color), words)
}

pub fn write_words<W: WriteColor>(out: &mut W, words: &[String]) -> io::Result<()> {
    for word in words {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "{}", word)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

/// Print `hooks WORD hooks  #rank  definition` lines
pub fn print_details(details: &[WordDetails], color: bool) -> io::Result<()> {
    write_details(&mut stdout(color), details)
}

pub fn write_details<W: WriteColor>(out: &mut W, details: &[WordDetails]) -> io::Result<()> {
    let hook_width = details
        .iter()
        .map(|d| d.front_hooks.len())
        .max()
        .unwrap_or(0);

    for d in details {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{:>width$}", d.front_hooks, width = hook_width)?;
        out.reset()?;
        write!(out, " ")?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "{}", d.word)?;
        out.reset()?;
        write!(out, " ")?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{}", d.back_hooks)?;
        out.reset()?;

        if let Some(rank) = d.probability_order {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(out, "  #{}", rank)?;
            out.reset()?;
        }

        if let Some(definition) = &d.definition {
            let indent = " ".repeat(hook_width + d.word.len() + 4);
            let mut senses = definition.lines();
            if let Some(first) = senses.next() {
                write!(out, "  {}", first)?;
            }
            for sense in senses {
                write!(out, "\n{}{}", indent, sense)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print `WORD: valid` / `WORD: not valid`
pub fn print_judgement(results: &[(String, bool)], color: bool) -> io::Result<()> {
    write_judgement(&mut stdout(color), results)
}

pub fn write_judgement<W: WriteColor>(out: &mut W, results: &[(String, bool)]) -> io::Result<()> {
    for (word, acceptable) in results {
        write!(out, "{}: ", word)?;
        let (label, color) = if *acceptable {
            ("valid", Color::Green)
        } else {
            ("not valid", Color::Red)
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{}", label)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

/// Print details for known words, then a `not valid` line per rejected word
pub fn print_info(details: &[WordDetails], rejected: &[String], color: bool) -> io::Result<()> {
    write_info(&mut stdout(color), details, rejected)
}

pub fn write_info<W: WriteColor>(
    out: &mut W,
    details: &[WordDetails],
    rejected: &[String],
) -> io::Result<()> {
    write_details(out, details)?;
    let rejected: Vec<(String, bool)> = rejected.iter().map(|w| (w.clone(), false)).collect();
    write_judgement(out, &rejected)
}

/// Print attribute rows as a JSON array
pub fn print_json(infos: &[WordInfo]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, infos)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn render(f: impl FnOnce(&mut Buffer) -> io::Result<()>) -> String {
        let mut buf = Buffer::no_color();
        f(&mut buf).unwrap();
        String::from_utf8(buf.into_inner()).unwrap()
    }

    #[test]
    fn test_write_words() {
        let words = vec!["CAT".to_string(), "COT".to_string()];
        assert_eq!(render(|b| write_words(b, &words)), "CAT\nCOT\n");
    }

    #[test]
    fn test_write_details_aligns_hooks() {
        let details = vec![
            WordDetails {
                word: "AT".to_string(),
                front_hooks: "bc".to_string(),
                back_hooks: "e".to_string(),
                probability_order: Some(3),
                definition: Some("in the position of\nnear".to_string()),
            },
            WordDetails {
                word: "CAT".to_string(),
                front_hooks: "s".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(
            render(|b| write_details(b, &details)),
            "bc AT e  #3  in the position of\n        near\n s CAT \n"
        );
    }

    #[test]
    fn test_write_info_reports_rejected_words() {
        let details = vec![WordDetails {
            word: "CAT".to_string(),
            back_hooks: "s".to_string(),
            ..Default::default()
        }];
        let rejected = vec!["CATZ".to_string()];
        assert_eq!(
            render(|b| write_info(b, &details, &rejected)),
            " CAT s\nCATZ: not valid\n"
        );
    }

    #[test]
    fn test_write_judgement() {
        let results = vec![("CAT".to_string(), true), ("CATZ".to_string(), false)];
        assert_eq!(
            render(|b| write_judgement(b, &results)),
            "CAT: valid\nCATZ: not valid\n"
        );
    }
}
