//! Interactive prompts for runs started without a URL.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use hlsdl_engine::VariantChooser;
use hlsdl_engine::hls::{SelectionError, Variant, validate_choice};
use tracing::debug;

use crate::error::AppError;
use crate::utils::{DEFAULT_OUTPUT, normalize_output_path};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stderr> {
    /// Reads from stdin; prompts go to stderr so stdout stays clean.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn prompt_url(&mut self) -> Result<String, AppError> {
        loop {
            match self.ask("Playlist URL: ")? {
                Some(url) if !url.is_empty() => return Ok(url),
                Some(_) => continue,
                None => return Err(AppError::InvalidInput("no URL given".to_string())),
            }
        }
    }

    /// Asks for the output file; an empty answer keeps the default.
    pub fn prompt_output(&mut self) -> Result<PathBuf, AppError> {
        let answer = self
            .ask(&format!("Output file [{DEFAULT_OUTPUT}]: "))?
            .unwrap_or_default();
        Ok(normalize_output_path(Path::new(&answer)))
    }

    fn list_variants(&mut self, variants: &[Variant]) -> io::Result<()> {
        writeln!(self.output, "Available renditions:")?;
        for (i, variant) in variants.iter().enumerate() {
            writeln!(self.output, "[{}] {}", i + 1, variant.resolution_label())?;
        }
        Ok(())
    }
}

/// Lets the user pick a rendition, asking again until the answer is valid.
impl<R: BufRead, W: Write> VariantChooser for Prompter<R, W> {
    fn choose(&mut self, variants: &[Variant]) -> Result<usize, SelectionError> {
        if variants.is_empty() {
            return Err(SelectionError::NoVariants);
        }
        if self.list_variants(variants).is_err() {
            return Err(SelectionError::InputClosed);
        }

        let prompt = format!("Choose a rendition [1-{}]: ", variants.len());
        loop {
            let answer = match self.ask(&prompt) {
                Ok(Some(answer)) => answer,
                Ok(None) | Err(_) => return Err(SelectionError::InputClosed),
            };
            match validate_choice(&answer, variants.len()) {
                Ok(index) => return Ok(index),
                Err(e) => {
                    debug!(answer = %answer, "Rejected rendition choice");
                    if writeln!(self.output, "{e}").is_err() {
                        return Err(SelectionError::InputClosed);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use url::Url;

    fn variants() -> Vec<Variant> {
        ["1920x1080", "1280x720"]
            .into_iter()
            .map(|res| Variant {
                resolution: Some(res.to_string()),
                playlist_url: Url::parse(&format!("https://example.com/{res}.m3u8")).unwrap(),
            })
            .chain(std::iter::once(Variant {
                resolution: None,
                playlist_url: Url::parse("https://example.com/audio.m3u8").unwrap(),
            }))
            .collect()
    }

    #[test]
    fn test_reprompts_until_valid_choice() {
        let mut output = Vec::new();
        let mut prompter = Prompter::new(Cursor::new("abc\n0\n4\n2\n"), &mut output);

        let index = prompter.choose(&variants()).unwrap();
        assert_eq!(index, 1);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("[1] 1920x1080\n[2] 1280x720\n[3] unknown\n"));
        assert_eq!(shown.matches("Choose a rendition [1-3]: ").count(), 4);
        assert!(shown.contains("'abc' is not a number"));
        assert!(shown.contains("choice 4 is out of range 1..=3"));
    }

    #[test]
    fn test_closed_input_ends_selection() {
        let mut prompter = Prompter::new(Cursor::new("nope\n"), Vec::new());
        assert_eq!(
            prompter.choose(&variants()),
            Err(SelectionError::InputClosed)
        );
    }

    #[test]
    fn test_prompt_url_skips_blank_lines() {
        let mut prompter = Prompter::new(
            Cursor::new("\n  \n https://example.com/master.m3u8 \n"),
            Vec::new(),
        );
        assert_eq!(
            prompter.prompt_url().unwrap(),
            "https://example.com/master.m3u8"
        );
    }

    #[test]
    fn test_prompt_url_without_input() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
        assert!(matches!(
            prompter.prompt_url(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_prompt_output() {
        let mut prompter = Prompter::new(Cursor::new("\nmovie\n"), Vec::new());
        assert_eq!(prompter.prompt_output().unwrap(), PathBuf::from("video.mp4"));
        assert_eq!(prompter.prompt_output().unwrap(), PathBuf::from("movie.mp4"));
    }
}
