//! Line-by-line stripping of markdown, URLs and Reddit markup from corpus text.
//!
//! Passes run in a fixed order, and each pass repeats until its pattern no longer
//! matches, so a line with several links loses all of them. Lines that end up
//! blank are dropped.

use anyhow::{Context, Result};
use regex::Regex;

/// Lines containing this broken image link are dropped whole. Such lines are
/// assumed to hold nothing else; any other text on the same line is lost.
pub const BROKEN_IMAGE_MARKER: &str = "https://.png?";

const URL_TLDS: &str = "com|net|org|io|gg|co|uk|ca|tv|me|ly|gl|be|wiki";

struct CleanPass {
    name: &'static str,
    re: Regex,
}

impl CleanPass {
    fn new(name: &'static str, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).with_context(|| format!("compile {} pattern", name))?;
        Ok(Self { name, re })
    }

    fn apply(&self, line: &mut String) {
        while self.re.is_match(line) {
            *line = self.re.replace_all(line, "").into_owned();
        }
    }
}

pub struct TextNormalizer {
    passes: Vec<CleanPass>,
    spaces: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        let passes = vec![
            // [text](url); the url may hold one level of parens, e.g. wiki `Zulrah_(boss)`
            CleanPass::new("markdown link", r"\[[^\]\n]*\]\((?:[^()\n]|\([^()\n]*\))*\)")?,
            // scheme-prefixed URLs, then bare hosts on known TLDs with optional path.
            // A `user@` in front of a bare host goes with it.
            CleanPass::new(
                "url",
                &format!(
                    r"(?i)\bhttps?://[^\s)\]]+|(?:[^\s@]+@)?\b(?:www\.)?(?:[a-z0-9-]+\.)+(?:{})\b(?:/[^\s)\]]*)?",
                    URL_TLDS
                ),
            )?,
            // zero-width space, double-escaped quote markers and ampersand escapes
            CleanPass::new("html escape", r"(?i)&amp;#x200b;|&#x200b;|&amp;gt;|&amp;")?,
            // emphasis markers and escaped hyphens
            CleanPass::new("emphasis", r"\*+|\\-")?,
            // slashes, quote markers, TL;DR
            CleanPass::new("markup", r"/|&gt;|(?i:\btl;\s?dr\b):?")?,
        ];
        let spaces = Regex::new(r"\s{2,}").context("compile whitespace pattern")?;
        Ok(Self { passes, spaces })
    }

    /// Names of the passes, in application order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }

    /// Clean one line. None when the line should not be emitted.
    pub fn clean_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() || line.contains(BROKEN_IMAGE_MARKER) {
            return None;
        }
        let mut out = line.to_string();
        for pass in &self.passes {
            pass.apply(&mut out);
        }
        let out = self.spaces.replace_all(out.trim(), " ").into_owned();
        if out.is_empty() { None } else { Some(out) }
    }

    /// Clean every line of `text`, keeping order and joining with `\n`.
    pub fn clean(&self, text: &str) -> String {
        let mut kept = 0usize;
        let mut dropped = 0usize;
        let mut out = String::with_capacity(text.len());
        for line in text.lines() {
            match self.clean_line(line) {
                Some(l) => {
                    if kept > 0 {
                        out.push('\n');
                    }
                    out.push_str(&l);
                    kept += 1;
                }
                None => dropped += 1,
            }
        }
        tracing::debug!("Normalized corpus - kept={} lines, dropped={}", kept, dropped);
        out
    }
}
