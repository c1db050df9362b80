use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::cli::NormalizeArgs;
use crate::table::{read_text, write_text};

pub fn run(args: NormalizeArgs) -> Result<()> {
    let rewritten = normalize_file(&args.input_path, &args.output_path)?;
    info!(
        input = %args.input_path.display(),
        output = %args.output_path.display(),
        rewritten,
        "normalize completed"
    );
    Ok(())
}

/// Rewrites `input` into `output`, returning the number of rewritten spans.
pub fn normalize_file(input: &Path, output: &Path) -> Result<usize> {
    let normalizer = BracketNormalizer::new()?;
    let content = read_text(input)?;
    let (normalized, rewritten) = normalizer.normalize(&content);
    write_text(output, &normalized)?;
    Ok(rewritten)
}

/// Turns every `(...)` span into `[...]`, anywhere in the text.
pub struct BracketNormalizer {
    pattern: Regex,
}

impl BracketNormalizer {
    pub fn new() -> Result<Self> {
        let pattern =
            Regex::new(r"\(([^)]+)\)").context("failed to compile parenthesis list regex")?;
        Ok(Self { pattern })
    }

    pub fn normalize(&self, content: &str) -> (String, usize) {
        let rewritten = self.pattern.find_iter(content).count();
        let normalized = self.pattern.replace_all(content, "[$1]").into_owned();
        (normalized, rewritten)
    }
}
