//! ccount: chart lines of code per language over a git repository's history.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module; the pipeline lives in the
//! library crate.

mod cli;
mod render;

fn main() {
    cli::run();
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
