//! Thread-local parser pooling.
//!
//! Creating a tree-sitter parser and loading its grammar is not free, and a
//! check run parses the student code, the solution code and every snippet.
//! Parsers are kept per thread and per language and reused across calls.

use crate::ts::{LanguageParser, TreeSitterError};
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<SupportLang, LanguageParser>> = RefCell::new(HashMap::new());
}

/// Execute function with pooled parser instance for `lang`.
///
/// On first call per thread and language, creates a new parser. Subsequent
/// calls reuse the same instance.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sct_focus::pool::with_parser;
/// use sct_focus::ts::resolve_language;
///
/// let lang = resolve_language("rust")?;
/// let root = with_parser(lang, |parser| {
///     parser.parse_with_source("fn main() {}").map(|parsed| parsed.lower())
/// })??;
/// assert_eq!(root.kind, "source_file");
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(lang: SupportLang, f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut LanguageParser) -> R,
{
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(lang) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(LanguageParser::new(lang)?),
        };
        Ok(f(parser))
    })
}

/// Number of parsers pooled on this thread.
pub fn pooled_count() -> usize {
    PARSERS.with(|cell| cell.borrow().len())
}
