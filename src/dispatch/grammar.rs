use crate::ast::{AstNode, FieldValue, Finder};
use crate::config::DispatcherConfig;
use crate::dispatch::describe::{DescribeContext, Vocabulary};
use crate::dispatch::{resolve_search_priority, DispatchError, Dispatcher, ParseError, ParseResult};
use crate::pool::with_parser;
use crate::ts::{parse_snippet, resolve_language, SnippetTree};
use ast_grep_language::SupportLang;
use std::rc::Rc;
use tracing::{debug, trace};

/// Dispatcher backed by a tree-sitter grammar from `ast-grep-language`.
pub struct TreeSitterDispatcher {
    lang: SupportLang,
    config: DispatcherConfig,
    vocabulary: Vocabulary,
}

impl TreeSitterDispatcher {
    /// Build a dispatcher from a validated configuration.
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        let lang = resolve_language(&config.language)?;
        let vocabulary = Vocabulary::new(config.node_names.clone(), config.field_names.clone());
        Ok(Self {
            lang,
            config,
            vocabulary,
        })
    }

    /// Dispatcher with the built-in configuration for `language`.
    pub fn for_language(language: &str) -> Result<Self, DispatchError> {
        Self::new(DispatcherConfig::for_language(language))
    }

    pub fn language(&self) -> SupportLang {
        self.lang
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    fn parse_program(&self, code: &str) -> Result<ParseResult, DispatchError> {
        let result = with_parser(self.lang, |parser| {
            parser.parse_with_source(code).map(|parsed| match parsed.first_error() {
                Some(span) => Err(ParseError { span: Some(span) }),
                None => Ok(Rc::new(parsed.lower())),
            })
        })??;
        if let Err(err) = &result {
            debug!(language = ?self.lang, %err, "code did not parse");
        }
        Ok(result)
    }

    fn parse_rule(&self, code: &str, rule_name: &str) -> Result<ParseResult, DispatchError> {
        let rule = self
            .config
            .start_rules
            .get(rule_name)
            .ok_or_else(|| DispatchError::UnknownStartRule {
                rule: rule_name.to_string(),
            })?;
        let snippet = with_parser(self.lang, |parser| {
            parse_snippet(parser, rule_name, rule, code)
        })??;
        Ok(match snippet {
            SnippetTree::Parsed(node) => Ok(node),
            SnippetTree::Invalid(span) => {
                debug!(rule = rule_name, "snippet did not parse");
                Err(ParseError { span: Some(span) })
            }
        })
    }
}

impl Dispatcher for TreeSitterDispatcher {
    fn parse(&self, code: &str, start: Option<&str>) -> Result<ParseResult, DispatchError> {
        match start {
            None => self.parse_program(code),
            Some(rule) => self.parse_rule(code, rule),
        }
    }

    fn select(&self, kind: &str, tree: &FieldValue, priority: Option<u32>) -> Vec<Rc<AstNode>> {
        let priority = resolve_search_priority(priority, self.config.priority_of(kind));
        trace!(kind, priority, "select");
        Finder::new(kind, priority, |k| self.config.priority_of(k)).find_all(tree)
    }

    fn describe(
        &self,
        node: Option<&AstNode>,
        template: &str,
        ctx: &DescribeContext<'_>,
    ) -> Option<String> {
        self.vocabulary.describe(node, template, ctx)
    }
}
