use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("unsupported language: {name}")]
    UnknownLanguage { name: String },

    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("parser produced no tree")]
    ParseFailed,

    #[error("start rule '{rule}' produced no {kind} node")]
    StartRuleNoMatch { rule: String, kind: String },

    #[error("start rule '{rule}': {kind} node has no field '{field}'")]
    StartRuleMissingField {
        rule: String,
        kind: String,
        field: String,
    },
}
