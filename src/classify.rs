//! Prompt intent heuristic
//!
//! Decides whether a prompt reads like a coding request. The check is a
//! pure function of the text: a prompt is CODE as soon as one signal
//! matches, CHAT otherwise. Ambiguous prompts can be misrouted; callers
//! that care pass an explicit provider or model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent
{   Code
  , Chat
}

impl Intent
{   /// Provider that serves this intent under auto-detection.
    pub fn provider(self) -> crate::Provider
    {   match self
        {   Intent::Code => crate::Provider::Codestral
          , Intent::Chat => crate::Provider::Mistral
        }
    }
}

/// What made a prompt look like code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSignal
{   Language
  , Keyword
  , Syntax
}

static LANGUAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
  compile_patterns(&[
    r"(?i)\b(python|javascript|typescript|java|rust|golang|kotlin|swift|ruby|php|perl|scala|haskell|elixir|erlang|clojure|lua|dart|julia|fortran|cobol|matlab|csharp|sql|bash|powershell|html|css|jsx|tsx|react|node\.?js|django|flask)\b",
    r"(?i)(^|[^\w+#])(c\+\+|c#|f#)($|[^\w+#])",
  ])
});

static KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
  compile_patterns(&[
    r"(?i)\b(functions?|class(es)?|algorithms?|implement\w*)\b",
    r"(?i)\b(code|coding|snippet|refactor\w*|debug\w*|compil(e|er|ing|ation)|regex|unit tests?|data structures?|api endpoints?)\b",
  ])
});

static SYNTAX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
  compile_patterns(&[
    // Braces, arrows and call sites
    r"[{}]",
    r"=>|->|::|!=|==",
    r"[A-Za-z_]\w*\(",
    // Statement starters at the beginning of a line
    r"(?m)^\s*(def|fn|func|function|class|import|from|const|let|var|pub|public|private|return|#include|package|struct|impl)\s",
    // Fenced or indented blocks, trailing semicolons
    r"```",
    r"(?m)^( {2,}|\t)\S",
    r"(?m);\s*$",
  ])
});

fn compile_patterns(patterns: &[&str]) -> Vec<Regex>
{   patterns
      .iter()
      .filter_map(|p| Regex::new(p).ok())
      .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool
{   patterns.iter().any(|re| re.is_match(text))
}

/// First code signal found in `prompt`, if any.
pub fn code_signal(prompt: &str) -> Option<CodeSignal>
{   if any_match(&LANGUAGE_PATTERNS, prompt)
    {   Some(CodeSignal::Language)
    } else if any_match(&KEYWORD_PATTERNS, prompt)
    {   Some(CodeSignal::Keyword)
    } else if any_match(&SYNTAX_PATTERNS, prompt)
    {   Some(CodeSignal::Syntax)
    } else
    {   None
    }
}

pub fn classify(prompt: &str) -> Intent
{   match code_signal(prompt)
    {   Some(_) => Intent::Code
      , None => Intent::Chat
    }
}
