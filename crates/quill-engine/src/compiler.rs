//! Prompt Compiler: history, one-time file context, and the new
//! instruction folded into a single payload.
//!
//! Layout once the session has history:
//!
//! ```text
//! User: <prompt 1>
//! AI: <response 1>
//!
//! User: <prompt 2>
//! AI: <response 2>
//! ---
//! <context block, first compilation only>
//!
//! User: <new prompt>
//! ```
//!
//! With no history the new prompt is sent bare, preceded only by the
//! context block if this is the compilation that includes it.

use quill_core::LoadError;
use tracing::debug;

use crate::context::ContextSource;
use crate::memory::SessionMemory;

const CONTEXT_DELIMITER: &str = "\n---\n";

enum ContextState {
    /// A source is configured but has not been read.
    Pending(Box<dyn ContextSource>),
    /// Context was read (or there was none); never read again.
    Included,
}

pub struct PromptCompiler {
    context: ContextState,
    loads: usize,
}

impl PromptCompiler {
    pub fn new(context: Option<Box<dyn ContextSource>>) -> Self {
        Self {
            context: context.map_or(ContextState::Included, ContextState::Pending),
            loads: 0,
        }
    }

    /// Whether file context has been consumed.
    pub fn context_included(&self) -> bool {
        matches!(self.context, ContextState::Included)
    }

    /// How many times the context source has been read.
    pub fn context_loads(&self) -> usize {
        self.loads
    }

    /// Compile `prompt` against `memory`.
    ///
    /// The first call reads the context source, if any. A load failure is
    /// returned and the source is not retried.
    pub fn compile(&mut self, memory: &SessionMemory, prompt: &str) -> Result<String, LoadError> {
        let context_block = self.take_context()?;

        let mut out = memory
            .all()
            .iter()
            .map(|e| format!("User: {}\nAI: {}", e.prompt, e.response_text()))
            .collect::<Vec<_>>()
            .join("\n\n");

        if let Some(block) = context_block {
            out.push_str(CONTEXT_DELIMITER);
            out.push_str(&block);
        }

        if !memory.is_empty() {
            out.push_str("\n\nUser: ");
            out.push_str(prompt);
        } else if out.is_empty() {
            out.push_str(prompt);
        } else {
            out.push_str("\n\n");
            out.push_str(prompt);
        }
        Ok(out)
    }

    fn take_context(&mut self) -> Result<Option<String>, LoadError> {
        let ContextState::Pending(source) =
            std::mem::replace(&mut self.context, ContextState::Included)
        else {
            return Ok(None);
        };

        self.loads += 1;
        let map = source.load()?;
        let rendered = map.render();
        debug!(files = map.len(), context = ?rendered, "including file context");
        Ok((!map.is_empty()).then_some(rendered))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use quill_llm::GenerateContentResponse;

    use super::*;
    use crate::context::ContextMap;
    use crate::memory::Exchange;

    struct StaticContext {
        map: ContextMap,
        loads: Arc<AtomicUsize>,
    }

    impl ContextSource for StaticContext {
        fn load(&self) -> Result<ContextMap, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.map.clone())
        }
    }

    struct FailingContext;

    impl ContextSource for FailingContext {
        fn load(&self) -> Result<ContextMap, LoadError> {
            Err(LoadError::List {
                path: PathBuf::from("gone"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    fn with_context(files: &[(&str, &str)]) -> (PromptCompiler, Arc<AtomicUsize>) {
        let mut map = ContextMap::default();
        for (path, content) in files {
            map.push(PathBuf::from(path), (*content).to_string());
        }
        let loads = Arc::new(AtomicUsize::new(0));
        let source = StaticContext {
            map,
            loads: loads.clone(),
        };
        (PromptCompiler::new(Some(Box::new(source))), loads)
    }

    fn memory_of(pairs: &[(&str, &str)]) -> SessionMemory {
        let mut memory = SessionMemory::new();
        for (prompt, response) in pairs {
            memory.append(Exchange::new(
                *prompt,
                GenerateContentResponse::from_text(*response),
            ));
        }
        memory
    }

    #[test]
    fn first_prompt_without_context_is_bare() {
        let mut compiler = PromptCompiler::new(None);
        let out = compiler.compile(&SessionMemory::new(), "draft an intro").unwrap();
        assert_eq!(out, "draft an intro");
    }

    #[test]
    fn history_rendered_in_order_then_prompt() {
        let mut compiler = PromptCompiler::new(None);
        let memory = memory_of(&[("one", "1"), ("two", "2")]);
        let out = compiler.compile(&memory, "three").unwrap();
        assert_eq!(out, "User: one\nAI: 1\n\nUser: two\nAI: 2\n\nUser: three");
    }

    #[test]
    fn missing_candidate_renders_empty_response() {
        let mut compiler = PromptCompiler::new(None);
        let mut memory = SessionMemory::new();
        memory.append(Exchange::new("q", GenerateContentResponse::default()));
        let out = compiler.compile(&memory, "again").unwrap();
        assert_eq!(out, "User: q\nAI: \n\nUser: again");
    }

    #[test]
    fn context_included_once_after_history() {
        let (mut compiler, loads) = with_context(&[("notes.md", "facts")]);
        let memory = memory_of(&[("one", "1")]);

        let first = compiler.compile(&memory, "two").unwrap();
        assert_eq!(
            first,
            "User: one\nAI: 1\n---\n--- notes.md ---\nfacts\n\nUser: two"
        );
        assert!(compiler.context_included());

        let second = compiler.compile(&memory, "three").unwrap();
        assert_eq!(second, "User: one\nAI: 1\n\nUser: three");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn context_on_first_turn_precedes_bare_prompt() {
        let (mut compiler, _) = with_context(&[("a.txt", "ay")]);
        let out = compiler.compile(&SessionMemory::new(), "go").unwrap();
        assert_eq!(out, "\n---\n--- a.txt ---\nay\n\ngo");
    }

    #[test]
    fn context_loaded_once_across_turns() {
        let (mut compiler, loads) = with_context(&[("a.txt", "ay")]);
        let mut memory = SessionMemory::new();
        for turn in 0..4 {
            let prompt = format!("turn {turn}");
            let _ = compiler.compile(&memory, &prompt).unwrap();
            memory.append(Exchange::new(prompt, GenerateContentResponse::from_text("ok")));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(compiler.context_loads(), 1);
    }

    #[test]
    fn empty_context_adds_nothing() {
        let (mut compiler, _) = with_context(&[]);
        let out = compiler.compile(&SessionMemory::new(), "go").unwrap();
        assert_eq!(out, "go");
        assert!(compiler.context_included());
    }

    #[test]
    fn load_failure_propagates_and_is_not_retried() {
        let mut compiler = PromptCompiler::new(Some(Box::new(FailingContext)));
        let err = compiler.compile(&SessionMemory::new(), "go").unwrap_err();
        assert_matches!(err, LoadError::List { .. });
        assert_eq!(compiler.compile(&SessionMemory::new(), "go").unwrap(), "go");
        assert_eq!(compiler.context_loads(), 1);
    }
}
