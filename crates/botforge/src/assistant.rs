//! Question rewriting and answer composition
//!
//! Both steps are one-shot prompts against a [`TextGenerator`]. Neither ever
//! fails: when the model is unavailable the caller gets a [`Generated::Fallback`]
//! built from its own input, so the query endpoint can always respond.

use crate::genai::TextGenerator;

/// Characters of context quoted by the fallback answer
pub const FALLBACK_CONTEXT_CHARS: usize = 200;

/// Output of a generation step, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated<T> {
  /// Produced by the model
  Model(T),
  /// Derived locally because the model call failed
  Fallback(T),
}

impl<T> Generated<T> {
  pub fn into_inner(self) -> T {
    match self {
      Generated::Model(value) | Generated::Fallback(value) => value,
    }
  }

  pub fn is_fallback(&self) -> bool {
    matches!(self, Generated::Fallback(_))
  }
}

fn rewrite_prompt(question: &str) -> String {
  format!(
    "Convert the following user question into a concise search query or keywords suitable for \
     semantic vector search in a dataset. Remove unnecessary words and focus on the main topic or \
     entities.\n\n\
     User question: {question}\n\n\
     Output only the search query, nothing else."
  )
}

fn answer_prompt(question: &str, context: &str) -> String {
  format!(
    "You are an expert data analyst. Given the following context retrieved from a vector search in \
     a dataset, answer the user's question in a formal, well-structured manner suitable for a \
     professional report.\n\n\
     Context from vector search:\n{context}\n\n\
     User question:\n{question}\n\n\
     Instructions:\n\
     - Use only the information in the context to answer the question.\n\
     - If the context is insufficient, state this clearly and suggest what additional data would be needed.\n\
     - Format your answer formally, using complete sentences and clear structure.\n\
     - Avoid speculation or informal language."
  )
}

/// Stub answer quoting the start of the retrieved context
pub fn fallback_answer(context: &str) -> String {
  let head: String = context.chars().take(FALLBACK_CONTEXT_CHARS).collect();
  format!("Based on the dataset, here are the relevant findings: {head}...")
}

/// Distill a question into a search query, or hand the question back
pub async fn rewrite(generator: &dyn TextGenerator, question: &str) -> Generated<String> {
  match generator.generate(&rewrite_prompt(question)).await {
    Ok(text) if !text.trim().is_empty() => Generated::Model(text.trim().to_string()),
    Ok(_) => {
      tracing::warn!("Search query rewrite came back empty, using the question as-is");
      Generated::Fallback(question.to_string())
    }
    Err(e) => {
      tracing::warn!("Failed to convert question to search query: {e}");
      Generated::Fallback(question.to_string())
    }
  }
}

/// Compose a formal answer strictly from the retrieved context
pub async fn answer(generator: &dyn TextGenerator, question: &str, context: &str) -> Generated<String> {
  match generator.generate(&answer_prompt(question, context)).await {
    Ok(text) => Generated::Model(text),
    Err(e) => {
      tracing::warn!("AI response generation failed: {e}");
      Generated::Fallback(fallback_answer(context))
    }
  }
}
