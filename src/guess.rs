//! Guess-the-prompt evaluation: similarity prompt and reply parsing.
//!
//! Expected reply shape: `Similarity: <tier>. Explanation: <text>`.
//! Anything that does not match yields tier `unknown` with the raw reply.

use crate::config::Prompts;
use crate::domain::{ContentKind, GameContentItem, SimilarityTier};
use crate::util::{fill_template, truncate_chars};

pub const CONTEXT_MAX_CHARS: usize = 300;
const SIMILARITY_PREFIX: &str = "Similarity:";
const EXPLANATION_DELIMITER: &str = ". Explanation:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
  pub tier: SimilarityTier,
  pub explanation: String,
}

/// Output text as embedded in the prompt; long text output is cut to bound prompt size.
pub fn output_context(item: &GameContentItem) -> String {
  match item.kind {
    ContentKind::Text => truncate_chars(&item.output, CONTEXT_MAX_CHARS),
  }
}

pub fn build_similarity_prompt(prompts: &Prompts, item: &GameContentItem, user_guess: &str) -> String {
  let context = output_context(item);
  fill_template(
    &prompts.similarity_template,
    &[
      ("kind", item.kind.as_str()),
      ("context", context.as_str()),
      ("original_prompt", item.original_prompt.as_str()),
      ("user_guess", user_guess),
    ],
  )
}

pub fn parse_similarity(raw: &str) -> Evaluation {
  let reply = raw.trim();
  let unknown = || Evaluation { tier: SimilarityTier::Unknown, explanation: reply.to_string() };

  let Some(rest) = reply.strip_prefix(SIMILARITY_PREFIX) else {
    return unknown();
  };
  let Some((tier, explanation)) = rest.split_once(EXPLANATION_DELIMITER) else {
    return unknown();
  };
  match SimilarityTier::from_label(tier.trim()) {
    Some(tier) => Evaluation { tier, explanation: explanation.trim().to_string() },
    None => unknown(),
  }
}

/// Result used when the backend call failed.
pub fn failed_evaluation() -> Evaluation {
  Evaluation {
    tier: SimilarityTier::Unknown,
    explanation: "Could not get evaluation from AI.".into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(output: &str) -> GameContentItem {
    GameContentItem {
      id: "g1".into(),
      kind: ContentKind::Text,
      original_prompt: "Write a short poem about a robot learning to dream.".into(),
      output: output.into(),
    }
  }

  #[test]
  fn parses_each_recognised_tier() {
    let cases = [
      ("Similarity: Very Similar. Explanation: Same subject and form.", SimilarityTier::VerySimilar),
      ("Similarity: Somewhat Similar. Explanation: Right topic, wrong form.", SimilarityTier::SomewhatSimilar),
      ("Similarity: Not Similar. Explanation: Unrelated.", SimilarityTier::NotSimilar),
    ];
    for (raw, tier) in cases {
      let e = parse_similarity(raw);
      assert_eq!(e.tier, tier);
      assert!(!e.explanation.starts_with(' '));
      assert!(!e.explanation.contains("Explanation:"));
    }
  }

  #[test]
  fn unrecognised_tier_surfaces_raw_reply() {
    let raw = "Similarity: Quite Close. Explanation: Mostly there.";
    let e = parse_similarity(raw);
    assert_eq!(e.tier, SimilarityTier::Unknown);
    assert_eq!(e.explanation, raw);
  }

  #[test]
  fn missing_prefix_or_delimiter_is_unknown() {
    for raw in [
      "Very Similar. Explanation: good",
      "Similarity: Very Similar - good guess",
      "I think it is very similar.",
    ] {
      let e = parse_similarity(raw);
      assert_eq!(e.tier, SimilarityTier::Unknown);
      assert_eq!(e.explanation, raw);
    }
  }

  #[test]
  fn long_output_is_truncated_in_prompt() {
    let long = "x".repeat(500);
    let ctx = output_context(&item(&long));
    assert_eq!(ctx.chars().count(), CONTEXT_MAX_CHARS + 3);
    assert!(ctx.ends_with("..."));

    let p = build_similarity_prompt(&Prompts::default(), &item(&long), "a robot poem");
    assert!(p.contains("AI Output Context (text):"));
    assert!(p.contains("Original Prompt: Write a short poem"));
    assert!(p.contains("User's Guessed Prompt: a robot poem"));
    assert!(!p.contains(&"x".repeat(301)));
  }

  #[test]
  fn short_output_is_kept_whole() {
    assert_eq!(output_context(&item("Steel gears turn soft tonight")), "Steel gears turn soft tonight");
  }
}
