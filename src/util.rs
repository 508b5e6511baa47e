//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces `{key}` in the template with the provided values in a single pass,
/// so substituted text (e.g. a user's answer) is never expanded again.
/// Unknown placeholders are left as-is.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(start) = rest.find('{') {
    out.push_str(&rest[..start]);
    let after = &rest[start + 1..];
    let replaced = after.find('}').and_then(|end| {
      let key = &after[..end];
      pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, end))
    });
    match replaced {
      Some((value, end)) => {
        out.push_str(value);
        rest = &after[end + 1..];
      }
      None => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

/// Cut `s` to at most `max` chars, appending `...` when something was dropped.
pub fn truncate_chars(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    Some((idx, _)) => format!("{}...", &s[..idx]),
    None => s.to_string(),
  }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge backend replies.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    Some((idx, _)) => format!("{}… ({} bytes total)", &s[..idx], s.len()),
    None => s.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_single_pass() {
    let out = fill_template(
      "Q: {question} / A: {answer} / U: {user_answer} / {other}",
      &[("question", "2+2?"), ("answer", "4"), ("user_answer", "{answer}")],
    );
    assert_eq!(out, "Q: 2+2? / A: 4 / U: {answer} / {other}");
  }

  #[test]
  fn fill_template_handles_stray_braces() {
    assert_eq!(fill_template("a { b } {x", &[("x", "1")]), "a { b } {x");
    assert_eq!(fill_template("{x}{x}", &[("x", "1")]), "11");
  }

  #[test]
  fn truncate_chars_respects_char_boundaries() {
    assert_eq!(truncate_chars("short", 300), "short");
    assert_eq!(truncate_chars("abcdef", 3), "abc...");
    assert_eq!(truncate_chars("ééééé", 2), "éé...");
    let exact = "x".repeat(300);
    assert_eq!(truncate_chars(&exact, 300), exact);
  }

  #[test]
  fn trunc_for_log_reports_size() {
    assert_eq!(trunc_for_log("abcdef", 2), "ab… (6 bytes total)");
  }
}
