use std::collections::HashMap;

use crate::catalog::Condition;

/// Combine per-rule outcomes into a single presence decision.
///
/// The starting value is "any rule matched". A `required` list with more than
/// one entry is then AND-folded into it, and afterwards an `optional` list with
/// more than one entry is OR-folded into whatever that produced. Lists of zero
/// or one entry are ignored, so a lone required rule never narrows the result.
/// Rule names missing from `outcomes` count as `false`.
pub fn evaluate(condition: &Condition, outcomes: &HashMap<String, bool>) -> bool {
    let outcome = |name: &String| outcomes.get(name).copied().unwrap_or(false);

    // `None` until some outcome is known to be true
    let mut state: Option<bool> = outcomes.values().any(|v| *v).then_some(true);

    if condition.required.len() > 1 {
        for key in &condition.required {
            state = Some(match state {
                None => outcome(key),
                Some(acc) => acc && outcome(key),
            });
        }
    }

    if condition.optional.len() > 1 {
        for key in &condition.optional {
            state = Some(match state {
                None => outcome(key),
                Some(acc) => acc || outcome(key),
            });
        }
    }

    state.unwrap_or(false)
}
