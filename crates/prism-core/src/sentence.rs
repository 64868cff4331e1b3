//! Sentence composition helpers shared by insight narration and rankings
//!
//! Phrase lists are rendered "A, B and C": only the final `", "` separator is
//! replaced with `" and "`, never an Oxford comma.

use crate::table::Value;

/// Replace the last `", "` of an already-joined phrase list with `" and "`
pub fn and_join(joined: &str) -> String {
    match joined.rsplit_once(", ") {
        Some((head, last)) => format!("{} and {}", head, last),
        None => joined.to_string(),
    }
}

/// Join phrases with `", "` then render the final separator as `" and "`
pub fn compose<S: AsRef<str>>(phrases: &[S]) -> String {
    let joined = phrases
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    and_join(&joined)
}

/// Scope clause: `present` + composed phrases, or `absent` when there are none
pub fn scoped<S: AsRef<str>>(phrases: &[S], present: &str, absent: &str) -> String {
    if phrases.is_empty() {
        absent.to_string()
    } else {
        format!("{}{}", present, compose(phrases))
    }
}

/// `" when A and B"` or `" in all data"`
pub fn when_clause<S: AsRef<str>>(phrases: &[S]) -> String {
    scoped(phrases, " when ", " in all data")
}

/// Round to two decimals, exact halves to the even neighbour
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Sentence form of a number: integers verbatim, floats to two decimals
pub fn format_number(value: &Value) -> String {
    match value {
        Value::Float(f) => format_f64(*f),
        other => other.to_string(),
    }
}

pub fn format_f64(x: f64) -> String {
    Value::Float(round2(x)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_three_phrases() {
        assert_eq!(
            compose(&["A is 1", "B is 2", "C is 3"]),
            "A is 1, B is 2 and C is 3"
        );
    }

    #[test]
    fn test_compose_single_and_empty() {
        assert_eq!(compose(&["A is 1"]), "A is 1");
        assert_eq!(compose::<&str>(&[]), "");
    }

    #[test]
    fn test_and_join_two() {
        assert_eq!(and_join("BMW, Ford"), "BMW and Ford");
        assert_eq!(and_join("BMW"), "BMW");
    }

    #[test]
    fn test_when_clause() {
        assert_eq!(when_clause(&["Year is 2012"]), " when Year is 2012");
        assert_eq!(when_clause::<String>(&[]), " in all data");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(&Value::Int(450)), "450");
        assert_eq!(format_number(&Value::Float(0.34567)), "0.35");
        assert_eq!(format_number(&Value::Float(2.0)), "2.0");
        assert_eq!(format_f64(-0.731), "-0.73");
    }

    #[test]
    fn test_round2_halves_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.875), 0.88);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(0.126), 0.13);
    }
}
