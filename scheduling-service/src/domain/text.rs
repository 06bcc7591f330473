//! Canonicalizes operator-entered role and shift names so that config and
//! worker profiles compare equal regardless of bidi marks or quote style
//! picked up from mixed-script (Hebrew/English) editing environments.

const LRM: char = '\u{200e}';
const RLM: char = '\u{200f}';
const NBSP: char = '\u{a0}';

/// Strips left-to-right/right-to-left marks, turns NBSP into a plain
/// space, unifies the ASCII double quote to an apostrophe, and trims.
///
/// Idempotent: `norm(norm(s)) == norm(s)`.
pub fn norm(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            LRM | RLM => {}
            NBSP => out.push(' '),
            '"' => out.push('\''),
            other => out.push(other),
        }
    }
    out.trim().to_string()
}

/// Tests whether a shift's canonical name marks it as a night shift.
pub fn is_night_shift(name: &str) -> bool {
    let n = norm(name).to_lowercase();
    n == "22-06" || (n.contains("22") && n.contains("06")) || n.contains("night") || n.contains("לילה")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bidi_marks_and_nbsp() {
        let raw = format!("{LRM}Guard{RLM}{NBSP}A");
        assert_eq!(norm(&raw), "Guard A");
    }

    #[test]
    fn unifies_quotes_and_trims() {
        assert_eq!(norm("  Site \"A\" Guard  "), "Site 'A' Guard");
    }

    #[test]
    fn is_idempotent() {
        let s = "\u{200e}  Night \u{a0}Guard\"  ";
        assert_eq!(norm(&norm(s)), norm(s));
    }

    #[test]
    fn night_shift_detection() {
        assert!(is_night_shift("22-06"));
        assert!(is_night_shift("Night Shift"));
        assert!(is_night_shift("לילה"));
        assert!(!is_night_shift("06-14"));
    }
}
