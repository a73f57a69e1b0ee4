//! Word-family index: decides whether two claimed words are "the same word" for steal
//! purposes (MILE↔MILES, CLAP↔CLAPPING, WALK↔WALKED, HAPPY↔UNHAPPY) as opposed to merely
//! sharing letters (MILE↔SMILE, OUGHT↔THOUGHT, EIGHT↔WEIGHT).
//!
//! `family_signatures` expands a word with recognized prefix/suffix strippings and light
//! morphological fixups, stems every candidate with a Porter-style stemmer, and returns the
//! set of resulting stems. `overlap` is then just a set intersection.
use std::collections::HashSet;

const PREFIXES: &[&str] = &[
    "UN", "RE", "DIS", "MIS", "NON", "OVER", "UNDER", "PRE", "SUB", "INTER", "FORE", "TRANS",
    "SEMI", "ANTI", "MID",
];

const SUFFIXES: &[&str] = &[
    "NESS", "MENT", "ABLE", "IES", "ING", "EST", "ED", "ER", "LY", "IC", "AL", "ES", "S", "Y",
];

/// Every distinct stem (length ≥ 2) reachable from `word` by stripping a recognized affix and
/// stemming, plus stemming `word` itself unmodified.
pub fn family_signatures(word: &str) -> HashSet<String> {
    let word = word.to_ascii_uppercase();
    let mut candidates: HashSet<String> = HashSet::new();
    candidates.insert(word.clone());

    for prefix in PREFIXES {
        if let Some(rest) = word.strip_prefix(prefix) {
            if rest.len() >= MIN_STEM_INPUT {
                candidates.insert(rest.to_string());
            }
        }
    }

    // Suffixes are tried longest-first so e.g. "IES" is preferred over "S" for "FLIES".
    let mut suffixes: Vec<&str> = SUFFIXES.to_vec();
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for suffix in suffixes {
        if let Some(rest) = word.strip_suffix(suffix) {
            if rest.len() < MIN_STEM_INPUT {
                continue;
            }
            candidates.insert(rest.to_string());
            for fixed in morphological_fixups(rest, suffix) {
                candidates.insert(fixed);
            }
        }
    }

    candidates
        .into_iter()
        .map(|c| porter_stem(&c))
        .filter(|s| s.len() >= 2)
        .collect()
}

pub fn overlap(a: &str, b: &str) -> bool {
    !family_signatures(a).is_disjoint(&family_signatures(b))
}

const MIN_STEM_INPUT: usize = 2;

/// Light morphological cleanup applied to the stem left behind after removing a
/// `-ED`/`-ING`/`-ER`/`-EST`/`-Y` suffix: undo doubled-consonant gemination
/// (`CLAPP` -> `CLAP`), restore a silent `E` for a CVC remainder (`RAT` -> `RATE`), and
/// swap a terminal `I` back to `Y` (`HAPPI` -> `HAPPY`).
fn morphological_fixups(stem: &str, suffix: &str) -> Vec<String> {
    let mut out = Vec::new();
    let bytes = stem.as_bytes();

    if matches!(suffix, "ED" | "ING" | "ER" | "EST") {
        if bytes.len() >= 2 && bytes[bytes.len() - 1] == bytes[bytes.len() - 2] {
            out.push(stem[..stem.len() - 1].to_string());
        }
        if ends_cvc(stem) {
            out.push(format!("{stem}E"));
        }
    }

    if bytes.last() == Some(&b'I') {
        out.push(format!("{}Y", &stem[..stem.len() - 1]));
    }

    out
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'A' | b'E' | b'I' | b'O' | b'U')
}

/// consonant-vowel-consonant, with the final consonant not W, X or Y — the classic Porter
/// "CVC" predicate used to decide whether a silent E belongs back on a stem.
fn ends_cvc(stem: &str) -> bool {
    let b = stem.as_bytes();
    if b.len() < 3 {
        return false;
    }
    let (x, y, z) = (b[b.len() - 3], b[b.len() - 2], b[b.len() - 1]);
    !is_vowel(x) && is_vowel(y) && !is_vowel(z) && !matches!(z, b'W' | b'X' | b'Y')
}

// ---------------------------------------------------------------------------------------------
// Porter stemmer (Porter, 1980). A direct, compact port; see
// https://tartarus.org/martin/PorterStemmer/def.txt for the reference algorithm this follows.
// ---------------------------------------------------------------------------------------------

fn is_consonant(chars: &[u8], i: usize) -> bool {
    match chars[i] {
        b'A' | b'E' | b'I' | b'O' | b'U' => false,
        b'Y' => {
            if i == 0 {
                true
            } else {
                !is_consonant(chars, i - 1)
            }
        }
        _ => true,
    }
}

/// The "measure" `m` of a stem: the number of consonant-sequence/vowel-sequence pairs.
fn measure(chars: &[u8]) -> usize {
    let mut m = 0;
    let mut i = 0;
    // skip leading consonant sequence
    while i < chars.len() && is_consonant(chars, i) {
        i += 1;
    }
    while i < chars.len() {
        // vowel sequence
        while i < chars.len() && !is_consonant(chars, i) {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        // consonant sequence
        while i < chars.len() && is_consonant(chars, i) {
            i += 1;
        }
        m += 1;
    }
    m
}

fn contains_vowel(chars: &[u8]) -> bool {
    (0..chars.len()).any(|i| !is_consonant(chars, i))
}

fn ends_double_consonant(chars: &[u8]) -> bool {
    let n = chars.len();
    n >= 2 && chars[n - 1] == chars[n - 2] && is_consonant(chars, n - 1)
}

fn replace_suffix(word: &str, suffix: &str, replacement: &str) -> Option<String> {
    word.strip_suffix(suffix)
        .map(|stem| format!("{stem}{replacement}"))
}

fn stem_measure_at_least(word: &str, suffix: &str, min_m: usize) -> Option<String> {
    let stem = word.strip_suffix(suffix)?;
    (measure(stem.as_bytes()) >= min_m).then(|| stem.to_string())
}

/// Porter stemmer step 1: plurals and -ed/-ing.
fn step1(word: &str) -> String {
    // 1a
    let mut w = if let Some(s) = replace_suffix(word, "SSES", "SS") {
        s
    } else if let Some(s) = replace_suffix(word, "IES", "I") {
        s
    } else if word.ends_with("SS") {
        word.to_string()
    } else if let Some(s) = word.strip_suffix('S') {
        s.to_string()
    } else {
        word.to_string()
    };

    // 1b
    let mut did_ed_or_ing = false;
    if let Some(stem) = stem_measure_at_least(&w, "EED", 1) {
        w = format!("{stem}EE");
    } else {
        let after_ed = w.strip_suffix("ED").filter(|s| contains_vowel(s.as_bytes()));
        let after_ing = w.strip_suffix("ING").filter(|s| contains_vowel(s.as_bytes()));
        if let Some(stem) = after_ed.or(after_ing) {
            w = stem.to_string();
            did_ed_or_ing = true;
        }
    }

    if did_ed_or_ing {
        let bytes = w.as_bytes();
        if w.ends_with("AT") || w.ends_with("BL") || w.ends_with("IZ") {
            w.push('E');
        } else if ends_double_consonant(bytes) && !w.ends_with('L') && !w.ends_with('S') && !w.ends_with('Z') {
            w.truncate(w.len() - 1);
        } else if measure(bytes) == 1 && ends_cvc(&w) {
            w.push('E');
        }
    }

    // 1c
    if let Some(stem) = w.strip_suffix('Y') {
        if contains_vowel(stem.as_bytes()) {
            w = format!("{stem}I");
        }
    }

    w
}

/// Porter stemmer step 2: double-suffix reductions (`-ATIONAL` -> `-ATE`, etc.), gated on m > 0.
fn step2(word: &str) -> String {
    const PAIRS: &[(&str, &str)] = &[
        ("ATIONAL", "ATE"),
        ("TIONAL", "TION"),
        ("ENCI", "ENCE"),
        ("ANCI", "ANCE"),
        ("IZER", "IZE"),
        ("ABLI", "ABLE"),
        ("ALLI", "AL"),
        ("ENTLI", "ENT"),
        ("ELI", "E"),
        ("OUSLI", "OUS"),
        ("IZATION", "IZE"),
        ("ATION", "ATE"),
        ("ATOR", "ATE"),
        ("ALISM", "AL"),
        ("IVENESS", "IVE"),
        ("FULNESS", "FUL"),
        ("OUSNESS", "OUS"),
        ("ALITI", "AL"),
        ("IVITI", "IVE"),
        ("BILITI", "BLE"),
    ];
    for &(suffix, replacement) in PAIRS {
        if let Some(stem) = stem_measure_at_least(word, suffix, 1) {
            return format!("{stem}{replacement}");
        }
    }
    word.to_string()
}

/// Porter stemmer step 3: further suffix reductions, gated on m > 0.
fn step3(word: &str) -> String {
    const PAIRS: &[(&str, &str)] = &[
        ("ICATE", "IC"),
        ("ATIVE", ""),
        ("ALIZE", "AL"),
        ("ICITI", "IC"),
        ("ICAL", "IC"),
        ("FUL", ""),
        ("NESS", ""),
    ];
    for &(suffix, replacement) in PAIRS {
        if let Some(stem) = stem_measure_at_least(word, suffix, 1) {
            return format!("{stem}{replacement}");
        }
    }
    word.to_string()
}

/// Porter stemmer step 4: drop a final suffix outright once m > 1.
fn step4(word: &str) -> String {
    const SUFFIXES: &[&str] = &[
        "AL", "ANCE", "ENCE", "ER", "IC", "ABLE", "IBLE", "ANT", "EMENT", "MENT", "ENT", "OU",
        "ISM", "ATE", "ITI", "OUS", "IVE", "IZE",
    ];
    if let Some(stem) = word.strip_suffix("ION") {
        if (stem.ends_with('S') || stem.ends_with('T')) && measure(stem.as_bytes()) > 1 {
            return stem.to_string();
        }
    }
    for suffix in SUFFIXES {
        if let Some(stem) = stem_measure_at_least(word, suffix, 2) {
            return stem;
        }
    }
    word.to_string()
}

/// Porter stemmer step 5: trailing `E` and a final doubled `L`, gated on measure.
fn step5(word: &str) -> String {
    let mut w = word.to_string();
    if let Some(stem) = w.strip_suffix('E') {
        let m = measure(stem.as_bytes());
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            w = stem.to_string();
        }
    }
    let bytes = w.as_bytes();
    if w.ends_with("LL") && measure(bytes) > 1 {
        w.truncate(w.len() - 1);
    }
    w
}

/// Stem a single uppercase word with the Porter algorithm. Words shorter than 3 letters are
/// returned unchanged — the algorithm's measure-based rules aren't meaningful below that.
pub fn porter_stem(word: &str) -> String {
    let word = word.to_ascii_uppercase();
    if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_alphabetic()) {
        return word;
    }
    let w = step1(&word);
    let w = step2(&w);
    let w = step3(&w);
    let w = step4(&w);
    step5(&w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_contract_positive_cases() {
        assert!(overlap("MILE", "MILES"), "MILE/MILES should overlap");
        assert!(overlap("CLAP", "CLAPPING"), "CLAP/CLAPPING should overlap");
        assert!(overlap("WALK", "WALKED"), "WALK/WALKED should overlap");
        assert!(overlap("HAPPY", "UNHAPPY"), "HAPPY/UNHAPPY should overlap");
    }

    #[test]
    fn overlap_contract_negative_cases() {
        assert!(!overlap("MILE", "SMILE"), "MILE/SMILE should not overlap");
        assert!(!overlap("OUGHT", "THOUGHT"), "OUGHT/THOUGHT should not overlap");
        assert!(!overlap("EIGHT", "WEIGHT"), "EIGHT/WEIGHT should not overlap");
    }

    #[test]
    fn porter_stem_is_deterministic() {
        assert_eq!(porter_stem("RUNNING"), porter_stem("RUNNING"));
    }
}
