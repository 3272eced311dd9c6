//! Parser for personal names as they appear in book exports.
//!
//! Names arrive in several conventions that all need to land on one author:
//! ```text
//! Jane Q. Doe
//! Doe, Jane Q.
//! Dr. Martin Luther King Jr. ("MLK")
//! King, Martin Luther, Jr.
//! ```
//!
//! The parser splits a name into title, first, middle, last, suffix and
//! nickname, and renders the parts back into a canonical full name that is
//! used as the author deduplication key.

/// Parsed components of a personal name. Absent parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HumanName {
    /// Honorifics before the name (e.g., "Dr.", "Sir").
    pub title: String,
    pub first: String,
    /// Everything between first and last, usually given names or initials.
    pub middle: String,
    /// Family name, including particles such as "van" or "Le".
    pub last: String,
    /// Generational or academic suffixes (e.g., "Jr.", "III", "PhD").
    pub suffix: String,
    /// Text that appeared in double quotes or parentheses.
    pub nickname: String,
}

impl HumanName {
    /// Canonical rendering: `title first middle last suffix (nickname)`.
    ///
    /// Empty parts are dropped, so two spellings of the same name in different
    /// conventions render identically.
    pub fn full_name(&self) -> String {
        let mut out = [
            self.title.as_str(),
            self.first.as_str(),
            self.middle.as_str(),
            self.last.as_str(),
            self.suffix.as_str(),
        ]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

        if !self.nickname.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('(');
            out.push_str(&self.nickname);
            out.push(')');
        }
        out
    }

    /// The middle name, or `None` when the name has none.
    pub fn middle_opt(&self) -> Option<String> {
        if self.middle.is_empty() {
            None
        } else {
            Some(self.middle.clone())
        }
    }
}

impl std::fmt::Display for HumanName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Parse a personal name in either "First Last" or "Last, First" order.
///
/// # Examples
///
/// ```
/// use book_manager_catalog::name_parser::parse_human_name;
///
/// let n = parse_human_name("Jane Q. Doe");
/// assert_eq!(n.first, "Jane");
/// assert_eq!(n.middle, "Q.");
/// assert_eq!(n.last, "Doe");
///
/// let n = parse_human_name("Doe, Jane Q.");
/// assert_eq!(n.full_name(), "Jane Q. Doe");
///
/// let n = parse_human_name("Ursula K. Le Guin");
/// assert_eq!(n.last, "Le Guin");
/// ```
pub fn parse_human_name(name: &str) -> HumanName {
    let mut result = HumanName::default();

    let (rest, nicknames) = extract_nicknames(name);
    result.nickname = nicknames.join(" ");

    let parts: Vec<Vec<&str>> = rest
        .split(',')
        .map(|p| p.split_whitespace().collect::<Vec<_>>())
        .filter(|words| !words.is_empty())
        .collect();

    match parts.len() {
        0 => {}
        1 => parse_pieces(&parts[0], &mut result),
        // "First Last, Jr.": the part after the comma is only suffixes
        2 if parts[1].iter().all(|w| is_suffix(w)) => {
            parse_pieces(&parts[0], &mut result);
            push_suffix(&mut result, &parts[1].join(" "));
        }
        _ => parse_last_first(&parts, &mut result),
    }

    result
}

// ── Internal parsing ────────────────────────────────────────────────────────

/// Remove `"quoted"` and `(parenthesized)` segments, returning the remaining
/// text and the removed segments in order.
fn extract_nicknames(name: &str) -> (String, Vec<String>) {
    let mut rest = String::with_capacity(name.len());
    let mut nicknames = Vec::new();
    let mut chars = name.chars();

    while let Some(ch) = chars.next() {
        let close = match ch {
            '"' => '"',
            '(' => ')',
            _ => {
                rest.push(ch);
                continue;
            }
        };

        let mut content = String::new();
        for c in chars.by_ref() {
            if c == close {
                break;
            }
            content.push(c);
        }
        let content = content.split_whitespace().collect::<Vec<_>>().join(" ");
        if !content.is_empty() {
            nicknames.push(content);
        }
        rest.push(' ');
    }

    (rest, nicknames)
}

/// Classify words written in natural order: `title first middle last suffix`.
fn parse_pieces(words: &[&str], result: &mut HumanName) {
    let mut start = 0;
    let mut end = words.len();

    // Leading titles, but always leave at least one word for the name itself
    let mut titles = Vec::new();
    while start < end - 1 && is_title(words[start]) {
        titles.push(words[start]);
        start += 1;
    }
    result.title = titles.join(" ");

    // Trailing suffixes, with the same guard: "Sir John" is never all-suffix
    let mut suffixes = Vec::new();
    while end - start > 1 && is_suffix(words[end - 1]) {
        suffixes.insert(0, words[end - 1]);
        end -= 1;
    }
    if !suffixes.is_empty() {
        push_suffix(result, &suffixes.join(" "));
    }

    let names = &words[start..end];
    match names.len() {
        0 => {}
        1 => result.first = names[0].to_string(),
        n => {
            result.first = names[0].to_string();
            // A particle starts the last name: "Ludwig van Beethoven"
            let last_start = (1..n - 1)
                .find(|&i| is_particle(names[i]))
                .unwrap_or(n - 1);
            result.middle = names[1..last_start].join(" ");
            result.last = names[last_start..].join(" ");
        }
    }
}

/// Classify comma-separated parts written as `last, title first middle, suffix`.
fn parse_last_first(parts: &[Vec<&str>], result: &mut HumanName) {
    result.last = parts[0].join(" ");

    let given = &parts[1];
    let mut start = 0;
    let mut end = given.len();

    let mut titles = Vec::new();
    while start < end && is_title(given[start]) {
        titles.push(given[start]);
        start += 1;
    }
    result.title = titles.join(" ");

    let mut suffixes = Vec::new();
    while end > start + 1 && is_suffix(given[end - 1]) {
        suffixes.insert(0, given[end - 1]);
        end -= 1;
    }

    if start < end {
        result.first = given[start].to_string();
        result.middle = given[start + 1..end].join(" ");
    }

    if !suffixes.is_empty() {
        push_suffix(result, &suffixes.join(" "));
    }
    for extra in &parts[2..] {
        push_suffix(result, &extra.join(" "));
    }
}

fn push_suffix(result: &mut HumanName, suffix: &str) {
    if result.suffix.is_empty() {
        result.suffix = suffix.to_string();
    } else {
        result.suffix = format!("{}, {}", result.suffix, suffix);
    }
}

/// Lowercase a word and drop periods, so "Ph.D." and "phd" compare equal.
fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Honorifics recognized before a name.
const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "doctor", "prof", "professor", "sir", "dame", "lord",
    "lady", "rev", "reverend", "fr", "father", "hon", "capt", "captain", "col", "colonel", "gen",
    "general", "lt", "sgt", "rabbi", "pastor", "president", "judge",
];

/// Suffixes recognized after a name.
const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "esq", "phd", "md", "dds", "jd", "mba", "msc", "obe",
    "mbe", "cbe", "kbe", "dbe", "qc", "kc",
];

/// Particles that begin a compound last name.
const PARTICLES: &[&str] = &[
    "van", "von", "de", "del", "della", "der", "den", "di", "da", "du", "la", "le", "st", "ter",
    "ten", "dos", "das", "bin", "ibn", "al", "af", "av", "zu",
];

fn is_title(word: &str) -> bool {
    TITLES.contains(&normalize(word).as_str())
}

fn is_suffix(word: &str) -> bool {
    SUFFIXES.contains(&normalize(word).as_str())
}

fn is_particle(word: &str) -> bool {
    PARTICLES.contains(&normalize(word).as_str())
}
