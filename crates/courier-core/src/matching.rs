//! Report-to-recipient name matching.
//!
//! Report workbooks arrive named `<Area>_<Recipient Name>.xlsx`. The name
//! is extracted from the filename and matched against recipient folder
//! names in three tiers of decreasing confidence. The weakest tier is
//! deliberately permissive; the preview command flags its hits for human
//! review instead of suppressing them.

/// Match confidence, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// No tier matched
    None,
    /// Some word of the name appears in the folder name
    PartialWord,
    /// The whole name appears in the folder name
    Substring,
    /// The name equals the folder's name segments
    Exact,
}

impl Confidence {
    /// Numeric score used in operator-facing output.
    pub fn score(self) -> u8 {
        match self {
            Confidence::None => 0,
            Confidence::PartialWord => 50,
            Confidence::Substring => 80,
            Confidence::Exact => 100,
        }
    }
}

/// Outcome of matching one report file against the folder list.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub extracted_name: String,
    pub folder: Option<String>,
    pub confidence: Confidence,
}

/// Extract the recipient name from a report file name.
///
/// `A04_Uy Naro.xlsx` yields `Uy Naro`: the extension is stripped and the
/// stem split on its first underscore, keeping the tail. A stem without an
/// underscore is returned whole. Always trimmed, possibly empty.
pub fn extract_report_name(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    match stem.split_once('_') {
        Some((_, tail)) => tail.trim().to_string(),
        None => stem.trim().to_string(),
    }
}

/// Find the best-matching folder for an extracted name.
///
/// Tiers are tried in priority order and the first hit wins:
///
/// 1. Exact: the folder parses as `Area_Role_ChatId_Name...` and its name
///    segments, joined with spaces, equal the extracted name
///    case-insensitively.
/// 2. Substring: the lowercased name occurs inside the lowercased folder
///    name.
/// 3. Partial word: any whitespace-separated word of the name occurs
///    inside the lowercased folder name.
///
/// Folders are scanned in the order given; callers pass sorted lists so
/// results are stable run to run.
pub fn best_match<'a>(name: &str, folders: &'a [String]) -> (Option<&'a str>, Confidence) {
    let needle = name.to_lowercase();

    for folder in folders {
        let parts: Vec<&str> = folder.split('_').collect();
        if parts.len() >= 4 {
            let folder_name = parts[3..].join(" ").to_lowercase();
            if needle == folder_name {
                return (Some(folder.as_str()), Confidence::Exact);
            }
        }
    }

    for folder in folders {
        if folder.to_lowercase().contains(&needle) {
            return (Some(folder.as_str()), Confidence::Substring);
        }
    }

    for folder in folders {
        let folder_lower = folder.to_lowercase();
        if needle
            .split_whitespace()
            .any(|word| folder_lower.contains(word))
        {
            return (Some(folder.as_str()), Confidence::PartialWord);
        }
    }

    (None, Confidence::None)
}

/// Extract the name from `filename` and match it against `folders`.
pub fn match_report(filename: &str, folders: &[String]) -> MatchResult {
    let extracted_name = extract_report_name(filename);
    let (folder, confidence) = best_match(&extracted_name, folders);
    MatchResult {
        extracted_name,
        folder: folder.map(|f| f.to_string()),
        confidence,
    }
}
