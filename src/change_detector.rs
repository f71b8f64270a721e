//! Line-level change detection
//!
//! Compares the stored text of a monitor with the freshly aggregated text and
//! keeps only what was inserted or removed. The rendered diff is what the
//! summarizer sees, so it is capped at a fixed character budget. Removed and
//! added lines share that budget, and a line too long for its share is cut
//! down to a window around the point where it differs from its counterpart.

use similar::{ChangeTag, TextDiff};

use crate::utils::{DIFF_CHAR_LIMIT, safe_truncate_chars};

/// Marks text cut from either end of an oversized line.
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub change: LineChange,
    pub text: String,
}

impl DiffLine {
    fn marker(&self) -> &'static str {
        match self.change {
            LineChange::Added => "+ ",
            LineChange::Removed => "- ",
        }
    }

    fn render(&self) -> String {
        format!("{}{}", self.marker(), self.text)
    }

    /// Rendered length in chars, including the marker.
    fn rendered_len(&self) -> usize {
        self.text.chars().count() + 2
    }
}

/// Inserted and removed lines between two texts, in order of occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    lines: Vec<DiffLine>,
    rendered: String,
    truncated: bool,
}

impl DiffResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    /// `+ line` / `- line` form, possibly truncated.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.rendered
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    char_limit: usize,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DIFF_CHAR_LIMIT)
    }
}

impl ChangeDetector {
    #[must_use]
    pub fn new(char_limit: usize) -> Self {
        Self {
            char_limit: char_limit.max(1),
        }
    }

    /// Diff `old_text` against `new_text`.
    ///
    /// Line endings and trailing whitespace are normalized first; lines that
    /// are blank after trimming never count as changes.
    #[must_use]
    pub fn detect(&self, old_text: &str, new_text: &str) -> DiffResult {
        let old = normalize(old_text);
        let new = normalize(new_text);
        if old == new {
            return DiffResult::default();
        }

        let diff = TextDiff::from_lines(&old, &new);
        let lines: Vec<DiffLine> = diff
            .iter_all_changes()
            .filter_map(|change| {
                let kind = match change.tag() {
                    ChangeTag::Insert => LineChange::Added,
                    ChangeTag::Delete => LineChange::Removed,
                    ChangeTag::Equal => return None,
                };
                let text = change.value().trim_end();
                (!text.trim().is_empty()).then(|| DiffLine {
                    change: kind,
                    text: text.to_string(),
                })
            })
            .collect();

        let (rendered, truncated) = render_within(&lines, self.char_limit);
        DiffResult {
            lines,
            rendered,
            truncated,
        }
    }
}

/// Render `lines` in at most `limit` chars.
///
/// Every line costs its rendered length plus one newline, against a budget
/// of `limit + 1` since the last line has no newline. Removed and added lines
/// draw from separate halves of that budget; a side that needs less than half
/// leaves the rest to the other. Within a side lines are kept in order until
/// one does not fit, which is excerpted into what is left.
fn render_within(lines: &[DiffLine], limit: usize) -> (String, bool) {
    let cost = |line: &DiffLine| line.rendered_len() + 1;
    let removed: usize = lines
        .iter()
        .filter(|line| line.change == LineChange::Removed)
        .map(cost)
        .sum();
    let added: usize = lines
        .iter()
        .filter(|line| line.change == LineChange::Added)
        .map(cost)
        .sum();

    let total = limit + 1;
    if removed + added <= total {
        let full = lines.iter().map(DiffLine::render).collect::<Vec<_>>();
        return (full.join("\n"), false);
    }

    let half = total / 2;
    let (mut removed_budget, mut added_budget) = if removed <= half {
        (removed, total - removed)
    } else if added <= half {
        (total - added, added)
    } else {
        (half, total - half)
    };

    let partners = pair_replacements(lines);
    let mut out = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let budget = match line.change {
            LineChange::Removed => &mut removed_budget,
            LineChange::Added => &mut added_budget,
        };
        if cost(line) <= *budget {
            out.push(line.render());
            *budget -= cost(line);
            continue;
        }
        // Marker and newline need three chars; anything less drops the line.
        if *budget > 3 {
            let room = *budget - 3;
            let focus = partners[index]
                .map_or(0, |partner| common_prefix_chars(&line.text, &lines[partner].text));
            out.push(format!("{}{}", line.marker(), excerpt(&line.text, focus, room)));
        }
        *budget = 0;
    }

    (out.join("\n"), true)
}

/// Pair the k-th removed line of each replacement block with its k-th added
/// line, so an oversized line can be excerpted where it actually changed.
fn pair_replacements(lines: &[DiffLine]) -> Vec<Option<usize>> {
    let mut partners = vec![None; lines.len()];
    let mut index = 0;
    while index < lines.len() {
        let removed_start = index;
        while index < lines.len() && lines[index].change == LineChange::Removed {
            index += 1;
        }
        let added_start = index;
        while index < lines.len() && lines[index].change == LineChange::Added {
            index += 1;
        }
        let pairs = (added_start - removed_start).min(index - added_start);
        for k in 0..pairs {
            partners[removed_start + k] = Some(added_start + k);
            partners[added_start + k] = Some(removed_start + k);
        }
    }
    partners
}

fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// `room` chars of `text` starting a little before char `focus`, with an
/// ellipsis standing in for each cut end.
fn excerpt(text: &str, focus: usize, room: usize) -> String {
    if room < 8 {
        return safe_truncate_chars(text, room).to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= room {
        return text.to_string();
    }

    let start = focus.saturating_sub(room / 4).min(chars.len() - room);
    let end = start + room;
    let mut window = chars[start..end].to_vec();
    if start > 0 {
        window[0] = ELLIPSIS;
    }
    if end < chars.len() {
        window[room - 1] = ELLIPSIS;
    }
    window.into_iter().collect()
}

/// Trim trailing whitespace per line and end every non-empty text with one
/// newline, so the last line compares equal regardless of how it ended.
fn normalize(text: &str) -> String {
    let mut normalized = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string();
    if !normalized.is_empty() {
        normalized.push('\n');
    }
    normalized
}
