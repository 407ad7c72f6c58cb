//! Parser for the columnar listing printed by `7z l`.
//!
//! Example output (abridged):
//! ```text
//!    Date      Time    Attr         Size   Compressed  Name
//! ------------------- ----- ------------ ------------  ------------------------
//! 2024-03-01 10:00:00 D....            0            0  docs
//! 2024-03-01 10:00:00 ....A          123           80  docs/readme.txt
//! ------------------- ----- ------------ ------------  ------------------------
//! 2024-03-01 10:00:00                123           80  1 files, 1 folders
//! ```
//!
//! Column positions come from the header line (refined by the first separator line), so the parser
//! doesn't care about the date format or which optional columns a given 7-Zip version prints. The
//! name runs to the end of the line unless another column follows it.

use crate::archive::entry::ArchiveEntry;

/// How many characters of the attribute column are searched for the directory flag.
const ATTR_WINDOW: usize = 5;

/// Character offsets of the columns we read, taken from the header line.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    size: Option<usize>,
    attr: usize,
}

impl Columns {
    /// Recognizes the header line: it must mention both "Name" and "Attr".
    fn from_header(line: &str) -> Option<Self> {
        let name = char_offset_of(line, "Name")?;
        let attr = char_offset_of(line, "Attr")?;
        Some(Self {
            name,
            size: char_offset_of(line, "Size"),
            attr,
        })
    }

    /// Where the name field stops: the next column to its right, or the end of the line.
    fn name_end(&self) -> usize {
        [self.size, Some(self.attr)]
            .into_iter()
            .flatten()
            .filter(|&offset| offset > self.name)
            .min()
            .unwrap_or(usize::MAX)
    }

    /// Moves a right-aligned title's anchor back to the start of its column on the separator line.
    ///
    /// 7-Zip right-aligns the "Attr" and "Size" titles inside their columns, so the title offset
    /// can sit a few characters past where the column's values begin. An anchor only moves when
    /// its dash run is a single column: bounded by spaces on both sides and holding no other
    /// anchor. A separator that is one unbroken dash line leaves every anchor where it was.
    fn aligned_to(self, separator: &str) -> Self {
        let dashes: Vec<char> = separator.chars().collect();
        let anchors = [Some(self.name), self.size, Some(self.attr)];
        let snap = |offset: usize| {
            let Some((start, end)) = dash_run_around(&dashes, offset) else {
                return offset;
            };
            let bounded = start > 0 && dashes.get(end) == Some(&' ');
            let shared = anchors
                .iter()
                .flatten()
                .any(|&other| other != offset && (start..end).contains(&other));
            if bounded && !shared { start } else { offset }
        };
        Self {
            name: snap(self.name),
            size: self.size.map(snap),
            attr: snap(self.attr),
        }
    }
}

/// The half-open range of the dash run covering `offset`, if there is one.
fn dash_run_around(dashes: &[char], offset: usize) -> Option<(usize, usize)> {
    if dashes.get(offset) != Some(&'-') {
        return None;
    }
    let mut start = offset;
    while start > 0 && dashes[start - 1] == '-' {
        start -= 1;
    }
    let mut end = offset + 1;
    while dashes.get(end) == Some(&'-') {
        end += 1;
    }
    (start == 0 || dashes[start - 1] == ' ').then_some((start, end))
}

/// Parses a `7z l` listing into entries, in listing order, stopping after `max_entries`.
///
/// Anything that doesn't look like the expected table yields an empty list, never an error.
pub fn parse_listing_table(raw: &str, max_entries: usize) -> Vec<ArchiveEntry> {
    let mut entries = Vec::new();
    let mut columns: Option<Columns> = None;
    let mut separator_count = 0;

    for raw_line in raw.split('\n') {
        let line = raw_line.trim_end_matches('\r');

        let Some(cols) = columns else {
            columns = Columns::from_header(line);
            continue;
        };

        if line.trim_start().starts_with("---") {
            separator_count += 1;
            if separator_count >= 2 {
                break;
            }
            columns = Some(cols.aligned_to(line));
            continue;
        }

        if separator_count == 0 {
            continue;
        }

        if let Some(entry) = parse_data_line(line, cols) {
            entries.push(entry);
            if entries.len() >= max_entries {
                break;
            }
        }
    }

    entries
}

fn parse_data_line(line: &str, cols: Columns) -> Option<ArchiveEntry> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < cols.name {
        return None;
    }

    let name_end = cols.name_end().min(chars.len());
    let name: String = chars.get(cols.name..name_end)?.iter().collect();
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let is_directory = chars
        .get(cols.attr..)
        .map(|rest| rest.iter().take(ATTR_WINDOW).any(|&c| c == 'D'))
        .unwrap_or(false);

    let size = cols.size.map(|offset| parse_size_at(&chars, offset)).unwrap_or(0);

    Some(ArchiveEntry::new(name, size, is_directory))
}

/// Reads the first run of digits at `offset`, skipping leading whitespace. 0 if there is none.
fn parse_size_at(chars: &[char], offset: usize) -> u64 {
    let digits: String = chars
        .get(offset..)
        .unwrap_or_default()
        .iter()
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Like `str::find`, but counts characters instead of bytes.
fn char_offset_of(line: &str, needle: &str) -> Option<usize> {
    line.find(needle).map(|byte_offset| line[..byte_offset].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "   Date      Time    Attr         Size   Compressed  Name";
    const SEPARATOR: &str = "------------------- ----- ------------ ------------  ------------------------";

    fn table(rows: &[&str]) -> String {
        let mut out = vec![
            "7-Zip 23.01 (x64) : Copyright (c) 1999-2023 Igor Pavlov : 2023-06-20",
            "",
            "Listing archive: test.zip",
            "",
            "--",
            "Path = test.zip",
            "Type = zip",
            "",
            HEADER,
            SEPARATOR,
        ];
        out.extend_from_slice(rows);
        out.push(SEPARATOR);
        out.push("2024-03-01 10:00:00                123           80  1 files, 1 folders");
        out.join("\r\n")
    }

    #[test]
    fn parses_files_and_directories() {
        let raw = table(&[
            "2024-03-01 10:00:00 D....            0            0  docs",
            "2024-03-01 10:00:00 ....A          123           80  docs/readme.txt",
        ]);

        let entries = parse_listing_table(&raw, 200);

        assert_eq!(
            entries,
            vec![
                ArchiveEntry::new("docs", 0, true),
                ArchiveEntry::new("docs/readme.txt", 123, false),
            ]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_listing_table("", 200).is_empty());
    }

    #[test]
    fn headerless_input_yields_nothing() {
        let raw = format!("{}\n2024-03-01 10:00:00 ....A   5   5  a.txt\n{}\n", SEPARATOR, SEPARATOR);
        assert!(parse_listing_table(&raw, 200).is_empty());
    }

    #[test]
    fn footer_after_second_separator_is_ignored() {
        let raw = table(&["2024-03-01 10:00:00 ....A            7            7  a.txt"]);
        let entries = parse_listing_table(&raw, 200);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "a.txt");
    }

    #[test]
    fn stops_at_max_entries() {
        let raw = table(&[
            "2024-03-01 10:00:00 ....A            1            1  a.txt",
            "2024-03-01 10:00:00 ....A            2            2  b.txt",
            "2024-03-01 10:00:00 ....A            3            3  c.txt",
        ]);
        let entries = parse_listing_table(&raw, 2);
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn wide_sizes_are_read_in_full() {
        let raw = table(&["2024-03-01 10:00:00 ....A    123456789     99999999  big.iso"]);
        let entries = parse_listing_table(&raw, 200);
        assert_eq!(entries[0].size(), 123_456_789);
    }

    #[test]
    fn missing_size_defaults_to_zero() {
        let raw = table(&["2024-03-01 10:00:00 D....                            empty-dir"]);
        let entries = parse_listing_table(&raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::new("empty-dir", 0, true)]);
    }

    #[test]
    fn names_with_spaces_and_unicode_survive() {
        let raw = table(&["2024-03-01 10:00:00 ....A           42           40  Фото/my photo 1.jpg"]);
        let entries = parse_listing_table(&raw, 200);
        assert_eq!(entries[0].name(), "Фото/my photo 1.jpg");
        assert_eq!(entries[0].size(), 42);
    }

    #[test]
    fn short_and_blank_rows_are_skipped() {
        let raw = table(&["", "short", "2024-03-01 10:00:00 ....A            9            9  kept.txt"]);
        let entries = parse_listing_table(&raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::file("kept.txt", 9)]);
    }

    #[test]
    fn full_width_separator_keeps_header_offsets() {
        let raw = "Attr  Size  Name\n----------------------\nD.... 123   file.txt\n----------------------\n";
        let entries = parse_listing_table(raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::new("file.txt", 123, true)]);
    }

    #[test]
    fn name_first_column_order() {
        let raw = "\
Name            Size       Attr
--------------------------------
docs               0       D....
docs/readme.txt  123       ....A
--------------------------------
";
        let entries = parse_listing_table(raw, 200);
        assert_eq!(
            entries,
            vec![
                ArchiveEntry::new("docs", 0, true),
                ArchiveEntry::new("docs/readme.txt", 123, false),
            ]
        );
    }

    #[test]
    fn name_first_with_per_column_separators() {
        let raw = "\
Name            Size  Attr
--------------- ----- -----
notes.md           42 ....A
--------------- ----- -----
";
        let entries = parse_listing_table(raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::new("notes.md", 42, false)]);
    }

    #[test]
    fn right_aligned_titles_snap_to_their_column() {
        // "Size" sits two characters into its column, so the anchor moves back to the column start
        let raw = "\
Attr    Size  Name
----- ------  ----
D.... 120456  big
----- ------  ----
";
        let entries = parse_listing_table(raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::new("big", 120_456, true)]);
    }

    #[test]
    fn minimal_layout_from_header_offsets() {
        let raw = "Attr  Size  Name\n----\nD.... 123   file.txt\n----\n";
        let entries = parse_listing_table(raw, 200);
        assert_eq!(entries, vec![ArchiveEntry::new("file.txt", 123, true)]);
    }
}
