//! Plain-text tables for snapshots.

use std::fmt;
use std::time::Duration;

use crate::snapshot::{GroupSnapshot, ProfileSnapshot, RegistrySnapshot};

/// Column-aligned text table.
struct Table {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Table {
    const fn new(headers: &'static [&'static str]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .fold(header.len(), usize::max)
            })
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| format!("{h:<w$}"))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect();
            writeln!(f, "{}", cells.join("  ").trim_end())?;
        }
        Ok(())
    }
}

const LEAF_HEADERS: &[&str] = &[
    "profile",
    "total runtime",
    "effective runtime",
    "mean runtime",
    "branch taken",
    "nsamples",
];

const CHILD_HEADERS: &[&str] = &[
    "profile",
    "timeslice",
    "total runtime",
    "effective runtime",
    "mean runtime",
    "branch taken",
    "nsamples",
];

const GROUP_HEADERS: &[&str] = &["group", "total runtime", "effective runtime", "nsamples"];

fn duration(d: Duration) -> String {
    format!("{d:?}")
}

/// Shares are truncated, not rounded, to three decimals.
fn share(value: f64) -> String {
    format!("{:.3}", (value * 1000.0).floor() / 1000.0)
}

fn child_row(p: &ProfileSnapshot) -> Vec<String> {
    vec![
        p.path.clone(),
        share(p.stats.timeslice),
        duration(p.stats.total_time),
        duration(p.stats.effective_time),
        duration(p.stats.mean_time),
        share(p.stats.taken),
        p.stats.samples.to_string(),
    ]
}

/// Tables for every composite node below `children`, depth first.
fn write_composites(f: &mut fmt::Formatter<'_>, children: &[ProfileSnapshot]) -> fmt::Result {
    for child in children.iter().filter(|c| c.composite) {
        write!(f, "{child}")?;
    }
    Ok(())
}

impl fmt::Display for ProfileSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Profile {}", self.name)?;

        if !self.composite {
            let mut table = Table::new(LEAF_HEADERS);
            table.push(vec![
                self.path.clone(),
                duration(self.stats.total_time),
                duration(self.stats.effective_time),
                duration(self.stats.mean_time),
                share(self.stats.taken),
                self.stats.samples.to_string(),
            ]);
            return write!(f, "{table}");
        }

        let mut table = Table::new(CHILD_HEADERS);
        for child in &self.children {
            table.push(child_row(child));
        }
        write!(f, "{table}")?;
        write_composites(f, &self.children)
    }
}

impl fmt::Display for GroupSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Group {}", self.name)?;

        let mut table = Table::new(CHILD_HEADERS);
        for profile in &self.profiles {
            table.push(child_row(profile));
        }
        write!(f, "{table}")?;
        write_composites(f, &self.profiles)
    }
}

impl fmt::Display for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Groups")?;

        let mut table = Table::new(GROUP_HEADERS);
        for group in &self.groups {
            table.push(vec![
                group.name.clone(),
                duration(group.stats.total_time),
                duration(group.stats.effective_time),
                group.stats.samples.to_string(),
            ]);
        }
        write!(f, "{table}")?;

        for group in &self.groups {
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::builder::Builder;
    use crate::registry::Registry;

    #[test]
    fn share_truncates() {
        assert_eq!(super::share(0.6666), "0.666");
        assert_eq!(super::share(0.0), "0.000");
    }

    #[test]
    fn leaf_report_has_single_row() {
        let leaf = Builder::new().build("solo");
        leaf.record(Duration::from_millis(20));

        let text = leaf.snapshot().to_string();
        assert!(text.contains("Profile solo"));
        assert!(text.contains("20ms"));
        assert!(!text.contains("timeslice"));
    }

    #[test]
    fn group_report_lists_nested_composites() {
        let registry = Registry::new();
        let group = registry.group("render");
        group.profile("draw").record(Duration::from_millis(6));
        group.profile("upload").record_as(&["textures"], Duration::from_millis(2));

        let text = registry.snapshot().to_string();
        assert!(text.contains("Groups"));
        assert!(text.contains("Group render"));
        assert!(text.contains("render -> draw"));
        assert!(text.contains("Profile upload"));
        assert!(text.contains("render -> upload -> textures"));
        assert!(!text.contains("Profile draw"));
    }

    #[test]
    fn columns_are_aligned() {
        let group = Registry::new().group("g");
        group.profile("a").record(Duration::from_millis(1));
        group.profile("a-much-longer-name").record(Duration::from_millis(1));

        let text = group.snapshot().to_string();
        let lines: Vec<&str> = text.lines().filter(|l| l.starts_with("g -> ")).collect();
        assert_eq!(lines.len(), 2);
        let column = |line: &str| line.find("0.500").unwrap();
        assert_eq!(column(lines[0]), column(lines[1]));
    }
}
