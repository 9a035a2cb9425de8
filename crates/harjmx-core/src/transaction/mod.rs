//! Partitioning of HAR entries into numbered pages (JMeter transaction
//! controllers).

use crate::har::{Entry, Page as HarPage};
use crate::sampler::Sampler;
use crate::{Error, Result};

/// A HAR entry with its assigned sampler number
#[derive(Debug, Clone)]
pub struct NumberedEntry {
    pub number: u64,
    pub entry: Entry,
}

/// Entries grouped into one page, before samplers are built
#[derive(Debug, Clone)]
pub struct EntryGroup {
    pub number: u64,
    pub title: String,
    /// HAR page id when grouped by `pageref`
    pub har_page_id: Option<String>,
    /// Pause to inject before the page, in milliseconds
    pub pause_ms: Option<u64>,
    pub entries: Vec<NumberedEntry>,
}

/// One transaction controller of the generated test plan
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u64,
    pub name: String,
    pub har_page_id: Option<String>,
    pub pause_ms: Option<u64>,
    pub samplers: Vec<Sampler>,
}

impl Page {
    pub fn from_group(group: EntryGroup, samplers: Vec<Sampler>) -> Self {
        Self {
            number: group.number,
            name: page_display_name(group.number, &group.title),
            har_page_id: group.har_page_id,
            pause_ms: group.pause_ms,
            samplers,
        }
    }
}

pub fn page_display_name(number: u64, title: &str) -> String {
    format!("PAGE_{:02} - {}", number, title)
}

/// Groups entries into pages and assigns page and sampler numbers
#[derive(Debug, Clone)]
pub struct TransactionGrouper {
    /// Gap that starts a new page; zero or less disables splitting
    pub pause_threshold_ms: i64,
    pub add_pause: bool,
    pub page_start: u64,
    pub sampler_start: u64,
    pub use_har_pages: bool,
}

impl Default for TransactionGrouper {
    fn default() -> Self {
        Self {
            pause_threshold_ms: crate::config::DEFAULT_PAUSE_THRESHOLD_MS,
            add_pause: true,
            page_start: 1,
            sampler_start: 1,
            use_har_pages: true,
        }
    }
}

impl TransactionGrouper {
    pub fn from_config(config: &crate::ConversionConfig) -> Self {
        Self {
            pause_threshold_ms: config.pause_threshold_ms,
            add_pause: config.add_pause,
            page_start: u64::from(config.page_start.max(1)),
            sampler_start: u64::from(config.sampler_start.max(1)),
            use_har_pages: config.use_har_pages,
        }
    }

    /// Partition `entries` into numbered pages
    ///
    /// `har_pages` is the `log.pages` list; it is only consulted when some
    /// entry carries a `pageref` and HAR page grouping is enabled.
    pub fn group(&self, entries: Vec<Entry>, har_pages: &[HarPage]) -> Result<Vec<EntryGroup>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let buckets = if self.use_har_pages && entries.iter().any(|e| e.page_ref.is_some()) {
            tracing::debug!("Grouping {} entries by HAR page reference", entries.len());
            by_page_ref(entries, har_pages)
        } else {
            tracing::debug!(
                "Grouping {} entries by time gap > {} ms",
                entries.len(),
                self.pause_threshold_ms
            );
            self.by_time_gap(entries)?
        };

        let groups = self.number(buckets);
        tracing::debug!("Created {} pages", groups.len());
        Ok(groups)
    }

    fn by_time_gap(&self, entries: Vec<Entry>) -> Result<Vec<Bucket>> {
        let mut timed = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let start = start_ms(&entry, idx)?;
            timed.push((start, entry));
        }
        // stable: entries recorded at the same instant keep HAR order
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut buckets: Vec<Bucket> = Vec::new();
        let mut previous_end: Option<f64> = None;
        for (start, entry) in timed {
            let (split, gap_ms) = match previous_end {
                None => (true, None),
                Some(end) => {
                    let gap = start - end;
                    (self.pause_threshold_ms > 0 && gap > self.pause_threshold_ms as f64, Some(gap))
                }
            };
            previous_end = Some(start + entry.time.max(0.0));

            if split {
                buckets.push(Bucket {
                    title: entry.request.path(),
                    har_page_id: None,
                    gap_ms,
                    entries: vec![entry],
                });
            } else if let Some(last) = buckets.last_mut() {
                last.entries.push(entry);
            }
        }
        Ok(buckets)
    }

    fn number(&self, buckets: Vec<Bucket>) -> Vec<EntryGroup> {
        let mut groups = Vec::with_capacity(buckets.len());
        let mut page_number = self.page_start;
        let mut sampler_number = self.sampler_start;
        let mut previous_end: Option<f64> = None;

        for bucket in buckets {
            // time-gap pages pause for the gap that split them
            let gap = bucket.gap_ms.or_else(|| {
                let start = bucket.entries.first().and_then(Entry::started_ms)?;
                previous_end.map(|end| start - end)
            });
            let pause_ms = match gap {
                Some(gap) if self.add_pause && gap >= 0.5 => Some(gap.round() as u64),
                _ => None,
            };

            let mut numbered = Vec::with_capacity(bucket.entries.len());
            for entry in bucket.entries {
                if let Some(end) = entry.ended_ms() {
                    previous_end = Some(previous_end.map_or(end, |p| p.max(end)));
                }
                numbered.push(NumberedEntry {
                    number: sampler_number,
                    entry,
                });
                sampler_number += 1;
            }

            groups.push(EntryGroup {
                number: page_number,
                title: bucket.title,
                har_page_id: bucket.har_page_id,
                pause_ms,
                entries: numbered,
            });
            page_number += 1;
        }
        groups
    }
}

struct Bucket {
    title: String,
    har_page_id: Option<String>,
    gap_ms: Option<f64>,
    entries: Vec<Entry>,
}

fn by_page_ref(entries: Vec<Entry>, har_pages: &[HarPage]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = har_pages
        .iter()
        .map(|p| Bucket {
            title: if p.title.trim().is_empty() {
                p.id.clone()
            } else {
                p.title.clone()
            },
            har_page_id: Some(p.id.clone()),
            gap_ms: None,
            entries: Vec::new(),
        })
        .collect();
    let mut orphans: Vec<Entry> = Vec::new();

    for entry in entries {
        let Some(page_ref) = entry.page_ref.clone() else {
            orphans.push(entry);
            continue;
        };
        match buckets
            .iter_mut()
            .find(|b| b.har_page_id.as_deref() == Some(page_ref.as_str()))
        {
            Some(bucket) => bucket.entries.push(entry),
            None => {
                tracing::debug!("Entry references undeclared page '{}'", page_ref);
                buckets.push(Bucket {
                    title: page_ref.clone(),
                    har_page_id: Some(page_ref),
                    gap_ms: None,
                    entries: vec![entry],
                });
            }
        }
    }

    if let Some(first) = orphans.first() {
        buckets.push(Bucket {
            title: first.request.path(),
            har_page_id: None,
            gap_ms: None,
            entries: orphans,
        });
    }

    buckets.retain(|b| !b.entries.is_empty());
    buckets
}

fn start_ms(entry: &Entry, idx: usize) -> Result<f64> {
    entry.started_ms().ok_or_else(|| {
        Error::MalformedInput(format!(
            "entry {} has an invalid startedDateTime '{}'",
            idx, entry.started_date_time
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::fixtures::entry;

    fn grouper(threshold: i64) -> TransactionGrouper {
        TransactionGrouper {
            pause_threshold_ms: threshold,
            ..Default::default()
        }
    }

    fn urls(group: &EntryGroup) -> Vec<&str> {
        group.entries.iter().map(|e| e.entry.request.url.as_str()).collect()
    }

    fn numbers(groups: &[EntryGroup]) -> Vec<u64> {
        groups.iter().flat_map(|g| g.entries.iter().map(|e| e.number)).collect()
    }

    fn har_page(id: &str, title: &str) -> HarPage {
        HarPage {
            started_date_time: String::new(),
            id: id.to_string(),
            title: title.to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_split_on_gap() {
        // entry1 ends at 100ms, entry2 starts at 100ms (gap 0), ends at 200ms,
        // entry3 starts at 2200ms (gap 2000)
        let entries = vec![
            entry("https://example.com/login", "2024-01-15T10:30:00.000Z", 100.0),
            entry("https://example.com/api/me", "2024-01-15T10:30:00.100Z", 100.0),
            entry("https://example.com/home", "2024-01-15T10:30:02.200Z", 50.0),
        ];
        let groups = grouper(1000).group(entries, &[]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].number, 1);
        assert_eq!(groups[1].number, 2);
        assert_eq!(urls(&groups[0]), vec!["https://example.com/login", "https://example.com/api/me"]);
        assert_eq!(urls(&groups[1]), vec!["https://example.com/home"]);
        assert_eq!(numbers(&groups), vec![1, 2, 3]);
        assert_eq!(groups[0].title, "/login");
        assert_eq!(groups[0].pause_ms, None);
        assert_eq!(groups[1].pause_ms, Some(2000));
    }

    #[test]
    fn test_pause_matches_split_gap_with_overlap() {
        // the long first request is still running when the third starts;
        // the split and the pause both measure from the second request's end
        let entries = vec![
            entry("https://example.com/report", "2024-01-15T10:30:00.000Z", 5000.0),
            entry("https://example.com/ping", "2024-01-15T10:30:00.100Z", 10.0),
            entry("https://example.com/next", "2024-01-15T10:30:02.000Z", 10.0),
        ];
        let groups = grouper(1000).group(entries, &[]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(urls(&groups[1]), vec!["https://example.com/next"]);
        assert_eq!(groups[0].pause_ms, None);
        assert_eq!(groups[1].pause_ms, Some(1890));
    }

    #[test]
    fn test_numbering_past_u32_range() {
        let entries = vec![
            entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 0.0),
            entry("https://example.com/b", "2024-01-15T10:30:10.000Z", 0.0),
        ];
        let config = crate::ConversionConfig::builder("capture.har")
            .pause_threshold_ms(1000)
            .page_start(u32::MAX)
            .sampler_start(u32::MAX)
            .build();
        let groups = TransactionGrouper::from_config(&config).group(entries, &[]).unwrap();

        let max = u64::from(u32::MAX);
        assert_eq!(groups[0].number, max);
        assert_eq!(groups[1].number, max + 1);
        assert_eq!(numbers(&groups), vec![max, max + 1]);
    }

    #[test]
    fn test_no_pause_when_disabled() {
        let entries = vec![
            entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 0.0),
            entry("https://example.com/b", "2024-01-15T10:30:10.000Z", 0.0),
        ];
        let groups = TransactionGrouper {
            pause_threshold_ms: 1000,
            add_pause: false,
            ..Default::default()
        }
        .group(entries, &[])
        .unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.pause_ms.is_none()));
    }

    #[test]
    fn test_zero_threshold_is_single_page() {
        let entries = vec![
            entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 0.0),
            entry("https://example.com/b", "2024-01-15T11:30:00.000Z", 0.0),
            entry("https://example.com/c", "2024-01-15T12:30:00.000Z", 0.0),
        ];
        for threshold in [0, -5] {
            let groups = grouper(threshold).group(entries.clone(), &[]).unwrap();
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].entries.len(), 3);
        }
    }

    #[test]
    fn test_start_offsets() {
        let entries = vec![
            entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 0.0),
            entry("https://example.com/b", "2024-01-15T10:30:10.000Z", 0.0),
        ];
        let groups = TransactionGrouper {
            pause_threshold_ms: 1000,
            page_start: 7,
            sampler_start: 40,
            ..Default::default()
        }
        .group(entries, &[])
        .unwrap();
        assert_eq!(groups[0].number, 7);
        assert_eq!(groups[1].number, 8);
        assert_eq!(numbers(&groups), vec![40, 41]);
    }

    #[test]
    fn test_chronological_order() {
        let entries = vec![
            entry("https://example.com/late", "2024-01-15T10:30:00.500Z", 0.0),
            entry("https://example.com/early", "2024-01-15T10:30:00.000Z", 0.0),
        ];
        let groups = grouper(1000).group(entries, &[]).unwrap();
        assert_eq!(urls(&groups[0]), vec!["https://example.com/early", "https://example.com/late"]);
    }

    #[test]
    fn test_group_by_har_pages() {
        let mut a = entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 100.0);
        a.page_ref = Some("page_2".to_string());
        let mut b = entry("https://example.com/b", "2024-01-15T10:30:00.000Z", 100.0);
        b.page_ref = Some("page_1".to_string());
        let mut c = entry("https://example.com/c", "2024-01-15T10:30:03.000Z", 100.0);
        c.page_ref = Some("page_2".to_string());
        let d = entry("https://example.com/d", "2024-01-15T10:30:05.000Z", 100.0);

        let pages = vec![har_page("page_1", "Home"), har_page("page_2", "")];
        let groups = grouper(1000).group(vec![a, b, c, d], &pages).unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].title, "Home");
        assert_eq!(groups[0].har_page_id.as_deref(), Some("page_1"));
        assert_eq!(urls(&groups[0]), vec!["https://example.com/b"]);
        assert_eq!(groups[1].title, "page_2");
        assert_eq!(urls(&groups[1]), vec!["https://example.com/a", "https://example.com/c"]);
        assert_eq!(groups[2].har_page_id, None);
        assert_eq!(urls(&groups[2]), vec!["https://example.com/d"]);
        assert_eq!(numbers(&groups), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_har_pages_ignored_when_disabled() {
        let mut a = entry("https://example.com/a", "2024-01-15T10:30:00.000Z", 0.0);
        a.page_ref = Some("page_1".to_string());
        let mut b = entry("https://example.com/b", "2024-01-15T10:30:00.100Z", 0.0);
        b.page_ref = Some("page_2".to_string());

        let groups = TransactionGrouper {
            pause_threshold_ms: 1000,
            use_har_pages: false,
            ..Default::default()
        }
        .group(vec![a, b], &[])
        .unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_invalid_timestamp_is_malformed() {
        let entries = vec![entry("https://example.com/a", "yesterday", 0.0)];
        let err = grouper(1000).group(entries, &[]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(grouper(1000).group(vec![], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_page_display_name() {
        assert_eq!(page_display_name(3, "/login"), "PAGE_03 - /login");
        assert_eq!(page_display_name(120, "Home"), "PAGE_120 - Home");
    }
}
