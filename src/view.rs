//! Pure derived-view computations.
//!
//! Nothing here is stored in the state: the presentation layer recomputes
//! these from the latest snapshot whenever it re-renders. All functions
//! borrow from their inputs; nothing is cloned.

use crate::model::{Article, Feed, Folder};
use crate::state::{AppState, ReadFilter, Selection, SortOrder};
use chrono::NaiveDate;
use std::cmp::Ordering;

// ============================================================================
// Article Scope, Filter, Sort
// ============================================================================

/// The raw article set behind the current selection.
///
/// The aggregate view reads the materialized union; a concrete feed reads
/// its cache entry (empty while not yet fetched); no selection reads
/// nothing.
pub fn scoped_articles(state: &AppState) -> &[Article] {
    match &state.selected_feed {
        Selection::AllArticles => &state.all_articles,
        Selection::Feed(id) => state
            .articles_by_feed
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        Selection::None => &[],
    }
}

/// Filter then sort a list of articles, preserving input order for ties.
pub fn filter_and_sort(
    articles: &[Article],
    filter: ReadFilter,
    order: SortOrder,
) -> Vec<&Article> {
    let mut out: Vec<&Article> = articles
        .iter()
        .filter(|a| match filter {
            ReadFilter::All => true,
            ReadFilter::Unread => !a.is_read,
            ReadFilter::Read => a.is_read,
        })
        .collect();

    // Vec::sort_by is stable, so equal keys keep their input order.
    let cmp = article_ordering(order);
    out.sort_by(|a, b| cmp(a, b));
    out
}

/// The article list the main pane renders: current scope, current filter,
/// current sort.
pub fn visible_articles(state: &AppState) -> Vec<&Article> {
    filter_and_sort(scoped_articles(state), state.read_filter, state.sort_order)
}

// ============================================================================
// Calendar-Day Grouping
// ============================================================================

/// Articles published on one calendar day.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    /// Display header: "Today", "Yesterday", or a long-form date.
    pub label: String,
    pub articles: Vec<&'a Article>,
}

/// Display label for a day bucket. `today` is a parameter so the function
/// stays deterministic under test.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%A, %B %-d, %Y").to_string()
    }
}

/// Bucket articles by publication day, newest day first.
///
/// Within a bucket, articles keep the order of the input list (callers pass
/// an already-sorted list from [`filter_and_sort`]).
pub fn group_by_day<'a>(articles: &[&'a Article], today: NaiveDate) -> Vec<DayGroup<'a>> {
    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    for article in articles {
        let date = article.pub_date.date_naive();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.articles.push(article),
            None => groups.push(DayGroup {
                date,
                label: day_label(date, today),
                articles: vec![article],
            }),
        }
    }
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

// ============================================================================
// Feeds Grouped by Folder
// ============================================================================

/// A folder together with its member feeds, in sidebar order.
#[derive(Debug)]
pub struct FolderGroup<'a> {
    pub folder: &'a Folder,
    pub feeds: Vec<&'a Feed>,
}

/// The sidebar grouping: one group per folder plus the ungrouped residue.
#[derive(Debug)]
pub struct GroupedFeeds<'a> {
    pub folders: Vec<FolderGroup<'a>>,
    /// Feeds with no folder membership.
    pub ungrouped: Vec<&'a Feed>,
}

pub fn feeds_by_folder<'a>(feeds: &'a [Feed], folders: &'a [Folder]) -> GroupedFeeds<'a> {
    let folder_groups = folders
        .iter()
        .map(|folder| FolderGroup {
            folder,
            feeds: feeds
                .iter()
                .filter(|f| f.folder_id.as_deref() == Some(folder.id.as_str()))
                .collect(),
        })
        .collect();

    GroupedFeeds {
        folders: folder_groups,
        ungrouped: feeds.iter().filter(|f| f.folder_id.is_none()).collect(),
    }
}

/// Comparator matching [`SortOrder`], exposed for callers that sort their
/// own collections (e.g. search results in the presentation layer).
pub fn article_ordering(order: SortOrder) -> impl Fn(&Article, &Article) -> Ordering {
    move |a, b| match order {
        SortOrder::DateDesc => b.pub_date.cmp(&a.pub_date),
        SortOrder::DateAsc => a.pub_date.cmp(&b.pub_date),
        SortOrder::TitleAsc => a.title.cmp(&b.title),
        SortOrder::TitleDesc => b.title.cmp(&a.title),
    }
}

// ============================================================================
// Tests
// ============================================================================
