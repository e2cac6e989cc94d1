//! Page planning: decide whether a listing page warrants fetching the next.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::api::MovieData;
use crate::models::ForumCursor;

/// Advised wait before the next page, in seconds.
pub const CONTINUATION_DELAY_SECS: RangeInclusive<u64> = 1800..=3600;

/// Outcome of inspecting one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan<'a> {
    /// Cursor for the next page, if the crawl should keep paging.
    pub continuation: Option<ForumCursor>,
    /// Movies to reconcile, regardless of the continuation.
    pub movies: &'a [MovieData],
}

/// True if any torrent on the page was uploaded strictly after `after`.
pub fn has_new_torrents(movies: &[MovieData], after: DateTime<Utc>) -> bool {
    let after = after.timestamp();
    movies
        .iter()
        .flat_map(|movie| movie.torrents.iter())
        .any(|torrent| torrent.date_uploaded_unix > after)
}

/// Plan the handling of a fetched page.
///
/// An empty page ends the cycle. Otherwise the crawl continues to the next
/// page when the cursor has no watermark or the page holds torrents newer
/// than the watermark.
pub fn plan_page<'a, R: Rng>(
    forum: &ForumCursor,
    movies: &'a [MovieData],
    now: DateTime<Utc>,
    rng: &mut R,
) -> PagePlan<'a> {
    if movies.is_empty() {
        return PagePlan {
            continuation: None,
            movies,
        };
    }

    let keep_paging = match forum.after(now) {
        None => true,
        Some(after) => has_new_torrents(movies, after),
    };
    let continuation =
        keep_paging.then(|| forum.next(rng.random_range(CONTINUATION_DELAY_SECS)));

    PagePlan {
        continuation,
        movies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiders::yts::api::TorrentData;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn movie_uploaded_at(ts: i64) -> MovieData {
        MovieData {
            id: "1".into(),
            torrents: vec![TorrentData {
                hash: "h".into(),
                date_uploaded_unix: ts,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_page_stops() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_page(&ForumCursor::new(1, 1, None), &[], Utc::now(), &mut rng);
        assert!(plan.continuation.is_none());
        assert!(plan.movies.is_empty());
    }

    #[test]
    fn test_no_watermark_always_continues() {
        let mut rng = StdRng::seed_from_u64(1);
        let movies = vec![movie_uploaded_at(0)];
        let plan = plan_page(&ForumCursor::new(1, 3, None), &movies, Utc::now(), &mut rng);

        let next = plan.continuation.unwrap();
        assert_eq!(next.page, 4);
        assert_eq!(next.last, None);
        assert!(CONTINUATION_DELAY_SECS.contains(&next.delay));
        assert_eq!(plan.movies.len(), 1);
    }

    #[test]
    fn test_watermark_without_new_items_stops() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let old = (now - Duration::hours(3)).timestamp();
        let movies = vec![movie_uploaded_at(old), movie_uploaded_at(old - 60)];

        let plan = plan_page(&ForumCursor::new(1, 2, Some(1)), &movies, now, &mut rng);
        assert!(plan.continuation.is_none());
        assert_eq!(plan.movies.len(), 2);
    }

    #[test]
    fn test_watermark_with_new_item_continues() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let movies = vec![
            movie_uploaded_at((now - Duration::hours(5)).timestamp()),
            movie_uploaded_at((now - Duration::minutes(10)).timestamp()),
        ];

        let plan = plan_page(&ForumCursor::new(1, 2, Some(1)), &movies, now, &mut rng);
        let next = plan.continuation.unwrap();
        assert_eq!(next.page, 3);
        assert_eq!(next.last, Some(1));
    }

    #[test]
    fn test_zero_watermark_only_future_items_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let forum = ForumCursor::new(1, 1, Some(0));

        let recent = vec![movie_uploaded_at((now - Duration::seconds(1)).timestamp())];
        assert!(plan_page(&forum, &recent, now, &mut rng).continuation.is_none());

        let ahead = vec![movie_uploaded_at((now + Duration::seconds(5)).timestamp())];
        assert!(plan_page(&forum, &ahead, now, &mut rng).continuation.is_some());
    }

    #[test]
    fn test_detector_is_strict() {
        let now = Utc::now();
        let movies = vec![movie_uploaded_at(now.timestamp())];
        assert!(!has_new_torrents(&movies, now));
        assert!(has_new_torrents(&movies, now - Duration::seconds(1)));
    }

    #[test]
    fn test_detector_ignores_movies_without_torrents() {
        let movies = vec![MovieData::default()];
        assert!(!has_new_torrents(&movies, DateTime::UNIX_EPOCH));
    }

    #[test]
    fn test_seeded_delay_is_deterministic() {
        let movies = vec![movie_uploaded_at(0)];
        let forum = ForumCursor::new(1, 1, None);
        let now = Utc::now();

        let a = plan_page(&forum, &movies, now, &mut StdRng::seed_from_u64(7));
        let b = plan_page(&forum, &movies, now, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.continuation, b.continuation);
    }

    #[test]
    fn test_delay_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        let movies = vec![movie_uploaded_at(0)];
        let forum = ForumCursor::new(1, 1, None);
        for _ in 0..200 {
            let delay = plan_page(&forum, &movies, Utc::now(), &mut rng)
                .continuation
                .unwrap()
                .delay;
            assert!((1800..=3600).contains(&delay));
        }
    }
}
