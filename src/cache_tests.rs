use super::*;
use crate::models::Media;
use uuid::Uuid;

fn query(raw: &str) -> SearchQuery {
    SearchQuery::parse(raw).unwrap()
}

fn create_test_items(prefix: &str, count: usize) -> Arc<Vec<PhotoItem>> {
    let items = (1..=count)
        .map(|i| PhotoItem {
            id: Uuid::new_v4(),
            title: format!("{} photo {}", prefix, i),
            link: format!("https://example.com/photos/{}", i),
            media: Media { m: format!("https://example.com/{}_m.jpg", i) },
            taken: "2023-08-10T12:21:28-08:00".to_string(),
            description: String::new(),
            published: "2024-07-09T21:44:08Z".to_string(),
            author: "nobody@flickr.com (\"tester\")".to_string(),
            author_id: "1@N01".to_string(),
            tags: prefix.to_string(),
        })
        .collect();
    Arc::new(items)
}

#[test]
fn test_lookup_miss_on_empty_cache() {
    let cache = QueryCache::new();
    assert!(cache.lookup(&query("cats")).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_store_then_lookup_preserves_order() {
    let mut cache = QueryCache::new();
    let items = create_test_items("cats", 3);

    cache.store(query("cats"), items.clone());

    let cached = cache.lookup(&query("cats")).unwrap();
    let titles: Vec<_> = cached.iter().map(|i| i.title.clone()).collect();
    assert_eq!(titles, vec!["cats photo 1", "cats photo 2", "cats photo 3"]);
    assert!(Arc::ptr_eq(&cached, &items));
}

#[test]
fn test_keys_are_exact() {
    let mut cache = QueryCache::new();
    cache.store(query("cats"), create_test_items("cats", 1));

    assert!(cache.lookup(&query("Cats")).is_none());
    assert!(cache.lookup(&query("cats dogs")).is_none());
    // trimming happens before the key is built
    assert!(cache.lookup(&query("  cats  ")).is_some());
}

#[test]
fn test_store_overwrites_existing_entry() {
    let mut cache = QueryCache::new();
    cache.store(query("cats"), create_test_items("old", 2));
    cache.store(query("cats"), create_test_items("new", 1));

    let cached = cache.lookup(&query("cats")).unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "new photo 1");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_empty_result_is_a_valid_entry() {
    let mut cache = QueryCache::new();
    cache.store(query("nothing"), Arc::new(Vec::new()));

    let cached = cache.lookup(&query("nothing"));
    assert!(cached.is_some_and(|items| items.is_empty()));
}
