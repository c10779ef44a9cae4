// Integration tests for the STRM organizer against a real temporary tree

use std::fs;
use std::path::{Path, PathBuf};

use jellyfin_strm::layout::{hash_bucket, PathLayoutPlanner};
use jellyfin_strm::{
    Classification, ConfigBuilder, DuplicateHandling, FilenameNormalizer, ItemOutcome,
    LocalFilesystem, MediaItem, MediaOrganizer, OrganizerConfig, OrganizerError, WebhookPayload,
};
use tempfile::TempDir;

fn base_of(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

fn config(dir: &TempDir) -> ConfigBuilder {
    ConfigBuilder::new().base_path(dir.path())
}

fn organizer(config: OrganizerConfig) -> MediaOrganizer {
    MediaOrganizer::new(config).unwrap()
}

fn fill_with_strm(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        fs::write(dir.join(format!("filler_{i}.strm")), "http://filler").unwrap();
    }
}

fn written(outcome: ItemOutcome) -> PathBuf {
    match outcome {
        ItemOutcome::Written(path) => path,
        other => panic!("expected a write, got {other:?}"),
    }
}

#[test]
fn test_movie_lands_in_alphabet_bucket() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/amazing.mkv", "Amazing Film (2003) 1080p.mkv"))
            .unwrap(),
    );

    assert_eq!(path, base_of(&dir).join("Movies/A-C/Amazing Film (2003).strm"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "http://cdn/amazing.mkv");
}

#[test]
fn test_scene_episode_goes_to_season_folder() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/ep.mkv", "Movie.Name.S01E02.1080p.mkv"))
            .unwrap(),
    );

    assert_eq!(
        path,
        base_of(&dir).join("TV Shows/Movie Name/Season 01/Movie.Name.S01E02.strm")
    );
}

#[test]
fn test_full_movie_bucket_splits_by_hash() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    fill_with_strm(&base.join("Movies/G-I"), 3);
    let organizer = organizer(config(&dir).auto_split(true, 3).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/heat.mkv", "Heat (1995).mkv"))
            .unwrap(),
    );

    let expected = base
        .join("Movies/G-I")
        .join(format!("movie_{}", hash_bucket("Heat")))
        .join("Heat (1995).strm");
    assert_eq!(path, expected);
}

#[test]
fn test_bucket_below_threshold_is_not_split() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    fill_with_strm(&base.join("Movies/G-I"), 2);
    let organizer = organizer(config(&dir).auto_split(true, 3).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/heat.mkv", "Heat (1995).mkv"))
            .unwrap(),
    );
    assert_eq!(path, base.join("Movies/G-I/Heat (1995).strm"));
}

#[test]
fn test_auto_split_disabled_ignores_threshold() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    fill_with_strm(&base.join("Movies/G-I"), 5);
    let organizer = organizer(config(&dir).auto_split(false, 3).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/heat.mkv", "Heat (1995).mkv"))
            .unwrap(),
    );
    assert_eq!(path, base.join("Movies/G-I/Heat (1995).strm"));
}

#[test]
fn test_full_season_splits_into_episode_ranges() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    fill_with_strm(&base.join("TV Shows/The Show/Season 01"), 3);
    let organizer = organizer(config(&dir).auto_split(true, 3).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/e150.mkv", "The Show S01E150.mkv"))
            .unwrap(),
    );

    assert_eq!(
        path.parent().unwrap(),
        base.join("TV Shows/The Show/Season 01/Episodes 101-200")
    );
}

#[test]
fn test_year_only_title_goes_to_digit_bucket() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/1917.mkv", "1917.mkv"))
            .unwrap(),
    );
    assert_eq!(path, base_of(&dir).join("Movies/0-9/1917.strm"));
}

#[test]
fn test_full_series_folder_without_season_splits_by_hash() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    let name = "Planet Earth Season 2 Episode 5.mkv";
    let series_dir = base.join("TV Shows/Planet Earth Season 2 Episode 5");
    fill_with_strm(&series_dir, 3);
    let organizer = organizer(config(&dir).auto_split(true, 3).build().unwrap());

    let plan = organizer.plan_item(&MediaItem::new("http://cdn/pe", name)).unwrap();
    assert_eq!(
        plan.classification,
        Some(Classification::TvSeries {
            series_name: "Planet Earth Season 2 Episode 5".to_string(),
            season: None,
            episode: None,
        })
    );

    let display_name = FilenameNormalizer::new().unwrap().normalize(name).display_name;
    let path = written(organizer.process_item(&MediaItem::new("http://cdn/pe", name)).unwrap());
    assert_eq!(
        path.parent().unwrap(),
        series_dir.join(format!("episode_{}", hash_bucket(&display_name)))
    );
}

#[test]
fn test_series_folder_without_season_below_threshold() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    let series_dir = base.join("TV Shows/Planet Earth Season 2 Episode 5");
    fill_with_strm(&series_dir, 2);
    let organizer = organizer(config(&dir).auto_split(true, 3).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/pe", "Planet Earth Season 2 Episode 5.mkv"))
            .unwrap(),
    );
    assert_eq!(path.parent().unwrap(), series_dir);
}

#[test]
fn test_full_season_without_episode_number_stays_in_season() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    let season_dir = base.join("TV Shows/The Show/Season 01");
    fill_with_strm(&season_dir, 3);

    let config = config(&dir).auto_split(true, 3).build().unwrap();
    let fs = LocalFilesystem;
    let normalizer = FilenameNormalizer::new().unwrap();
    let planner = PathLayoutPlanner::new(&config, &fs, &normalizer);

    let item = MediaItem::new("http://cdn/special", "The Show Season 1 Special.mkv");
    let classification = Classification::TvSeries {
        series_name: "The Show".to_string(),
        season: Some(1),
        episode: None,
    };
    let target = planner
        .target_directory(&item, Some(&classification), &normalizer.normalize(&item.name))
        .unwrap();
    assert_eq!(target, season_dir);

    let numbered = Classification::TvSeries {
        series_name: "The Show".to_string(),
        season: Some(1),
        episode: Some(7),
    };
    let target = planner
        .target_directory(&item, Some(&numbered), &normalizer.normalize(&item.name))
        .unwrap();
    assert_eq!(target, season_dir.join("Episodes 001-100"));
}

#[test]
fn test_existing_series_folder_is_reused_ignoring_case() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    fs::create_dir_all(base.join("TV Shows/the show")).unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/e1.mkv", "The Show S01E01.mkv"))
            .unwrap(),
    );

    assert_eq!(path.parent().unwrap(), base.join("TV Shows/the show/Season 01"));
    let series: Vec<_> = fs::read_dir(base.join("TV Shows"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(series, vec!["the show".to_string()]);
}

#[test]
fn test_skip_policy_keeps_first_file() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(
        config(&dir)
            .duplicate_handling(DuplicateHandling::Skip)
            .build()
            .unwrap(),
    );

    let first = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/one", "Amazing Film (2003).mkv"))
            .unwrap(),
    );
    let second = organizer
        .process_item(&MediaItem::new("http://cdn/two", "Amazing Film (2003).mkv"))
        .unwrap();

    assert_eq!(second, ItemOutcome::Skipped(first.clone()));
    assert_eq!(fs::read_to_string(&first).unwrap(), "http://cdn/one");
    assert_eq!(fs::read_dir(first.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn test_overwrite_policy_replaces_content() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(
        config(&dir)
            .duplicate_handling(DuplicateHandling::Overwrite)
            .build()
            .unwrap(),
    );

    let first = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/one", "Amazing Film (2003).mkv"))
            .unwrap(),
    );
    let second = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/two", "Amazing Film (2003).mkv"))
            .unwrap(),
    );

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "http://cdn/two");
}

#[test]
fn test_create_versions_policy_numbers_copies() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(
        config(&dir)
            .duplicate_handling(DuplicateHandling::CreateVersions)
            .build()
            .unwrap(),
    );

    let names: Vec<String> = ["http://cdn/a", "http://cdn/b", "http://cdn/c"]
        .iter()
        .map(|url| {
            let path = written(
                organizer
                    .process_item(&MediaItem::new(*url, "Amazing Film (2003).mkv"))
                    .unwrap(),
            );
            path.file_name().unwrap().to_string_lossy().to_string()
        })
        .collect();

    assert_eq!(
        names,
        vec![
            "Amazing Film (2003).strm".to_string(),
            "Amazing Film (2003)_1.strm".to_string(),
            "Amazing Film (2003)_2.strm".to_string(),
        ]
    );
}

#[test]
fn test_escaping_pattern_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(
        config(&dir)
            .media_type_detection(false)
            .filename_pattern("../../etc/{name}")
            .build()
            .unwrap(),
    );

    let err = organizer
        .process_item(&MediaItem::new("http://cdn/x", "Amazing Film (2003).mkv"))
        .unwrap_err();

    assert!(matches!(err, OrganizerError::PathEscape { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_traversal_in_item_name_stays_inside_base() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/x", "../../etc/passwd"))
            .unwrap(),
    );

    assert!(path.starts_with(base_of(&dir)));
    assert!(!path.file_name().unwrap().to_string_lossy().contains('/'));
}

#[test]
fn test_parent_grouping_adds_parent_folder() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    let organizer = organizer(config(&dir).group_by_parent(true).build().unwrap());

    let grouped = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/a", "Amazing Film (2003).mkv").with_parent(42))
            .unwrap(),
    );
    let ungrouped = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/b", "Another Film (2004).mkv"))
            .unwrap(),
    );

    assert_eq!(grouped, base.join("Movies/A-C/parent_42/Amazing Film (2003).strm"));
    assert_eq!(ungrouped, base.join("Movies/A-C/Another Film (2004).strm"));
}

#[test]
fn test_detection_disabled_writes_to_base() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).media_type_detection(false).build().unwrap());

    let plan = organizer
        .plan_item(&MediaItem::new("http://cdn/ep", "The Show S01E01.mkv"))
        .unwrap();
    assert_eq!(plan.media_type(), None);
    assert_eq!(plan.directory, base_of(&dir));
}

#[test]
fn test_filename_pattern_wraps_display_name() {
    let dir = TempDir::new().unwrap();
    let organizer = organizer(config(&dir).filename_pattern("[web] {name}").build().unwrap());

    let path = written(
        organizer
            .process_item(&MediaItem::new("http://cdn/a", "Amazing Film (2003).mkv"))
            .unwrap(),
    );
    assert_eq!(path.file_name().unwrap(), "[web] Amazing Film (2003).strm");
}

#[test]
fn test_failed_item_does_not_stop_batch() {
    let dir = TempDir::new().unwrap();
    // a plain file where the TV tree should be makes every episode fail
    fs::write(dir.path().join("TV Shows"), "not a directory").unwrap();
    let organizer = organizer(config(&dir).build().unwrap());

    let payload = WebhookPayload::from_json(
        r#"{ "items": [
            { "url": "http://cdn/ep", "name": "The Show S01E01.mkv", "parentId": 7 },
            { "url": "http://cdn/movie", "name": "Amazing Film (2003).mkv" }
        ] }"#,
    )
    .unwrap();

    let report = organizer.process_batch(&payload.items);

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.written(), 1);
    assert!(report.items[0].result.is_err());
    assert!(base_of(&dir).join("Movies/A-C/Amazing Film (2003).strm").exists());
}

#[test]
fn test_batch_sees_its_own_writes() {
    let dir = TempDir::new().unwrap();
    let base = base_of(&dir);
    let organizer = organizer(config(&dir).auto_split(true, 2).build().unwrap());

    let items: Vec<MediaItem> = ["Alpha (2001).mkv", "Bravo (2002).mkv", "Charlie (2003).mkv"]
        .iter()
        .map(|name| MediaItem::new("http://cdn/x", *name))
        .collect();
    let report = organizer.process_batch(&items);
    assert_eq!(report.written(), 3);

    let third = match &report.items[2].result {
        Ok(ItemOutcome::Written(path)) => path.clone(),
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(
        third.parent().unwrap(),
        base.join("Movies/A-C").join(format!("movie_{}", hash_bucket("Charlie")))
    );
}
