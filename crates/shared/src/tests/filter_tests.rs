use super::*;
use crate::domain::{Conference, Deadline, Location};

fn conference(id: &str, name: &str) -> Conference {
    Conference::new(id, name)
}

fn names(conferences: &[Conference]) -> Vec<&str> {
    conferences.iter().map(|c| c.name.as_str()).collect()
}

fn dataset() -> Vec<Conference> {
    let mut neurips = conference("neurips-2025", "NeurIPS");
    neurips.description = Some("Neural information processing".into());
    neurips.tags = ["ml", "ai"].into_iter().map(String::from).collect();
    neurips.start_date = Some("2025-12-02".into());
    neurips.location = Location::Venue {
        venue: None,
        city: Some("San Diego".into()),
        country: Some("USA".into()),
    };
    neurips.deadlines = vec![Deadline {
        name: "Paper".into(),
        date: "2025-05-15T23:59:59".into(),
        timezone: Some("AoE".into()),
    }];

    let mut acl = conference("acl-2025", "ACL");
    acl.description = Some("Computational linguistics".into());
    acl.tags = ["nlp"].into_iter().map(String::from).collect();
    acl.start_date = Some("2025-07-27".into());
    acl.location = Location::Text("Vienna, Austria".into());
    acl.deadlines = vec![Deadline {
        name: "Paper".into(),
        date: "2025-02-15".into(),
        timezone: None,
    }];

    let mut cvpr = conference("cvpr-2026", "CVPR");
    cvpr.tags = ["cv", "ai"].into_iter().map(String::from).collect();
    cvpr.start_date = Some("2026-06-10".into());

    let mut unknown = conference("tbd", "Workshop on Things");
    unknown.start_date = Some("sometime".into());

    vec![neurips, acl, cvpr, unknown]
}

#[test]
fn unfiltered_criteria_only_reorders() {
    let mut input = dataset();
    input.push(conference("acl-2024", "acl"));
    let criteria = FilterCriteria::default().sorted_by(SortKey::Name, SortOrder::Asc);
    assert!(criteria.is_unfiltered());

    let mut expected = input.clone();
    expected.sort_by_key(|c| c.name.to_lowercase());

    let output = filter_and_sort(&input, &criteria);
    assert_eq!(output, expected);
    let ids: Vec<_> = output.iter().map(|c| c.id.as_str()).take(2).collect();
    assert_eq!(ids, ["acl-2025", "acl-2024"]);
}

#[test]
fn name_sort_scenario() {
    let input = vec![conference("a", "Zeta"), conference("b", "Alpha")];
    let criteria = FilterCriteria::default().sorted_by(SortKey::Name, SortOrder::Asc);
    assert_eq!(names(&filter_and_sort(&input, &criteria)), ["Alpha", "Zeta"]);
}

#[test]
fn name_sort_is_monotonic_in_both_directions() {
    let input = dataset();

    let ascending = filter_and_sort(
        &input,
        &FilterCriteria::default().sorted_by(SortKey::Name, SortOrder::Asc),
    );
    for pair in ascending.windows(2) {
        assert!(pair[0].name.to_lowercase() <= pair[1].name.to_lowercase());
    }

    let descending = filter_and_sort(
        &input,
        &FilterCriteria::default().sorted_by(SortKey::Name, SortOrder::Desc),
    );
    for pair in descending.windows(2) {
        assert!(pair[0].name.to_lowercase() >= pair[1].name.to_lowercase());
    }
}

#[test]
fn search_is_a_case_insensitive_substring() {
    let criteria = FilterCriteria::default().with_search("neur");
    assert_eq!(names(&filter_and_sort(&dataset(), &criteria)), ["NeurIPS"]);

    let by_description = FilterCriteria::default().with_search("LINGUISTICS");
    assert_eq!(names(&filter_and_sort(&dataset(), &by_description)), ["ACL"]);
}

#[test]
fn tags_match_on_any_intersection() {
    let criteria = FilterCriteria::default()
        .with_tags(["ai", "robotics"])
        .sorted_by(SortKey::Name, SortOrder::Asc);
    assert_eq!(names(&filter_and_sort(&dataset(), &criteria)), ["CVPR", "NeurIPS"]);
}

#[test]
fn year_uses_the_start_date_and_drops_unparseable_ones() {
    let criteria = FilterCriteria::default().with_year(Some(2025));
    let output = filter_and_sort(&dataset(), &criteria);
    assert_eq!(names(&output), ["ACL", "NeurIPS"]);
}

#[test]
fn location_matches_rendered_venue() {
    let criteria = FilterCriteria::default().with_location(Some("san diego".into()));
    assert_eq!(names(&filter_and_sort(&dataset(), &criteria)), ["NeurIPS"]);
}

#[test]
fn missing_dates_sort_last_in_both_directions() {
    let input = dataset();

    for order in [SortOrder::Asc, SortOrder::Desc] {
        let output = filter_and_sort(
            &input,
            &FilterCriteria::default().sorted_by(SortKey::StartDate, order),
        );
        assert_eq!(output.last().map(|c| c.name.as_str()), Some("Workshop on Things"));
    }

    let ascending = filter_and_sort(
        &input,
        &FilterCriteria::default().sorted_by(SortKey::StartDate, SortOrder::Asc),
    );
    assert_eq!(
        names(&ascending),
        ["ACL", "NeurIPS", "CVPR", "Workshop on Things"]
    );

    let descending = filter_and_sort(
        &input,
        &FilterCriteria::default().sorted_by(SortKey::StartDate, SortOrder::Desc),
    );
    assert_eq!(
        names(&descending),
        ["CVPR", "NeurIPS", "ACL", "Workshop on Things"]
    );
}

#[test]
fn deadline_sort_falls_back_to_start_date() {
    let output = filter_and_sort(&dataset(), &FilterCriteria::default());
    assert_eq!(
        names(&output),
        ["ACL", "NeurIPS", "CVPR", "Workshop on Things"]
    );
}

#[test]
fn ties_keep_input_order() {
    let mut first = conference("x1", "Same");
    first.start_date = Some("2025-01-01".into());
    let mut second = conference("x2", "Same");
    second.start_date = Some("2025-01-01T00:00:00Z".into());
    let third = conference("x3", "Same");
    let input = vec![first, second, third];

    for key in [SortKey::Name, SortKey::StartDate] {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let ids: Vec<String> = filter_and_sort(&input, &FilterCriteria::default().sorted_by(key, order))
                .into_iter()
                .map(|c| c.id.0)
                .collect();
            assert_eq!(ids, ["x1", "x2", "x3"], "{key} {order}");
        }
    }
}

#[test]
fn same_input_gives_same_output() {
    let input = dataset();
    let criteria = FilterCriteria::default().with_search("a");
    assert_eq!(
        filter_and_sort(&input, &criteria),
        filter_and_sort(&input, &criteria)
    );
}

#[test]
fn sort_keywords_parse_case_insensitively() {
    assert_eq!("Date".parse::<SortKey>(), Ok(SortKey::StartDate));
    assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
    assert!("popularity".parse::<SortKey>().is_err());
}
