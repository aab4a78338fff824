//! Property-based tests for task validation and routing.
//!
//! Uses proptest to verify:
//! 1. A `TagSet` never holds duplicates or blank tags and keeps first-seen order.
//! 2. A normalized task has a trimmed, non-empty title within the limit.
//! 3. Task JSON always uses the camelCase field names of the service.
//! 4. Endpoint URLs stay under the base path for any id.

use proptest::prelude::*;
use taskgrid_proto::{Endpoint, NewTask, RouteStyle, TagSet, TaskId, ValidationError};
use url::Url;

fn arb_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        "[A-Za-z]{1,8}",
        " [A-Za-z]{1,8} ",
    ]
}

proptest! {
    #[test]
    fn tag_set_has_no_duplicates_or_blanks(tags in prop::collection::vec(arb_tag(), 0..20)) {
        let set: TagSet = tags.iter().collect();

        let mut seen = Vec::new();
        for tag in &tags {
            let t = tag.trim();
            if !t.is_empty() && !seen.iter().any(|s: &String| s == t) {
                seen.push(t.to_string());
            }
        }
        prop_assert_eq!(set.as_slice(), seen.as_slice());
        for tag in set.as_slice() {
            prop_assert!(!tag.trim().is_empty());
        }
    }

    #[test]
    fn normalized_title_is_trimmed_and_bounded(
        title in "\\PC{0,40}",
        pad in " {0,3}",
        max in 1usize..32,
    ) {
        let raw = format!("{pad}{title}{pad}");
        match NewTask::new(raw.clone(), "todo").normalized(max) {
            Ok(task) => {
                prop_assert_eq!(task.title.as_str(), raw.trim());
                prop_assert!(!task.title.is_empty());
                prop_assert!(task.title.chars().count() <= max);
            }
            Err(ValidationError::TitleEmpty) => prop_assert!(raw.trim().is_empty()),
            Err(ValidationError::TitleTooLong { len, max: limit }) => {
                prop_assert_eq!(limit, max);
                prop_assert_eq!(len, raw.trim().chars().count());
                prop_assert!(len > max);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn task_json_uses_service_field_names(
        title in "[a-z ]{1,20}",
        due in proptest::option::of(Just("2025-12-01".to_string())),
        id in "[a-z0-9-]{1,12}",
    ) {
        let mut draft = NewTask::new(title, "todo");
        if let Some(due) = due.clone() {
            draft = draft.with_due_date(due);
        }
        let value = serde_json::to_value(draft.into_task(TaskId::new(id.clone()))).unwrap();

        prop_assert_eq!(&value["id"], &serde_json::json!(id));
        prop_assert_eq!(&value["columnId"], &serde_json::json!("todo"));
        prop_assert!(value.get("column_id").is_none());
        prop_assert_eq!(value.get("dueDate").is_some(), due.is_some());
        prop_assert!(value.get("image").is_none());
    }

    #[test]
    fn endpoint_urls_stay_under_base(id in "\\PC{1,16}", legacy in any::<bool>()) {
        let base = Url::parse("http://localhost:3000/api").unwrap();
        let style = if legacy { RouteStyle::Legacy } else { RouteStyle::Rest };
        let id = TaskId::new(id);

        for endpoint in [
            Endpoint::update_task(style, &id),
            Endpoint::delete_task(style, &id),
            Endpoint::move_task(),
        ] {
            let url = endpoint.url(&base);
            prop_assert_eq!(url.host_str(), Some("localhost"));
            prop_assert!(url.path().starts_with("/api/"), "{}", url);
            prop_assert!(url.query().is_none());
            prop_assert!(url.fragment().is_none());
        }
    }
}
