//! End-to-end traversal tests against a mocked Canvas API.
//!
//! Every scenario drives a full `Synchronizer` run into a temp directory and
//! asserts on the produced file tree and the run report. No network.

use std::path::Path;

use tempfile::tempdir;

use canvas_sync_core::config::{ModuleSettings, SyncSettings};
use canvas_sync_core::contract::{
    AssignmentInfo, CourseInfo, FileInfo, FolderInfo, MockCanvasApi, ModuleInfo, ModuleItem,
    ModuleItemType, PageInfo,
};
use canvas_sync_core::hierarchy::Synchronizer;
use canvas_sync_core::report::SyncStatus;

fn settings(root: &Path) -> SyncSettings {
    SyncSettings {
        sync_path: root.to_path_buf(),
        courses_to_sync: Vec::new(),
        use_nicknames: false,
        modules: ModuleSettings::default(),
        sync_assignments: true,
        download_linked: true,
        avoid_duplicates: true,
    }
}

fn course_info(id: i64, code: &str) -> CourseInfo {
    CourseInfo {
        id,
        name: Some(code.to_string()),
        course_code: Some(code.to_string()),
    }
}

fn file_info(id: i64, name: &str, url: &str) -> FileInfo {
    FileInfo {
        id,
        display_name: name.to_string(),
        url: url.to_string(),
        locked_for_user: false,
    }
}

fn item(id: i64, title: &str, item_type: ModuleItemType, indent: i64, url: Option<&str>) -> ModuleItem {
    ModuleItem {
        id,
        title: title.to_string(),
        item_type,
        indent,
        url: url.map(str::to_string),
        external_url: None,
    }
}

#[tokio::test]
async fn dedup_skips_module_files_in_the_files_section() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            1,
            "slides.pdf",
            ModuleItemType::File,
            0,
            Some("https://canvas.example.edu/api/v1/files/42"),
        )])
    });
    api.expect_get_file_by_url()
        .returning(|_| Ok(file_info(42, "slides.pdf", "https://canvas.example.edu/files/42/download")));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| {
        Ok(vec![FolderInfo {
            id: 77,
            name: "course files".to_string(),
            full_name: "course files".to_string(),
        }])
    });
    api.expect_get_files_in_folder().returning(|_| {
        Ok(vec![
            file_info(42, "slides.pdf", "https://canvas.example.edu/files/42/download"),
            file_info(43, "extra.pdf", "https://canvas.example.edu/files/43/download"),
        ])
    });
    api.expect_get_folders_in_folder().returning(|_| Ok(vec![]));
    api.expect_download_file_payload()
        .returning(|_| Ok(b"payload".to_vec()));

    let report = Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let course_dir = out.path().join("BIO101");
    assert!(course_dir.join("1 - Week 1").join("slides.pdf").exists());
    assert!(course_dir.join("Other Files").join("extra.pdf").exists());
    assert!(
        !course_dir.join("Other Files").join("slides.pdf").exists(),
        "the file claimed by the module must not reappear in the Files section"
    );
    assert!(
        !course_dir.join("Assignments").exists(),
        "a course without assignments gets no Assignments folder"
    );
    assert_eq!(report.count(SyncStatus::Downloaded), 2);
}

#[tokio::test]
async fn duplicates_are_kept_when_deduplication_is_disabled() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            1,
            "slides.pdf",
            ModuleItemType::File,
            0,
            Some("https://canvas.example.edu/api/v1/files/42"),
        )])
    });
    api.expect_get_file_by_url()
        .returning(|_| Ok(file_info(42, "slides.pdf", "https://canvas.example.edu/files/42/download")));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| {
        Ok(vec![FolderInfo {
            id: 77,
            name: "course files".to_string(),
            full_name: "course files".to_string(),
        }])
    });
    api.expect_get_files_in_folder().returning(|_| {
        Ok(vec![file_info(
            42,
            "slides.pdf",
            "https://canvas.example.edu/files/42/download",
        )])
    });
    api.expect_get_folders_in_folder().returning(|_| Ok(vec![]));
    api.expect_download_file_payload()
        .returning(|_| Ok(b"payload".to_vec()));

    let mut config = settings(out.path());
    config.avoid_duplicates = false;

    Synchronizer::new(config).sync(&api).await.expect("sync should succeed");

    let course_dir = out.path().join("BIO101");
    assert!(course_dir.join("1 - Week 1").join("slides.pdf").exists());
    assert!(course_dir.join("Other Files").join("slides.pdf").exists());
}

#[tokio::test]
async fn second_run_downloads_nothing() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            1,
            "slides.pdf",
            ModuleItemType::File,
            0,
            Some("https://canvas.example.edu/api/v1/files/42"),
        )])
    });
    api.expect_get_file_by_url()
        .returning(|_| Ok(file_info(42, "slides.pdf", "https://canvas.example.edu/files/42/download")));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));
    // The payload must be fetched exactly once across both runs.
    api.expect_download_file_payload()
        .times(1)
        .returning(|_| Ok(b"payload".to_vec()));

    let synchronizer = Synchronizer::new(settings(out.path()));

    let first = synchronizer.sync(&api).await.expect("first run should succeed");
    assert_eq!(first.count(SyncStatus::Downloaded), 1);

    let second = synchronizer.sync(&api).await.expect("second run should succeed");
    assert_eq!(second.count(SyncStatus::Downloaded), 0);
    assert_eq!(second.count(SyncStatus::AlreadySynced), 1);
}

#[tokio::test]
async fn page_with_linked_files_is_pushed_down() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    let body = concat!(
        r#"<p>See <a data-api-endpoint="https://canvas.example.edu/api/v1/files/7" href="f">the slides</a>"#,
        r#" and <a href="https://example.org/notes.pdf">these notes</a>.</p>"#
    )
    .to_string();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            5,
            "Syllabus",
            ModuleItemType::Page,
            0,
            Some("https://canvas.example.edu/api/v1/courses/1/pages/syllabus"),
        )])
    });
    api.expect_get_page_by_url().returning(move |_| {
        Ok(PageInfo {
            page_id: 5,
            body: Some(body.clone()),
            html_url: Some("https://canvas.example.edu/courses/1/pages/syllabus".to_string()),
        })
    });
    api.expect_get_file_by_url()
        .returning(|_| Ok(file_info(7, "embedded.pdf", "https://canvas.example.edu/files/7/download")));
    api.expect_download_file_payload()
        .returning(|_| Ok(b"embedded".to_vec()));
    api.expect_download_external_payload()
        .returning(|_| Ok(b"external".to_vec()));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let module_dir = out.path().join("BIO101").join("1 - Week 1");
    let page_dir = module_dir.join("Syllabus");
    assert!(page_dir.is_dir(), "push-down must create a directory at the page's original path");
    assert!(page_dir.join("Syllabus.html").exists());
    assert!(page_dir.join("embedded.pdf").exists());
    assert!(page_dir.join("notes.pdf").exists());
    assert!(
        !module_dir.join("Syllabus.html").exists(),
        "the page artifact must live inside the pushed-down directory"
    );
}

#[tokio::test]
async fn page_without_linked_files_stays_in_place() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            5,
            "Syllabus",
            ModuleItemType::Page,
            0,
            Some("https://canvas.example.edu/api/v1/courses/1/pages/syllabus"),
        )])
    });
    api.expect_get_page_by_url().returning(|_| {
        Ok(PageInfo {
            page_id: 5,
            body: Some("<p>Just text.</p>".to_string()),
            html_url: None,
        })
    });
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let module_dir = out.path().join("BIO101").join("1 - Week 1");
    assert!(module_dir.join("Syllabus.html").exists());
    assert!(!module_dir.join("Syllabus").exists());
}

#[tokio::test]
async fn locked_files_are_reported_and_never_fetched() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            1,
            "exam.pdf",
            ModuleItemType::File,
            0,
            Some("https://canvas.example.edu/api/v1/files/50"),
        )])
    });
    api.expect_get_file_by_url().returning(|_| {
        Ok(FileInfo {
            id: 50,
            display_name: "exam.pdf".to_string(),
            url: "https://canvas.example.edu/files/50/download".to_string(),
            locked_for_user: true,
        })
    });
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));
    // No download_file_payload expectation: the mock panics if a locked
    // file is ever attempted.

    let report = Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let locked: Vec<_> = report
        .items()
        .filter(|i| i.status == SyncStatus::Locked)
        .collect();
    assert_eq!(locked.len(), 1, "a locked file reports its status exactly once");
    assert_eq!(locked[0].name, "exam.pdf");
    assert!(!out
        .path()
        .join("BIO101")
        .join("1 - Week 1")
        .join("exam.pdf")
        .exists());
}

#[tokio::test]
async fn invalid_linked_file_candidates_are_discarded() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    let long_name = "a".repeat(65);
    let body = format!(
        r#"<a href="https://example.org/notes.pdf">ok</a>
<a href="https://coursematerial.example/readme">no extension</a>
<a href="https://example.org/{long_name}.pdf">too long</a>"#
    );

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![item(
            5,
            "Reading list",
            ModuleItemType::Page,
            0,
            Some("https://canvas.example.edu/api/v1/courses/1/pages/reading-list"),
        )])
    });
    api.expect_get_page_by_url().returning(move |_| {
        Ok(PageInfo {
            page_id: 5,
            body: Some(body.clone()),
            html_url: None,
        })
    });
    api.expect_download_external_payload()
        .times(1)
        .returning(|_| Ok(b"notes".to_vec()));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let page_dir = out.path().join("BIO101").join("1 - Week 1").join("Reading list");
    assert!(page_dir.join("notes.pdf").exists());
    assert_eq!(
        std::fs::read_dir(&page_dir).unwrap().count(),
        2,
        "only the page artifact and the one valid linked file belong here"
    );
}

#[tokio::test]
async fn sub_headers_become_nested_directories() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![
            item(1, "outer.pdf", ModuleItemType::File, 0, Some("https://canvas.example.edu/api/v1/files/60")),
            item(2, "Readings", ModuleItemType::SubHeader, 0, None),
            item(3, "inner one.pdf", ModuleItemType::File, 1, Some("https://canvas.example.edu/api/v1/files/61")),
            item(4, "inner two.pdf", ModuleItemType::File, 1, Some("https://canvas.example.edu/api/v1/files/62")),
        ])
    });
    api.expect_get_file_by_url().returning(|url: &str| {
        let id: i64 = url.rsplit('/').next().unwrap().parse().unwrap();
        let name = match id {
            60 => "outer.pdf",
            61 => "inner one.pdf",
            _ => "inner two.pdf",
        };
        Ok(file_info(id, name, &format!("https://canvas.example.edu/files/{id}/download")))
    });
    api.expect_download_file_payload()
        .returning(|_| Ok(b"payload".to_vec()));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let module_dir = out.path().join("BIO101").join("1 - Week 1");
    assert!(module_dir.join("outer.pdf").exists());
    let group_dir = module_dir.join("1 - Readings");
    assert!(group_dir.is_dir());
    assert!(group_dir.join("inner one.pdf").exists());
    assert!(group_dir.join("inner two.pdf").exists());
}

#[tokio::test]
async fn missing_files_root_warns_and_continues() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| Ok(vec![]));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| {
        Ok(vec![FolderInfo {
            id: 80,
            name: "misc".to_string(),
            full_name: "somewhere else".to_string(),
        }])
    });

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("a course without the root files folder must not abort the run");

    assert!(!out.path().join("BIO101").join("Other Files").exists());
}

#[tokio::test]
async fn unselected_courses_are_skipped_without_discovery() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    // No other expectations: discovery on a skipped course would panic the
    // mock.

    let mut config = settings(out.path());
    config.courses_to_sync = vec!["MATH200".to_string()];

    let report = Synchronizer::new(config)
        .sync(&api)
        .await
        .expect("sync should succeed");

    assert!(report.courses[0].skipped);
    assert!(!out.path().join("BIO101").exists());
}

#[tokio::test]
async fn assignments_materialize_description_and_referenced_files() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| Ok(vec![]));
    api.expect_get_assignments_in_course().returning(|_| {
        Ok(vec![AssignmentInfo {
            id: 200,
            name: "Homework 1".to_string(),
            description: Some(
                r#"<p>Use <a data-api-endpoint="https://canvas.example.edu/api/v1/files/7" href="f">this template</a>.</p>"#
                    .to_string(),
            ),
            html_url: Some("https://canvas.example.edu/courses/1/assignments/200".to_string()),
        }])
    });
    api.expect_get_file_by_url()
        .returning(|_| Ok(file_info(7, "template.docx", "https://canvas.example.edu/files/7/download")));
    api.expect_download_file_payload()
        .returning(|_| Ok(b"template".to_vec()));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let assignment_dir = out.path().join("BIO101").join("Assignments").join("Homework 1");
    assert!(assignment_dir.join("Homework 1.html").exists());
    assert!(assignment_dir.join("template.docx").exists());

    let wrapper = std::fs::read_to_string(assignment_dir.join("Homework 1.html")).unwrap();
    assert!(wrapper.starts_with("<h1><strong>Homework 1</strong></h1>"));
    assert!(wrapper.contains("https://canvas.example.edu/courses/1/assignments/200"));
}

#[tokio::test]
async fn disabled_module_types_suppress_module_discovery() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));
    // get_modules_in_course has no expectation: calling it would panic.

    let mut config = settings(out.path());
    config.modules = ModuleSettings {
        files: false,
        html_pages: false,
        external_urls: false,
    };

    Synchronizer::new(config)
        .sync(&api)
        .await
        .expect("sync should succeed");

    assert!(out.path().join("BIO101").exists());
}

#[tokio::test]
async fn external_urls_become_shortcuts() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![ModuleItem {
            id: 9,
            title: "Lecture recording".to_string(),
            item_type: ModuleItemType::ExternalUrl,
            indent: 0,
            url: None,
            external_url: Some("https://videos.example.org/lecture-1".to_string()),
        }])
    });
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("sync should succeed");

    let module_dir = out.path().join("BIO101").join("1 - Week 1");
    let shortcuts: Vec<_> = std::fs::read_dir(&module_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(shortcuts.len(), 1);
    assert!(
        shortcuts[0].starts_with("Lecture recording."),
        "shortcut should be named after the item with a platform extension, got {shortcuts:?}"
    );
}

#[tokio::test]
async fn failed_course_listing_aborts_the_run() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Err("server unreachable".into()));

    let result = Synchronizer::new(settings(out.path())).sync(&api).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn failed_single_download_does_not_stop_siblings() {
    let out = tempdir().unwrap();
    let mut api = MockCanvasApi::new();

    api.expect_get_courses()
        .returning(|| Ok(vec![course_info(1, "BIO101")]));
    api.expect_get_modules_in_course().returning(|_| {
        Ok(vec![ModuleInfo {
            id: 10,
            name: "Week 1".to_string(),
        }])
    });
    api.expect_get_items_in_module().returning(|_, _| {
        Ok(vec![
            item(1, "broken.pdf", ModuleItemType::File, 0, Some("https://canvas.example.edu/api/v1/files/60")),
            item(2, "fine.pdf", ModuleItemType::File, 0, Some("https://canvas.example.edu/api/v1/files/61")),
        ])
    });
    api.expect_get_file_by_url().returning(|url: &str| {
        if url.ends_with("/60") {
            Ok(file_info(60, "broken.pdf", "https://canvas.example.edu/files/60/download"))
        } else {
            Ok(file_info(61, "fine.pdf", "https://canvas.example.edu/files/61/download"))
        }
    });
    api.expect_download_file_payload().returning(|url: &str| {
        if url.contains("/60/") {
            Err("connection reset".into())
        } else {
            Ok(b"payload".to_vec())
        }
    });
    api.expect_get_assignments_in_course().returning(|_| Ok(vec![]));
    api.expect_get_folders_in_course().returning(|_| Ok(vec![]));

    let report = Synchronizer::new(settings(out.path()))
        .sync(&api)
        .await
        .expect("one failed download must not abort the run");

    assert_eq!(report.count(SyncStatus::Failed), 1);
    assert_eq!(report.count(SyncStatus::Downloaded), 1);
    let module_dir = out.path().join("BIO101").join("1 - Week 1");
    assert!(!module_dir.join("broken.pdf").exists());
    assert!(module_dir.join("fine.pdf").exists());
}
