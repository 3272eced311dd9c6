use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use book_manager_catalog::ValidationError;
use book_manager_catalog::types::*;
use book_manager_db::{
    OperationError, authors_for_book, catalog_stats, find_book_by_title, find_reading,
    get_or_create_shelf, insert_user, list_import_logs, open_memory, readings_for_user,
};
use book_manager_import::*;
use chrono::NaiveDate;
use tempfile::NamedTempFile;

const HEADER: [&str; 18] = [
    "Book Id",
    "Title",
    "Author",
    "Additional Authors",
    "ISBN",
    "ISBN13",
    "My Rating",
    "Publisher",
    "Binding",
    "Number of Pages",
    "Year Published",
    "Original Publication Year",
    "Date Read",
    "Date Added",
    "Exclusive Shelf",
    "My Review",
    "Private Notes",
    "Read Count",
];

type Fields = HashMap<&'static str, String>;

fn dune() -> Fields {
    [
        ("Book Id", "234225"),
        ("Title", "Dune"),
        ("Author", "Frank Herbert"),
        ("Additional Authors", ""),
        ("ISBN", "=\"0441172717\""),
        ("ISBN13", "=\"9780441172719\""),
        ("My Rating", "4"),
        ("Publisher", "Ace"),
        ("Binding", "Paperback"),
        ("Number of Pages", "412"),
        ("Year Published", "1990"),
        ("Original Publication Year", "1965"),
        ("Date Read", "2019/07/04"),
        ("Date Added", "2019/06/01"),
        ("Exclusive Shelf", "read"),
        ("My Review", ""),
        ("Private Notes", ""),
        ("Read Count", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
}

fn with(mut fields: Fields, key: &'static str, value: &str) -> Fields {
    fields.insert(key, value.to_string());
    fields
}

fn write_export_with_header(header: &[&'static str], rows: &[Fields]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let mut writer = csv::Writer::from_path(file.path()).unwrap();
    writer.write_record(header).unwrap();
    for row in rows {
        writer
            .write_record(header.iter().map(|h| row.get(h).map(String::as_str).unwrap_or("")))
            .unwrap();
    }
    writer.flush().unwrap();
    file
}

fn write_export(rows: &[Fields]) -> NamedTempFile {
    write_export_with_header(&HEADER, rows)
}

fn setup() -> (rusqlite::Connection, User) {
    let conn = open_memory().unwrap();
    let user = insert_user(&conn, "alice").unwrap();
    (conn, user)
}

fn run(
    conn: &rusqlite::Connection,
    path: &Path,
    user: &User,
    overwrite: bool,
) -> Result<ImportStats, ImportError> {
    import_goodreads(
        conn,
        path,
        user,
        &ImportOptions { overwrite },
        &SilentAudit,
        Some(&SilentProgress),
    )
}

fn book(conn: &rusqlite::Connection, title: &str) -> Book {
    find_book_by_title(conn, title).unwrap().unwrap()
}

fn reading(conn: &rusqlite::Connection, title: &str, user: &User) -> Reading {
    find_reading(conn, book(conn, title).id, user.id)
        .unwrap()
        .unwrap()
}

#[derive(Default)]
struct RecordingAudit {
    events: RefCell<Vec<AuditEvent>>,
}

impl AuditSink for RecordingAudit {
    fn record(&self, event: &AuditEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl RecordingAudit {
    fn lines(&self) -> Vec<String> {
        self.events.borrow().iter().map(ToString::to_string).collect()
    }
}

#[derive(Default)]
struct RecordingProgress {
    rows: RefCell<Vec<(usize, usize, String)>>,
    phases: RefCell<Vec<ImportPhase>>,
    completed_rows: RefCell<Option<u64>>,
}

impl ImportProgress for RecordingProgress {
    fn on_row(&self, current: usize, total: usize, title: &str) {
        self.rows
            .borrow_mut()
            .push((current, total, title.to_string()));
    }

    fn on_phase(&self, phase: ImportPhase) {
        self.phases.borrow_mut().push(phase);
    }

    fn on_complete(&self, stats: &ImportStats) {
        *self.completed_rows.borrow_mut() = Some(stats.rows);
    }
}

// ── Happy path ──────────────────────────────────────────────────────────────

#[test]
fn imports_book_with_lookups_and_reading() {
    let (conn, user) = setup();
    let file = write_export(&[dune()]);

    let stats = run(&conn, file.path(), &user, false).unwrap();
    assert_eq!(stats.rows, 1);
    assert_eq!(stats.bindings_created, 1);
    assert_eq!(stats.publishers_created, 1);
    assert_eq!(stats.authors_created, 1);
    assert_eq!(stats.books_created, 1);
    assert_eq!(stats.readings_created, 1);
    assert_eq!(stats.shelves_created, 1);

    let dune = book(&conn, "Dune");
    assert_eq!(dune.slug, "dune");
    assert_eq!(dune.isbn.as_deref(), Some("0441172717"));
    assert_eq!(dune.isbn13.as_deref(), Some("9780441172719"));
    assert_eq!(dune.num_pages, Some(412));
    assert_eq!(dune.year_published, Some(1990));
    assert_eq!(dune.original_publication_year, Some(1965));
    assert!(dune.binding_id.is_some());
    assert!(dune.publisher_id.is_some());

    let authors = authors_for_book(&conn, dune.id).unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].author.full_name, "Frank Herbert");
    assert_eq!(authors[0].author.first_name, "Frank");
    assert_eq!(authors[0].author.last_name, "Herbert");
    assert_eq!(authors[0].order, 1);

    let r = reading(&conn, "Dune", &user);
    assert_eq!(r.rating, 4);
    assert_eq!(r.read_count, 1);
    assert_eq!(r.date_added, NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
    assert_eq!(r.date_read, NaiveDate::from_ymd_opt(2019, 7, 4));
    assert_eq!(r.review, None);
    assert_eq!(r.private_notes, None);

    let (shelf, created) = get_or_create_shelf(&conn, user.id, "read").unwrap();
    assert!(!created);
    assert_eq!(r.shelf_id, Some(shelf.id));
}

#[test]
fn reimport_is_idempotent() {
    let (conn, user) = setup();
    let file = write_export(&[dune(), with(with(dune(), "Title", "Emma"), "Author", "Jane Austen")]);

    run(&conn, file.path(), &user, false).unwrap();
    let before = catalog_stats(&conn).unwrap();

    let stats = run(&conn, file.path(), &user, false).unwrap();
    assert_eq!(catalog_stats(&conn).unwrap(), before);
    assert_eq!(stats.bindings_created, 0);
    assert_eq!(stats.publishers_created, 0);
    assert_eq!(stats.authors_created, 0);
    assert_eq!(stats.books_created, 0);
    assert_eq!(stats.books_unchanged, 2);
    assert_eq!(stats.readings_created, 0);
    assert_eq!(stats.readings_updated, 2);
    assert_eq!(stats.shelves_created, 0);

    assert_eq!(before.books, 2);
    assert_eq!(before.authors, 2);
    assert_eq!(before.bindings, 1);
    assert_eq!(before.publishers, 1);
    assert_eq!(before.readings, 2);
}

#[test]
fn duplicate_title_in_one_file_shares_a_book() {
    let (conn, user) = setup();
    let file = write_export(&[dune(), with(dune(), "My Rating", "5")]);

    let stats = run(&conn, file.path(), &user, false).unwrap();
    assert_eq!(stats.books_created, 1);
    assert_eq!(stats.books_unchanged, 1);
    assert_eq!(stats.readings_created, 1);
    assert_eq!(stats.readings_updated, 1);
    assert_eq!(reading(&conn, "Dune", &user).rating, 5);
}

// ── Authors ─────────────────────────────────────────────────────────────────

#[test]
fn authors_are_linked_in_billing_order() {
    let (conn, user) = setup();
    let row = with(
        with(with(dune(), "Title", "Anthology"), "Author", "Jane Doe"),
        "Additional Authors",
        "John Smith, Ann Lee",
    );
    let file = write_export(&[row]);
    run(&conn, file.path(), &user, false).unwrap();

    let links: Vec<(String, u32)> = authors_for_book(&conn, book(&conn, "Anthology").id)
        .unwrap()
        .into_iter()
        .map(|link| (link.author.full_name, link.order))
        .collect();
    assert_eq!(
        links,
        vec![
            ("Jane Doe".to_string(), 1),
            ("John Smith".to_string(), 2),
            ("Ann Lee".to_string(), 3),
        ]
    );
}

#[test]
fn inverted_name_resolves_to_same_author() {
    let (conn, user) = setup();
    let file = write_export(&[
        with(with(dune(), "Title", "First"), "Author", "Jane Q. Doe"),
        with(with(dune(), "Title", "Second"), "Author", "Doe, Jane Q."),
    ]);

    let stats = run(&conn, file.path(), &user, false).unwrap();
    assert_eq!(stats.authors_created, 1);
    assert_eq!(catalog_stats(&conn).unwrap().authors, 1);

    let first = &authors_for_book(&conn, book(&conn, "First").id).unwrap()[0];
    let second = &authors_for_book(&conn, book(&conn, "Second").id).unwrap()[0];
    assert_eq!(first.author.id, second.author.id);
    assert_eq!(first.author.full_name, "Jane Q. Doe");
    assert_eq!(first.author.middle_name.as_deref(), Some("Q."));
}

#[test]
fn author_components_do_not_depend_on_spelling_order() {
    let (conn, user) = setup();
    let file = write_export(&[
        with(with(dune(), "Title", "Fables"), "Author", "Fontaine, Jean de la"),
        with(with(dune(), "Title", "Contes"), "Author", "Jean de la Fontaine"),
    ]);
    run(&conn, file.path(), &user, false).unwrap();

    let links = authors_for_book(&conn, book(&conn, "Fables").id).unwrap();
    let author = &links[0].author;
    assert_eq!(catalog_stats(&conn).unwrap().authors, 1);
    assert_eq!(author.full_name, "Jean de la Fontaine");
    assert_eq!(author.first_name, "Jean");
    assert_eq!(author.middle_name, None);
    assert_eq!(author.last_name, "de la Fontaine");
}

#[test]
fn blank_author_columns_link_nothing() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "Author", "")]);
    run(&conn, file.path(), &user, false).unwrap();

    assert!(authors_for_book(&conn, book(&conn, "Dune").id).unwrap().is_empty());
    assert_eq!(catalog_stats(&conn).unwrap().authors, 0);
}

// ── Overwrite policy ────────────────────────────────────────────────────────

#[test]
fn existing_book_untouched_without_overwrite() {
    let (conn, user) = setup();
    run(&conn, write_export(&[dune()]).path(), &user, false).unwrap();

    let changed = write_export(&[with(dune(), "Number of Pages", "500")]);
    let stats = run(&conn, changed.path(), &user, false).unwrap();
    assert_eq!(stats.books_unchanged, 1);
    assert_eq!(stats.books_updated, 0);
    assert_eq!(book(&conn, "Dune").num_pages, Some(412));
}

#[test]
fn existing_book_repopulated_with_overwrite() {
    let (conn, user) = setup();
    run(&conn, write_export(&[dune()]).path(), &user, false).unwrap();

    let changed = write_export(&[with(
        with(dune(), "Number of Pages", "500"),
        "Binding",
        "Hardcover",
    )]);
    let stats = run(&conn, changed.path(), &user, true).unwrap();
    assert_eq!(stats.books_updated, 1);
    assert_eq!(stats.books_unchanged, 0);

    let dune = book(&conn, "Dune");
    assert_eq!(dune.num_pages, Some(500));
    assert_eq!(dune.slug, "dune");
    assert_eq!(catalog_stats(&conn).unwrap().bindings, 2);
}

#[test]
fn overwrite_rebuilds_author_links() {
    let (conn, user) = setup();
    let original = with(dune(), "Additional Authors", "Brian Herbert");
    run(&conn, write_export(&[original]).path(), &user, false).unwrap();
    assert_eq!(authors_for_book(&conn, book(&conn, "Dune").id).unwrap().len(), 2);

    let solo = write_export(&[with(dune(), "Author", "Kevin J. Anderson")]);
    run(&conn, solo.path(), &user, true).unwrap();

    let links = authors_for_book(&conn, book(&conn, "Dune").id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].author.full_name, "Kevin J. Anderson");
    assert_eq!(links[0].order, 1);
}

#[test]
fn empty_isbn_is_stored_as_none() {
    let (conn, user) = setup();
    let file = write_export(&[with(with(dune(), "ISBN", "=\"\""), "ISBN13", "")]);
    run(&conn, file.path(), &user, false).unwrap();

    let dune = book(&conn, "Dune");
    assert_eq!(dune.isbn, None);
    assert_eq!(dune.isbn13, None);
}

// ── Readings ────────────────────────────────────────────────────────────────

#[test]
fn reading_refreshed_even_without_overwrite() {
    let (conn, user) = setup();
    run(&conn, write_export(&[dune()]).path(), &user, false).unwrap();

    let rerated = write_export(&[with(with(dune(), "My Rating", "5"), "Read Count", "2")]);
    run(&conn, rerated.path(), &user, false).unwrap();

    let readings = readings_for_user(&conn, user.id).unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].rating, 5);
    assert_eq!(readings[0].read_count, 2);
}

#[test]
fn blank_fields_keep_stored_reading_values() {
    let (conn, user) = setup();
    let reviewed = with(with(dune(), "My Review", "Spice!"), "Private Notes", "Loaned to Bob");
    run(&conn, write_export(&[reviewed]).path(), &user, false).unwrap();

    let blank = write_export(&[with(dune(), "Date Read", "")]);
    run(&conn, blank.path(), &user, false).unwrap();

    let r = reading(&conn, "Dune", &user);
    assert_eq!(r.review.as_deref(), Some("Spice!"));
    assert_eq!(r.private_notes.as_deref(), Some("Loaned to Bob"));
    assert_eq!(r.date_read, NaiveDate::from_ymd_opt(2019, 7, 4));
}

#[test]
fn empty_read_count_means_zero() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "Read Count", "")]);
    run(&conn, file.path(), &user, false).unwrap();
    assert_eq!(reading(&conn, "Dune", &user).read_count, 0);
}

#[test]
fn existing_reading_keeps_its_shelf() {
    let (conn, user) = setup();
    let queued = with(with(dune(), "Exclusive Shelf", "to-read"), "Date Read", "");
    run(&conn, write_export(&[queued]).path(), &user, false).unwrap();
    let (to_read, _) = get_or_create_shelf(&conn, user.id, "to-read").unwrap();

    let stats = run(&conn, write_export(&[dune()]).path(), &user, false).unwrap();
    assert_eq!(stats.shelves_created, 1);
    assert_eq!(reading(&conn, "Dune", &user).shelf_id, Some(to_read.id));
}

#[test]
fn readings_are_per_user() {
    let (conn, alice) = setup();
    let bob = insert_user(&conn, "bob").unwrap();
    let file = write_export(&[dune()]);

    run(&conn, file.path(), &alice, false).unwrap();
    let stats = run(&conn, file.path(), &bob, false).unwrap();
    assert_eq!(stats.readings_created, 1);
    assert_eq!(stats.shelves_created, 1);
    assert_eq!(catalog_stats(&conn).unwrap().readings, 2);
    assert_eq!(catalog_stats(&conn).unwrap().books, 1);
}

// ── Audit and progress ──────────────────────────────────────────────────────

#[test]
fn audit_reports_created_entities() {
    let (conn, user) = setup();
    let audit = RecordingAudit::default();
    let file = write_export(&[dune()]);
    import_goodreads(&conn, file.path(), &user, &ImportOptions::default(), &audit, None)
        .unwrap();

    let lines = audit.lines();
    assert!(lines.contains(&"GoodreadsImporter.binding.created name=\"Paperback\"".to_string()));
    assert!(lines.contains(&"GoodreadsImporter.publisher.created name=\"Ace\"".to_string()));
    assert!(lines.contains(&"GoodreadsImporter.author.created full_name=\"Frank Herbert\"".to_string()));
    assert!(lines.contains(&"GoodreadsImporter.book.created title=\"Dune\"".to_string()));
    assert!(lines.contains(&"GoodreadsImporter.shelf.created user=alice name=\"read\"".to_string()));
    assert!(lines.contains(&"GoodreadsImporter.reading.created user=alice title=\"Dune\"".to_string()));
}

#[test]
fn audit_reports_untouched_book_as_updated() {
    let (conn, user) = setup();
    let file = write_export(&[dune()]);
    run(&conn, file.path(), &user, false).unwrap();

    let audit = RecordingAudit::default();
    let stats =
        import_goodreads(&conn, file.path(), &user, &ImportOptions::default(), &audit, None)
            .unwrap();
    assert_eq!(stats.books_unchanged, 1);

    let events = audit.events.borrow();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.entity == EntityKind::Book
        && e.action == AuditAction::Updated));
    assert!(events.iter().any(|e| e.entity == EntityKind::Reading
        && e.action == AuditAction::Updated));
}

#[test]
fn progress_reports_each_pass_and_row() {
    let (conn, user) = setup();
    let file = write_export(&[dune(), with(dune(), "Title", "Emma")]);
    let progress = RecordingProgress::default();

    import_goodreads(
        &conn,
        file.path(),
        &user,
        &ImportOptions::default(),
        &SilentAudit,
        Some(&progress),
    )
    .unwrap();

    assert_eq!(
        *progress.rows.borrow(),
        vec![(1, 2, "Dune".to_string()), (2, 2, "Emma".to_string())]
    );
    assert_eq!(
        *progress.phases.borrow(),
        vec![
            ImportPhase::ResolveLookups,
            ImportPhase::ImportRows { total: 2 },
        ]
    );
    assert_eq!(*progress.completed_rows.borrow(), Some(2));
}

#[test]
fn log_import_records_run() {
    let (conn, user) = setup();
    let file = write_export(&[dune()]);
    let stats = run(&conn, file.path(), &user, false).unwrap();

    let id = log_import(&conn, "goodreads_library_export.csv", &user, &stats).unwrap();
    assert!(id > 0);

    let logs = list_import_logs(&conn, None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source_type, "goodreads");
    assert_eq!(logs[0].source_name, "goodreads_library_export.csv");
    assert_eq!(logs[0].reader_id, Some(user.id));
    assert_eq!(logs[0].records_created, 2);
    assert_eq!(logs[0].records_updated, 0);
    assert_eq!(logs[0].records_unchanged, 0);
}

// ── Failures ────────────────────────────────────────────────────────────────

#[test]
fn missing_file_fails_to_open() {
    let (conn, user) = setup();
    let err = run(&conn, Path::new("/nonexistent/export.csv"), &user, false).unwrap_err();
    assert!(matches!(err, ImportError::Open { .. }));
}

#[test]
fn missing_column_fails_before_writing() {
    let (conn, user) = setup();
    let header: Vec<&'static str> = HEADER.iter().copied().filter(|h| *h != "Read Count").collect();
    let file = write_export_with_header(&header, &[dune()]);

    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(err, ImportError::AtRow { row: 1, .. }));
    assert!(matches!(err.root(), ImportError::Csv(_)));
    assert_eq!(catalog_stats(&conn).unwrap().bindings, 0);
    assert_eq!(catalog_stats(&conn).unwrap().books, 0);
}

#[test]
fn bad_date_aborts_the_row() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "Date Added", "2019-06-01")]);

    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(err, ImportError::AtRow { row: 1, .. }));
    assert!(matches!(
        err.root(),
        ImportError::InvalidDate { field: "Date Added", .. }
    ));
    // Lookups were committed, the row was not
    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.bindings, 1);
    assert_eq!(stats.books, 0);
}

#[test]
fn empty_rating_is_rejected() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "My Rating", "")]);
    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(
        err.root(),
        ImportError::InvalidNumber { field: "My Rating", .. }
    ));
}

#[test]
fn out_of_range_rating_keeps_earlier_rows() {
    let (conn, user) = setup();
    let file = write_export(&[
        dune(),
        with(with(dune(), "Title", "Emma"), "My Rating", "6"),
    ]);

    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(err, ImportError::AtRow { row: 2, .. }));
    assert!(matches!(
        err.root(),
        ImportError::Db(OperationError::Validation(ValidationError::OutOfRange { .. }))
    ));

    assert!(find_book_by_title(&conn, "Dune").unwrap().is_some());
    assert!(find_book_by_title(&conn, "Emma").unwrap().is_none());
    assert_eq!(readings_for_user(&conn, user.id).unwrap().len(), 1);
}

#[test]
fn markup_in_notes_is_rejected() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "Private Notes", "<script>alert(1)</script>")]);
    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(
        err.root(),
        ImportError::Db(OperationError::Validation(ValidationError::ContainsMarkup { .. }))
    ));
}

#[test]
fn negative_page_count_is_rejected() {
    let (conn, user) = setup();
    let file = write_export(&[with(dune(), "Number of Pages", "-3")]);
    let err = run(&conn, file.path(), &user, false).unwrap_err();
    assert!(matches!(
        err.root(),
        ImportError::Db(OperationError::Validation(ValidationError::Negative { .. }))
    ));
}
