use crate::catalog::{
    ATMOSPHERES, Book, BrowseState, FavoriteSet, FavoriteStore, Filter, HEROES, NewBook, PACES,
    STYLES, Year,
};
use crate::client;
use crate::config::{Backend, Config};
use crate::db::{Database, NewComment};
use crate::server::handlers::{self, CommentRequest};
use crate::server::{AppState, CoverUpload};
use crate::storage::{self, FileStore, Storage};
use axum::Json;
use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Path, Query, State};
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

fn test_db() -> Database {
    Database::open_memory().unwrap()
}

fn new_book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "Author".to_string(),
        year: Some(Year::Number(2001)),
        atmosphere: "Уютная".to_string(),
        pace: "Средний".to_string(),
        hero: "Искатель".to_string(),
        style: "Лирический".to_string(),
        description: "Description".to_string(),
        cover: None,
    }
}

fn seed_books() -> Vec<Book> {
    client::bundled_seed().unwrap()
}

/// Config whose files all live in a temp dir, with the bundled seed copied in.
fn temp_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.path = dir.path().join("data").join("bookhunt.db");
    config.files.seed = dir.path().join("seed.json");
    config.files.comments = dir.path().join("comments.json");
    config.files.uploads_dir = dir.path().join("uploads");
    config.files.assets_dir = dir.path().join("assets");
    std::fs::write(&config.files.seed, client::BUNDLED_SEED).unwrap();
    config
}

fn file_state(dir: &TempDir) -> AppState {
    let mut config = temp_config(dir);
    config.storage.backend = Backend::File;
    let storage = storage::open(&config).unwrap();
    AppState::new(config, storage)
}

fn sqlite_state(dir: &TempDir) -> AppState {
    let config = temp_config(dir);
    let storage = storage::open(&config).unwrap();
    AppState::new(config, storage)
}

// ========== DATABASE ==========

#[test]
fn db_create_and_list_books() {
    let db = test_db();
    let id = db.create_book(new_book("Alpha")).unwrap();

    let books = db.list_books(100).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, id);
    assert_eq!(books[0].title, "Alpha");
    assert_eq!(books[0].year, Some(Year::Number(2001)));
}

#[test]
fn db_list_most_recent_first() {
    let db = test_db();
    let first = db.create_book(new_book("First")).unwrap();
    let second = db.create_book(new_book("Second")).unwrap();

    let books = db.list_books(100).unwrap();
    assert_eq!(books[0].id, second);
    assert_eq!(books[1].id, first);
}

#[test]
fn db_list_is_limited() {
    let db = test_db();
    for i in 0..105 {
        db.create_book(new_book(&format!("Book {}", i))).unwrap();
    }

    assert_eq!(db.book_count().unwrap(), 105);
    let books = db.list_books(100).unwrap();
    assert_eq!(books.len(), 100);
    assert_eq!(books[0].title, "Book 104");
}

#[test]
fn db_missing_cover_uses_default() {
    let db = test_db().with_default_cover("/assets/covers/none.svg");
    db.create_book(new_book("No cover")).unwrap();

    let mut with_cover = new_book("Cover");
    with_cover.cover = Some("/uploads/1_c.png".to_string());
    db.create_book(with_cover).unwrap();

    let books = db.list_books(100).unwrap();
    assert_eq!(books[0].cover.as_deref(), Some("/uploads/1_c.png"));
    assert_eq!(books[1].cover.as_deref(), Some("/assets/covers/none.svg"));
}

#[test]
fn db_keeps_non_numeric_year_as_text() {
    let db = test_db();
    let mut book = new_book("Old");
    book.year = crate::catalog::parse_year("около 1850");
    db.create_book(book).unwrap();
    db.create_book(new_book("New")).unwrap();

    let books = db.list_books(100).unwrap();
    assert_eq!(books[0].year, Some(Year::Number(2001)));
    assert_eq!(books[1].year, Some(Year::Text("около 1850".to_string())));
    assert_eq!(books[1].byline(), "Author · около 1850");
}

#[test]
fn db_counts_comments_per_book() {
    let db = test_db();
    for book_id in ["b1", "b1", "b2"] {
        db.add_comment(&NewComment {
            book_id: book_id.to_string(),
            ..Default::default()
        })
        .unwrap();
    }

    let counts = db.comment_counts().unwrap();
    assert_eq!(counts.get("b1"), Some(&2));
    assert_eq!(counts.get("b2"), Some(&1));
    assert_eq!(counts.get("b3"), None);
}

#[test]
fn db_import_preserves_seed_order() {
    let db = test_db();
    let seed = seed_books();

    assert_eq!(db.import_books(&seed).unwrap(), seed.len());
    assert_eq!(db.list_books(100).unwrap(), seed);
}

#[test]
fn db_import_is_idempotent() {
    let db = test_db();
    let seed = seed_books();

    db.import_books(&seed).unwrap();
    assert_eq!(db.import_books(&seed).unwrap(), 0);
    assert_eq!(db.book_count().unwrap(), seed.len());
}

#[test]
fn db_new_books_listed_before_seed() {
    let db = test_db();
    db.import_books(&seed_books()).unwrap();
    let id = db.create_book(new_book("Fresh")).unwrap();

    assert_eq!(db.list_books(100).unwrap()[0].id, id);
}

#[test]
fn db_comments_keep_literal_rating() {
    let db = test_db();
    let numeric = db
        .add_comment(&NewComment {
            book_id: "b1".to_string(),
            user: Some("anna".to_string()),
            text: Some("Great".to_string()),
            rating: json!(5),
        })
        .unwrap();
    let text = db
        .add_comment(&NewComment {
            book_id: "b1".to_string(),
            user: Some("oleg".to_string()),
            text: Some("Hmm".to_string()),
            rating: json!("five-ish"),
        })
        .unwrap();
    db.add_comment(&NewComment {
        book_id: "b2".to_string(),
        ..Default::default()
    })
    .unwrap();

    assert_ne!(numeric, text);

    let comments = db.list_comments("b1").unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].rating, json!(5));
    assert_eq!(comments[1].rating, json!("five-ish"));
    assert_eq!(comments[1].user.as_deref(), Some("oleg"));
}

#[test]
fn db_comment_for_unknown_book_is_accepted() {
    let db = test_db();
    db.add_comment(&NewComment {
        book_id: "does-not-exist".to_string(),
        rating: json!(3),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(db.list_comments("does-not-exist").unwrap().len(), 1);
}

// ========== FILE STORE ==========

#[test]
fn file_store_lists_seed_verbatim() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);
    let store = storage::file_store(&config);

    let raw: Vec<Value> = serde_json::from_str(client::BUNDLED_SEED).unwrap();
    assert_eq!(store.records().unwrap(), raw);
    assert_eq!(store.list_books().unwrap(), seed_books());
}

#[test]
fn file_store_keeps_records_it_does_not_understand() {
    let dir = TempDir::new().unwrap();
    let mut config = temp_config(&dir);
    let original = json!([
        {"id": "b1", "title": "Старая книга", "year": "около 1850", "cover": null, "isbn": "978-5"},
        {"id": null, "title": "Без id"},
        {"id": 7, "title": "Numeric", "tags": ["a", "b"]}
    ]);
    std::fs::write(&config.files.seed, original.to_string()).unwrap();
    config.storage.backend = Backend::File;
    let storage = storage::open(&config).unwrap();

    assert_eq!(Value::Array(storage.list_records(100).unwrap()), original);
    assert_eq!(storage.count_books().unwrap(), 3);

    // Typed views skip the record with a null id.
    let books = storage.list_books(100).unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].year, Some(Year::Text("около 1850".to_string())));
    assert_eq!(books[1].id, "7");

    let id = storage.create_book(new_book("Новая")).unwrap();
    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&config.files.seed).unwrap()).unwrap();
    let records = on_disk.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["id"], json!(id));
    assert_eq!(records[0]["title"], "Новая");
    assert_eq!(&records[1..], original.as_array().unwrap().as_slice());
}

#[test]
fn file_store_create_prepends_to_dataset() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);
    let store = storage::file_store(&config);

    let id = store.create_book(new_book("Offline")).unwrap();
    assert!(id.starts_with('b'));

    // The rewritten file is read back from disk.
    let reread = FileStore::new(&config.files.seed, &config.files.comments, "/x.svg");
    let books = reread.list_books().unwrap();
    assert_eq!(books.len(), seed_books().len() + 1);
    assert_eq!(books[0].id, id);
    assert_eq!(books[0].title, "Offline");
    assert_eq!(books[0].cover.as_deref(), Some("/assets/covers/tihie.svg"));
}

#[test]
fn file_store_ids_are_unique() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);
    let store = storage::file_store(&config);

    let mut ids: Vec<String> = (0..50)
        .map(|i| store.create_book(new_book(&format!("B{}", i))).unwrap())
        .collect();
    ids.extend(seed_books().into_iter().map(|b| b.id));

    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn file_store_comments_start_from_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);
    let store = storage::file_store(&config);
    assert!(!config.files.comments.exists());

    let first = store
        .add_comment(NewComment {
            book_id: "b1".to_string(),
            user: Some("anna".to_string()),
            text: Some("Good".to_string()),
            rating: json!("not a number"),
        })
        .unwrap();
    let second = store
        .add_comment(NewComment {
            book_id: "b1".to_string(),
            rating: json!(4),
            ..Default::default()
        })
        .unwrap();

    assert!(second > first);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.files.comments).unwrap()).unwrap();
    assert_eq!(raw[0]["bookId"], "b1");
    assert_eq!(raw[0]["rating"], "not a number");
    assert_eq!(raw[1]["rating"], 4);
}

// ========== BACKEND SELECTION ==========

#[test]
fn storage_open_seeds_empty_database() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);

    let storage = storage::open(&config).unwrap();
    assert_eq!(storage.backend(), Backend::Sqlite);
    assert_eq!(storage.list_books(100).unwrap(), seed_books());
}

#[test]
fn storage_open_falls_back_when_database_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut config = temp_config(&dir);
    // A regular file where the database directory should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    config.database.path = blocker.join("bookhunt.db");

    let storage = storage::open(&config).unwrap();
    assert_eq!(storage.backend(), Backend::File);

    config.storage.fallback_to_file = false;
    assert!(storage::open(&config).is_err());
}

#[test]
fn import_files_copies_missing_records() {
    let dir = TempDir::new().unwrap();
    let config = temp_config(&dir);
    let files = storage::file_store(&config);

    let offline = files.create_book(new_book("Written offline")).unwrap();
    files
        .add_comment(NewComment {
            book_id: offline.clone(),
            rating: json!(5),
            ..Default::default()
        })
        .unwrap();

    let db = storage::open_database(&config).unwrap();
    let report = storage::import_files(&db, &files).unwrap();
    assert_eq!(report.comments, 1);
    assert!(db.list_books(100).unwrap().iter().any(|b| b.id == offline));
    assert_eq!(db.list_comments(&offline).unwrap().len(), 1);

    let again = storage::import_files(&db, &files).unwrap();
    assert_eq!(again, storage::ImportReport::default());
}

// ========== FILTERS & FAVORITES ==========

fn with_empty(values: &[&str]) -> Vec<String> {
    std::iter::once(String::new())
        .chain(values.iter().map(|v| v.to_string()))
        .collect()
}

#[test]
fn filter_matches_every_non_empty_field() {
    let books = seed_books();
    let queries = ["", "ДОН", "михаил", "зон", "nothing-matches"];

    for atmosphere in with_empty(ATMOSPHERES) {
        for pace in with_empty(PACES) {
            for hero in with_empty(HEROES) {
                for style in with_empty(STYLES) {
                    for query in queries {
                        let filter = Filter {
                            atmosphere: atmosphere.clone(),
                            pace: pace.clone(),
                            hero: hero.clone(),
                            style: style.clone(),
                            query: query.to_string(),
                        };

                        let expected: Vec<&Book> = books
                            .iter()
                            .filter(|b| {
                                (atmosphere.is_empty() || b.atmosphere == atmosphere)
                                    && (pace.is_empty() || b.pace == pace)
                                    && (hero.is_empty() || b.hero == hero)
                                    && (style.is_empty() || b.style == style)
                                    && (query.is_empty()
                                        || b.title.to_lowercase().contains(&query.to_lowercase())
                                        || b.author.to_lowercase().contains(&query.to_lowercase())
                                        || b.description
                                            .to_lowercase()
                                            .contains(&query.to_lowercase()))
                            })
                            .collect();

                        assert_eq!(filter.apply(&books), expected, "{:?}", filter);
                    }
                }
            }
        }
    }
}

#[test]
fn filter_text_is_case_insensitive() {
    let books = seed_books();
    let filter = Filter {
        query: "ПИКНИК".to_string(),
        ..Default::default()
    };
    let found = filter.apply(&books);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "b2");
}

#[test]
fn filter_combines_tags_with_and() {
    let books = seed_books();
    let filter = Filter {
        atmosphere: "Мрачная".to_string(),
        hero: "Детектив".to_string(),
        ..Default::default()
    };
    let found = filter.apply(&books);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "b5");
}

#[test]
fn favorite_toggle_twice_restores_set() {
    let mut favorites: FavoriteSet = ["b1".to_string(), "b3".to_string()].into_iter().collect();
    let original = favorites.clone();

    for id in ["b1", "b2", "b3", "zzz"] {
        let added = favorites.toggle(id);
        assert_eq!(favorites.contains(id), added);
        favorites.toggle(id);
        assert_eq!(favorites, original);
    }
}

#[test]
fn favorite_store_persists_under_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("favorites.json");
    let store = FavoriteStore::new(&path);
    assert!(store.load().is_empty());

    let mut favorites = FavoriteSet::new();
    favorites.toggle("b4");
    favorites.toggle("b2");
    store.save(&favorites).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["favs"], json!(["b4", "b2"]));
    assert_eq!(store.load(), favorites);
}

#[test]
fn favorite_store_ignores_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("favorites.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(FavoriteStore::new(&path).load().is_empty());
}

#[test]
fn browse_state_favorites_only() {
    let books = seed_books();
    let mut state = BrowseState::default();
    state.toggle_favorite("b7");
    state.toggle_favorite("b1");
    state.favorites_only = true;

    let ids: Vec<&str> = state.visible(&books).iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "b7"]);
}

#[test]
fn book_excerpt_truncates_long_descriptions() {
    let books = seed_books();
    let long = books.iter().find(|b| b.id == "b1").unwrap();
    let excerpt = long.excerpt();
    assert!(excerpt.ends_with('…'));
    assert_eq!(excerpt.chars().count(), crate::catalog::EXCERPT_CHARS + 1);

    let short = books.iter().find(|b| b.id == "b4").unwrap();
    assert_eq!(short.excerpt(), short.description);
}

#[test]
fn book_accepts_numeric_ids_and_string_years() {
    let book: Book = serde_json::from_str(
        r#"{"id": 42, "title": "T", "author": "A", "year": "1999", "atmosphere": "Уютная"}"#,
    )
    .unwrap();
    assert_eq!(book.id, "42");
    assert_eq!(book.year, Some(Year::Text("1999".to_string())));
    assert_eq!(book.cover, None);
    assert_eq!(book.byline(), "A · 1999");
}

// ========== CLIENT ==========

#[test]
fn client_falls_back_to_bundled_seed() {
    // Nothing listens on port 9 of localhost in the test environment.
    let books = tokio_test::block_on(client::load_books("http://127.0.0.1:9"));
    assert_eq!(books, seed_books());
}

#[test]
fn client_render_marks_favorites() {
    let books = seed_books();
    let mut state = BrowseState::with_filter(Filter {
        pace: "Быстрый".to_string(),
        ..Default::default()
    });
    state.toggle_favorite("b5");

    let out = client::render(&state, &books);
    assert!(out.starts_with("Избранное: 1"));
    assert!(out.contains("❤ Собака Баскервилей"));
    assert!(!out.contains("Тихий Дон"));
}

// ========== HANDLERS ==========

#[tokio::test]
async fn handler_lists_seeded_books() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);

    let Json(records) = handlers::api_books(State(state)).await.unwrap();
    assert_eq!(Book::from_records(records), seed_books());
}

#[tokio::test]
async fn handler_lists_file_dataset_as_stored() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir);

    let Json(records) = handlers::api_books(State(state)).await.unwrap();
    let raw: Vec<Value> = serde_json::from_str(client::BUNDLED_SEED).unwrap();
    assert_eq!(records, raw);
}

#[tokio::test]
async fn handler_comment_accepts_any_rating() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);

    let Json(created) = handlers::add_comment(
        State(state.clone()),
        Path("b3".to_string()),
        Json(CommentRequest {
            user: Some("ivan".to_string()),
            text: Some("Любимая книга".to_string()),
            rating: json!("десять"),
        }),
    )
    .await
    .unwrap();
    assert!(created.ok);

    let Json(comments) = handlers::list_comments(State(state), Path("b3".to_string()))
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, created.id);
    assert_eq!(comments[0].rating, json!("десять"));
}

#[tokio::test]
async fn handler_stats_reports_backend() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir);

    let Json(stats) = handlers::api_stats(State(state)).await.unwrap();
    assert_eq!(stats.backend, "file");
    assert_eq!(stats.total_books, seed_books().len());
}

#[tokio::test]
async fn handler_stats_counts_past_listing_limit() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);
    for i in 0..100 {
        state.create_book(new_book(&format!("Extra {}", i)), None).unwrap();
    }

    let Json(stats) = handlers::api_stats(State(state.clone())).await.unwrap();
    assert_eq!(stats.backend, "sqlite");
    assert_eq!(stats.total_books, seed_books().len() + 100);
    assert_eq!(state.list_books().unwrap().len(), 100);
}

#[tokio::test]
async fn index_page_renders_filtered_cards() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);
    for _ in 0..2 {
        state
            .add_comment(NewComment {
                book_id: "b7".to_string(),
                ..Default::default()
            })
            .unwrap();
    }

    let filter = Filter {
        atmosphere: "Романтичная".to_string(),
        ..Default::default()
    };
    let html = handlers::index(State(state), Query(filter)).await.unwrap().0;

    assert!(html.contains("Гордость и предубеждение"));
    assert!(html.contains("Комментарии: 2"));
    assert!(!html.contains("Пикник на обочине"));
    assert!(html.contains("<option selected>Романтичная</option>"));
    assert!(html.contains(r#"var key = "favs";"#));
}

#[test]
fn page_escapes_book_fields() {
    let books = vec![Book {
        id: "x".to_string(),
        title: "<script>alert(1)</script>".to_string(),
        author: "A & B".to_string(),
        year: None,
        atmosphere: String::new(),
        pace: String::new(),
        hero: String::new(),
        style: String::new(),
        description: String::new(),
        cover: None,
    }];

    let html = crate::server::page::render("T", &BrowseState::default(), &books, &HashMap::new());
    assert!(!html.contains("<script>alert"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("A &amp; B"));
    assert!(html.contains("Комментарии: 0"));
}

#[tokio::test]
async fn index_page_counts_file_comments() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir);
    state
        .add_comment(NewComment {
            book_id: "b8".to_string(),
            rating: json!(5),
            ..Default::default()
        })
        .unwrap();

    let filter = Filter {
        query: "хоббит".to_string(),
        ..Default::default()
    };
    let html = handlers::index(State(state), Query(filter)).await.unwrap().0;
    assert!(html.contains("Хоббит"));
    assert!(html.contains("Комментарии: 1"));
}

// ========== BOOK CREATION ==========

#[test]
fn create_book_on_file_backend_lands_in_dataset() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir);

    let id = state.create_book(new_book("Fallback"), None).unwrap();

    let books = storage::file_store(&state.config).list_books().unwrap();
    assert_eq!(books[0].id, id);
}

#[test]
fn create_book_saves_cover_upload() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);

    let id = state
        .create_book(
            new_book("With cover"),
            Some(CoverUpload {
                file_name: Some("../my cover.png".to_string()),
                data: vec![0x89, b'P', b'N', b'G'],
            }),
        )
        .unwrap();

    let books = state.list_books().unwrap();
    let book = books.iter().find(|b| b.id == id).unwrap();
    let cover = book.cover.as_deref().unwrap();
    assert!(cover.starts_with("/uploads/"));
    assert!(cover.ends_with("_my%20cover.png"));

    let saved: Vec<_> = std::fs::read_dir(&state.config.files.uploads_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("_my cover.png"));
    assert_eq!(
        std::fs::read(state.config.files.uploads_dir.join(&saved[0])).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
}

#[test]
fn storage_trait_object_is_shareable() {
    let db: Arc<dyn Storage> = Arc::new(test_db());
    let handle = std::thread::spawn({
        let db = db.clone();
        move || db.create_book(new_book("Threaded")).unwrap()
    });
    let id = handle.join().unwrap();
    assert_eq!(db.list_books(10).unwrap()[0].id, id);
}

// ========== ADMIN FORM ==========

const BOUNDARY: &str = "bookhunt-form-boundary";

/// A form part: name, optional file name, content.
type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

async fn multipart(parts: &[Part<'_>]) -> Multipart {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/book")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    Multipart::from_request(request, &()).await.unwrap()
}

#[tokio::test]
async fn admin_form_with_cover_lands_in_dataset() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir);

    let form = multipart(&[
        ("title", None, "Записки охотника".as_bytes()),
        ("author", None, "Иван Тургенев".as_bytes()),
        ("year", None, "около 1850".as_bytes()),
        ("atmosphere", None, "Меланхоличная".as_bytes()),
        ("newsletter", None, "yes".as_bytes()),
        ("cover", Some("zapiski.png"), &[0x89, b'P', b'N', b'G'][..]),
    ])
    .await;

    let Json(created) = handlers::admin_create_book(State(state.clone()), form)
        .await
        .unwrap();
    assert!(created.ok);
    assert!(created.id.starts_with('b'));

    let records = storage::file_store(&state.config).records().unwrap();
    assert_eq!(records.len(), seed_books().len() + 1);
    let record = &records[0];
    assert_eq!(record["id"], json!(created.id));
    assert_eq!(record["title"], "Записки охотника");
    assert_eq!(record["year"], "около 1850");
    assert_eq!(record["atmosphere"], "Меланхоличная");
    assert!(record.get("newsletter").is_none());
    let cover = record["cover"].as_str().unwrap();
    assert!(cover.starts_with("/uploads/"));
    assert!(cover.ends_with("_zapiski.png"));
}

#[tokio::test]
async fn admin_form_ignores_empty_cover_part() {
    let dir = TempDir::new().unwrap();
    let state = sqlite_state(&dir);

    let form = multipart(&[
        ("title", None, "Dune".as_bytes()),
        ("author", None, "Frank Herbert".as_bytes()),
        ("year", None, "1965".as_bytes()),
        ("cover", Some(""), &[][..]),
    ])
    .await;

    let Json(created) = handlers::admin_create_book(State(state.clone()), form)
        .await
        .unwrap();
    assert!(created.ok);

    let books = state.list_books().unwrap();
    assert_eq!(books[0].id, created.id);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].year, Some(Year::Number(1965)));
    assert_eq!(books[0].cover.as_deref(), Some("/assets/covers/tihie.svg"));
    assert!(!state.config.files.uploads_dir.exists());

    let body = serde_json::to_value(&created).unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["id"], json!(created.id));
}

#[tokio::test]
async fn admin_form_failure_is_json_error() {
    let dir = TempDir::new().unwrap();
    let mut config = temp_config(&dir);
    config.storage.backend = Backend::File;
    // A directory where the dataset file should be.
    config.files.seed = dir.path().join("seed-dir");
    std::fs::create_dir_all(&config.files.seed).unwrap();
    let storage = storage::open(&config).unwrap();
    let state = AppState::new(config, storage);

    let form = multipart(&[("title", None, "Unwritable".as_bytes())]).await;
    let err = handlers::admin_create_book(State(state), form)
        .await
        .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("IO error"));
}
