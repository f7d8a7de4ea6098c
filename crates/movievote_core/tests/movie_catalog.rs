use movievote_core::db::open_db_in_memory;
use movievote_core::{
    CatalogError, MovieDraft, MovieListQuery, MoviePageRequest, MovieRepository, MovieService,
    Opinion, RepoError, SortKey, SqliteMovieRepository, SqliteVoteRepository, VoteRepository,
    VoteService,
};

#[test]
fn create_and_get_roundtrip_starts_counters_at_zero() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);

    let id = repo.create_movie(&draft("Alien", "ridley", 100)).unwrap();

    let loaded = repo.get_movie(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Alien");
    assert_eq!(loaded.owner, "ridley");
    assert_eq!(loaded.publication_date, 100);
    assert_eq!(loaded.likes, 0);
    assert_eq!(loaded.hates, 0);
}

#[test]
fn duplicate_title_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);

    repo.create_movie(&draft("Alien", "ridley", 100)).unwrap();
    let err = repo
        .create_movie(&draft("Alien", "someone-else", 200))
        .unwrap_err();

    assert!(matches!(err, RepoError::DuplicateTitle(title) if title == "Alien"));
}

#[test]
fn draft_validation_blocks_empty_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);

    let err = repo.create_movie(&draft("   ", "ridley", 100)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo.create_movie(&draft("Alien", "", 100)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn list_filters_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);

    repo.create_movie(&draft("Alien", "ridley", 100)).unwrap();
    repo.create_movie(&draft("Blade Runner", "ridley", 200)).unwrap();
    repo.create_movie(&draft("Heat", "michael", 300)).unwrap();

    let query = MovieListQuery {
        owner: Some("ridley".to_string()),
        ..MovieListQuery::default()
    };
    let movies = repo.list_movies(&query).unwrap();
    assert_eq!(movies.len(), 2);
    assert!(movies.iter().all(|movie| movie.owner == "ridley"));
}

#[test]
fn list_sorts_descending_by_resolved_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);
    let votes = VoteService::new(&conn);

    let old = repo.create_movie(&draft("Old", "a", 100)).unwrap();
    let new = repo.create_movie(&draft("New", "b", 200)).unwrap();
    votes.cast_vote(old, "alice", Opinion::Like).unwrap();
    votes.cast_vote(old, "bob", Opinion::Like).unwrap();
    votes.cast_vote(new, "alice", Opinion::Hate).unwrap();

    let by_date = repo.list_movies(&MovieListQuery::default()).unwrap();
    assert_eq!(ids(&by_date), vec![new, old]);

    let by_likes = repo
        .list_movies(&MovieListQuery {
            sort: SortKey::Likes,
            ..MovieListQuery::default()
        })
        .unwrap();
    assert_eq!(ids(&by_likes), vec![old, new]);

    let by_hates = repo
        .list_movies(&MovieListQuery {
            sort: SortKey::Hates,
            ..MovieListQuery::default()
        })
        .unwrap();
    assert_eq!(ids(&by_hates), vec![new, old]);
}

#[test]
fn movie_page_rejects_sort_input_outside_allow_list() {
    let conn = open_db_in_memory().unwrap();
    let service = MovieService::new(
        SqliteMovieRepository::new(&conn),
        SqliteVoteRepository::new(&conn),
    );

    let request = MoviePageRequest {
        sort: Some("id; DROP TABLE movies".to_string()),
        ..MoviePageRequest::default()
    };
    let err = service.movie_page(&request).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidSortKey(_)));

    // The allow-list accepts its own names and a date alias, nothing more.
    assert_eq!(SortKey::parse("likes").unwrap(), SortKey::Likes);
    assert_eq!(SortKey::parse("HATES").unwrap(), SortKey::Hates);
    assert_eq!(SortKey::parse("date").unwrap(), SortKey::PublicationDate);
    assert!(SortKey::parse("title").is_err());
}

#[test]
fn add_movie_through_service_reads_back_persisted_record() {
    let conn = open_db_in_memory().unwrap();
    let service = MovieService::new(
        SqliteMovieRepository::new(&conn),
        SqliteVoteRepository::new(&conn),
    );

    let movie = service.add_movie(&draft("Alien", "ridley", 100)).unwrap();
    assert_eq!(movie.title, "Alien");
    assert_eq!(movie.likes, 0);

    let err = service.add_movie(&draft("Alien", "ridley", 100)).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Repo(RepoError::DuplicateTitle(_))
    ));
}

#[test]
fn records_serialize_with_snake_case_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::new(&conn);
    let id = repo.create_movie(&draft("Alien", "ridley", 100)).unwrap();
    VoteService::new(&conn)
        .cast_vote(id, "alice", Opinion::Like)
        .unwrap();

    let movie = repo.get_movie(id).unwrap().unwrap();
    let rendered = serde_json::to_value(&movie).unwrap();
    assert_eq!(rendered["title"], "Alien");
    assert_eq!(rendered["publication_date"], 100);
    assert_eq!(rendered["likes"], 1);

    let ballots = SqliteVoteRepository::new(&conn).list_ballots("alice").unwrap();
    let rendered = serde_json::to_value(&ballots).unwrap();
    assert_eq!(rendered[0]["opinion"], "like");
}

fn draft(title: &str, owner: &str, publication_date: i64) -> MovieDraft {
    MovieDraft {
        title: title.to_string(),
        description: String::new(),
        owner: owner.to_string(),
        publication_date,
    }
}

fn ids(movies: &[movievote_core::Movie]) -> Vec<i64> {
    movies.iter().map(|movie| movie.id).collect()
}
